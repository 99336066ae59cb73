use crate::log_info;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Where the final choice is reported (`VILARK_OUTPUT_FILE`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTarget {
    path: Option<PathBuf>,
}

impl OutputTarget {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Truncate the file and write the choice, if any. No file, no-op.
    pub fn write(&self, choice: Option<&str>) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        log_info(&format!(
            "writing {} to {}",
            if choice.is_some() { "choice" } else { "empty result" },
            path.display()
        ));
        fs::write(path, choice.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::process;

    #[test]
    fn writes_choice_and_truncates_on_cancel() {
        let path = env::temp_dir().join(format!("vilark_output_{}.txt", process::id()));
        let target = OutputTarget::new(Some(path.clone()));
        target.write(Some("/work/a.txt")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "/work/a.txt");
        target.write(None).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_target_is_a_no_op() {
        assert!(OutputTarget::default().write(Some("x")).is_ok());
    }
}
