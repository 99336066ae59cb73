/// One selectable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    search: String,
    display: String,
    choice: String,
}

impl Item {
    /// A scanned file; `relative` is below `root_prefix`, which ends in `/`.
    pub fn scanned(root_prefix: &str, relative: String) -> Self {
        Self {
            display: file_display_string(&relative),
            choice: format!("{root_prefix}{relative}"),
            search: relative,
        }
    }

    /// A line from an input file, chosen verbatim.
    pub fn external(line: &str, display_as_file: bool) -> Self {
        let display = if display_as_file {
            file_display_string(line)
        } else {
            line.to_string()
        };
        Self {
            search: line.to_string(),
            display,
            choice: line.to_string(),
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn display_text(&self) -> &str {
        &self.display
    }

    pub fn choice(&self) -> &str {
        &self.choice
    }
}

/// `some/dir/file.txt` → `some/dir | file.txt`; anything else unchanged.
pub fn file_display_string(path: &str) -> String {
    match path.rfind('/') {
        Some(split) if split > 0 && !path.ends_with('/') => {
            format!("{} | {}", &path[..split], &path[split + 1..])
        }
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_splits_directory_from_file() {
        assert_eq!(file_display_string("src/ui/mod.rs"), "src/ui | mod.rs");
        assert_eq!(file_display_string("README.md"), "README.md");
        assert_eq!(file_display_string("/etc"), "/etc");
        assert_eq!(file_display_string("dir/"), "dir/");
    }

    #[test]
    fn scanned_items_choose_absolute_paths() {
        let item = Item::scanned("/work/", "src/main.rs".to_string());
        assert_eq!(item.search_text(), "src/main.rs");
        assert_eq!(item.display_text(), "src | main.rs");
        assert_eq!(item.choice(), "/work/src/main.rs");
    }

    #[test]
    fn external_items_choose_the_raw_line() {
        let plain = Item::external("notes/today.md", false);
        assert_eq!(plain.display_text(), "notes/today.md");
        let as_file = Item::external("notes/today.md", true);
        assert_eq!(as_file.display_text(), "notes | today.md");
        assert_eq!(as_file.choice(), "notes/today.md");
    }
}
