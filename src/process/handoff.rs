use super::{find_in_path, HandoffError};
use crate::config::IPC_URL_VAR;
use crate::event::{EventSender, Notification};
use crate::ipc::IpcEndpoint;
use crate::log_info;
use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

/// Process-level actions the controller delegates.
pub trait Handoff {
    /// Replace this process with the editor. Returns only on failure.
    fn replace(&mut self, target: &str) -> HandoffError;

    /// Start the editor as a child; `ChildExited` is posted when it ends.
    fn spawn_and_wait(
        &mut self,
        target: &str,
        notes: EventSender<Notification>,
    ) -> Result<(), HandoffError>;

    /// Send SIGSTOP to our own process.
    fn stop_self(&mut self) -> Result<(), HandoffError>;
}

/// The real implementation over `exec`, `fork` and `kill`.
#[derive(Debug, Clone)]
pub struct ProcessHandoff {
    editor: Option<Vec<String>>,
    tty_reset: String,
    endpoint: Option<IpcEndpoint>,
    path_var: Option<OsString>,
}

impl ProcessHandoff {
    pub fn new(editor: Option<Vec<String>>, tty_reset: String, endpoint: Option<IpcEndpoint>) -> Self {
        Self {
            editor,
            tty_reset,
            endpoint,
            path_var: std::env::var_os("PATH"),
        }
    }

    pub fn with_path_var(mut self, path_var: Option<OsString>) -> Self {
        self.path_var = path_var;
        self
    }

    fn editor(&self) -> Result<(&str, &[String]), HandoffError> {
        match self.editor.as_deref() {
            Some([program, args @ ..]) => Ok((program.as_str(), args)),
            _ => Err(HandoffError::NoEditor),
        }
    }

    fn resolve(&self, program: &str) -> Result<PathBuf, HandoffError> {
        if program.contains('/') {
            let path = PathBuf::from(program);
            return if path.is_file() {
                Ok(path)
            } else {
                Err(HandoffError::NotFound(program.to_string()))
            };
        }
        self.path_var
            .as_deref()
            .and_then(|path_var| find_in_path(program, path_var))
            .ok_or_else(|| HandoffError::NotFound(program.to_string()))
    }

    /// The single `sh -c` exec that resets the tty and then execs the editor.
    pub fn replace_command(&self, target: &str) -> Result<Command, HandoffError> {
        let (program, args) = self.editor()?;
        let program = self.resolve(program)?;
        let shell = self.resolve("sh")?;
        log_info(&format!(
            "exec wrapper {} for {}, tty reset {:?}",
            shell.display(),
            program.display(),
            self.tty_reset
        ));
        Ok(wrapper_command(&shell, &self.tty_reset, &program, args, target))
    }
}

pub(crate) fn wrapper_command(
    shell: &Path,
    tty_reset: &str,
    program: &Path,
    args: &[String],
    target: &str,
) -> Command {
    let mut command = Command::new(shell);
    command
        .arg0("sh")
        .arg("-c")
        .arg(format!("{tty_reset} ; exec \"$@\""))
        .arg("vilark-exec")
        .arg(program)
        .args(args)
        .arg(target)
        .env_remove(IPC_URL_VAR);
    command
}

impl Handoff for ProcessHandoff {
    fn replace(&mut self, target: &str) -> HandoffError {
        let mut command = match self.replace_command(target) {
            Ok(command) => command,
            Err(err) => return err,
        };
        tracing::info!(target, "exec replace");
        let source = command.exec();
        HandoffError::Exec {
            program: command.get_program().to_string_lossy().into_owned(),
            source,
        }
    }

    fn spawn_and_wait(
        &mut self,
        target: &str,
        notes: EventSender<Notification>,
    ) -> Result<(), HandoffError> {
        let (program, args) = self.editor()?;
        let mut command = Command::new(program);
        command.args(args).arg(target);
        if let Some(endpoint) = &self.endpoint {
            command.env(IPC_URL_VAR, endpoint.url());
        }
        let mut child = command.spawn().map_err(|source| HandoffError::Spawn {
            program: program.to_string(),
            source,
        })?;
        let pid = child.id();
        tracing::info!(pid, program, "child spawned");
        log_info(&format!("spawned {program} pid={pid}"));

        thread::Builder::new()
            .name("child-wait".to_string())
            .spawn(move || {
                match child.wait() {
                    Ok(status) => {
                        tracing::info!(pid, code = status.code(), "child exited");
                        log_info(&format!("child {pid} exited: {status}"));
                    }
                    Err(err) => log_info(&format!("waiting for child {pid} failed: {err}")),
                }
                notes.send(Notification::ChildExited);
            })?;
        Ok(())
    }

    fn stop_self(&mut self) -> Result<(), HandoffError> {
        log_info("stopping self with SIGSTOP");
        // SAFETY: kill() on our own pid has no memory-safety preconditions.
        let rc = unsafe { libc::kill(libc::getpid(), libc::SIGSTOP) };
        if rc != 0 {
            return Err(HandoffError::Stop(std::io::Error::last_os_error()));
        }
        Ok(())
    }
}
