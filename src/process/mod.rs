//! Handing the terminal to an editor: exec-replace, spawn-and-wait, self-stop.

mod handoff;

#[cfg(test)]
mod tests;

use std::ffi::OsStr;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use thiserror::Error;

pub use handoff::{Handoff, ProcessHandoff};

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("no editor configured")]
    NoEditor,
    #[error("can't find {0} in $PATH")]
    NotFound(String),
    #[error("exec of {program} failed: {source}")]
    Exec {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("self-stop failed: {0}")]
    Stop(#[source] io::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// First executable `program` along a `PATH`-style list.
pub fn find_in_path(program: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| {
            candidate
                .metadata()
                .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        })
}
