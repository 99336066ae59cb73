//! Fast-switch requests over a Unix socket.
//!
//! Protocol: the client writes one newline-terminated request; the reply is
//! an absolute path (or an empty string on cancel), then the connection closes.

mod listener;


use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use listener::{IpcEndpoint, IpcListener, IpcReplier};

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("cannot bind socket {path}: {source}")]
    Bind {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("socket accept failed: {0}")]
    Accept(#[source] io::Error),
    #[error("reply channel closed")]
    ReplyChannelClosed,
    #[error(transparent)]
    Io(#[from] io::Error),
}
