use crate::loader::Item;
use std::fmt;

/// Everything that is neither a keypress nor a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Progress { processed: usize, ignored: usize },
    Completed { items: Vec<Item> },
    FatalError { message: String },
    ChildExited,
    ForceRedraw,
    WebRequest { payload: String },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Progress { .. } => "progress",
            Self::Completed { .. } => "completed",
            Self::FatalError { .. } => "fatal_error",
            Self::ChildExited => "child_exited",
            Self::ForceRedraw => "force_redraw",
            Self::WebRequest { .. } => "web_request",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Progress { processed, ignored } => {
                write!(f, "progress processed={processed} ignored={ignored}")
            }
            Self::Completed { items } => write!(f, "completed items={}", items.len()),
            Self::FatalError { message } => write!(f, "fatal error: {message}"),
            Self::WebRequest { payload } => write!(f, "web request bytes={}", payload.len()),
            other => f.write_str(other.kind()),
        }
    }
}
