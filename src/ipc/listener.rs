use super::IpcError;
use crate::event::{EventChannel, EventSender, Notification};
use crate::log_info;
use std::fs;
use std::io::{self, Read, Write};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;

const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// The socket path a spawned editor should talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcEndpoint {
    path: PathBuf,
}

impl IpcEndpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value exported as `VILARK_IPC_URL`.
    pub fn url(&self) -> String {
        self.path.display().to_string()
    }

    pub fn remove_socket(&self) {
        if self.path.exists() {
            log_info(&format!("removing socket {}", self.path.display()));
            if let Err(err) = fs::remove_file(&self.path) {
                log_info(&format!("could not remove {}: {err}", self.path.display()));
            }
        }
    }
}

/// Controller side of the reply path.
#[derive(Debug, Clone)]
pub struct IpcReplier {
    replies: EventSender<String>,
}

impl IpcReplier {
    pub(crate) fn new(replies: EventSender<String>) -> Self {
        Self { replies }
    }

    /// An absolute path, or `""` when the user cancelled.
    pub fn reply(&self, response: &str) {
        tracing::info!(bytes = response.len(), "ipc reply");
        self.replies.send(response.to_string());
    }
}

/// A bound Unix socket serving one request at a time.
pub struct IpcListener {
    listener: UnixListener,
    endpoint: IpcEndpoint,
}

impl IpcListener {
    /// `/tmp/vilark.sock.<pid>`
    pub fn default_path() -> PathBuf {
        PathBuf::from(format!("/tmp/vilark.sock.{}", process::id()))
    }

    pub fn bind(path: impl Into<PathBuf>) -> Result<Self, IpcError> {
        let path = path.into();
        // A leftover from an earlier process with our pid.
        let _ = fs::remove_file(&path);
        let listener = UnixListener::bind(&path).map_err(|source| IpcError::Bind {
            path: path.clone(),
            source,
        })?;
        log_info(&format!("listening on socket {}", path.display()));
        Ok(Self {
            listener,
            endpoint: IpcEndpoint { path },
        })
    }

    pub fn endpoint(&self) -> IpcEndpoint {
        self.endpoint.clone()
    }

    /// Start the `ipc` thread. A failure there is reported as `FatalError`.
    pub fn spawn(self, notes: EventSender<Notification>) -> Result<IpcReplier, IpcError> {
        let replies = EventChannel::new();
        let replier = IpcReplier::new(replies.sender());
        thread::Builder::new()
            .name("ipc".to_string())
            .spawn(move || {
                if let Err(err) = serve(&self.listener, &notes, &replies) {
                    log_info(&format!("ipc listener stopped: {err}"));
                    notes.send(Notification::FatalError {
                        message: err.to_string(),
                    });
                }
            })?;
        Ok(replier)
    }
}

fn serve(
    listener: &UnixListener,
    notes: &EventSender<Notification>,
    replies: &EventChannel<String>,
) -> Result<(), IpcError> {
    loop {
        let (mut stream, _) = listener.accept().map_err(IpcError::Accept)?;
        let payload = match read_request(&mut stream) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                log_info("ipc client closed before sending a request");
                continue;
            }
            Err(err) => {
                log_info(&format!("ipc request read failed: {err}"));
                continue;
            }
        };
        tracing::info!(bytes = payload.len(), "ipc request");
        if !notes.send(Notification::WebRequest { payload }) {
            return Ok(());
        }
        let response = replies.recv().map_err(|_| IpcError::ReplyChannelClosed)?;
        if let Err(err) = stream.write_all(response.as_bytes()) {
            log_info(&format!("ipc reply write failed: {err}"));
        }
    }
}

/// Read up to and including the first newline; `None` if nothing arrived.
pub(crate) fn read_request(stream: &mut impl Read) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.last() == Some(&b'\n') || buf.len() >= MAX_REQUEST_BYTES {
            break;
        }
    }
    if buf.is_empty() {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
