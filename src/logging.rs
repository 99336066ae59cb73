use crate::lock_or_recover;
use std::{
    fs,
    io::Write,
    panic,
    path::PathBuf,
    sync::{
        atomic::{AtomicU8, Ordering},
        Mutex, OnceLock,
    },
    thread,
    time::{SystemTime, UNIX_EPOCH},
};

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const LEVEL_OFF: u8 = 0;
const LEVEL_INFO: u8 = 1;
const LEVEL_DEBUG: u8 = 2;

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LEVEL_OFF);
static LOG_STATE: OnceLock<Mutex<LogState>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Info,
    /// Adds byte-level keyboard tracing.
    Debug,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "INFO" => Some(Self::Info),
            "DEBUG" => Some(Self::Debug),
            _ => None,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Info => LEVEL_INFO,
            Self::Debug => LEVEL_DEBUG,
        }
    }
}

/// Where (and whether) the debug log and the structured trace go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig {
    /// `None` keeps logging off entirely.
    pub path: Option<PathBuf>,
    pub level: LogLevel,
    pub trace_path: PathBuf,
}

struct LogWriter {
    path: PathBuf,
    file: fs::File,
    max_bytes: u64,
    bytes_written: u64,
}

impl LogWriter {
    fn new(path: PathBuf, max_bytes: u64) -> Option<Self> {
        let mut bytes_written = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if bytes_written > max_bytes {
            let _ = fs::remove_file(&path);
            bytes_written = 0;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()?;
        Some(Self {
            path,
            file,
            max_bytes,
            bytes_written,
        })
    }

    fn rotate_if_needed(&mut self, next_len: usize) {
        if self.bytes_written.saturating_add(next_len as u64) <= self.max_bytes {
            return;
        }
        if let Ok(file) = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
        {
            self.file = file;
            self.bytes_written = 0;
        }
    }

    fn write_line(&mut self, line: &str) {
        self.rotate_if_needed(line.len());
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.bytes_written = self.bytes_written.saturating_add(line.len() as u64);
        }
    }
}

#[derive(Default)]
struct LogState {
    writer: Option<LogWriter>,
}

fn log_state() -> &'static Mutex<LogState> {
    LOG_STATE.get_or_init(|| Mutex::new(LogState::default()))
}

/// Open the debug log named by the config. Never writes to the terminal.
pub fn init_logging(config: &LogConfig) {
    let mut state = lock_or_recover(log_state(), "logging::init_logging");
    state.writer = config
        .path
        .clone()
        .and_then(|path| LogWriter::new(path, LOG_MAX_BYTES));
    let level = match state.writer {
        Some(_) => config.level.as_u8(),
        None => LEVEL_OFF,
    };
    LOG_LEVEL.store(level, Ordering::Relaxed);
}

/// True when byte-level tracing should be computed at all.
pub fn debug_enabled() -> bool {
    LOG_LEVEL.load(Ordering::Relaxed) >= LEVEL_DEBUG
}

pub fn log_info(msg: &str) {
    write_at(LEVEL_INFO, msg);
}

pub fn log_debug(msg: &str) {
    write_at(LEVEL_DEBUG, msg);
}

fn write_at(level: u8, msg: &str) {
    let current = LOG_LEVEL.load(Ordering::Relaxed);
    if current == LEVEL_OFF || level > current {
        return;
    }
    let line = format_line(msg);
    let mut state = lock_or_recover(log_state(), "logging::write_at");
    if let Some(writer) = state.writer.as_mut() {
        writer.write_line(&line);
    }
}

fn format_line(msg: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let current = thread::current();
    let name = current.name().unwrap_or("unnamed");
    format!(
        "{}.{:03} {name} {msg}\n",
        now.as_secs(),
        now.subsec_millis()
    )
}

/// Record a panic location and payload in the debug log, if one is open.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let payload = if let Some(text) = info.payload().downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = info.payload().downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    };
    log_info(&format!(
        "panic at {location}: {payload} (v{})",
        env!("CARGO_PKG_VERSION")
    ));
}
