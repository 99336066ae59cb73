use crate::LogConfig;
use std::fs::OpenOptions;
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Install the JSON-lines tracing subscriber, only while the debug log is enabled.
pub fn init_tracing(config: &LogConfig) {
    if config.path.is_none() {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let file = match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.trace_path)
        {
            Ok(file) => file,
            Err(_) => return,
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_thread_names(true)
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
