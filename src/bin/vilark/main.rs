//! vilark entrypoint so the picker's producers and controller start as one session.
//!
//! # Threads
//!
//! - keyboard: decodes tty bytes, one keypress in flight at a time
//! - signals: hands each signal to the controller and waits for its ack
//! - loader: scans the directory (or reads the input file)
//! - redraw-timer: animates the loading spinner
//! - ipc: serves fast-switch requests from a running editor
//!
//! The main thread runs the session controller, the only writer to the tty.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use vilark::config::{Cli, PickerConfig, Settings};
use vilark::input::{spawn_keyboard_thread, KeyDecoder, TtyByteSource};
use vilark::ipc::IpcListener;
use vilark::loader::{spawn_loader, LoaderConfig};
use vilark::output::OutputTarget;
use vilark::process::ProcessHandoff;
use vilark::screen::{Screen, TtyScreen};
use vilark::session::{
    Channels, Flow, RedrawTimer, SessionController, SessionOptions, REDRAW_INTERVAL,
};
use vilark::signals::SignalCoordinator;
use vilark::terminal_restore::{install_terminal_panic_hook, restore_terminal};
use vilark::ui::PickerUi;
use vilark::{init_logging, init_tracing, log_info, VERSION};

fn main() {
    let cli = Cli::parse();
    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            restore_terminal();
            log_info(&format!("fatal: {err:#}"));
            println!("Fatal Error\n{err:#}");
            1
        }
    };
    // Blocked producer threads end with the process.
    process::exit(code);
}

fn run(cli: &Cli) -> Result<i32> {
    let config = PickerConfig::from_env(cli)?;
    init_logging(&config.log);
    init_tracing(&config.log);
    log_info(&format!("=== vilark {VERSION} started ==="));
    log_info(&format!("root={} editor={:?}", config.root.display(), config.editor));
    install_terminal_panic_hook();

    let settings = Settings::load(config.settings_file.as_deref());

    let tty = TtyScreen::open_tty().context("opening /dev/tty")?;
    let keyboard_tty = tty.try_clone().context("duplicating the tty handle")?;
    let screen = TtyScreen::new(tty, config.preserve_terminal);

    let channels = Channels::new();
    let keys = channels.keyboard.sender();
    let notes = channels.notifications.sender();
    let _signals = SignalCoordinator::install(channels.signals.sender())
        .context("installing signal handlers")?;

    let ipc = if config.wants_ipc_listener() {
        let listener = IpcListener::bind(IpcListener::default_path())?;
        let endpoint = listener.endpoint();
        let replier = listener.spawn(notes.clone())?;
        Some((endpoint, replier))
    } else {
        None
    };

    let handoff = ProcessHandoff::new(
        config.editor.clone(),
        config.tty_reset.clone(),
        ipc.as_ref().map(|(endpoint, _)| endpoint.clone()),
    );
    let ui = PickerUi::new(config.input_label.clone(), settings, screen.size());
    let options = SessionOptions {
        has_editor: config.has_editor(),
        settings_path: config.settings_file.clone(),
        output: OutputTarget::new(config.output_file.clone()),
    };
    let mut controller = SessionController::new(channels, screen, handoff, ui, options);
    if let Some((endpoint, replier)) = ipc {
        controller = controller.with_ipc(endpoint, replier);
    }
    controller.set_redraw_timer(
        RedrawTimer::start(notes.clone(), REDRAW_INTERVAL).context("starting redraw timer")?,
    );

    controller.start()?;
    spawn_keyboard_thread(
        KeyDecoder::new(TtyByteSource::new(keyboard_tty)),
        keys,
        notes.clone(),
    )
    .context("starting keyboard thread")?;
    spawn_loader(LoaderConfig::from(&config), notes).context("starting loader thread")?;

    match controller.run()? {
        Flow::Exit(code) => {
            log_info(&format!("exit {code}"));
            Ok(code)
        }
        Flow::Fatal(message) => {
            log_info(&format!("fatal: {message}"));
            println!("Fatal Error\n{message}");
            Ok(1)
        }
        Flow::Continue => Ok(0),
    }
}
