use super::state::SessionState;
use super::timer::RedrawTimer;
use crate::config::{EditorLaunchMode, FastSwitchSearch};
use crate::event::{EventChannel, Notification};
use crate::input::KeyEvent;
use crate::ipc::{IpcEndpoint, IpcReplier};
use crate::loader::Item;
use crate::output::OutputTarget;
use crate::process::Handoff;
use crate::screen::Screen;
use crate::signals::{SignalEvent, SignalKind};
use crate::ui::{PickerUi, UiAction};
use crate::{debug_enabled, log_debug, log_info};
use anyhow::{Context, Result};
use crossbeam_channel::Select;
use std::env;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const SPINNER_FRAME_MS: u128 = 250;

/// The three mailboxes the controller drains.
pub struct Channels {
    pub keyboard: EventChannel<KeyEvent>,
    pub signals: EventChannel<SignalEvent>,
    pub notifications: EventChannel<Notification>,
}

impl Channels {
    pub fn new() -> Self {
        Self {
            keyboard: EventChannel::new(),
            signals: EventChannel::new(),
            notifications: EventChannel::new(),
        }
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Terminal is already cleaned up; exit with this status.
    Exit(i32),
    /// Terminal is already cleaned up; print the message and exit 1.
    Fatal(String),
}

/// Startup facts the controller needs besides its collaborators.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub has_editor: bool,
    pub settings_path: Option<PathBuf>,
    pub output: OutputTarget,
}

/// Single consumer of every event; the only writer to the terminal.
pub struct SessionController<S: Screen, H: Handoff> {
    channels: Channels,
    screen: S,
    handoff: H,
    ui: PickerUi,
    state: SessionState,
    options: SessionOptions,
    endpoint: Option<IpcEndpoint>,
    replier: Option<IpcReplier>,
    redraw_timer: Option<RedrawTimer>,
    started: Instant,
}

impl<S: Screen, H: Handoff> SessionController<S, H> {
    pub fn new(channels: Channels, screen: S, handoff: H, ui: PickerUi, options: SessionOptions) -> Self {
        Self {
            channels,
            screen,
            handoff,
            ui,
            state: SessionState::default(),
            options,
            endpoint: None,
            replier: None,
            redraw_timer: None,
            started: Instant::now(),
        }
    }

    pub fn with_ipc(mut self, endpoint: IpcEndpoint, replier: IpcReplier) -> Self {
        self.endpoint = Some(endpoint);
        self.replier = Some(replier);
        self
    }

    pub fn set_redraw_timer(&mut self, timer: RedrawTimer) {
        self.redraw_timer = Some(timer);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn ui(&self) -> &PickerUi {
        &self.ui
    }

    /// Take over the terminal and draw the first frame.
    pub fn start(&mut self) -> Result<()> {
        let started = self
            .screen
            .enter()
            .context("entering raw mode")
            .and_then(|()| self.redraw());
        if started.is_err() {
            self.screen.cleanup();
            self.prepare_exit();
        }
        started
    }

    /// Dispatch until an exit path is taken. A dispatch error leaves the
    /// same way a fatal notification does.
    pub fn run(&mut self) -> Result<Flow> {
        loop {
            match self.step(None) {
                Ok(Some(Flow::Continue)) | Ok(None) => {}
                Ok(Some(flow)) => return Ok(flow),
                Err(err) => {
                    log_info(&format!("session error: {err:#}"));
                    self.screen.cleanup();
                    self.prepare_exit();
                    tracing::info!(exit = "error", "session exit");
                    return Ok(Flow::Fatal(format!("{err:#}")));
                }
            }
        }
    }

    /// Wait for one event (or the timeout) and dispatch it.
    pub fn step(&mut self, timeout: Option<Duration>) -> Result<Option<Flow>> {
        let mut select = Select::new();
        let keyboard = select.recv(self.channels.keyboard.wait_handle());
        let signals = select.recv(self.channels.signals.wait_handle());
        let notifications = select.recv(self.channels.notifications.wait_handle());
        let ready = match timeout {
            Some(timeout) => match select.ready_timeout(timeout) {
                Ok(index) => index,
                Err(_) => return Ok(None),
            },
            None => select.ready(),
        };
        drop(select);

        let flow = if ready == keyboard {
            let event = self.channels.keyboard.take();
            self.on_key(event)?
        } else if ready == signals {
            let event = self.channels.signals.take();
            self.on_signal(event)?
        } else if ready == notifications {
            let note = self.channels.notifications.take();
            self.on_notification(note)?
        } else {
            unreachable!("select returned unknown operation {ready}");
        };
        Ok(Some(flow))
    }

    fn on_key(&mut self, event: KeyEvent) -> Result<Flow> {
        let KeyEvent { key, ack } = event;
        if self.state.terminating {
            log_debug(&format!("key {key} dropped while terminating"));
            return Ok(Flow::Continue);
        }
        if debug_enabled() {
            log_debug(&format!("key {key} mode={:?}", self.state.mode()));
        }
        let flow = match self.ui.on_key(&key) {
            UiAction::None => Flow::Continue,
            UiAction::ClosedByEscape => self.on_escape()?,
            UiAction::Chosen(item) => self.on_chosen(item)?,
        };
        if flow != Flow::Continue {
            // Dropping the ack stops the keyboard thread.
            return Ok(flow);
        }
        self.redraw()?;
        self.state.settle_keyboard_ack(ack);
        Ok(Flow::Continue)
    }

    fn on_escape(&mut self) -> Result<Flow> {
        if self.state.web_request_active {
            log_info("fast switch cancelled");
            self.reply_web("");
            return Ok(Flow::Continue);
        }
        Ok(self.exit_with_choice(None))
    }

    fn on_chosen(&mut self, item: Item) -> Result<Flow> {
        log_info(&format!("item chosen: {}", item.choice()));
        if !self.options.has_editor {
            return Ok(self.exit_with_choice(Some(item.choice())));
        }
        if self.state.web_request_active {
            let path = absolute_choice(item.choice());
            self.reply_web(&path);
            return Ok(Flow::Continue);
        }
        match self.ui.settings().editor_launch_mode {
            EditorLaunchMode::Replace => {
                self.screen.cleanup();
                self.prepare_exit();
                tracing::info!(exit = "replace", "session exit");
                let err = self.handoff.replace(item.choice());
                log_info(&format!("exec replace failed: {err}"));
                Ok(Flow::Fatal(err.to_string()))
            }
            EditorLaunchMode::Child => {
                let notes = self.channels.notifications.sender();
                if let Err(err) = self.handoff.spawn_and_wait(item.choice(), notes) {
                    self.screen.cleanup();
                    self.prepare_exit();
                    return Ok(Flow::Fatal(err.to_string()));
                }
                self.state.child_running = true;
                Ok(Flow::Continue)
            }
        }
    }

    fn reply_web(&mut self, response: &str) {
        match &self.replier {
            Some(replier) => replier.reply(response),
            None => log_info("fast switch reply with no listener"),
        }
        self.state.web_request_active = false;
    }

    fn on_signal(&mut self, event: SignalEvent) -> Result<Flow> {
        let SignalEvent { kind, ack } = event;
        log_info(&format!(
            "signal {} mode={:?}",
            kind.name(),
            self.state.mode()
        ));
        if self.state.terminating {
            ack.signal();
            return Ok(Flow::Continue);
        }
        match kind {
            SignalKind::Winch => self.redraw()?,
            SignalKind::Int => {
                // The default disposition terminates us once acked.
                self.screen.cleanup();
                self.remove_socket();
                self.state.terminating = true;
            }
            SignalKind::Cont => {
                if self.state.stopped {
                    self.state.stopped = false;
                    if self.state.ui_owns_terminal() {
                        self.screen.enter().context("re-entering raw mode")?;
                    }
                }
                self.redraw()?;
            }
            SignalKind::Tstp => {
                if !self.state.stopped {
                    if self.state.ui_owns_terminal() {
                        self.screen.cleanup();
                    }
                    self.state.stopped = true;
                    self.handoff.stop_self().context("self-stop")?;
                }
            }
            SignalKind::Term => {
                drop(ack);
                return Ok(self.exit_with_choice(None));
            }
            SignalKind::Quit => {}
        }
        ack.signal();
        Ok(Flow::Continue)
    }

    fn on_notification(&mut self, note: Notification) -> Result<Flow> {
        log_info(&format!("notification {note}"));
        if self.state.terminating {
            return Ok(Flow::Continue);
        }
        match note {
            Notification::Progress { processed, ignored } => {
                self.ui.set_progress(processed, ignored);
            }
            Notification::Completed { items } => {
                self.ui.set_items(items);
                if let Some(timer) = self.redraw_timer.take() {
                    timer.stop();
                }
            }
            Notification::FatalError { message } => {
                self.screen.cleanup();
                self.prepare_exit();
                tracing::info!(exit = "fatal", "session exit");
                return Ok(Flow::Fatal(message));
            }
            Notification::ChildExited => {
                self.state.child_running = false;
                self.state.release_keyboard();
            }
            Notification::ForceRedraw => {}
            Notification::WebRequest { payload } => {
                log_debug(&format!("fast switch request {payload:?}"));
                self.state.web_request_active = true;
                if self.ui.settings().fast_switch_search == FastSwitchSearch::Clear {
                    self.ui.clear_search();
                }
                self.state.release_keyboard();
            }
        }
        self.redraw()?;
        Ok(Flow::Continue)
    }

    fn redraw(&mut self) -> Result<()> {
        if !self.state.can_draw() {
            return Ok(());
        }
        self.ui.resize(self.screen.size());
        let spinner = (self.started.elapsed().as_millis() / SPINNER_FRAME_MS) as usize;
        let mut frame = Vec::new();
        self.ui.render(&mut frame, spinner).context("rendering frame")?;
        self.screen.draw(&frame).context("writing frame")
    }

    /// Cleanup, report the choice, then leave.
    fn exit_with_choice(&mut self, choice: Option<&str>) -> Flow {
        self.screen.cleanup();
        let written = self.options.output.write(choice);
        self.prepare_exit();
        tracing::info!(exit = "normal", chosen = choice.is_some(), "session exit");
        match written {
            Ok(()) => Flow::Exit(0),
            Err(err) => Flow::Fatal(format!("cannot write output file: {err}")),
        }
    }

    /// Save settings and remove the socket file.
    fn prepare_exit(&mut self) {
        if let Some(path) = &self.options.settings_path {
            if let Err(err) = self.ui.settings().save(path) {
                log_info(&format!("saving settings failed: {err}"));
            }
        }
        self.remove_socket();
    }

    fn remove_socket(&self) {
        if let Some(endpoint) = &self.endpoint {
            endpoint.remove_socket();
        }
    }
}

fn absolute_choice(choice: &str) -> String {
    let path = Path::new(choice);
    if path.is_absolute() {
        return choice.to_string();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path).display().to_string(),
        Err(_) => choice.to_string(),
    }
}
