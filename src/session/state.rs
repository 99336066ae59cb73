use crate::event::AckHandle;
use crate::log_info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Normal,
    ChildRunning,
    /// A child runs but an IPC request needs the keyboard.
    ChildRunningWebOverride,
    Stopped,
    Exiting,
}

/// Controller-owned flags plus the parked keyboard ack.
#[derive(Debug, Default)]
pub struct SessionState {
    pub child_running: bool,
    pub web_request_active: bool,
    pub stopped: bool,
    pub terminating: bool,
    paused_keyboard_ack: Option<AckHandle>,
}

impl SessionState {
    pub fn mode(&self) -> SessionMode {
        if self.terminating {
            SessionMode::Exiting
        } else if self.stopped {
            SessionMode::Stopped
        } else {
            match (self.child_running, self.web_request_active) {
                (false, _) => SessionMode::Normal,
                (true, false) => SessionMode::ChildRunning,
                (true, true) => SessionMode::ChildRunningWebOverride,
            }
        }
    }

    pub fn ui_owns_terminal(&self) -> bool {
        !self.child_running || self.web_request_active
    }

    pub fn can_draw(&self) -> bool {
        self.ui_owns_terminal() && !self.stopped && !self.terminating
    }

    pub fn keyboard_paused(&self) -> bool {
        self.paused_keyboard_ack.is_some()
    }

    /// Re-arm the pump now, or park the ack while a child owns the tty.
    pub fn settle_keyboard_ack(&mut self, ack: AckHandle) {
        if self.ui_owns_terminal() {
            ack.signal();
            return;
        }
        log_info("child owns the terminal; pausing keyboard reads");
        if self.paused_keyboard_ack.replace(ack).is_some() {
            log_info("replaced an already parked keyboard ack");
        }
    }

    /// Signal the parked ack, if any. Returns true when one was released.
    pub fn release_keyboard(&mut self) -> bool {
        match self.paused_keyboard_ack.take() {
            Some(ack) => {
                log_info("resuming keyboard reads");
                ack.signal();
                true
            }
            None => false,
        }
    }
}
