use crossterm::{
    cursor::Show,
    queue,
    style::{Attribute, SetAttribute},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{
    io::{self, Write},
    os::fd::{AsRawFd, RawFd},
    panic,
    sync::{
        atomic::{AtomicBool, AtomicI32, Ordering},
        OnceLock,
    },
};

static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static ALT_SCREEN_ENABLED: AtomicBool = AtomicBool::new(false);
static TTY_FD: AtomicI32 = AtomicI32::new(-1);
static ORIGINAL_TERMIOS: OnceLock<libc::termios> = OnceLock::new();
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// RAII guard to restore terminal state on drop (and on panic via a shared hook).
///
/// Raw mode here keeps `ISIG`, so Ctrl-C, Ctrl-\ and Ctrl-Z still arrive as
/// signals rather than bytes.
pub struct TerminalRestoreGuard {
    fd: RawFd,
}

impl TerminalRestoreGuard {
    pub fn new(tty: &impl AsRawFd) -> Self {
        install_terminal_panic_hook();
        let fd = tty.as_raw_fd();
        TTY_FD.store(fd, Ordering::SeqCst);
        TerminalRestoreGuard { fd }
    }

    pub fn enable_raw_mode(&self) -> io::Result<()> {
        // SAFETY: termios is plain data; tcgetattr fills it in.
        let mut current: libc::termios = unsafe { std::mem::zeroed() };
        // SAFETY: fd is the open tty and `current` is a valid out pointer.
        if unsafe { libc::tcgetattr(self.fd, &mut current) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let original = *ORIGINAL_TERMIOS.get_or_init(|| current);

        let mut raw = original;
        raw.c_iflag &= !(libc::IXON | libc::ICRNL | libc::BRKINT | libc::INPCK | libc::ISTRIP);
        raw.c_oflag &= !libc::OPOST;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN);
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        // SAFETY: `raw` is a fully initialized termios copied from the tty.
        if unsafe { libc::tcsetattr(self.fd, libc::TCSAFLUSH, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }
        RAW_MODE_ENABLED.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn enter_alt_screen(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, EnterAlternateScreen)?;
        out.flush()?;
        ALT_SCREEN_ENABLED.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn restore(&self) {
        restore_terminal();
    }
}

impl Drop for TerminalRestoreGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

pub fn is_raw_mode_enabled() -> bool {
    RAW_MODE_ENABLED.load(Ordering::SeqCst)
}

pub fn is_alt_screen_enabled() -> bool {
    ALT_SCREEN_ENABLED.load(Ordering::SeqCst)
}

/// Leave the alternate screen, show the cursor and put back cooked mode.
///
/// Safe to call repeatedly; only the parts still active are undone.
pub fn restore_terminal() {
    let fd = TTY_FD.load(Ordering::SeqCst);
    if fd < 0 {
        return;
    }
    let mut buf = Vec::new();
    if ALT_SCREEN_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = queue!(buf, LeaveAlternateScreen);
    }
    let _ = queue!(buf, SetAttribute(Attribute::Reset), Show);
    write_fd(fd, &buf);

    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        if let Some(original) = ORIGINAL_TERMIOS.get() {
            // SAFETY: restoring the termios captured from the same fd.
            unsafe {
                libc::tcsetattr(fd, libc::TCSADRAIN, original);
            }
        }
    }
}

fn write_fd(fd: RawFd, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        // SAFETY: bytes is a live slice; a short or failed write just stops here.
        let n = unsafe { libc::write(fd, bytes.as_ptr() as *const libc::c_void, bytes.len()) };
        if n <= 0 {
            if n < 0 && io::Error::last_os_error().kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return;
        }
        bytes = &bytes[n as usize..];
    }
}

pub fn install_terminal_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            crate::log_panic(info);
            previous(info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alt_screen_flag_follows_enter_and_restore() {
        let mut fds = [0 as libc::c_int; 2];
        // SAFETY: fds has room for the two descriptors pipe() writes.
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        let guard = TerminalRestoreGuard { fd: fds[1] };
        TTY_FD.store(fds[1], Ordering::SeqCst);

        let mut sink = Vec::new();
        guard.enter_alt_screen(&mut sink).unwrap();
        assert!(is_alt_screen_enabled());
        assert!(sink.starts_with(b"\x1b[?1049h"));

        guard.restore();
        assert!(!is_alt_screen_enabled());
        assert!(!is_raw_mode_enabled());
        TTY_FD.store(-1, Ordering::SeqCst);
        std::mem::forget(guard);
        // SAFETY: closing the pipe descriptors created above.
        unsafe {
            libc::close(fds[0]);
            libc::close(fds[1]);
        }
    }

    #[test]
    fn raw_mode_on_a_non_tty_fails_cleanly() {
        let file = std::fs::File::open("/dev/null").unwrap();
        let guard = TerminalRestoreGuard { fd: file.as_raw_fd() };
        assert!(guard.enable_raw_mode().is_err());
        std::mem::forget(guard);
    }
}
