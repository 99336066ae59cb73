use super::decoder::ByteSource;
use std::fs::File;
use std::io;
use std::os::fd::AsRawFd;
use std::time::Duration;

/// How long a lone ESC waits for the rest of a sequence.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(100);

const READ_CHUNK: usize = 4000;

/// Buffered, poll-driven reader over the controlling terminal.
pub struct TtyByteSource {
    tty: File,
    buf: Box<[u8; READ_CHUNK]>,
    start: usize,
    end: usize,
    escape_timeout: Duration,
}

impl TtyByteSource {
    pub fn new(tty: File) -> Self {
        Self {
            tty,
            buf: Box::new([0u8; READ_CHUNK]),
            start: 0,
            end: 0,
            escape_timeout: ESCAPE_TIMEOUT,
        }
    }

    pub fn with_escape_timeout(mut self, timeout: Duration) -> Self {
        self.escape_timeout = timeout;
        self
    }

    fn pop(&mut self) -> Option<u8> {
        if self.start < self.end {
            let byte = self.buf[self.start];
            self.start += 1;
            Some(byte)
        } else {
            None
        }
    }

    /// Refill the buffer; `timeout = None` blocks. Returns false on timeout.
    fn fill(&mut self, timeout: Option<Duration>) -> io::Result<bool> {
        let fd = self.tty.as_raw_fd();
        let timeout_ms = timeout.map_or(-1, |t| t.as_millis().min(i32::MAX as u128) as i32);
        loop {
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            // SAFETY: pfd is a valid pollfd for the duration of the call.
            let ready = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if ready < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    if timeout.is_some() {
                        return Ok(false);
                    }
                    continue;
                }
                return Err(err);
            }
            if ready == 0 {
                return Ok(false);
            }

            // SAFETY: buf is a live, writable buffer of READ_CHUNK bytes.
            let n = unsafe {
                libc::read(
                    fd,
                    self.buf.as_mut_ptr() as *mut libc::c_void,
                    READ_CHUNK,
                )
            };
            if n > 0 {
                self.start = 0;
                self.end = n as usize;
                return Ok(true);
            }
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "terminal closed",
                ));
            }
            let err = io::Error::last_os_error();
            match err.kind() {
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => continue,
                _ => return Err(err),
            }
        }
    }
}

impl ByteSource for TtyByteSource {
    fn next_byte(&mut self) -> io::Result<u8> {
        loop {
            if let Some(byte) = self.pop() {
                return Ok(byte);
            }
            self.fill(None)?;
        }
    }

    fn try_next_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(byte) = self.pop() {
            return Ok(Some(byte));
        }
        if self.fill(Some(self.escape_timeout))? {
            Ok(self.pop())
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::fd::FromRawFd;
    use std::os::unix::net::UnixStream;

    fn pipe_pair() -> (File, File) {
        let mut fds = [0 as libc::c_int; 2];
        // SAFETY: fds has room for the two descriptors pipe() writes.
        let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
        assert_eq!(rc, 0);
        // SAFETY: pipe() just returned two owned descriptors.
        unsafe { (File::from_raw_fd(fds[0]), File::from_raw_fd(fds[1])) }
    }

    #[test]
    fn reads_buffered_bytes_in_order() {
        let (reader, mut writer) = pipe_pair();
        writer.write_all(b"ab").unwrap();
        let mut source = TtyByteSource::new(reader);
        assert_eq!(source.next_byte().unwrap(), b'a');
        assert_eq!(source.try_next_byte().unwrap(), Some(b'b'));
    }

    #[test]
    fn try_next_byte_times_out_on_silence() {
        let (reader, _writer) = pipe_pair();
        let mut source = TtyByteSource::new(reader).with_escape_timeout(Duration::from_millis(10));
        assert_eq!(source.try_next_byte().unwrap(), None);
    }

    #[test]
    fn closed_writer_is_reported_as_eof() {
        let (reader, writer) = pipe_pair();
        drop(writer);
        let mut source = TtyByteSource::new(reader);
        let err = source.next_byte().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn socket_backed_source_decodes_through_poll() {
        let (left, mut right) = UnixStream::pair().unwrap();
        right.write_all(&[0x1b]).unwrap();
        let file = File::from(std::os::fd::OwnedFd::from(left));
        let mut source = TtyByteSource::new(file).with_escape_timeout(Duration::from_millis(10));
        assert_eq!(source.next_byte().unwrap(), 0x1b);
        assert_eq!(source.try_next_byte().unwrap(), None);
    }
}
