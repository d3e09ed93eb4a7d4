use core::fmt::Write as _;

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::error::Error;
use crate::module_timing::cr_grace_time;
use crate::traits::{Clock, Transport, Watchdog};

/// Line-oriented access to the modem's AT interface.
///
/// Holds the byte transport, the clock every wait is measured against and
/// the single line buffer replies are assembled in. The buffer keeps at most
/// `N - 1` bytes of a line; anything beyond that is read and dropped.
pub struct AtClient<'d, T, C, const N: usize = 64> {
    pub(crate) transport: T,
    clock: C,
    watchdog: Option<&'d mut dyn Watchdog>,
    diag: Option<&'d mut dyn core::fmt::Write>,
    line: Vec<u8, N>,
}

impl<'d, T, C, const N: usize> AtClient<'d, T, C, N>
where
    T: Transport,
    C: Clock,
{
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            watchdog: None,
            diag: None,
            line: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_watchdog(self, watchdog: &'d mut dyn Watchdog) -> Self {
        Self {
            watchdog: Some(watchdog),
            ..self
        }
    }

    /// Echo all traffic to `sink`, received bytes verbatim and sent commands
    /// prefixed with `>> `.
    #[must_use]
    pub fn with_diagnostics(self, sink: &'d mut dyn core::fmt::Write) -> Self {
        Self {
            diag: Some(sink),
            ..self
        }
    }

    pub fn now(&mut self) -> Instant {
        self.clock.now()
    }

    pub fn deadline(&mut self, timeout: Duration) -> Instant {
        self.clock.now() + timeout
    }

    pub fn is_timed_out(&mut self, deadline: Instant) -> bool {
        self.clock.now() >= deadline
    }

    pub(crate) fn kick(&mut self) {
        if let Some(wd) = self.watchdog.as_mut() {
            wd.reset();
        }
    }

    fn echo(&mut self, b: u8) {
        if let Some(diag) = self.diag.as_mut() {
            diag.write_char(char::from(b)).ok();
        }
    }

    pub(crate) fn echo_str(&mut self, s: &str) {
        if let Some(diag) = self.diag.as_mut() {
            diag.write_str(s).ok();
        }
    }

    /// Busy wait, keeping the watchdog fed.
    pub fn delay(&mut self, duration: Duration) {
        let deadline = self.deadline(duration);
        while !self.is_timed_out(deadline) {
            self.kick();
        }
    }

    /// Drop whatever the modem sent that nobody asked for.
    pub fn flush_input(&mut self) {
        while let Some(b) = self.transport.read_byte() {
            self.kick();
            self.echo(b);
        }
    }

    /// Read one line into the line buffer and return its length.
    ///
    /// A line ends at `\n`, at `\r\n`, or at a `\r` that is not followed by
    /// `\n` within the grace period. Terminators are not stored.
    pub fn read_line(&mut self, deadline: Instant) -> Result<usize, Error> {
        self.line.clear();
        let keep = N.saturating_sub(1);
        let mut grace: Option<Instant> = None;

        loop {
            if self.is_timed_out(deadline) {
                // A CR was seen, so the line is complete even if the grace
                // period is cut short.
                if grace.is_some() {
                    return Ok(self.line.len());
                }
                break;
            }
            self.kick();

            if let Some(grace_deadline) = grace {
                match self.transport.peek_byte() {
                    Some(b'\n') => {}
                    Some(_) => return Ok(self.line.len()),
                    None if self.is_timed_out(grace_deadline) => return Ok(self.line.len()),
                    None => continue,
                }
            }

            let Some(b) = self.transport.read_byte() else {
                continue;
            };
            self.echo(b);

            match b {
                b'\r' => grace = Some(self.deadline(cr_grace_time())),
                b'\n' => return Ok(self.line.len()),
                _ => {
                    if self.line.len() < keep {
                        self.line.push(b).ok();
                    }
                }
            }
        }

        self.line.clear();
        Err(Error::Timeout)
    }

    /// Read exactly `len` raw bytes, storing as many as fit in `buf`.
    ///
    /// Returns the number of bytes still owed when the deadline passed, so
    /// `0` means complete. A NUL is written after the stored bytes when `buf`
    /// has room for it.
    pub fn read_bytes(&mut self, len: usize, buf: &mut [u8], deadline: Instant) -> usize {
        let mut remaining = len;
        let mut stored = 0;

        while remaining > 0 && !self.is_timed_out(deadline) {
            self.kick();
            if let Some(b) = self.transport.read_byte() {
                self.echo(b);
                if let Some(slot) = buf.get_mut(stored) {
                    *slot = b;
                    stored += 1;
                }
                remaining -= 1;
            }
        }

        if let Some(slot) = buf.get_mut(stored) {
            *slot = 0;
        }
        remaining
    }

    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.transport.write_all(bytes)
    }

    /// Stream `cmd` to the modem followed by a lone `\r`.
    pub(crate) fn write_command<D: core::fmt::Display + ?Sized>(&mut self, cmd: &D) -> Result<(), Error> {
        self.echo_str(">> ");
        let mut sink = CommandSink {
            transport: &mut self.transport,
            diag: self.diag.as_deref_mut(),
            error: None,
        };
        let res = write!(sink, "{}\r", cmd);
        if let Some(e) = sink.error {
            return Err(e);
        }
        res.map_err(|_| Error::Io(embedded_io::ErrorKind::Other))?;
        self.echo_str("\n");
        Ok(())
    }

    /// The most recently read line.
    pub fn line(&self) -> &[u8] {
        &self.line
    }

    /// The most recently read line as text; empty if it is not UTF-8.
    pub fn line_str(&self) -> &str {
        core::str::from_utf8(&self.line).unwrap_or("")
    }

    pub fn transport(&mut self) -> &mut T {
        &mut self.transport
    }
}

struct CommandSink<'a, 'd, T> {
    transport: &'a mut T,
    diag: Option<&'a mut (dyn core::fmt::Write + 'd)>,
    error: Option<Error>,
}

impl<T: Transport> core::fmt::Write for CommandSink<'_, '_, T> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        if let Some(diag) = self.diag.as_mut() {
            diag.write_str(s).ok();
        }
        self.transport.write_all(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            core::fmt::Error
        })
    }
}
