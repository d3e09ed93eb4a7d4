//! AT command engine and command vocabulary for SIMCOM SIM800/SIM900 modules.
//!
//! Commands are plain [`Display`] values; the engine streams them to the
//! modem and matches the reply lines against deadlines. At most one command
//! is in flight at a time, which `&mut self` enforces.

pub mod ftp;
pub mod general;
pub mod http;
pub mod ip_transport_layer;
pub mod network_service;
pub(crate) mod parse;
pub mod psn;
pub mod sms;

use core::fmt::Display;

use embassy_time::Duration;
use heapless::String;

use crate::client::AtClient;
use crate::error::Error;
use crate::fmt::Bytes;
use crate::module_timing::{command_settle_time, ok_timeout};
use crate::traits::{Clock, Transport};

impl<'d, T, C, const N: usize> AtClient<'d, T, C, N>
where
    T: Transport,
    C: Clock,
{
    /// Flush stale input, let the line settle, then write `cmd` and `\r`.
    pub fn send<D: Display + ?Sized>(&mut self, cmd: &D) -> Result<(), Error> {
        self.flush_input();
        self.delay(command_settle_time());
        self.write_command(cmd)
    }

    /// Skip lines until a bare `OK` (success) or `ERROR` (rejection).
    pub fn wait_for_ok(&mut self, timeout: Duration) -> Result<(), Error> {
        let deadline = self.deadline(timeout);
        loop {
            self.read_line(deadline)?;
            match self.line() {
                b"OK" => return Ok(()),
                b"ERROR" => {
                    debug!("Modem replied ERROR");
                    return Err(Error::Rejected);
                }
                _ => {}
            }
        }
    }

    pub fn send_wait_ok<D: Display + ?Sized>(&mut self, cmd: &D, timeout: Duration) -> Result<(), Error> {
        self.send(cmd)?;
        self.wait_for_ok(timeout)
    }

    /// Wait for the first line starting with `prefix`. The matched line stays
    /// available through [`AtClient::line`].
    pub fn wait_for_message(&mut self, prefix: &str, timeout: Duration) -> Result<(), Error> {
        let deadline = self.deadline(timeout);
        loop {
            self.read_line(deadline)?;
            if !self.line().is_empty() && self.line().starts_with(prefix.as_bytes()) {
                return Ok(());
            }
        }
    }

    /// Wait for a line equal to one of `candidates` and return its index.
    pub fn wait_for_one_of(&mut self, candidates: &[&str], timeout: Duration) -> Result<usize, Error> {
        let deadline = self.deadline(timeout);
        loop {
            self.read_line(deadline)?;
            let line = self.line();
            if let Some(i) = candidates.iter().position(|c| c.as_bytes() == line) {
                return Ok(i);
            }
        }
    }

    /// Scan raw bytes for `prompt`, which need not end a line.
    ///
    /// `\r` is skipped, `\n` and any mismatching byte restart the match.
    pub fn wait_for_prompt(&mut self, prompt: &str, timeout: Duration) -> Result<(), Error> {
        let prompt = prompt.as_bytes();
        let deadline = self.deadline(timeout);
        let mut matched = 0;

        while !self.is_timed_out(deadline) {
            self.kick();
            let Some(b) = self.transport.read_byte() else {
                continue;
            };
            match b {
                b'\r' => {}
                b'\n' => matched = 0,
                _ if prompt.get(matched) == Some(&b) => {
                    matched += 1;
                    if matched == prompt.len() {
                        return Ok(());
                    }
                }
                _ => matched = 0,
            }
        }

        debug!("No prompt {} from modem", Bytes(prompt));
        Err(Error::Timeout)
    }

    /// Payload of the last line after `prefix`, leading spaces removed.
    pub(crate) fn payload(&self, prefix: &str) -> &[u8] {
        let line = self.line();
        parse::skip_spaces(line.get(prefix.len()..).unwrap_or(&[]))
    }

    /// Send `cmd`, read the leading decimal number of the `prefix` reply and
    /// require the terminal `OK`.
    pub fn get_int_value<D: Display + ?Sized>(
        &mut self,
        cmd: &D,
        prefix: &str,
        timeout: Duration,
    ) -> Result<u32, Error> {
        self.send(cmd)?;
        self.wait_for_message(prefix, timeout)?;
        let (value, _) = parse::uint(self.payload(prefix)).ok_or_else(|| {
            warn!("No number in reply {}", Bytes(self.line()));
            Error::MalformedReply
        })?;
        self.wait_for_ok(ok_timeout())?;
        Ok(value)
    }

    /// Send `cmd`, copy the rest of the `prefix` reply (truncated to `M`
    /// bytes) and require the terminal `OK`.
    pub fn get_str_value<const M: usize, D: Display + ?Sized>(
        &mut self,
        cmd: &D,
        prefix: &str,
        timeout: Duration,
    ) -> Result<String<M>, Error> {
        self.send(cmd)?;
        self.wait_for_message(prefix, timeout)?;
        let value = parse::bounded_str(self.payload(prefix)).ok_or(Error::MalformedReply)?;
        self.wait_for_ok(ok_timeout())?;
        Ok(value)
    }

    /// Like [`AtClient::get_str_value`] for commands whose answer is an
    /// unprefixed line, e.g. `AT+GSN`.
    pub fn get_line_value<const M: usize, D: Display + ?Sized>(
        &mut self,
        cmd: &D,
        timeout: Duration,
    ) -> Result<String<M>, Error> {
        self.send(cmd)?;
        let deadline = self.deadline(timeout);
        let value = loop {
            self.read_line(deadline)?;
            match self.line() {
                b"" => continue,
                b"ERROR" => return Err(Error::Rejected),
                line => break parse::bounded_str(line).ok_or(Error::MalformedReply)?,
            }
        };
        self.wait_for_ok(ok_timeout())?;
        Ok(value)
    }
}
