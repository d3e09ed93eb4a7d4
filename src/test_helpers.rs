//! Scripted collaborators for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embassy_time::Instant;

use crate::error::Error;
use crate::power::PowerControl;
use crate::traits::{Clock, Transport, Watchdog};

#[derive(Default)]
struct Script {
    rx: VecDeque<u8>,
    written: Vec<u8>,
    pending: Vec<u8>,
    once: VecDeque<(Vec<u8>, Vec<u8>)>,
    always: Vec<(Vec<u8>, Vec<u8>)>,
}

impl Script {
    fn fire(&mut self) {
        let pending = &self.pending;
        if let Some(i) = self.once.iter().position(|(t, _)| pending.ends_with(t)) {
            if let Some((_, reply)) = self.once.remove(i) {
                self.rx.extend(reply);
            }
            self.pending.clear();
        } else if let Some((_, reply)) = self.always.iter().find(|(t, _)| pending.ends_with(t)) {
            self.rx.extend(reply.iter().copied());
            self.pending.clear();
        } else if pending.last() == Some(&b'\r') {
            self.pending.clear();
        }
    }
}

/// Fake modem: replies are queued when the written bytes end with a
/// registered trigger. One-shot rules are consulted first, in registration
/// order, then persistent ones.
#[derive(Clone, Default)]
pub struct MockTransport(Rc<RefCell<Script>>);

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes available to read right away.
    pub fn feed(&self, bytes: &[u8]) -> &Self {
        self.0.borrow_mut().rx.extend(bytes.iter().copied());
        self
    }

    pub fn on(&self, trigger: &str, reply: &str) -> &Self {
        self.on_bytes(trigger.as_bytes(), reply.as_bytes())
    }

    pub fn on_bytes(&self, trigger: &[u8], reply: &[u8]) -> &Self {
        self.0
            .borrow_mut()
            .once
            .push_back((trigger.to_vec(), reply.to_vec()));
        self
    }

    pub fn always(&self, trigger: &str, reply: &str) -> &Self {
        self.0
            .borrow_mut()
            .always
            .push((trigger.as_bytes().to_vec(), reply.as_bytes().to_vec()));
        self
    }

    pub fn written(&self) -> Vec<u8> {
        self.0.borrow().written.clone()
    }

    pub fn written_str(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow().written).into_owned()
    }

    /// Number of times `needle` was written.
    pub fn count(&self, needle: &str) -> usize {
        self.written_str().matches(needle).count()
    }

    pub fn unread(&self) -> usize {
        self.0.borrow().rx.len()
    }
}

impl Transport for MockTransport {
    fn read_byte(&mut self) -> Option<u8> {
        self.0.borrow_mut().rx.pop_front()
    }

    fn peek_byte(&mut self) -> Option<u8> {
        self.0.borrow().rx.front().copied()
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let mut script = self.0.borrow_mut();
        for &b in bytes {
            script.written.push(b);
            script.pending.push(b);
            script.fire();
        }
        Ok(())
    }
}

/// A modem that answers the liveness probe, has a good signal and is
/// registered at home.
pub fn healthy_modem() -> MockTransport {
    let mock = MockTransport::new();
    mock.always("AT\r", "OK\r\n")
        .always("ATE0\r", "OK\r\n")
        .always("AT+CIURC=0\r", "OK\r\n")
        .always("AT+CSQ\r", "+CSQ: 18,0\r\n\r\nOK\r\n")
        .always("AT+CREG?\r", "+CREG: 0,1\r\n\r\nOK\r\n");
    mock
}

/// Clock that moves forward one millisecond on every reading.
#[derive(Clone, Default)]
pub struct MockClock(Rc<Cell<u64>>);

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn millis(&self) -> u64 {
        self.0.get()
    }
}

impl Clock for MockClock {
    fn now(&mut self) -> Instant {
        let t = self.0.get() + 1;
        self.0.set(t);
        Instant::from_millis(t)
    }
}

#[derive(Clone, Default)]
pub struct CountingWatchdog(Rc<Cell<u64>>);

impl CountingWatchdog {
    pub fn resets(&self) -> u64 {
        self.0.get()
    }
}

impl Watchdog for CountingWatchdog {
    fn reset(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[derive(Default)]
pub struct MockPower {
    pub on: bool,
    pub turned_on: u32,
    pub turned_off: u32,
}

impl PowerControl for MockPower {
    fn turn_on(&mut self) {
        self.on = true;
        self.turned_on += 1;
    }

    fn turn_off(&mut self) {
        self.on = false;
        self.turned_off += 1;
    }

    fn is_on(&mut self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_rules_fire_before_persistent_ones() {
        let mock = MockTransport::new();
        mock.always("AT\r", "OK\r\n");
        mock.on("AT\r", "ERROR\r\n");

        let mut t = mock.clone();
        t.write_all(b"AT\r").unwrap();
        t.write_all(b"AT\r").unwrap();

        let mut rx = Vec::new();
        while let Some(b) = t.read_byte() {
            rx.push(b);
        }
        assert_eq!(rx, b"ERROR\r\nOK\r\n");
        assert_eq!(mock.count("AT\r"), 2);
    }

    #[test]
    fn clock_ticks_per_reading() {
        let mut clock = MockClock::new();
        let a = clock.now();
        let b = clock.now();
        assert_eq!((b - a).as_millis(), 1);
    }
}
