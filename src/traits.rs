use embassy_time::Instant;
use embedded_io::{Error as _, Read, ReadReady, Write};

use crate::error::Error;

/// Byte channel to the modem's AT interface.
///
/// Reads never block: `None` means no byte is available right now.
pub trait Transport {
    fn read_byte(&mut self) -> Option<u8>;

    /// Return the next byte without consuming it.
    fn peek_byte(&mut self) -> Option<u8>;

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_byte(&mut self) -> Option<u8> {
        T::read_byte(self)
    }

    fn peek_byte(&mut self) -> Option<u8> {
        T::peek_byte(self)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        T::write_all(self, bytes)
    }
}

/// Monotonic time source. Only differences between readings are used.
pub trait Clock {
    fn now(&mut self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&mut self) -> Instant {
        C::now(self)
    }
}

/// Hook called on every iteration of every wait loop.
pub trait Watchdog {
    fn reset(&mut self);
}

/// Watchdog for targets without one.
pub struct NoWatchdog;

impl Watchdog for NoWatchdog {
    fn reset(&mut self) {}
}

/// [`Transport`] over a blocking `embedded-io` serial port.
pub struct IoTransport<S> {
    serial: S,
    peeked: Option<u8>,
}

impl<S> IoTransport<S> {
    pub const fn new(serial: S) -> Self {
        Self {
            serial,
            peeked: None,
        }
    }

    pub fn into_inner(self) -> S {
        self.serial
    }
}

impl<S: Read + ReadReady> IoTransport<S> {
    fn fetch(&mut self) -> Option<u8> {
        match self.serial.read_ready() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                warn!("serial read_ready failed: {:?}", e.kind());
                return None;
            }
        }
        let mut byte = [0u8; 1];
        match self.serial.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(e) => {
                warn!("serial read failed: {:?}", e.kind());
                None
            }
        }
    }
}

impl<S: Read + ReadReady + Write> Transport for IoTransport<S> {
    fn read_byte(&mut self) -> Option<u8> {
        self.peeked.take().or_else(|| self.fetch())
    }

    fn peek_byte(&mut self) -> Option<u8> {
        if self.peeked.is_none() {
            self.peeked = self.fetch();
        }
        self.peeked
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.serial.write_all(bytes).map_err(|e| Error::Io(e.kind()))?;
        self.serial.flush().map_err(|e| Error::Io(e.kind()))
    }
}
