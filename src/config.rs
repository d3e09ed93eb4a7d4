use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use heapless::String;

use crate::error::Error;

/// Placeholder for a GPIO line that is not wired up.
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = core::convert::Infallible;
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Default lowest accepted signal strength, in dBm.
pub const DEFAULT_MIN_SIGNAL_QUALITY: i8 = -93;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub(crate) min_signal_quality: i8,
    pub(crate) skip_gprs_attach: Option<bool>,
    pub(crate) pin: String<8>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            min_signal_quality: DEFAULT_MIN_SIGNAL_QUALITY,
            skip_gprs_attach: None,
            pin: String::new(),
        }
    }

    /// Set the lowest accepted signal strength.
    ///
    /// Negative values are taken as dBm, non-negative values as raw `+CSQ`
    /// units and converted with `-113 + 2 * q`.
    #[must_use]
    pub fn with_min_signal_quality(self, q: i8) -> Self {
        Self {
            min_signal_quality: signal_threshold(q),
            ..self
        }
    }

    /// Force the GPRS attach step on or off. Once set, product detection no
    /// longer changes it.
    #[must_use]
    pub fn with_skip_gprs_attach(self, skip: bool) -> Self {
        Self {
            skip_gprs_attach: Some(skip),
            ..self
        }
    }

    /// SIM PIN, sent during bring-up when the SIM asks for it. PINs longer
    /// than 8 digits are rejected, as by [`Modem::set_pin`].
    ///
    /// [`Modem::set_pin`]: crate::Modem::set_pin
    pub fn with_pin(self, pin: &str) -> Result<Self, Error> {
        Ok(Self {
            pin: String::try_from(pin).map_err(|_| Error::Rejected)?,
            ..self
        })
    }

    pub fn min_signal_quality(&self) -> i8 {
        self.min_signal_quality
    }
}

pub(crate) fn signal_threshold(q: i8) -> i8 {
    if q < 0 {
        q
    } else {
        let dbm = -113 + 2 * i16::from(q);
        dbm.clamp(i16::from(i8::MIN), i16::from(i8::MAX)) as i8
    }
}

/// Access point used for the packet data bearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Apn<'a> {
    pub name: &'a str,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
}

impl<'a> Apn<'a> {
    pub const fn new(name: &'a str) -> Self {
        Self {
            name,
            username: None,
            password: None,
        }
    }

    #[must_use]
    pub const fn with_credentials(self, username: &'a str, password: &'a str) -> Self {
        Self {
            username: Some(username),
            password: Some(password),
            ..self
        }
    }

    pub(crate) fn user(&self) -> &'a str {
        self.username.unwrap_or("")
    }

    pub(crate) fn pass(&self) -> &'a str {
        self.password.unwrap_or("")
    }
}
