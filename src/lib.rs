#![cfg_attr(not(test), no_std)]

//! # SIMCOM modem
//!
//! Driver for SIMCOM SIM800 and SIM900 GSM/GPRS modules over their AT command
//! interface. It runs on `no_std` targets with a blocking serial port and a
//! millisecond clock, and can be tested on `std` with scripted fakes.
//!
//! The [`Modem`] owns an [`AtClient`] and the optional power control. On top
//! of network bring-up it offers TCP connections, FTP uploads, HTTP requests
//! and SMS, each as a session that borrows the modem:
//!
//! ```ignore
//! let at = AtClient::new(IoTransport::new(uart), SysClock);
//! let mut modem: Modem<'_, _, _> = Modem::new(at, Config::new()).with_power(&mut power);
//!
//! let apn = Apn::new("internet");
//! let mut tcp = modem.open_tcp(&apn, "example.com", 80, false)?;
//! tcp.send(b"GET / HTTP/1.0\r\n\r\n")?;
//! tcp.close(true);
//! ```

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod client;
pub mod command;
pub mod config;
mod control;
pub mod datetime;
pub mod error;
pub mod modem;
pub mod module_timing;
pub mod modules;
mod network;
pub mod power;
pub mod registration;
pub mod services;
pub mod traits;

#[cfg(test)]
mod test_helpers;

pub use client::AtClient;
pub use config::{Apn, Config, NoPin};
pub use datetime::DateTime;
pub use error::Error;
pub use modem::Modem;
pub use modules::Module;
pub use power::{GpioPowerControl, PowerControl};
pub use registration::Status;
pub use services::{FtpSession, HttpRequest, HttpSession, TcpSession};
pub use traits::{Clock, IoTransport, NoWatchdog, Transport, Watchdog};

pub use embassy_time::{Duration, Instant};
