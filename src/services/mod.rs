//! Session protocols layered on the bring-up: TCP, FTP upload, HTTP and SMS.
//!
//! Every `open_*` call powers the modem up and hands back a session that
//! borrows the modem until it is closed. A failed open leaves the modem
//! powered off and no session behind.

pub mod ftp;
pub mod http;
pub mod sms;
pub mod tcp;

pub use ftp::FtpSession;
pub use http::{HttpRequest, HttpSession};
pub use tcp::TcpSession;
