//! ### TCP/IP application commands

use core::fmt;

use crate::config::Apn;

/// AT+CSTT - start task, set APN and credentials
pub struct StartTask<'a>(pub &'a Apn<'a>);

impl fmt::Display for StartTask<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AT+CSTT=\"{}\",\"{}\",\"{}\"",
            self.0.name,
            self.0.user(),
            self.0.pass()
        )
    }
}

/// AT+CIICR - bring up the wireless connection
pub struct BringUpConnection;

impl fmt::Display for BringUpConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CIICR")
    }
}

/// AT+CIPSHUT - deactivate the PDP context, answered with `SHUT OK`
pub struct Shutdown;

impl fmt::Display for Shutdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CIPSHUT")
    }
}

pub const SHUT_OK: &str = "SHUT OK";

/// AT+CIPMODE - select transparent mode
pub struct SetTransparentMode(pub bool);

impl fmt::Display for SetTransparentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+CIPMODE={}", u8::from(self.0))
    }
}

/// AT+CIPCCFG - transparent transfer configuration
pub struct GetTransparentConfig;

impl fmt::Display for GetTransparentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CIPCCFG?")
    }
}

/// AT+CIPSTART - open a TCP connection
pub struct StartConnection<'a> {
    pub host: &'a str,
    pub port: u16,
}

impl fmt::Display for StartConnection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+CIPSTART=\"TCP\",\"{}\",{}", self.host, self.port)
    }
}

/// Outcomes of `AT+CIPSTART`, in order. Only the first two mean success.
pub const CONNECT_RESULTS: [&str; 3] = ["CONNECT OK", "CONNECT", "CONNECT FAIL"];

/// AT+CIPSEND - send `len` bytes after the `> ` prompt
pub struct SendData(pub usize);

impl fmt::Display for SendData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+CIPSEND={}", self.0)
    }
}

pub const SEND_OK: &str = "SEND OK";

/// AT+CIPSTATUS - connection status, `STATE: <state>`
pub struct GetConnectionStatus;

impl fmt::Display for GetConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CIPSTATUS")
    }
}

/// ATO - return to transparent data mode
pub struct ResumeData;

impl fmt::Display for ResumeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ATO0")
    }
}

/// Escape from transparent data mode to command mode
pub const ESCAPE_SEQUENCE: &[u8] = b"+++";

/// Whether a `STATE:` line reports an open connection.
pub fn is_connect_ok(line: &[u8]) -> bool {
    let state = line.strip_prefix(b"STATE:").unwrap_or(line);
    super::parse::skip_spaces(state) == b"CONNECT OK"
}
