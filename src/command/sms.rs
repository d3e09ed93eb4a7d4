//! ### SMS commands

use core::fmt;

/// AT+CMGF - select text mode
pub struct SetTextMode;

impl fmt::Display for SetTextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CMGF=1")
    }
}

/// AT+CMGS - send a message to `number`; the text follows the `> ` prompt
pub struct SendMessage<'a>(pub &'a str);

impl fmt::Display for SendMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+CMGS=\"{}\"", self.0)
    }
}

/// Terminates the message text
pub const CTRL_Z: u8 = 0x1A;
