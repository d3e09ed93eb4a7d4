//! ### HTTP application commands

use core::fmt;

use super::parse;
use super::psn::BEARER_PROFILE;
use crate::error::Error;

/// AT+HTTPINIT - initialise the HTTP service
pub struct Init;

impl fmt::Display for Init {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+HTTPINIT")
    }
}

/// AT+HTTPTERM - terminate the HTTP service
pub struct Term;

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+HTTPTERM")
    }
}

/// AT+HTTPPARA - set an HTTP parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpParam<'a> {
    BearerProfile,
    Url(&'a str),
    ContentType(&'a str),
    UserData(&'a str),
    Redirect,
}

impl fmt::Display for HttpParam<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BearerProfile => write!(f, "AT+HTTPPARA=\"CID\",{}", BEARER_PROFILE),
            Self::Url(v) => write!(f, "AT+HTTPPARA=\"URL\",\"{}\"", v),
            Self::ContentType(v) => write!(f, "AT+HTTPPARA=\"CONTENT\",\"{}\"", v),
            Self::UserData(v) => write!(f, "AT+HTTPPARA=\"USERDATA\",\"{}\"", v),
            Self::Redirect => f.write_str("AT+HTTPPARA=\"REDIR\",1"),
        }
    }
}

/// AT+HTTPSSL - use TLS for the next action
pub struct SetSsl(pub bool);

impl fmt::Display for SetSsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+HTTPSSL={}", u8::from(self.0))
    }
}

/// AT+HTTPDATA - upload `len` bytes within `window_ms`, after `DOWNLOAD`
pub struct Data {
    pub len: usize,
    pub window_ms: u32,
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+HTTPDATA={},{}", self.len, self.window_ms)
    }
}

pub const DOWNLOAD: &str = "DOWNLOAD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get = 0,
    Post = 1,
    Head = 2,
}

/// AT+HTTPACTION - perform the request, `+HTTPACTION: <method>,<status>,<len>`
pub struct Action(pub Method);

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+HTTPACTION={}", self.0 as u8)
    }
}

pub const HTTPACTION: &str = "+HTTPACTION:";

/// AT+HTTPREAD - read the response body, `+HTTPREAD:<len>` then raw data
pub struct Read;

impl fmt::Display for Read {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+HTTPREAD")
    }
}

pub const HTTPREAD: &str = "+HTTPREAD:";

/// Status code from a `+HTTPACTION:` payload.
///
/// The method digit and its separator are skipped as exactly two
/// characters, so a reply that deviates from `<digit>,<status>` yields
/// whatever number follows them.
pub fn parse_action_status(payload: &[u8]) -> Result<u16, Error> {
    let rest = parse::skip_spaces(payload).get(2..).ok_or(Error::MalformedReply)?;
    let (status, _) = parse::uint(rest).ok_or(Error::MalformedReply)?;
    u16::try_from(status).map_err(|_| Error::MalformedReply)
}

/// Body length from a `+HTTPREAD:` payload.
pub fn parse_read_len(payload: &[u8]) -> Result<usize, Error> {
    parse::uint(parse::skip_spaces(payload))
        .map(|(len, _)| len as usize)
        .ok_or(Error::MalformedReply)
}
