//! ### FTP commands

use core::fmt;

use super::parse;
use super::psn::BEARER_PROFILE;
use crate::error::Error;

/// AT+FTPCID - bearer profile used for FTP
pub struct SetBearerProfile;

impl fmt::Display for SetBearerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+FTPCID={}", BEARER_PROFILE)
    }
}

/// String valued FTP parameters, `AT+FTP<tag>="<value>"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpParam<'a> {
    Server(&'a str),
    User(&'a str),
    Password(&'a str),
    PutName(&'a str),
    PutPath(&'a str),
}

impl fmt::Display for FtpParam<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (tag, value) = match self {
            Self::Server(v) => ("SERV", v),
            Self::User(v) => ("UN", v),
            Self::Password(v) => ("PW", v),
            Self::PutName(v) => ("PUTNAME", v),
            Self::PutPath(v) => ("PUTPATH", v),
        };
        write!(f, "AT+FTP{}=\"{}\"", tag, value)
    }
}

/// AT+FTPPUT=1 - open a put session
pub struct OpenPut;

impl fmt::Display for OpenPut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+FTPPUT=1")
    }
}

/// AT+FTPPUT=2 - announce `len` bytes of data; 0 ends the upload
pub struct PutData(pub usize);

impl fmt::Display for PutData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+FTPPUT=2,{}", self.0)
    }
}

pub const FTPPUT: &str = "+FTPPUT:";

/// Maximum segment length from a `+FTPPUT: 1,1,<maxlength>` reply.
/// Anything else, including the `1,<error>` failure form, is a rejection.
pub fn parse_put_ready(payload: &[u8]) -> Result<usize, Error> {
    let rest = payload.strip_prefix(b"1,1,").ok_or(Error::Rejected)?;
    let (len, _) = parse::uint(rest).ok_or(Error::MalformedReply)?;
    Ok(len as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn render_params() {
        assert_eq!(FtpParam::Server("ftp.example.com").to_string(), "AT+FTPSERV=\"ftp.example.com\"");
        assert_eq!(FtpParam::User("anon").to_string(), "AT+FTPUN=\"anon\"");
        assert_eq!(FtpParam::PutPath("/logs/").to_string(), "AT+FTPPUTPATH=\"/logs/\"");
        assert_eq!(PutData(0).to_string(), "AT+FTPPUT=2,0");
    }

    #[test]
    fn put_ready() {
        assert_eq!(parse_put_ready(b"1,1,1360"), Ok(1360));
        assert_eq!(parse_put_ready(b"1,61"), Err(Error::Rejected));
        assert_eq!(parse_put_ready(b"1,1,"), Err(Error::MalformedReply));
    }
}
