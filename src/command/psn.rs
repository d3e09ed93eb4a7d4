//! ### Packet switched data and bearer commands

use core::fmt;

/// AT+CGATT - attach to the GPRS service
pub struct GprsAttach;

impl fmt::Display for GprsAttach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CGATT=1")
    }
}

/// AT+CGID - SIM group identifier, `+GID: <gid1>,<gid2>`
pub struct GetGroupId;

impl fmt::Display for GetGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CGID")
    }
}

/// Bearer profile used for FTP and HTTP
pub const BEARER_PROFILE: u8 = 1;

/// AT+SAPBR=3 - set a parameter of the bearer profile
pub struct SetBearerParam<'a> {
    pub tag: &'a str,
    pub value: &'a str,
}

impl fmt::Display for SetBearerParam<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AT+SAPBR=3,{},\"{}\",\"{}\"",
            BEARER_PROFILE, self.tag, self.value
        )
    }
}

/// AT+SAPBR=1 - open the bearer
pub struct OpenBearer;

impl fmt::Display for OpenBearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+SAPBR=1,{}", BEARER_PROFILE)
    }
}

/// AT+SAPBR=2 - query the bearer
pub struct QueryBearer;

impl fmt::Display for QueryBearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+SAPBR=2,{}", BEARER_PROFILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn bearer_commands() {
        let cmd = SetBearerParam {
            tag: "APN",
            value: "internet",
        };
        assert_eq!(cmd.to_string(), "AT+SAPBR=3,1,\"APN\",\"internet\"");
        assert_eq!(OpenBearer.to_string(), "AT+SAPBR=1,1");
        assert_eq!(QueryBearer.to_string(), "AT+SAPBR=2,1");
    }
}
