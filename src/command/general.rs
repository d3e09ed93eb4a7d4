//! ### General, V.25TER and status control commands

use core::fmt;

use crate::datetime::DateTime;

/// AT - attention, used as a liveness poke
pub struct At;

impl fmt::Display for At {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT")
    }
}

/// ATE - command echo
pub struct SetEcho(pub bool);

impl fmt::Display for SetEcho {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ATE{}", u8::from(self.0))
    }
}

/// ATI - product identification, e.g. `SIM800 R14.18`
pub struct ProductInfo;

impl fmt::Display for ProductInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ATI")
    }
}

/// AT+GSN - IMEI, returned as a bare line
pub struct GetImei;

impl fmt::Display for GetImei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+GSN")
    }
}

/// AT+GCAP - complete capabilities list, `+GCAP: +CGSM`
pub struct GetCapabilities;

impl fmt::Display for GetCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+GCAP")
    }
}

/// AT+CIMI - international mobile subscriber identity
pub struct GetImsi;

impl fmt::Display for GetImsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CIMI")
    }
}

/// AT+CCID - SIM card identification number
pub struct GetCcid;

impl fmt::Display for GetCcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CCID")
    }
}

/// AT+CFUN - phone functionality level
pub struct SetFunctionality(pub u8);

impl fmt::Display for SetFunctionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+CFUN={}", self.0)
    }
}

pub struct GetFunctionality;

impl fmt::Display for GetFunctionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CFUN?")
    }
}

/// AT+CIURC - `Call Ready` style unsolicited result codes
pub struct SetUrcIndication(pub bool);

impl fmt::Display for SetUrcIndication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+CIURC={}", u8::from(self.0))
    }
}

pub struct GetUrcIndication;

impl fmt::Display for GetUrcIndication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CIURC?")
    }
}

/// AT+CLTS - take local time from the network
pub struct SetLocalTimestamp(pub bool);

impl fmt::Display for SetLocalTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+CLTS={}", u8::from(self.0))
    }
}

/// AT+CCLK - real time clock
pub struct SetClock<'a>(pub &'a DateTime);

impl fmt::Display for SetClock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+CCLK=\"{}\"", self.0)
    }
}

pub struct GetClock;

impl fmt::Display for GetClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CCLK?")
    }
}

/// AT+CPIN - SIM lock state, `+CPIN: READY` or `+CPIN: SIM PIN`
pub struct GetPinStatus;

impl fmt::Display for GetPinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CPIN?")
    }
}

pub struct EnterPin<'a>(pub &'a str);

impl fmt::Display for EnterPin<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT+CPIN=\"{}\"", self.0)
    }
}

/// SIM lock state as reported by `+CPIN:`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinStatus {
    Ready,
    SimPin,
    Other,
}

impl PinStatus {
    pub fn from_reply(payload: &[u8]) -> Self {
        match payload {
            b"READY" => Self::Ready,
            b"SIM PIN" => Self::SimPin,
            _ => Self::Other,
        }
    }
}
