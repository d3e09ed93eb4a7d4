//! ### Network service and supplementary service commands

use core::fmt;

use super::parse;
use crate::error::Error;
use crate::registration::Status;

/// AT+CSQ - signal quality, `+CSQ: <rssi>,<ber>`
pub struct GetSignalQuality;

impl fmt::Display for GetSignalQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CSQ")
    }
}

/// AT+CREG - network registration, `+CREG: <n>,<stat>[,<lac>,<ci>]`
pub struct GetNetworkRegistration;

impl fmt::Display for GetNetworkRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CREG?")
    }
}

/// AT+COPS - operator selection
pub struct GetOperator;

impl fmt::Display for GetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+COPS?")
    }
}

/// AT+CSPN - service provider name from the SIM
pub struct GetServiceProvider;

impl fmt::Display for GetServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CSPN?")
    }
}

/// AT+CLIP - calling line identification presentation
pub struct GetClip;

impl fmt::Display for GetClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CLIP?")
    }
}

/// AT+CLIR - calling line identification restriction
pub struct GetClir;

impl fmt::Display for GetClir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+CLIR?")
    }
}

/// AT+COLP - connected line identification presentation
pub struct GetColp;

impl fmt::Display for GetColp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AT+COLP?")
    }
}

/// Bit error rate, in tenths of a percent, indexed by the raw `<ber>` value.
const BER_TABLE: [u8; 8] = [49, 43, 37, 25, 19, 13, 7, 0];

/// Raw `<rssi>` to dBm; 99 (unknown) becomes 0.
pub fn rssi_from_raw(raw: u32) -> i8 {
    if raw == 99 {
        0
    } else {
        let dbm = -113 + 2 * raw.min(63) as i32;
        dbm as i8
    }
}

pub fn ber_from_raw(raw: u32) -> u8 {
    BER_TABLE.get(raw as usize).copied().unwrap_or(0)
}

/// Parse the payload of a `+CSQ:` reply into `(rssi dBm, ber)`.
pub fn parse_signal_quality(payload: &[u8]) -> Result<(i8, u8), Error> {
    let (rssi, rest) = parse::uint(payload).ok_or(Error::MalformedReply)?;
    let ber = rest
        .strip_prefix(b",")
        .and_then(parse::uint)
        .map_or(0, |(ber, _)| ber_from_raw(ber));
    Ok((rssi_from_raw(rssi), ber))
}

/// Parse the payload of a `+CREG:` read reply. The status is the field after
/// the first comma.
pub fn parse_registration(payload: &[u8]) -> Result<Status, Error> {
    let stat = parse::field(payload, 1).ok_or(Error::MalformedReply)?;
    let (stat, _) = parse::uint(stat).ok_or(Error::MalformedReply)?;
    Ok(Status::from(stat))
}
