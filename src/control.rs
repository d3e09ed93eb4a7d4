//! Identity queries, functionality control and the real time clock.
//!
//! Every query switches echo off first, so it can be issued on a freshly
//! powered modem.

use heapless::String;

use crate::command::general::{
    GetCapabilities, GetCcid, GetClock, GetFunctionality, GetImei, GetImsi, GetUrcIndication,
    ProductInfo, SetClock, SetFunctionality, SetLocalTimestamp, SetUrcIndication,
};
use crate::command::network_service::{GetClip, GetClir, GetColp, GetOperator, GetServiceProvider};
use crate::command::psn::GetGroupId;
use crate::datetime::DateTime;
use crate::error::Error;
use crate::modem::Modem;
use crate::module_timing::{
    ok_timeout, product_info_timeout, urc_config_timeout, CLOCK_POWER_ON_ATTEMPTS,
    CLOCK_READ_ATTEMPTS,
};
use crate::traits::{Clock, Transport};

impl<'d, T, C, const N: usize> Modem<'d, T, C, N>
where
    T: Transport,
    C: Clock,
{
    /// Serial number, `AT+GSN`.
    pub fn imei(&mut self) -> Result<String<32>, Error> {
        self.switch_echo_off();
        self.at.get_line_value(&GetImei, product_info_timeout())
    }

    /// Capability list from `+GCAP:`.
    pub fn gcap(&mut self) -> Result<String<32>, Error> {
        self.switch_echo_off();
        self.at.get_str_value(&GetCapabilities, "+GCAP:", product_info_timeout())
    }

    pub fn imsi(&mut self) -> Result<String<32>, Error> {
        self.switch_echo_off();
        self.at.get_line_value(&GetImsi, product_info_timeout())
    }

    pub fn ccid(&mut self) -> Result<String<32>, Error> {
        self.switch_echo_off();
        self.at.get_line_value(&GetCcid, product_info_timeout())
    }

    /// Product identification, e.g. `SIM900 R11.0`.
    pub fn product_info(&mut self) -> Result<String<64>, Error> {
        self.switch_echo_off();
        self.at.get_line_value(&ProductInfo, product_info_timeout())
    }

    pub fn clip(&mut self) -> Result<String<32>, Error> {
        self.switch_echo_off();
        self.at.get_str_value(&GetClip, "+CLIP:", ok_timeout())
    }

    pub fn clir(&mut self) -> Result<String<32>, Error> {
        self.switch_echo_off();
        self.at.get_str_value(&GetClir, "+CLIR:", ok_timeout())
    }

    pub fn colp(&mut self) -> Result<String<32>, Error> {
        self.switch_echo_off();
        self.at.get_str_value(&GetColp, "+COLP:", ok_timeout())
    }

    /// Current operator selection, raw `+COPS:` payload.
    pub fn operator(&mut self) -> Result<String<32>, Error> {
        self.switch_echo_off();
        self.at.get_str_value(&GetOperator, "+COPS:", ok_timeout())
    }

    pub fn service_provider(&mut self) -> Result<String<32>, Error> {
        self.switch_echo_off();
        self.at.get_str_value(&GetServiceProvider, "+CSPN:", ok_timeout())
    }

    pub fn group_id(&mut self) -> Result<String<32>, Error> {
        self.switch_echo_off();
        self.at.get_str_value(&GetGroupId, "+GID:", ok_timeout())
    }

    /// `AT+CFUN`: 0 minimum, 1 full, 4 RF off.
    pub fn set_functionality(&mut self, level: u8) -> Result<(), Error> {
        self.switch_echo_off();
        self.at.send_wait_ok(&SetFunctionality(level), ok_timeout())
    }

    pub fn functionality(&mut self) -> Result<u8, Error> {
        self.switch_echo_off();
        let level = self.at.get_int_value(&GetFunctionality, "+CFUN:", ok_timeout())?;
        u8::try_from(level).map_err(|_| Error::MalformedReply)
    }

    pub fn set_ciurc(&mut self, enabled: bool) -> Result<(), Error> {
        self.switch_echo_off();
        self.at.send_wait_ok(&SetUrcIndication(enabled), ok_timeout())
    }

    pub fn ciurc(&mut self) -> Result<String<32>, Error> {
        self.switch_echo_off();
        self.at.get_str_value(&GetUrcIndication, "+CIURC:", ok_timeout())
    }

    /// Let the network set the clock. A refusal is ignored.
    pub fn enable_lts(&mut self) {
        if let Err(e) = self.at.send_wait_ok(&SetLocalTimestamp(true), urc_config_timeout()) {
            debug!("AT+CLTS=1 failed: {:?}", e);
        }
    }

    pub fn disable_lts(&mut self) {
        if let Err(e) = self.at.send_wait_ok(&SetLocalTimestamp(false), urc_config_timeout()) {
            debug!("AT+CLTS=0 failed: {:?}", e);
        }
    }

    pub fn set_clock(&mut self, time: &DateTime) -> Result<(), Error> {
        self.switch_echo_off();
        self.at.send_wait_ok(&SetClock(time), ok_timeout())
    }

    /// Read the real time clock.
    pub fn clock(&mut self) -> Result<DateTime, Error> {
        self.switch_echo_off();
        let raw: String<32> = self.at.get_str_value(&GetClock, "+CCLK:", ok_timeout())?;
        let raw = raw.as_bytes();
        Ok(DateTime::parse(raw.strip_prefix(b"\"").unwrap_or(raw)))
    }

    /// Seconds since 1970-01-01 UTC according to the modem clock, powering
    /// the modem on if needed.
    pub fn unix_epoch(&mut self) -> Result<u32, Error> {
        self.wake_and_read_clock().map(|time| time.unix_epoch())
    }

    /// Seconds since 2000-01-01 UTC according to the modem clock.
    pub fn y2k_epoch(&mut self) -> Result<u32, Error> {
        self.wake_and_read_clock().map(|time| time.y2k_epoch())
    }

    fn wake_and_read_clock(&mut self) -> Result<DateTime, Error> {
        if !(0..CLOCK_POWER_ON_ATTEMPTS).any(|_| self.on().is_ok()) {
            return Err(Error::PoweredDown);
        }

        let mut result = Err(Error::Timeout);
        for _ in 0..CLOCK_READ_ATTEMPTS {
            result = self.clock();
            if result.is_ok() {
                break;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AtClient;
    use crate::config::Config;
    use crate::test_helpers::{healthy_modem, MockClock, MockTransport};

    fn modem(mock: &MockTransport) -> Modem<'static, MockTransport, MockClock> {
        Modem::new(AtClient::new(mock.clone(), MockClock::new()), Config::new())
    }

    #[test]
    fn identity_queries() {
        let mock = healthy_modem();
        mock.on("AT+GSN\r", "\r\n861234567890123\r\n\r\nOK\r\n")
            .on("AT+COPS?\r", "\r\n+COPS: 0,0,\"KPN NL\"\r\n\r\nOK\r\n")
            .on("AT+CGID\r", "\r\n+GID: \"FF\"\r\n\r\nOK\r\n");
        let mut modem = modem(&mock);

        assert_eq!(modem.imei().unwrap().as_str(), "861234567890123");
        assert_eq!(modem.operator().unwrap().as_str(), "0,0,\"KPN NL\"");
        assert_eq!(modem.group_id().unwrap().as_str(), "\"FF\"");
        assert_eq!(mock.count("ATE0\r"), 1);
    }

    #[test]
    fn rejected_query() {
        let mock = healthy_modem();
        mock.on("AT+CIMI\r", "\r\nERROR\r\n");
        let mut modem = modem(&mock);
        assert_eq!(modem.imsi(), Err(Error::Rejected));
    }

    #[test]
    fn functionality_level() {
        let mock = healthy_modem();
        mock.on("AT+CFUN=4\r", "OK\r\n")
            .on("AT+CFUN?\r", "\r\n+CFUN: 4\r\n\r\nOK\r\n");
        let mut modem = modem(&mock);
        assert_eq!(modem.set_functionality(4), Ok(()));
        assert_eq!(modem.functionality(), Ok(4));
    }

    #[test]
    fn set_clock_renders_timestamp() {
        let mock = healthy_modem();
        mock.on("AT+CCLK=\"23/01/02,00:47:32+16\"\r", "OK\r\n");
        let mut modem = modem(&mock);
        let time = DateTime::new(2023, 1, 2, 0, 47, 32).with_timezone(16);
        assert_eq!(modem.set_clock(&time), Ok(()));
    }

    #[test]
    fn epoch_retries_clock_reads() {
        let mock = healthy_modem();
        mock.on("AT+CCLK?\r", "\r\nERROR\r\n")
            .on("AT+CCLK?\r", "\r\n+CCLK: \"23/01/02,00:47:32+16\"\r\n\r\nOK\r\n");
        let mut modem = modem(&mock);
        assert_eq!(modem.unix_epoch(), Ok(1_672_606_052));
        assert_eq!(mock.count("AT+CCLK?\r"), 2);
    }

    #[test]
    fn lts_failures_are_ignored() {
        let mock = healthy_modem();
        mock.on("AT+CLTS=1\r", "ERROR\r\n");
        let mut modem = modem(&mock);
        modem.enable_lts();
        assert_eq!(mock.count("AT+CLTS=1\r"), 1);
    }
}
