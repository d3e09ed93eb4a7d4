//! Network bring-up: echo, signal quality, registration, GPRS attach and the
//! packet data bearer.

use crate::command::general::{EnterPin, GetPinStatus, PinStatus, ProductInfo, SetEcho, SetUrcIndication};
use crate::command::network_service::{parse_registration, parse_signal_quality, GetNetworkRegistration, GetSignalQuality};
use crate::command::psn::{GprsAttach, OpenBearer, QueryBearer, SetBearerParam};
use crate::config::Apn;
use crate::error::Error;
use crate::fmt::Bytes;
use crate::modem::Modem;
use crate::module_timing::{
    bearer_open_timeout, gprs_attach_timeout, ok_timeout, poll_interval, product_info_timeout,
    registration_timeout, signal_quality_timeout, status_reply_timeout, urc_config_timeout,
    BEARER_OPEN_ATTEMPTS,
};
use crate::modules::{Module, ModuleParams};
use crate::traits::{Clock, Transport};

impl<'d, T, C, const N: usize> Modem<'d, T, C, N>
where
    T: Transport,
    C: Clock,
{
    /// Turn off command echo and `Call Ready` style URCs, once per power
    /// cycle. A modem that refuses `ATE0` is left as is.
    pub fn switch_echo_off(&mut self) {
        if self.echo_off {
            return;
        }
        if let Err(e) = self.at.send_wait_ok(&SetEcho(false), ok_timeout()) {
            warn!("Failed to switch echo off: {:?}", e);
            return;
        }
        self.disable_ciurc();
        self.echo_off = true;
    }

    /// Current `(rssi, ber)`; RSSI in dBm with 0 meaning unknown, BER in
    /// tenths of a percent.
    pub fn signal_quality(&mut self) -> Result<(i8, u8), Error> {
        self.at.send(&GetSignalQuality)?;
        self.at.wait_for_message("+CSQ:", status_reply_timeout())?;
        let quality = parse_signal_quality(self.at.payload("+CSQ:"))?;
        self.at.wait_for_ok(ok_timeout())?;
        Ok(quality)
    }

    /// Poll the signal until it is known and at least the configured
    /// minimum.
    pub fn wait_for_signal_quality(&mut self) -> Result<(), Error> {
        let start = self.at.now();
        let deadline = start + signal_quality_timeout();

        while !self.at.is_timed_out(deadline) {
            match self.signal_quality() {
                Ok((rssi, _)) if rssi != 0 && rssi >= self.config.min_signal_quality => {
                    let elapsed = self.at.now().checked_duration_since(start);
                    self.last_rssi = rssi;
                    self.csq_time = elapsed.map_or(0, |d| d.as_secs().min(u64::from(u8::MAX)) as u8);
                    debug!("Signal quality {} dBm after {} s", rssi, self.csq_time);
                    return Ok(());
                }
                Ok((rssi, _)) => trace!("Signal quality {} dBm too low", rssi),
                Err(e) => trace!("Signal quality query failed: {:?}", e),
            }
            self.at.delay(poll_interval());
        }

        self.last_rssi = 0;
        warn!("No usable signal");
        Err(Error::WeakSignal)
    }

    /// Poll `AT+CREG?` until registered at home or roaming.
    ///
    /// Gives up early once the modem stops answering `AT`.
    pub fn wait_for_creg(&mut self) -> Result<(), Error> {
        let deadline = self.at.deadline(registration_timeout());

        while !self.at.is_timed_out(deadline) {
            self.at.send(&GetNetworkRegistration)?;
            let status = match self.at.wait_for_message("+CREG:", status_reply_timeout()) {
                Ok(()) => parse_registration(self.at.payload("+CREG:")).unwrap_or_default(),
                Err(_) => Default::default(),
            };
            self.at.wait_for_ok(ok_timeout()).ok();

            if status.is_registered() {
                debug!("Registered: {:?}", status);
                return Ok(());
            }
            trace!("Registration status {:?}", status);

            self.at.delay(poll_interval());
            if !self.is_alive() {
                warn!("Modem stopped answering during registration");
                break;
            }
        }

        Err(Error::NotRegistered)
    }

    /// Power on, then wait for signal and registration.
    pub fn network_on(&mut self) -> Result<(), Error> {
        self.power_up()?;
        self.attach_network()
    }

    pub(crate) fn attach_network(&mut self) -> Result<(), Error> {
        self.switch_echo_off();
        self.unlock_sim()?;
        self.wait_for_signal_quality()?;
        self.wait_for_creg()
    }

    /// Enter the configured PIN if the SIM asks for one.
    pub(crate) fn unlock_sim(&mut self) -> Result<(), Error> {
        if self.config.pin.is_empty() {
            return Ok(());
        }

        let state: heapless::String<16> =
            self.at.get_str_value(&GetPinStatus, "+CPIN:", ok_timeout())?;
        match PinStatus::from_reply(state.as_bytes()) {
            PinStatus::Ready => Ok(()),
            PinStatus::SimPin => {
                info!("Unlocking SIM");
                let pin = self.config.pin.clone();
                self.at.send_wait_ok(&EnterPin(pin.as_str()), ok_timeout())
            }
            PinStatus::Other => {
                error!("SIM locked: {}", state.as_str());
                Err(Error::Rejected)
            }
        }
    }

    /// Identify the product from `ATI` and derive the attach behaviour,
    /// unless the caller fixed it.
    pub(crate) fn detect_module(&mut self) {
        if self.skip_gprs_attach_changed || self.module != Module::Unknown {
            return;
        }

        match self.at.get_line_value::<64, _>(&ProductInfo, product_info_timeout()) {
            Ok(info) => {
                if let Some(module) = Module::from_product_info(info.as_bytes()) {
                    info!("Detected {}", module.name());
                    self.module = module;
                    if module.skip_gprs_attach() {
                        self.skip_gprs_attach = true;
                    }
                }
            }
            Err(e) => warn!("Product identification failed: {:?}", e),
        }
    }

    /// Steps shared by every packet data session.
    pub(crate) fn connect_prolog(&mut self) -> Result<(), Error> {
        self.attach_network()?;
        self.detect_module();

        if !self.skip_gprs_attach {
            self.at.send_wait_ok(&GprsAttach, gprs_attach_timeout())?;
        }
        Ok(())
    }

    /// Configure and open bearer profile 1 for FTP and HTTP.
    pub(crate) fn setup_bearer(&mut self, apn: &Apn<'_>) -> Result<(), Error> {
        let params = [
            ("CONTYPE", "GPRS"),
            ("APN", apn.name),
            ("USER", apn.user()),
            ("PWD", apn.pass()),
        ];
        for (tag, value) in params {
            if value.is_empty() && tag != "APN" {
                continue;
            }
            self.at.send_wait_ok(&SetBearerParam { tag, value }, ok_timeout())?;
        }

        let mut opened = false;
        for attempt in 0..BEARER_OPEN_ATTEMPTS {
            match self.at.send_wait_ok(&OpenBearer, bearer_open_timeout()) {
                Ok(()) => {
                    opened = true;
                    break;
                }
                Err(e) => debug!("Bearer open attempt {} failed: {:?}", attempt, e),
            }
        }
        if !opened {
            error!("Could not open bearer for APN {}", Bytes(apn.name.as_bytes()));
            return Err(Error::Rejected);
        }

        self.at.send_wait_ok(&QueryBearer, ok_timeout())
    }

    pub fn enable_ciurc(&mut self) {
        if self.at.send_wait_ok(&SetUrcIndication(true), urc_config_timeout()).is_err() {
            debug!("AT+CIURC=1 not acknowledged");
        }
    }

    pub fn disable_ciurc(&mut self) {
        if self.at.send_wait_ok(&SetUrcIndication(false), urc_config_timeout()).is_err() {
            debug!("AT+CIURC=0 not acknowledged");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::client::AtClient;
    use crate::config::Config;
    use crate::error::Error;
    use crate::modem::Modem;
    use crate::modules::Module;
    use crate::test_helpers::{healthy_modem, MockClock, MockTransport};

    fn modem(mock: &MockTransport, config: Config) -> Modem<'static, MockTransport, MockClock> {
        Modem::new(AtClient::new(mock.clone(), MockClock::new()), config)
    }

    #[test]
    fn bring_up_records_rssi() {
        let mock = healthy_modem();
        let mut modem = modem(&mock, Config::new());
        assert_eq!(modem.network_on(), Ok(()));
        assert_eq!(modem.last_rssi(), -77);
        assert_eq!(modem.csq_time(), 0);
        assert_eq!(mock.count("ATE0\r"), 1);
    }

    #[test]
    fn echo_off_is_sent_once() {
        let mock = healthy_modem();
        let mut modem = modem(&mock, Config::new());
        modem.switch_echo_off();
        modem.switch_echo_off();
        assert_eq!(mock.count("ATE0\r"), 1);
        assert_eq!(mock.count("AT+CIURC=0\r"), 1);
        modem.off();
        modem.switch_echo_off();
        assert_eq!(mock.count("ATE0\r"), 2);
    }

    #[test]
    fn weak_signal_times_out() {
        let mock = MockTransport::new();
        mock.always("AT+CSQ\r", "+CSQ: 99,99\r\nOK\r\n");
        let mut modem = modem(&mock, Config::new());
        modem.last_rssi = -60;
        assert_eq!(modem.wait_for_signal_quality(), Err(Error::WeakSignal));
        assert_eq!(modem.last_rssi(), 0);
    }

    #[test]
    fn below_threshold_is_not_enough() {
        let mock = MockTransport::new();
        mock.on("AT+CSQ\r", "+CSQ: 5,0\r\nOK\r\n")
            .on("AT+CSQ\r", "+CSQ: 12,0\r\nOK\r\n");
        let mut modem = modem(&mock, Config::new().with_min_signal_quality(-90));
        assert_eq!(modem.wait_for_signal_quality(), Ok(()));
        assert_eq!(modem.last_rssi(), -89);
        assert_eq!(mock.count("AT+CSQ\r"), 2);
    }

    #[test]
    fn roaming_counts_as_registered() {
        let mock = MockTransport::new();
        mock.on("AT+CREG?\r", "+CREG: 0,2\r\nOK\r\n")
            .on("AT+CREG?\r", "+CREG: 0,5\r\nOK\r\n")
            .always("AT\r", "OK\r\n");
        let mut modem = modem(&mock, Config::new());
        assert_eq!(modem.wait_for_creg(), Ok(()));
        assert_eq!(mock.count("AT+CREG?\r"), 2);
    }

    #[test]
    fn registration_stops_when_modem_goes_silent() {
        let mock = MockTransport::new();
        mock.always("AT+CREG?\r", "+CREG: 0,3\r\nOK\r\n");
        let mut modem = modem(&mock, Config::new());
        assert_eq!(modem.wait_for_creg(), Err(Error::NotRegistered));
        assert_eq!(mock.count("AT+CREG?\r"), 1);
    }

    #[test]
    fn sim800_skips_gprs_attach() {
        let mock = healthy_modem();
        mock.always("ATI\r", "SIM800 R14.18\r\n\r\nOK\r\n");
        let mut modem = modem(&mock, Config::new());
        assert_eq!(modem.connect_prolog(), Ok(()));
        assert_eq!(modem.module(), Module::Sim800(crate::modules::sim800::Sim800));
        assert_eq!(mock.count("AT+CGATT=1\r"), 0);

        // Detection happens once
        modem.connect_prolog().unwrap();
        assert_eq!(mock.count("ATI\r"), 1);
    }

    #[test]
    fn sim900_attaches() {
        let mock = healthy_modem();
        mock.always("ATI\r", "SIM900 R11.0\r\n\r\nOK\r\n")
            .always("AT+CGATT=1\r", "OK\r\n");
        let mut modem = modem(&mock, Config::new());
        assert_eq!(modem.connect_prolog(), Ok(()));
        assert_eq!(mock.count("AT+CGATT=1\r"), 1);
    }

    #[test]
    fn explicit_skip_disables_detection() {
        let mock = healthy_modem();
        let mut modem = modem(&mock, Config::new().with_skip_gprs_attach(true));
        assert_eq!(modem.connect_prolog(), Ok(()));
        assert_eq!(mock.count("ATI\r"), 0);
        assert_eq!(mock.count("AT+CGATT"), 0);
    }

    #[test]
    fn pin_is_entered_when_asked() {
        let mock = healthy_modem();
        mock.on("AT+CPIN?\r", "+CPIN: SIM PIN\r\n\r\nOK\r\n")
            .on("AT+CPIN=\"1234\"\r", "OK\r\n");
        let mut modem = modem(&mock, Config::new().with_pin("1234").unwrap());
        assert_eq!(modem.network_on(), Ok(()));
        assert_eq!(mock.count("AT+CPIN=\"1234\"\r"), 1);
    }

    #[test]
    fn bearer_retries_open() {
        let mock = MockTransport::new();
        mock.always("AT+SAPBR=3,1,\"CONTYPE\",\"GPRS\"\r", "OK\r\n")
            .always("AT+SAPBR=3,1,\"APN\",\"internet\"\r", "OK\r\n")
            .on("AT+SAPBR=1,1\r", "ERROR\r\n")
            .on("AT+SAPBR=1,1\r", "OK\r\n")
            .always("AT+SAPBR=2,1\r", "+SAPBR: 1,1,\"10.0.0.1\"\r\n\r\nOK\r\n");
        let mut modem = modem(&mock, Config::new());
        assert_eq!(modem.setup_bearer(&crate::config::Apn::new("internet")), Ok(()));
        assert_eq!(mock.count("AT+SAPBR=1,1\r"), 2);
        assert_eq!(mock.count("\"USER\""), 0);
    }
}
