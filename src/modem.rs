use embassy_time::{Duration, Instant};

use crate::client::AtClient;
use crate::command::general::At;
use crate::config::{signal_threshold, Config};
use crate::error::Error;
use crate::module_timing::{ok_timeout, ALIVE_ATTEMPTS, POWER_ON_PROBES};
use crate::modules::Module;
use crate::power::PowerControl;
use crate::traits::{Clock, Transport};

/// A SIMCOM modem and everything known about its state.
///
/// All session types borrow the modem mutably, so only one conversation with
/// the module can be in progress.
pub struct Modem<'d, T, C, const N: usize = 64> {
    pub(crate) at: AtClient<'d, T, C, N>,
    power: Option<&'d mut dyn PowerControl>,
    pub(crate) config: Config,
    pub(crate) echo_off: bool,
    pub(crate) last_rssi: i8,
    pub(crate) csq_time: u8,
    pub(crate) module: Module,
    pub(crate) skip_gprs_attach: bool,
    pub(crate) skip_gprs_attach_changed: bool,
    pub(crate) started_on: Option<Instant>,
    pub(crate) time_to_open_tcp: Duration,
    pub(crate) time_to_close_tcp: Duration,
}

impl<'d, T, C, const N: usize> Modem<'d, T, C, N>
where
    T: Transport,
    C: Clock,
{
    pub fn new(at: AtClient<'d, T, C, N>, config: Config) -> Self {
        Self {
            at,
            power: None,
            echo_off: false,
            last_rssi: 0,
            csq_time: 0,
            module: Module::Unknown,
            skip_gprs_attach: config.skip_gprs_attach.unwrap_or(false),
            skip_gprs_attach_changed: config.skip_gprs_attach.is_some(),
            started_on: None,
            time_to_open_tcp: Duration::from_ticks(0),
            time_to_close_tcp: Duration::from_ticks(0),
            config,
        }
    }

    /// Without power control the modem is assumed to be always on.
    #[must_use]
    pub fn with_power(self, power: &'d mut dyn PowerControl) -> Self {
        Self {
            power: Some(power),
            ..self
        }
    }

    /// Switch the modem on if needed and wait until it answers `AT`.
    ///
    /// Returns what power control reports afterwards.
    pub fn on(&mut self) -> Result<bool, Error> {
        self.started_on = Some(self.at.now());

        if !self.is_on() {
            match self.power.as_mut() {
                Some(power) => power.turn_on(),
                None => warn!("No power control configured"),
            }
        }

        let alive = (0..POWER_ON_PROBES).any(|_| self.is_alive());
        if !alive {
            error!("No reply from modem");
            return Err(Error::PoweredDown);
        }

        Ok(self.is_on())
    }

    /// [`Modem::on`], treating a modem that still reports off as an error.
    pub(crate) fn power_up(&mut self) -> Result<(), Error> {
        if self.on()? {
            Ok(())
        } else {
            error!("Modem answers but reports power off");
            Err(Error::PoweredDown)
        }
    }

    /// Switch the modem off, whatever state it is in. Returns `true` if it
    /// now reports off.
    pub fn off(&mut self) -> bool {
        if let Some(power) = self.power.as_mut() {
            power.turn_off();
        }
        self.echo_off = false;
        !self.is_on()
    }

    pub fn is_on(&mut self) -> bool {
        match self.power.as_mut() {
            Some(power) => power.is_on(),
            None => true,
        }
    }

    /// Poke the modem with `AT` a few times and see if it answers `OK`.
    pub fn is_alive(&mut self) -> bool {
        for _ in 0..ALIVE_ATTEMPTS {
            if self.at.send_wait_ok(&At, ok_timeout()).is_ok() {
                return true;
            }
        }
        false
    }

    /// Lowest accepted signal strength. Negative values are dBm,
    /// non-negative values raw `+CSQ` units.
    pub fn set_min_signal_quality(&mut self, q: i8) {
        self.config.min_signal_quality = signal_threshold(q);
    }

    /// Force the GPRS attach step on or off, overriding product detection.
    pub fn set_skip_gprs_attach(&mut self, skip: bool) {
        self.skip_gprs_attach = skip;
        self.skip_gprs_attach_changed = true;
    }

    /// SIM PIN used when the SIM asks for one. Longer than 8 digits is
    /// rejected.
    pub fn set_pin(&mut self, pin: &str) -> Result<(), Error> {
        self.config.pin = heapless::String::try_from(pin).map_err(|_| Error::Rejected)?;
        Ok(())
    }

    /// RSSI in dBm from the last successful signal wait; 0 if unknown.
    pub fn last_rssi(&self) -> i8 {
        self.last_rssi
    }

    /// Seconds the last signal wait took.
    pub fn csq_time(&self) -> u8 {
        self.csq_time
    }

    pub fn module(&self) -> Module {
        self.module
    }

    /// Time from power on until the last TCP connection was established.
    pub fn time_to_open_tcp(&self) -> Duration {
        self.time_to_open_tcp
    }

    /// Time from power on until the last TCP connection was closed.
    pub fn time_to_close_tcp(&self) -> Duration {
        self.time_to_close_tcp
    }

    /// Time since the last [`Modem::on`].
    pub(crate) fn since_on(&mut self) -> Duration {
        let now = self.at.now();
        self.started_on
            .and_then(|started| now.checked_duration_since(started))
            .unwrap_or_else(|| Duration::from_millis(0))
    }

    pub fn client(&mut self) -> &mut AtClient<'d, T, C, N> {
        &mut self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockClock, MockPower, MockTransport};

    #[test]
    fn on_powers_up_and_probes() {
        let mock = MockTransport::new();
        mock.always("AT\r", "OK\r\n");
        let mut power = MockPower::default();
        {
            let mut modem: Modem<'_, _, _> =
                Modem::new(AtClient::new(mock.clone(), MockClock::new()), Config::new())
                    .with_power(&mut power);
            assert_eq!(modem.on(), Ok(true));
            assert!(modem.off());
        }
        assert_eq!(power.turned_on, 1);
        assert_eq!(power.turned_off, 1);
    }

    #[test]
    fn silent_modem_is_powered_down() {
        let mock = MockTransport::new();
        let mut modem: Modem<'_, _, _> =
            Modem::new(AtClient::new(mock.clone(), MockClock::new()), Config::new());
        assert_eq!(modem.on(), Err(Error::PoweredDown));
        assert_eq!(mock.count("AT\r"), 30);
    }

    #[test]
    fn config_sets_attach_override() {
        let mock = MockTransport::new();
        let modem: Modem<'_, _, _> = Modem::new(
            AtClient::new(mock, MockClock::new()),
            Config::new().with_skip_gprs_attach(true),
        );
        assert!(modem.skip_gprs_attach);
        assert!(modem.skip_gprs_attach_changed);
    }
}
