use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::config::NoPin;
use crate::module_timing::{power_off_time, vcc_settle_time};

/// Switches the modem supply. Implementations decide what "on" means for a
/// given board.
pub trait PowerControl {
    fn turn_on(&mut self);
    fn turn_off(&mut self);
    fn is_on(&mut self) -> bool;
}

/// Power control through a `VCC` gate, the `ON/OFF` line and an optional
/// `STATUS` input. Any of the lines may be left unconnected.
pub struct GpioPowerControl<V, O, S, D> {
    vcc_pin: Option<V>,
    onoff_pin: Option<O>,
    status_pin: Option<S>,
    delay: D,
}

impl<D: DelayNs> GpioPowerControl<NoPin, NoPin, NoPin, D> {
    pub fn new(delay: D) -> Self {
        Self {
            vcc_pin: None,
            onoff_pin: None,
            status_pin: None,
            delay,
        }
    }
}

impl<V, O, S, D> GpioPowerControl<V, O, S, D>
where
    V: OutputPin,
    O: OutputPin,
    S: InputPin,
    D: DelayNs,
{
    pub fn with_vcc<V2: OutputPin>(self, vcc_pin: V2) -> GpioPowerControl<V2, O, S, D> {
        GpioPowerControl {
            vcc_pin: Some(vcc_pin),
            onoff_pin: self.onoff_pin,
            status_pin: self.status_pin,
            delay: self.delay,
        }
    }

    pub fn with_onoff<O2: OutputPin>(self, onoff_pin: O2) -> GpioPowerControl<V, O2, S, D> {
        GpioPowerControl {
            vcc_pin: self.vcc_pin,
            onoff_pin: Some(onoff_pin),
            status_pin: self.status_pin,
            delay: self.delay,
        }
    }

    pub fn with_status<S2: InputPin>(self, status_pin: S2) -> GpioPowerControl<V, O, S2, D> {
        GpioPowerControl {
            vcc_pin: self.vcc_pin,
            onoff_pin: self.onoff_pin,
            status_pin: Some(status_pin),
            delay: self.delay,
        }
    }
}

impl<V, O, S, D> PowerControl for GpioPowerControl<V, O, S, D>
where
    V: OutputPin,
    O: OutputPin,
    S: InputPin,
    D: DelayNs,
{
    fn turn_on(&mut self) {
        debug!("Powering modem on");
        if let Some(pin) = self.vcc_pin.as_mut() {
            pin.set_high().ok();
            self.delay.delay_ms(vcc_settle_time().as_millis() as u32);
        }
        if let Some(pin) = self.onoff_pin.as_mut() {
            pin.set_high().ok();
        }
    }

    fn turn_off(&mut self) {
        debug!("Powering modem off");
        if let Some(pin) = self.vcc_pin.as_mut() {
            pin.set_low().ok();
        }
        if let Some(pin) = self.onoff_pin.as_mut() {
            pin.set_low().ok();
        }
        self.delay.delay_ms(power_off_time().as_millis() as u32);
    }

    fn is_on(&mut self) -> bool {
        match self.status_pin.as_mut() {
            Some(pin) => pin.is_high().unwrap_or(false),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    struct Pin(&'static str, Log);

    impl ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.1.borrow_mut().push(if self.0 == "vcc" { "vcc low" } else { "onoff low" });
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.1.borrow_mut().push(if self.0 == "vcc" { "vcc high" } else { "onoff high" });
            Ok(())
        }
    }

    struct Delay(Log);

    impl DelayNs for Delay {
        fn delay_ns(&mut self, _ns: u32) {
            self.0.borrow_mut().push("delay");
        }

        fn delay_ms(&mut self, ms: u32) {
            self.0.borrow_mut().push(if ms == 2 { "delay 2" } else { "delay 50" });
        }
    }

    struct Status(bool);

    impl ErrorType for Status {
        type Error = Infallible;
    }

    impl InputPin for Status {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0)
        }
    }

    #[test]
    fn gpio_power_sequence() {
        let log: Log = Rc::default();
        let mut pwr = GpioPowerControl::new(Delay(log.clone()))
            .with_vcc(Pin("vcc", log.clone()))
            .with_onoff(Pin("onoff", log.clone()));

        pwr.turn_on();
        pwr.turn_off();

        assert_eq!(
            *log.borrow(),
            ["vcc high", "delay 2", "onoff high", "vcc low", "onoff low", "delay 50"]
        );
        assert!(pwr.is_on());
    }

    #[test]
    fn status_pin_reports_power() {
        let log: Log = Rc::default();
        let mut pwr = GpioPowerControl::new(Delay(log)).with_status(Status(false));
        assert!(!pwr.is_on());
        pwr.turn_on();
        assert!(pwr.with_status(Status(true)).is_on());
    }
}
