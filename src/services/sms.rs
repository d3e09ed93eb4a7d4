use crate::command::sms::{SendMessage, SetTextMode, CTRL_Z};
use crate::error::Error;
use crate::modem::Modem;
use crate::module_timing::{ok_timeout, sms_send_timeout};
use crate::traits::{Clock, Transport};

impl<'d, T, C, const N: usize> Modem<'d, T, C, N>
where
    T: Transport,
    C: Clock,
{
    /// Power on, send `text` to `number` in text mode and power off again.
    pub fn send_sms(&mut self, number: &str, text: &str) -> Result<(), Error> {
        let result = self.power_up().and_then(|()| self.submit_sms(number, text));
        if let Err(e) = result {
            error!("SMS to {} failed: {:?}", number, e);
        }
        self.off();
        result
    }

    fn submit_sms(&mut self, number: &str, text: &str) -> Result<(), Error> {
        self.attach_network()?;

        self.at.send_wait_ok(&SetTextMode, ok_timeout())?;
        self.at.send(&SendMessage(number))?;
        self.at.wait_for_prompt("> ", ok_timeout())?;
        self.at.write_raw(text.as_bytes())?;
        self.at.write_raw(&[CTRL_Z])?;
        self.at.wait_for_ok(sms_send_timeout())
    }
}
