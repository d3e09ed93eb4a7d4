use embassy_time::Duration;

use crate::command::ip_transport_layer::{
    is_connect_ok, BringUpConnection, GetConnectionStatus, GetTransparentConfig, ResumeData,
    SendData, SetTransparentMode, Shutdown, StartConnection, StartTask, CONNECT_RESULTS,
    ESCAPE_SEQUENCE, SEND_OK, SHUT_OK,
};
use crate::config::Apn;
use crate::error::Error;
use crate::modem::Modem;
use crate::module_timing::{
    command_settle_time, escape_guard_time, escape_post_time, ok_timeout, tcp_connect_timeout,
};
use crate::traits::{Clock, Transport};

/// An open TCP connection through the modem's IP stack.
pub struct TcpSession<'m, 'd, T, C, const N: usize = 64> {
    modem: &'m mut Modem<'d, T, C, N>,
    transparent: bool,
}

impl<'d, T, C, const N: usize> Modem<'d, T, C, N>
where
    T: Transport,
    C: Clock,
{
    /// Power up, attach and connect to `host:port`.
    ///
    /// In transparent mode everything written after the connect goes straight
    /// to the peer, and [`TcpSession::send`] must not be used.
    pub fn open_tcp<'m>(
        &'m mut self,
        apn: &Apn<'_>,
        host: &str,
        port: u16,
        transparent: bool,
    ) -> Result<TcpSession<'m, 'd, T, C, N>, Error> {
        self.power_up()?;

        if let Err(e) = self.connect_tcp(apn, host, port, transparent) {
            error!("TCP open failed: {:?}", e);
            self.off();
            return Err(e);
        }

        self.time_to_open_tcp = self.since_on();
        info!("TCP connected after {} ms", self.time_to_open_tcp.as_millis());
        Ok(TcpSession {
            modem: self,
            transparent,
        })
    }

    fn connect_tcp(&mut self, apn: &Apn<'_>, host: &str, port: u16, transparent: bool) -> Result<(), Error> {
        self.connect_prolog()?;

        self.at.send_wait_ok(&StartTask(apn), ok_timeout())?;
        self.at.send_wait_ok(&BringUpConnection, ok_timeout())?;

        self.at.send(&Shutdown)?;
        self.at.wait_for_message(SHUT_OK, ok_timeout())?;

        if transparent {
            self.at.send_wait_ok(&SetTransparentMode(true), ok_timeout())?;
            self.at.send_wait_ok(&GetTransparentConfig, ok_timeout())?;
        }

        self.at.send_wait_ok(&StartConnection { host, port }, ok_timeout())?;
        match self.at.wait_for_one_of(&CONNECT_RESULTS, tcp_connect_timeout())? {
            0 | 1 => Ok(()),
            _ => Err(Error::Rejected),
        }
    }
}

impl<'m, 'd, T, C, const N: usize> TcpSession<'m, 'd, T, C, N>
where
    T: Transport,
    C: Clock,
{
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Send `data` with `AT+CIPSEND` and wait for `SEND OK`.
    pub fn send(&mut self, data: &[u8]) -> Result<(), Error> {
        let at = &mut self.modem.at;
        at.send(&SendData(data.len()))?;
        at.wait_for_prompt("> ", ok_timeout())?;
        at.delay(command_settle_time());
        at.write_raw(data)?;
        at.wait_for_message(SEND_OK, ok_timeout())
    }

    /// Fill `buf` with incoming bytes.
    ///
    /// Returns how many arrived before `timeout`; nothing at all is a
    /// [`Error::Timeout`].
    pub fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Error> {
        let at = &mut self.modem.at;
        let deadline = at.deadline(timeout);
        let remaining = at.read_bytes(buf.len(), buf, deadline);
        match buf.len() - remaining {
            0 if !buf.is_empty() => Err(Error::Timeout),
            n => Ok(n),
        }
    }

    /// Next line from the peer, without its terminator.
    pub fn receive_line(&mut self, timeout: Duration) -> Result<&[u8], Error> {
        let at = &mut self.modem.at;
        let deadline = at.deadline(timeout);
        at.read_line(deadline)?;
        Ok(at.line())
    }

    /// Ask the modem whether the connection is still up.
    pub fn is_connected(&mut self) -> bool {
        if !self.modem.is_on() {
            return false;
        }

        if self.transparent {
            self.escape();
            if self.modem.at.wait_for_ok(ok_timeout()).is_err() {
                return false;
            }
        }

        let connected = self.connection_state().unwrap_or(false);

        if self.transparent {
            let at = &mut self.modem.at;
            if at.send(&ResumeData).is_err() || at.wait_for_message("CONNECT", ok_timeout()).is_err() {
                warn!("Could not resume transparent data");
                return false;
            }
        }

        connected
    }

    fn connection_state(&mut self) -> Result<bool, Error> {
        let at = &mut self.modem.at;
        at.send_wait_ok(&GetConnectionStatus, ok_timeout())?;
        at.wait_for_message("STATE:", ok_timeout())?;
        Ok(is_connect_ok(at.line()))
    }

    /// Drop from transparent data mode back to command mode.
    fn escape(&mut self) {
        let at = &mut self.modem.at;
        at.delay(escape_guard_time());
        if let Err(e) = at.write_raw(ESCAPE_SEQUENCE) {
            warn!("Escape failed: {:?}", e);
        }
        at.delay(escape_post_time());
    }

    /// Shut the connection down, optionally powering the modem off.
    pub fn close(mut self, power_off: bool) {
        if self.transparent {
            self.escape();
        }

        let at = &mut self.modem.at;
        let shut = at.send(&Shutdown).and_then(|()| at.wait_for_message(SHUT_OK, ok_timeout()));
        if let Err(e) = shut {
            warn!("TCP shutdown not confirmed: {:?}", e);
        }

        if power_off {
            self.modem.off();
        }
        self.modem.time_to_close_tcp = self.modem.since_on();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AtClient;
    use crate::config::Config;
    use crate::test_helpers::{healthy_modem, MockClock, MockPower, MockTransport};

    fn tcp_modem() -> MockTransport {
        let mock = healthy_modem();
        mock.always("ATI\r", "SIM800 R14.18\r\n\r\nOK\r\n")
            .always("AT+CSTT=\"internet\",\"\",\"\"\r", "OK\r\n")
            .always("AT+CIICR\r", "OK\r\n")
            .always("AT+CIPSHUT\r", "\r\nSHUT OK\r\n");
        mock
    }

    const APN: Apn<'static> = Apn::new("internet");

    #[test]
    fn open_send_and_close() {
        let mock = tcp_modem();
        mock.on("AT+CIPSTART=\"TCP\",\"example.com\",80\r", "OK\r\n\r\nCONNECT OK\r\n")
            .on("AT+CIPSEND=5\r", "> ")
            .on("hello", "\r\nSEND OK\r\n");
        let mut power = MockPower::default();
        {
            let mut modem: Modem<'_, _, _> =
                Modem::new(AtClient::new(mock.clone(), MockClock::new()), Config::new())
                    .with_power(&mut power);
            let mut tcp = modem.open_tcp(&APN, "example.com", 80, false).unwrap();
            assert!(!tcp.is_transparent());
            tcp.send(b"hello").unwrap();
            tcp.close(true);
            assert!(modem.time_to_open_tcp() > Duration::from_millis(0));
            assert!(modem.time_to_close_tcp() >= modem.time_to_open_tcp());
        }
        assert_eq!(power.turned_on, 1);
        assert_eq!(power.turned_off, 1);
        assert_eq!(mock.count("AT+CIPSHUT\r"), 2);
        assert_eq!(mock.count("AT+CGATT"), 0);
    }

    #[test]
    fn connect_fail_powers_off() {
        let mock = tcp_modem();
        mock.on("AT+CIPSTART=\"TCP\",\"example.com\",80\r", "OK\r\n\r\nCONNECT FAIL\r\n");
        let mut power = MockPower::default();
        {
            let mut modem: Modem<'_, _, _> =
                Modem::new(AtClient::new(mock.clone(), MockClock::new()), Config::new())
                    .with_power(&mut power);
            assert!(matches!(
                modem.open_tcp(&APN, "example.com", 80, false),
                Err(Error::Rejected)
            ));
        }
        assert_eq!(power.turned_off, 1);
        assert!(!power.on);
    }

    #[test]
    fn receive_reports_partial_data() {
        let mock = tcp_modem();
        mock.on("AT+CIPSTART=\"TCP\",\"example.com\",80\r", "OK\r\n\r\nCONNECT\r\n");
        let mut modem: Modem<'_, _, _> =
            Modem::new(AtClient::new(mock.clone(), MockClock::new()), Config::new());
        let mut tcp = modem.open_tcp(&APN, "example.com", 80, false).unwrap();

        mock.feed(b"abc");
        let mut buf = [0u8; 8];
        assert_eq!(tcp.receive(&mut buf, Duration::from_millis(100)), Ok(3));
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(tcp.receive(&mut buf, Duration::from_millis(100)), Err(Error::Timeout));

        mock.feed(b"HTTP/1.0 200 OK\r\n");
        assert_eq!(tcp.receive_line(Duration::from_millis(100)).unwrap(), b"HTTP/1.0 200 OK");
    }

    #[test]
    fn connection_status_in_command_mode() {
        let mock = tcp_modem();
        mock.on("AT+CIPSTART=\"TCP\",\"example.com\",80\r", "OK\r\n\r\nCONNECT OK\r\n")
            .on("AT+CIPSTATUS\r", "\r\nOK\r\n\r\nSTATE: CONNECT OK\r\n")
            .on("AT+CIPSTATUS\r", "\r\nOK\r\n\r\nSTATE: TCP CLOSED\r\n");
        let mut modem: Modem<'_, _, _> =
            Modem::new(AtClient::new(mock.clone(), MockClock::new()), Config::new());
        let mut tcp = modem.open_tcp(&APN, "example.com", 80, false).unwrap();
        assert!(tcp.is_connected());
        assert!(!tcp.is_connected());
    }

    #[test]
    fn transparent_mode_escapes_and_resumes() {
        let mock = tcp_modem();
        mock.always("AT+CIPMODE=1\r", "OK\r\n")
            .always("AT+CIPCCFG?\r", "+CIPCCFG: 5,2,1024,1,0,1460,50\r\n\r\nOK\r\n")
            .on("AT+CIPSTART=\"TCP\",\"example.com\",80\r", "OK\r\n\r\nCONNECT\r\n")
            .on("+++", "\r\nOK\r\n")
            .on("AT+CIPSTATUS\r", "\r\nOK\r\n\r\nSTATE: CONNECT OK\r\n")
            .on("ATO0\r", "\r\nCONNECT\r\n");
        let mut modem: Modem<'_, _, _> =
            Modem::new(AtClient::new(mock.clone(), MockClock::new()), Config::new());
        let mut tcp = modem.open_tcp(&APN, "example.com", 80, true).unwrap();
        assert!(tcp.is_transparent());
        assert!(tcp.is_connected());
        tcp.close(false);
        assert_eq!(mock.count("+++"), 2);
        assert_eq!(mock.count("ATO0\r"), 1);
    }
}
