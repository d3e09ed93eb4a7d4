use embassy_time::Duration;

use crate::client::AtClient;
use crate::command::ftp::{parse_put_ready, FtpParam, OpenPut, PutData, SetBearerProfile, FTPPUT};
use crate::config::Apn;
use crate::error::Error;
use crate::modem::Modem;
use crate::module_timing::{
    ftp_close_timeout, ftp_data_ack_timeout, ftp_data_ok_timeout, ftp_data_settle_time,
    ftp_open_timeout, ok_timeout, FTP_OPEN_ATTEMPTS,
};
use crate::traits::{Clock, Transport};

/// Largest chunk [`FtpSession::send_from`] buffers from its reader at once.
const READ_CHUNK: usize = 256;

/// A logged-in FTP session for uploading files.
///
/// Data goes out in segments no longer than the maximum length the server
/// announced when the file was opened.
pub struct FtpSession<'m, 'd, T, C, const N: usize = 64> {
    modem: &'m mut Modem<'d, T, C, N>,
    max_length: usize,
}

impl<'d, T, C, const N: usize> Modem<'d, T, C, N>
where
    T: Transport,
    C: Clock,
{
    /// Power up, open the bearer and configure the FTP server.
    pub fn open_ftp<'m>(
        &'m mut self,
        apn: &Apn<'_>,
        server: &str,
        user: &str,
        password: &str,
    ) -> Result<FtpSession<'m, 'd, T, C, N>, Error> {
        self.power_up()?;

        if let Err(e) = self.setup_ftp(apn, server, user, password) {
            error!("FTP open failed: {:?}", e);
            self.off();
            return Err(e);
        }

        Ok(FtpSession {
            modem: self,
            max_length: 0,
        })
    }

    fn setup_ftp(&mut self, apn: &Apn<'_>, server: &str, user: &str, password: &str) -> Result<(), Error> {
        self.connect_prolog()?;
        self.setup_bearer(apn)?;

        self.at.send_wait_ok(&SetBearerProfile, ok_timeout())?;
        for param in [
            FtpParam::Server(server),
            FtpParam::User(user),
            FtpParam::Password(password),
        ] {
            self.at.send_wait_ok(&param, ok_timeout())?;
        }
        Ok(())
    }
}

impl<'m, 'd, T, C, const N: usize> FtpSession<'m, 'd, T, C, N>
where
    T: Transport,
    C: Clock,
{
    /// Segment length announced by the server; 0 before a file is open.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Start uploading `path`/`name`.
    pub fn open_file(&mut self, name: &str, path: &str) -> Result<(), Error> {
        let at = &mut self.modem.at;
        at.send_wait_ok(&FtpParam::PutName(name), ok_timeout())?;
        at.send_wait_ok(&FtpParam::PutPath(path), ok_timeout())?;

        for attempt in 0..FTP_OPEN_ATTEMPTS {
            if let Err(e) = self.modem.at.send_wait_ok(&OpenPut, ok_timeout()) {
                debug!("FTPPUT open attempt {} failed: {:?}", attempt, e);
                continue;
            }
            if self.modem.at.wait_for_message(FTPPUT, ftp_open_timeout()).is_err() {
                debug!("No FTPPUT session reply, attempt {}", attempt);
                self.modem.is_alive();
                continue;
            }

            self.max_length = parse_put_ready(self.modem.at.payload(FTPPUT)).map_err(|e| {
                error!("FTP server refused upload: {:?}", e);
                e
            })?;
            debug!("FTP max length {}", self.max_length);
            return Ok(());
        }

        Err(Error::Timeout)
    }

    /// Upload `data`, split into segments the server accepts.
    pub fn send(&mut self, data: &[u8]) -> Result<(), Error> {
        self.ensure_open()?;
        let mut rest = data;
        while !rest.is_empty() {
            let (chunk, tail) = rest.split_at(rest.len().min(self.max_length));
            self.put(chunk.len(), ok_timeout(), |at| at.write_raw(chunk))?;
            rest = tail;
        }
        Ok(())
    }

    /// Upload `len` bytes pulled from `reader`.
    pub fn send_from<R: embedded_io::Read>(&mut self, reader: &mut R, len: usize) -> Result<(), Error> {
        self.ensure_open()?;
        let mut remaining = len;
        while remaining > 0 {
            let segment = remaining.min(self.max_length);
            self.put(segment, ftp_open_timeout(), |at| {
                let mut buf = [0u8; READ_CHUNK];
                let mut left = segment;
                while left > 0 {
                    let want = left.min(READ_CHUNK);
                    let n = reader
                        .read(&mut buf[..want])
                        .map_err(|e| Error::Io(embedded_io::Error::kind(&e)))?;
                    if n == 0 {
                        warn!("Reader ended {} bytes early", left);
                        return Err(Error::Io(embedded_io::ErrorKind::Other));
                    }
                    at.write_raw(&buf[..n])?;
                    left -= n;
                }
                Ok(())
            })?;
            remaining -= segment;
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.max_length == 0 {
            warn!("No FTP file open");
            return Err(Error::Uninitialized);
        }
        Ok(())
    }

    /// One `AT+FTPPUT=2,<len>` round trip; `write` streams the payload.
    fn put<F>(&mut self, len: usize, ack_timeout: Duration, write: F) -> Result<(), Error>
    where
        F: FnOnce(&mut AtClient<'d, T, C, N>) -> Result<(), Error>,
    {
        let at = &mut self.modem.at;
        at.send(&PutData(len))?;
        at.wait_for_message(FTPPUT, ftp_data_ack_timeout())?;
        at.delay(ftp_data_settle_time());

        write(&mut *at)?;
        at.wait_for_ok(ftp_data_ok_timeout())?;

        // The server may follow up with a new maximum length.
        if at.wait_for_message(FTPPUT, ack_timeout).is_ok() {
            if let Ok(max) = parse_put_ready(at.payload(FTPPUT)) {
                if max > 0 {
                    self.max_length = max;
                }
            }
        }
        Ok(())
    }

    /// Finish the current file. The server's closing notice is awaited but
    /// not required.
    pub fn close_file(&mut self) -> Result<(), Error> {
        let at = &mut self.modem.at;
        at.send_wait_ok(&PutData(0), ok_timeout())?;
        if at.wait_for_message(FTPPUT, ftp_close_timeout()).is_err() {
            debug!("No FTPPUT close notice");
        }
        self.max_length = 0;
        Ok(())
    }

    /// End the session and power the modem off.
    pub fn close(self) {
        self.modem.off();
    }
}
