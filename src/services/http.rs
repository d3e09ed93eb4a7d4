use crate::client::AtClient;
use crate::command::http::{
    parse_action_status, parse_read_len, Action, Data, HttpParam, Init, Method, Read, SetSsl, Term,
    DOWNLOAD, HTTPACTION, HTTPREAD,
};
use crate::config::Apn;
use crate::error::Error;
use crate::modem::Modem;
use crate::module_timing::{http_action_timeout, http_read_timeout, ok_timeout, HTTP_DATA_WINDOW_MS};
use crate::traits::{Clock, Transport};

const READ_CHUNK: usize = 256;

/// Parameters of a single HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HttpRequest<'a> {
    pub url: &'a str,
    /// `Content-Type`, omitted when empty.
    pub content_type: &'a str,
    /// Extra header lines, omitted when empty.
    pub user_data: &'a str,
    pub redirect: bool,
    pub ssl: bool,
}

impl<'a> HttpRequest<'a> {
    pub const fn new(url: &'a str) -> Self {
        Self {
            url,
            content_type: "",
            user_data: "",
            redirect: false,
            ssl: false,
        }
    }

    /// TLS request that follows redirects.
    pub const fn https(url: &'a str) -> Self {
        Self {
            redirect: true,
            ssl: true,
            ..Self::new(url)
        }
    }

    #[must_use]
    pub const fn with_content_type(self, content_type: &'a str) -> Self {
        Self { content_type, ..self }
    }

    #[must_use]
    pub const fn with_user_data(self, user_data: &'a str) -> Self {
        Self { user_data, ..self }
    }

    #[must_use]
    pub const fn with_redirect(self, redirect: bool) -> Self {
        Self { redirect, ..self }
    }
}

/// An initialised HTTP service on an open bearer.
pub struct HttpSession<'m, 'd, T, C, const N: usize = 64> {
    modem: &'m mut Modem<'d, T, C, N>,
    last_status: Option<u16>,
}

impl<'d, T, C, const N: usize> Modem<'d, T, C, N>
where
    T: Transport,
    C: Clock,
{
    /// Attach, open the bearer and initialise the HTTP service. The modem
    /// must already be on.
    pub fn http_prolog<'m>(&'m mut self, apn: &Apn<'_>) -> Result<HttpSession<'m, 'd, T, C, N>, Error> {
        self.connect_prolog()?;
        self.setup_bearer(apn)?;
        self.at.send_wait_ok(&Init, ok_timeout())?;
        self.at.send_wait_ok(&HttpParam::BearerProfile, ok_timeout())?;
        Ok(HttpSession {
            modem: self,
            last_status: None,
        })
    }

    /// Power on, GET `url` into `buf` and power off again.
    ///
    /// Returns the body length, which may exceed what fit in `buf`.
    pub fn http_get(&mut self, apn: &Apn<'_>, url: &str, buf: &mut [u8]) -> Result<usize, Error> {
        let result = self.power_up().and_then(|()| {
            let mut http = self.http_prolog(apn)?;
            let len = http.get(url, buf)?;
            http.epilog();
            Ok(len)
        });
        if let Err(e) = result {
            error!("HTTP GET failed: {:?}", e);
        }
        self.off();
        result
    }

    /// Power on, POST `body` and power off again. Returns the status code.
    pub fn http_post(&mut self, apn: &Apn<'_>, request: &HttpRequest<'_>, body: &[u8]) -> Result<u16, Error> {
        let result = self.power_up().and_then(|()| {
            let mut http = self.http_prolog(apn)?;
            let status = http.post(request, body)?;
            http.epilog();
            Ok(status)
        });
        if let Err(e) = result {
            error!("HTTP POST failed: {:?}", e);
        }
        self.off();
        result
    }

    /// [`Modem::http_post`], then read the response body into `reply`.
    ///
    /// Returns the status code and the body length.
    pub fn http_post_with_reply(
        &mut self,
        apn: &Apn<'_>,
        request: &HttpRequest<'_>,
        body: &[u8],
        reply: &mut [u8],
    ) -> Result<(u16, usize), Error> {
        let result = self.power_up().and_then(|()| {
            let mut http = self.http_prolog(apn)?;
            let answer = http.post_with_reply(request, body, reply)?;
            http.epilog();
            Ok(answer)
        });
        if let Err(e) = result {
            error!("HTTP POST failed: {:?}", e);
        }
        self.off();
        result
    }
}

impl<'m, 'd, T, C, const N: usize> HttpSession<'m, 'd, T, C, N>
where
    T: Transport,
    C: Clock,
{
    /// Status of the last completed action.
    pub fn last_status(&self) -> Option<u16> {
        self.last_status
    }

    /// Set URL, content type, user data and redirect handling for the next
    /// action.
    pub fn set_session_params(&mut self, request: &HttpRequest<'_>) -> Result<(), Error> {
        let at = &mut self.modem.at;
        at.send_wait_ok(&HttpParam::Url(request.url), ok_timeout())?;
        if !request.content_type.is_empty() {
            at.send_wait_ok(&HttpParam::ContentType(request.content_type), ok_timeout())?;
        }
        if !request.user_data.is_empty() {
            at.send_wait_ok(&HttpParam::UserData(request.user_data), ok_timeout())?;
        }
        if request.redirect {
            at.send_wait_ok(&HttpParam::Redirect, ok_timeout())?;
        }
        Ok(())
    }

    /// GET `url` and read the body into `buf`. Anything but 200 fails.
    pub fn get(&mut self, url: &str, buf: &mut [u8]) -> Result<usize, Error> {
        self.modem.at.send_wait_ok(&HttpParam::Url(url), ok_timeout())?;
        self.action_ok(Method::Get)?;
        self.read(buf)
    }

    /// POST `body` and return the status code, whatever it is.
    pub fn post(&mut self, request: &HttpRequest<'_>, body: &[u8]) -> Result<u16, Error> {
        self.upload(request, body.len(), |at| at.write_raw(body))?;
        self.action(Method::Post)
    }

    /// POST `len` bytes pulled from `reader`.
    pub fn post_from<R: embedded_io::Read>(
        &mut self,
        request: &HttpRequest<'_>,
        reader: &mut R,
        len: usize,
    ) -> Result<u16, Error> {
        self.upload(request, len, |at| {
            let mut buf = [0u8; READ_CHUNK];
            let mut left = len;
            while left > 0 {
                let n = reader
                    .read(&mut buf[..left.min(READ_CHUNK)])
                    .map_err(|e| Error::Io(embedded_io::Error::kind(&e)))?;
                if n == 0 {
                    return Err(Error::Io(embedded_io::ErrorKind::Other));
                }
                at.write_raw(&buf[..n])?;
                left -= n;
            }
            Ok(())
        })?;
        self.action(Method::Post)
    }

    /// [`HttpSession::post`] followed by [`HttpSession::read`].
    pub fn post_with_reply(
        &mut self,
        request: &HttpRequest<'_>,
        body: &[u8],
        reply: &mut [u8],
    ) -> Result<(u16, usize), Error> {
        let status = self.post(request, body)?;
        let len = self.read(reply)?;
        Ok((status, len))
    }

    fn upload<F>(&mut self, request: &HttpRequest<'_>, len: usize, write: F) -> Result<(), Error>
    where
        F: FnOnce(&mut AtClient<'d, T, C, N>) -> Result<(), Error>,
    {
        self.set_session_params(request)?;

        let at = &mut self.modem.at;
        if request.ssl {
            at.send_wait_ok(&SetSsl(true), ok_timeout())?;
        }
        at.send(&Data {
            len,
            window_ms: HTTP_DATA_WINDOW_MS,
        })?;
        at.wait_for_message(DOWNLOAD, ok_timeout())?;
        write(&mut *at)?;
        at.wait_for_ok(ok_timeout())
    }

    /// Read the response body into `buf`, truncating to its capacity.
    ///
    /// Returns the body length the modem announced.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let at = &mut self.modem.at;
        at.send(&Read)?;
        at.wait_for_message(HTTPREAD, http_read_timeout())?;
        let len = parse_read_len(at.payload(HTTPREAD))?;

        let deadline = at.deadline(ok_timeout());
        let missing = at.read_bytes(len, buf, deadline);
        if at.wait_for_ok(ok_timeout()).is_err() {
            debug!("No OK after HTTPREAD");
        }

        if missing != 0 {
            warn!("HTTP body short by {} bytes", missing);
            return Err(Error::Timeout);
        }
        Ok(len)
    }

    /// Run `method` and return the server's status code.
    pub fn action(&mut self, method: Method) -> Result<u16, Error> {
        let at = &mut self.modem.at;
        at.send_wait_ok(&Action(method), ok_timeout())?;
        at.wait_for_message(HTTPACTION, http_action_timeout())?;
        let status = parse_action_status(at.payload(HTTPACTION))?;
        debug!("HTTP {:?} status {}", method, status);
        self.last_status = Some(status);
        Ok(status)
    }

    /// [`HttpSession::action`], treating anything but 200 as an error.
    pub fn action_ok(&mut self, method: Method) -> Result<(), Error> {
        match self.action(method)? {
            200 => Ok(()),
            status => Err(Error::HttpStatus(status)),
        }
    }

    /// Terminate the HTTP service. A refusal is only logged.
    pub fn epilog(self) {
        if let Err(e) = self.modem.at.send_wait_ok(&Term, ok_timeout()) {
            warn!("HTTPTERM failed: {:?}", e);
        }
    }
}
