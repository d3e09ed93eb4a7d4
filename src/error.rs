#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// No matching reply arrived before the deadline.
    Timeout,
    /// The modem answered `ERROR`, or with a reply outside the accepted set.
    Rejected,
    /// The expected reply line was present but its payload could not be
    /// parsed.
    MalformedReply,

    // Network errors
    NotRegistered,
    WeakSignal,

    // General device errors
    PoweredDown,
    Uninitialized,

    /// An HTTP action completed with a status other than 200.
    HttpStatus(u16),

    /// The byte transport failed.
    Io(embedded_io::ErrorKind),
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            Self::Timeout => defmt::write!(f, "Timeout"),
            Self::Rejected => defmt::write!(f, "Rejected"),
            Self::MalformedReply => defmt::write!(f, "MalformedReply"),
            Self::NotRegistered => defmt::write!(f, "NotRegistered"),
            Self::WeakSignal => defmt::write!(f, "WeakSignal"),
            Self::PoweredDown => defmt::write!(f, "PoweredDown"),
            Self::Uninitialized => defmt::write!(f, "Uninitialized"),
            Self::HttpStatus(code) => defmt::write!(f, "HttpStatus({=u16})", code),
            Self::Io(kind) => defmt::write!(f, "Io({:?})", kind),
        }
    }
}

impl From<embedded_io::ErrorKind> for Error {
    fn from(e: embedded_io::ErrorKind) -> Self {
        Self::Io(e)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => f.write_str("timed out waiting for the modem"),
            Self::Rejected => f.write_str("command rejected by the modem"),
            Self::MalformedReply => f.write_str("malformed reply"),
            Self::NotRegistered => f.write_str("not registered on the network"),
            Self::WeakSignal => f.write_str("signal quality below threshold"),
            Self::PoweredDown => f.write_str("modem not responding after power on"),
            Self::Uninitialized => f.write_str("transfer length not negotiated"),
            Self::HttpStatus(code) => write!(f, "unexpected HTTP status {}", code),
            Self::Io(kind) => write!(f, "transport error: {:?}", kind),
        }
    }
}
