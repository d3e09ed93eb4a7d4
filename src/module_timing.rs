use embassy_time::Duration;

/// Default wait for a terminal `OK`/`ERROR`
pub const fn ok_timeout() -> Duration {
    Duration::from_millis(4000)
}

/// Settle time between flushing stale input and writing a command
pub const fn command_settle_time() -> Duration {
    Duration::from_millis(50)
}

/// How long a lone `\r` may wait for its `\n` before ending the line anyway
pub const fn cr_grace_time() -> Duration {
    Duration::from_millis(50)
}

/// Delay between the `VCC` gate and the `ON/OFF` line when powering up
pub const fn vcc_settle_time() -> Duration {
    Duration::from_millis(2)
}

/// Hold time after dropping `VCC` and `ON/OFF`
pub const fn power_off_time() -> Duration {
    Duration::from_millis(50)
}

/// Number of `AT` pokes in a single liveness probe
pub const ALIVE_ATTEMPTS: u8 = 3;

/// Number of liveness probes after switching on
pub const POWER_ON_PROBES: u8 = 10;

/// Upper bound for the signal quality wait
pub const fn signal_quality_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Upper bound for the network registration wait
pub const fn registration_timeout() -> Duration {
    Duration::from_secs(120)
}

/// Wait for a `+CSQ`/`+CREG` reply line
pub const fn status_reply_timeout() -> Duration {
    Duration::from_secs(12)
}

/// Pause between two signal/registration polls
pub const fn poll_interval() -> Duration {
    Duration::from_millis(500)
}

/// `AT+CGATT=1`
pub const fn gprs_attach_timeout() -> Duration {
    Duration::from_secs(30)
}

/// `AT+CIURC` and `AT+CLTS`
pub const fn urc_config_timeout() -> Duration {
    Duration::from_secs(6)
}

/// `AT+SAPBR=1,1`, per attempt
pub const fn bearer_open_timeout() -> Duration {
    Duration::from_secs(10)
}

pub const BEARER_OPEN_ATTEMPTS: u8 = 5;

/// Wait for the `CONNECT ...` outcome of `AT+CIPSTART`
pub const fn tcp_connect_timeout() -> Duration {
    Duration::from_secs(15)
}

/// Guard time around the `+++` escape sequence
pub const fn escape_guard_time() -> Duration {
    Duration::from_millis(1000)
}

pub const fn escape_post_time() -> Duration {
    Duration::from_millis(500)
}

/// `+FTPPUT: 1,1,<len>` after opening a put session
pub const fn ftp_open_timeout() -> Duration {
    Duration::from_secs(30)
}

pub const FTP_OPEN_ATTEMPTS: u8 = 5;

/// `+FTPPUT: 2,<len>` data request acknowledgement
pub const fn ftp_data_ack_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Settle time between the data request ack and the payload
pub const fn ftp_data_settle_time() -> Duration {
    Duration::from_millis(100)
}

/// `OK` after an FTP payload
pub const fn ftp_data_ok_timeout() -> Duration {
    Duration::from_secs(5)
}

/// `+FTPPUT: 2,0` closing acknowledgement
pub const fn ftp_close_timeout() -> Duration {
    Duration::from_secs(20)
}

/// `+HTTPACTION:` result
pub const fn http_action_timeout() -> Duration {
    Duration::from_secs(20)
}

/// `+HTTPREAD:` header
pub const fn http_read_timeout() -> Duration {
    Duration::from_secs(8)
}

/// Upload window announced to the modem in `AT+HTTPDATA`, in milliseconds
pub const HTTP_DATA_WINDOW_MS: u32 = 10_000;

/// `OK` after the SMS body
pub const fn sms_send_timeout() -> Duration {
    Duration::from_secs(30)
}

/// `ATI` product identification
pub const fn product_info_timeout() -> Duration {
    Duration::from_secs(2)
}

pub const CLOCK_POWER_ON_ATTEMPTS: u8 = 10;
pub const CLOCK_READ_ATTEMPTS: u8 = 10;
