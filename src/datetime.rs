//! Calendar time as used by the modem real time clock (`AT+CCLK`).

use core::fmt;

/// Seconds between the Unix epoch and 2000-01-01T00:00:00Z.
pub const Y2K_UNIX_OFFSET: u32 = 946_684_800;

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const SECS_PER_DAY: u32 = 86_400;

/// A date and time between 2000 and 2255 with a time zone offset in
/// quarter hours.
///
/// Values are stored as received; nothing is range checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    year_offset: u8,
    month0: u8,
    day0: u8,
    hour: u8,
    minute: u8,
    second: u8,
    tz_quarters: i8,
}

impl DateTime {
    /// `month` and `day` start at 1. Years before 2000 clamp to 2000.
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year_offset: year.saturating_sub(2000).min(u16::from(u8::MAX)) as u8,
            month0: month.saturating_sub(1),
            day0: day.saturating_sub(1),
            hour,
            minute,
            second,
            tz_quarters: 0,
        }
    }

    /// Offset from UTC in multiples of 15 minutes.
    #[must_use]
    pub fn with_timezone(self, tz_quarters: i8) -> Self {
        Self {
            tz_quarters,
            ..self
        }
    }

    /// Parse `yy/MM/dd,hh:mm:ss±zz`. Every field is read as two digits at a
    /// fixed position; a non-digit counts as 0.
    pub fn parse(s: &[u8]) -> Self {
        let digit = |i: usize| match s.get(i) {
            Some(b) if b.is_ascii_digit() => b - b'0',
            _ => 0,
        };
        let two = |i: usize| digit(i) * 10 + digit(i + 1);

        let tz = two(18) as i8;
        Self {
            year_offset: two(0),
            month0: two(3).saturating_sub(1),
            day0: two(6).saturating_sub(1),
            hour: two(9),
            minute: two(12),
            second: two(15),
            tz_quarters: if s.get(17) == Some(&b'-') { -tz } else { tz },
        }
    }

    /// Inverse of [`DateTime::y2k_epoch`], in UTC.
    pub fn from_y2k_epoch(ts: u32) -> Self {
        let mut days = ts / SECS_PER_DAY;
        let secs = ts % SECS_PER_DAY;

        let mut year_offset = 0u8;
        loop {
            let len = if is_leap(year_offset) { 366 } else { 365 };
            if days < len || year_offset == u8::MAX {
                break;
            }
            days -= len;
            year_offset += 1;
        }

        let mut month0 = 0u8;
        while month0 < 11 {
            let len = u32::from(month_len(year_offset, month0));
            if days < len {
                break;
            }
            days -= len;
            month0 += 1;
        }

        Self {
            year_offset,
            month0,
            day0: days as u8,
            hour: (secs / 3600) as u8,
            minute: (secs / 60 % 60) as u8,
            second: (secs % 60) as u8,
            tz_quarters: 0,
        }
    }

    /// Seconds since 2000-01-01T00:00:00Z, with the time zone removed.
    pub fn y2k_epoch(&self) -> u32 {
        let y = i64::from(self.year_offset);
        let leap_days = (0..self.year_offset).filter(|&y| is_leap(y)).count() as i64;
        let mut days = i64::from(self.day0) + 365 * y + leap_days;
        days += DAYS_IN_MONTH
            .iter()
            .take(usize::from(self.month0))
            .map(|&d| i64::from(d))
            .sum::<i64>();
        if self.month0 >= 2 && is_leap(self.year_offset) {
            days += 1;
        }

        let local = ((days * 24 + i64::from(self.hour)) * 60 + i64::from(self.minute)) * 60
            + i64::from(self.second);
        let offset = i64::from(self.tz_quarters) * 15 * 60;
        (local - offset).clamp(0, i64::from(u32::MAX)) as u32
    }

    pub fn unix_epoch(&self) -> u32 {
        self.y2k_epoch().saturating_add(Y2K_UNIX_OFFSET)
    }

    pub fn year(&self) -> u16 {
        2000 + u16::from(self.year_offset)
    }

    pub fn month(&self) -> u8 {
        self.month0 + 1
    }

    pub fn day(&self) -> u8 {
        self.day0 + 1
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn timezone(&self) -> i8 {
        self.tz_quarters
    }
}

fn is_leap(year_offset: u8) -> bool {
    let y = 2000 + u32::from(year_offset);
    (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
}

fn month_len(year_offset: u8, month0: u8) -> u8 {
    if month0 == 1 && is_leap(year_offset) {
        29
    } else {
        DAYS_IN_MONTH[usize::from(month0 % 12)]
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.tz_quarters < 0 { '-' } else { '+' };
        write!(
            f,
            "{:02}/{:02}/{:02},{:02}:{:02}:{:02}{}{:02}",
            self.year_offset,
            self.month(),
            self.day(),
            self.hour,
            self.minute,
            self.second,
            sign,
            self.tz_quarters.unsigned_abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn parse_and_render() {
        let dt = DateTime::parse(b"23/01/02,00:47:32+16");
        assert_eq!(dt, DateTime::new(2023, 1, 2, 0, 47, 32).with_timezone(16));
        assert_eq!(dt.year(), 2023);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 2);
        assert_eq!(dt.to_string(), "23/01/02,00:47:32+16");
    }

    #[test]
    fn negative_timezone() {
        let dt = DateTime::parse(b"04/01/02,00:47:32-08");
        assert_eq!(dt.timezone(), -8);
        assert_eq!(dt.to_string(), "04/01/02,00:47:32-08");
    }

    #[test]
    fn garbage_is_zero() {
        let dt = DateTime::parse(b"xx/01/01");
        assert_eq!(dt.year(), 2000);
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.timezone(), 0);
    }

    #[test]
    fn epochs() {
        assert_eq!(DateTime::new(2000, 1, 1, 0, 0, 0).y2k_epoch(), 0);
        assert_eq!(DateTime::new(2000, 1, 1, 0, 0, 0).unix_epoch(), 946_684_800);
        // 2023-01-02T00:47:32+04:00
        assert_eq!(
            DateTime::parse(b"23/01/02,00:47:32+16").unix_epoch(),
            1_672_606_052
        );
        // Leap day counted from March on
        assert_eq!(DateTime::new(2024, 3, 1, 0, 0, 0).unix_epoch(), 1_709_251_200);
    }

    #[test]
    fn from_epoch_inverts() {
        for dt in [
            DateTime::new(2000, 1, 1, 0, 0, 0),
            DateTime::new(2024, 2, 29, 23, 59, 59),
            DateTime::new(2024, 3, 1, 12, 0, 0),
            DateTime::new(2037, 12, 31, 6, 30, 15),
        ] {
            assert_eq!(DateTime::from_y2k_epoch(dt.y2k_epoch()), dt);
        }
    }
}
