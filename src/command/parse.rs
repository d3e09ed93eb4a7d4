//! Small helpers for picking apart reply payloads.

use heapless::String;

pub(crate) fn skip_spaces(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&b| b != b' ').unwrap_or(s.len());
    &s[start..]
}

/// Leading run of decimal digits and whatever follows it.
pub(crate) fn uint(s: &[u8]) -> Option<(u32, &[u8])> {
    let end = s.iter().position(|b| !b.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end]
        .iter()
        .fold(0u32, |acc, &d| acc.saturating_mul(10).saturating_add(u32::from(d - b'0')));
    Some((value, &s[end..]))
}

/// The `index`th comma separated field, surrounding spaces removed.
pub(crate) fn field(s: &[u8], index: usize) -> Option<&[u8]> {
    s.split(|&b| b == b',').nth(index).map(trim)
}

pub(crate) fn trim(s: &[u8]) -> &[u8] {
    let s = skip_spaces(s);
    let end = s.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
    &s[..end]
}

pub(crate) fn unquote(s: &[u8]) -> &[u8] {
    let s = s.strip_prefix(b"\"").unwrap_or(s);
    s.strip_suffix(b"\"").unwrap_or(s)
}

/// Copy `s` into a bounded string, truncating to capacity. Empty or non
/// UTF-8 input yields `None`.
pub(crate) fn bounded_str<const M: usize>(s: &[u8]) -> Option<String<M>> {
    if s.is_empty() {
        return None;
    }
    let s = &s[..s.len().min(M)];
    let text = match core::str::from_utf8(s) {
        Ok(text) => text,
        // Truncation may have split a multi-byte character
        Err(e) if e.error_len().is_none() => core::str::from_utf8(&s[..e.valid_up_to()]).ok()?,
        Err(_) => return None,
    };
    String::try_from(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_digits() {
        assert_eq!(uint(b"18,0"), Some((18, &b",0"[..])));
        assert_eq!(uint(b"200"), Some((200, &b""[..])));
        assert_eq!(uint(b",5"), None);
        assert_eq!(uint(b""), None);
    }

    #[test]
    fn fields() {
        assert_eq!(field(b"0, 5", 1), Some(&b"5"[..]));
        assert_eq!(field(b"0,1,\"1A2B\"", 2), Some(&b"\"1A2B\""[..]));
        assert_eq!(field(b"0", 1), None);
        assert_eq!(unquote(b"\"KPN\""), b"KPN");
    }

    #[test]
    fn bounded() {
        assert_eq!(bounded_str::<4>(b"SIM800 R14.18").as_deref(), Some("SIM8"));
        assert_eq!(bounded_str::<4>(b""), None);
    }
}
