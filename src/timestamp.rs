//! Conversion of Slack `ts` strings into integer epoch values.
//!
//! Slack timestamps are decimal seconds with up to six fractional digits
//! (`"1549307811.074500"`). Both conversions work on the digit string directly
//! so the result is exact: no floating point is involved.
//!
//! # Example
//!
//! ```rust
//! use slackbridge::timestamp::{to_microseconds, to_milliseconds};
//!
//! assert_eq!(to_milliseconds("1549307811.074500"), 1549307811075);
//! assert_eq!(to_microseconds("1549307811.074500"), 1549307811074500);
//! assert_eq!(to_milliseconds("not a timestamp"), 1);
//! ```

/// Value returned for timestamps that cannot be parsed.
///
/// Never zero, so the target platform does not treat it as "unset".
pub const INVALID_TIMESTAMP: i64 = 1;

/// Converts a Slack timestamp to milliseconds since the epoch.
///
/// Rounds half-up (ties away from zero). Returns [`INVALID_TIMESTAMP`] when the
/// string is not a decimal number.
pub fn to_milliseconds(ts: &str) -> i64 {
    scale_decimal(ts, 3).unwrap_or(INVALID_TIMESTAMP)
}

/// Converts a Slack timestamp to microseconds since the epoch.
///
/// Slack never emits more than six fractional digits, so this value is exact
/// and is the sort key for posts. Returns [`INVALID_TIMESTAMP`] on parse
/// failure.
pub fn to_microseconds(ts: &str) -> i64 {
    scale_decimal(ts, 6).unwrap_or(INVALID_TIMESTAMP)
}

/// Computes `round(value * 10^digits)` for a decimal string.
fn scale_decimal(input: &str, digits: usize) -> Option<i64> {
    let (negative, unsigned) = match input.as_bytes().first()? {
        b'-' => (true, &input[1..]),
        b'+' => (false, &input[1..]),
        _ => (false, input),
    };

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (unsigned, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let mut value: i64 = 0;
    for b in int_part.bytes() {
        value = value.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
    }

    let frac = frac_part.as_bytes();
    for i in 0..digits {
        let digit = frac.get(i).map_or(0, |b| i64::from(b - b'0'));
        value = value.checked_mul(10)?.checked_add(digit)?;
    }

    // The discarded tail is at least one half exactly when its first digit is >= 5.
    if frac.get(digits).is_some_and(|b| *b >= b'5') {
        value = value.checked_add(1)?;
    }

    Some(if negative { -value } else { value })
}
