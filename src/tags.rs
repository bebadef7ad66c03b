//! Tag interpretation — promotes recognized tagged payloads into richer
//! values and maps those values back to their tagged wire form.
//!
//!   tag 0  : RFC 3339 text        → Timestamp
//!   tag 1  : epoch int or float   → Timestamp
//!   tag 2  : bytes                → unsigned bignum
//!   tag 3  : bytes                → negative bignum (-1 - n)
//!   tag 35 : text                 → Regex
//!
//! Anything else, including a recognized tag whose payload has the wrong
//! shape or does not parse, comes back as `Value::Tagged` untouched.

use regex::Regex;

use crate::bignum::{negative_from_bytes, positive_from_bytes};
use crate::constants::*;
use crate::value::{Timestamp, Value};

/// Interpret `(tag, payload)`; never fails.
pub fn interpret(tag: u64, payload: Value) -> Value {
    let promoted = match (tag, &payload) {
        (TAG_DATE_STRING, Value::Text(s)) => parse_rfc3339(s).map(Value::Timestamp),
        (TAG_EPOCH, Value::Integer(n)) => i64::try_from(*n)
            .ok()
            .map(|secs| Value::Timestamp(Timestamp::from_secs(secs))),
        (TAG_EPOCH, Value::Float(f)) => Timestamp::from_f64(*f).map(Value::Timestamp),
        (TAG_BIGNUM, Value::Bytes(b)) => Some(Value::from(positive_from_bytes(b))),
        (TAG_NEG_BIGNUM, Value::Bytes(b)) => Some(Value::from(negative_from_bytes(b))),
        (TAG_REGEX, Value::Text(s)) => Regex::new(s).ok().map(Value::Regex),
        _ => None,
    };
    promoted.unwrap_or_else(|| Value::tagged(tag, payload))
}

/// Tag number and payload a timestamp is written as.
///
/// Whole seconds use an integer payload.  Fractions use a float when the
/// float decodes back to the same instant, otherwise RFC 3339 text with
/// nanoseconds.  `None` when neither is exact: a fraction the float cannot
/// carry on an instant outside years 0000–9999.
pub fn timestamp_form(ts: &Timestamp) -> Option<(u64, Value)> {
    if ts.nanos() == 0 {
        return Some((TAG_EPOCH, Value::from(ts.secs())));
    }
    let secs = ts.as_f64();
    if Timestamp::from_f64(secs) == Some(*ts) {
        return Some((TAG_EPOCH, Value::Float(secs)));
    }
    format_rfc3339(ts).map(|text| (TAG_DATE_STRING, Value::Text(text)))
}

// ── RFC 3339 ─────────────────────────────────────────────────

/// Parse `YYYY-MM-DDTHH:MM:SS[.fraction](Z|±HH:MM)` into a UTC instant.
///
/// Fractions beyond nanoseconds are truncated.  A leap second (`:60`)
/// rolls into the next second.
pub fn parse_rfc3339(s: &str) -> Option<Timestamp> {
    let b = s.as_bytes();
    if b.len() < 20 {
        return None;
    }
    if b[4] != b'-' || b[7] != b'-' || !matches!(b[10], b'T' | b't') {
        return None;
    }
    if b[13] != b':' || b[16] != b':' {
        return None;
    }

    let year = parse_digits(b, 0, 4)?;
    let month = parse_digits(b, 5, 7)?;
    let day = parse_digits(b, 8, 10)?;
    let hour = parse_digits(b, 11, 13)?;
    let min = parse_digits(b, 14, 16)?;
    let sec = parse_digits(b, 17, 19)?;

    if !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
        return None;
    }
    if hour > 23 || min > 59 || sec > 60 {
        return None;
    }

    let mut pos = 19;
    let mut nanos: u32 = 0;
    if b[pos] == b'.' {
        pos += 1;
        let start = pos;
        while pos < b.len() && b[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == start {
            return None;
        }
        let mut scale = 100_000_000;
        for &digit in &b[start..pos.min(start + 9)] {
            nanos += (digit - b'0') as u32 * scale;
            scale /= 10;
        }
    }

    let offset = match *b.get(pos)? {
        b'Z' | b'z' if pos + 1 == b.len() => 0,
        sign @ (b'+' | b'-') if pos + 6 == b.len() && b[pos + 3] == b':' => {
            let oh = parse_digits(b, pos + 1, pos + 3)?;
            let om = parse_digits(b, pos + 4, pos + 6)?;
            if oh > 23 || om > 59 {
                return None;
            }
            let off = oh * 3600 + om * 60;
            if sign == b'-' {
                -off
            } else {
                off
            }
        }
        _ => return None,
    };

    let days = days_from_civil(year, month, day);
    let local = days * 86_400 + hour * 3_600 + min * 60 + sec;
    Timestamp::new(local - offset, nanos)
}

/// Format as RFC 3339 in UTC with a trimmed fraction.  `None` when the
/// year falls outside 0000–9999.
pub fn format_rfc3339(ts: &Timestamp) -> Option<String> {
    let days = ts.secs().div_euclid(86_400);
    let sod = ts.secs().rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);
    if !(0..=9999).contains(&year) {
        return None;
    }

    let mut out = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        year,
        month,
        day,
        sod / 3_600,
        sod % 3_600 / 60,
        sod % 60
    );
    if ts.nanos() > 0 {
        let frac = format!("{:09}", ts.nanos());
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out.push('Z');
    Some(out)
}

fn parse_digits(b: &[u8], start: usize, end: usize) -> Option<i64> {
    let digits = b.get(start..end)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(digits.iter().fold(0i64, |acc, &d| acc * 10 + (d - b'0') as i64))
}

fn is_leap_year(y: i64) -> bool {
    (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
}

fn days_in_month(y: i64, m: i64) -> i64 {
    match m {
        2 if is_leap_year(y) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date (Howard Hinnant's
/// algorithm).
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let yy = if m <= 2 { y - 1 } else { y };
    let mm = if m <= 2 { m + 9 } else { m - 3 };
    let era = yy.div_euclid(400);
    let yoe = yy - era * 400; // [0, 399]
    let doy = (153 * mm + 2) / 5 + d - 1; // [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]
    era * 146_097 + doe - 719_468
}

/// Inverse of `days_from_civil`.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = yoe + era * 400 + if m <= 2 { 1 } else { 0 };
    (y, m, d)
}
