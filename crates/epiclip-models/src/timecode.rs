//! Timecode parsing and formatting.
//!
//! Timecodes address an offset into an episode as `[[HH:]MM:]SS[.fff]`:
//! at least minutes and seconds, an optional hour field, and an optional
//! fractional-seconds field of up to three digits. Minutes and seconds
//! must stay below 60.

use thiserror::Error;

/// Timecode parsing error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimecodeError {
    #[error("invalid timecode format: {0}")]
    InvalidFormat(String),
}

/// Parse a timecode string into a millisecond offset.
///
/// # Examples
/// ```
/// use epiclip_models::timecode::parse_timecode;
/// assert_eq!(parse_timecode("1:23:45.5").unwrap(), 5_025_500);
/// assert_eq!(parse_timecode("0:30").unwrap(), 30_000);
/// assert!(parse_timecode("99:99").is_err());
/// ```
pub fn parse_timecode(text: &str) -> Result<u64, TimecodeError> {
    let invalid = || TimecodeError::InvalidFormat(text.to_string());

    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };

    let fields: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match fields[..] {
        [m, s] => (None, m, s),
        [h, m, s] => (Some(h), m, s),
        _ => return Err(invalid()),
    };

    let hours = match hours {
        Some(h) => parse_field(h, 99).ok_or_else(invalid)?,
        None => 0,
    };
    let minutes = parse_field(minutes, 59).ok_or_else(invalid)?;
    let seconds = parse_field(seconds, 59).ok_or_else(invalid)?;

    let frac_ms = match fraction {
        Some(f) => parse_fraction(f).ok_or_else(invalid)?,
        None => 0,
    };

    Ok(((hours * 60 + minutes) * 60 + seconds) * 1000 + frac_ms)
}

/// Parse a one- or two-digit clock field with an inclusive upper bound.
fn parse_field(field: &str, max: u64) -> Option<u64> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u64 = field.parse().ok()?;
    (value <= max).then_some(value)
}

/// Parse a 1-3 digit fractional-seconds field into milliseconds.
fn parse_fraction(fraction: &str) -> Option<u64> {
    if fraction.is_empty() || fraction.len() > 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u64 = fraction.parse().ok()?;
    // "5" means .500, "05" means .050
    Some(value * 10_u64.pow(3 - fraction.len() as u32))
}

/// Format a millisecond offset as a canonical timecode.
///
/// The hour field is omitted when zero and trailing zeros are trimmed
/// from the fraction, so `parse_timecode(&format_timecode(ms)) == ms`
/// for any offset below 100 hours.
///
/// # Examples
/// ```
/// use epiclip_models::timecode::format_timecode;
/// assert_eq!(format_timecode(5_025_500), "1:23:45.5");
/// assert_eq!(format_timecode(30_000), "0:30");
/// ```
pub fn format_timecode(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let frac_ms = ms % 1_000;

    let mut out = if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    };

    if frac_ms > 0 {
        let frac = format!("{:03}", frac_ms);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }

    out
}
