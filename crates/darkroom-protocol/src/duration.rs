//! Parsing of human-entered destruction timers.
//!
//! Two inputs arrive from clients: an absolute countdown in `HH:MM:SS`
//! form and an inactivity limit in whole days. Both are converted to
//! milliseconds here, once, at the boundary — everything downstream
//! works in epoch milliseconds only.

use crate::ProtocolError;

/// Milliseconds in one day.
pub const MS_PER_DAY: u64 = 86_400_000;

const MS_PER_SECOND: u64 = 1_000;

/// Parses a `"HH:MM:SS"` countdown into milliseconds.
///
/// Field rules: exactly three `:`-separated fields, each 1–2 ASCII
/// digits, `HH ≤ 99`, `MM ≤ 59`, `SS ≤ 59`. `"00:00:00"` is valid and
/// yields 0, which downstream means "no absolute deadline".
///
/// # Errors
/// Returns [`ProtocolError::InvalidCountdown`] on wrong field count,
/// non-numeric fields, over-wide fields, or out-of-range values.
pub fn parse_countdown(text: &str) -> Result<u64, ProtocolError> {
    let fields: Vec<&str> = text.split(':').collect();
    if fields.len() != 3 {
        return Err(ProtocolError::InvalidCountdown(text.to_owned()));
    }

    let hours = parse_field(text, fields[0], 99)?;
    let minutes = parse_field(text, fields[1], 59)?;
    let seconds = parse_field(text, fields[2], 59)?;

    Ok((hours * 3_600 + minutes * 60 + seconds) * MS_PER_SECOND)
}

fn parse_field(
    whole: &str,
    field: &str,
    max: u64,
) -> Result<u64, ProtocolError> {
    if field.is_empty()
        || field.len() > 2
        || !field.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ProtocolError::InvalidCountdown(whole.to_owned()));
    }
    let value: u64 = field
        .parse()
        .map_err(|_| ProtocolError::InvalidCountdown(whole.to_owned()))?;
    if value > max {
        return Err(ProtocolError::InvalidCountdown(whole.to_owned()));
    }
    Ok(value)
}

/// Converts a whole-day inactivity limit to milliseconds.
///
/// The numeric requirement is enforced by the type: anything that
/// deserialized into a `u32` is numeric. `0` is a legal limit meaning
/// "expire on the first inactivity check".
pub fn days_to_millis(days: u32) -> u64 {
    u64::from(days) * MS_PER_DAY
}
