//! Parsing of the month path parameter.

use time::Month;

use crate::Error;

/// Parse a month number from 1 (January) to 12 (December).
///
/// Surrounding whitespace is ignored, anything else that is not a base 10
/// integer in range is rejected.
///
/// # Errors
/// Returns [Error::InvalidMonth] holding the original text if `raw` is not a valid month.
pub fn parse_month(raw: &str) -> Result<Month, Error> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(|number| Month::try_from(number).ok())
        .ok_or_else(|| Error::InvalidMonth(raw.to_owned()))
}
