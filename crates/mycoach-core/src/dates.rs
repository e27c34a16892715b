//! Calendar-date parsing.
//!
//! Documents written by the current code store ISO `YYYY-MM-DD` dates.
//! Older documents keyed logs and weight samples by locale-formatted
//! strings, so the parser also accepts the common locale shapes:
//!
//! - `YYYY/M/D`, `YYYY.M.D` and `YYYY. M. D.` (year first, as in ja, zh, ko)
//! - `M/D/YYYY` (US), or `D/M/YYYY` when the first field cannot be a month
//! - `D.M.YYYY` and `D-M-YYYY` (day first)

use jiff::civil::Date;

use crate::error::CoreError;

/// Parse a stored date key in any shape a document may contain.
pub fn parse_calendar_date(raw: &str) -> Result<Date, CoreError> {
    let raw = raw.trim();

    if let Ok(date) = raw.parse::<Date>() {
        return Ok(date);
    }

    let invalid = || CoreError::InvalidDate(raw.to_string());

    let sep = ['/', '.', '-']
        .into_iter()
        .find(|c| raw.contains(*c))
        .ok_or_else(invalid)?;

    // Korean keys end with the separator: `2026. 10. 15.`
    let parts: Vec<&str> = raw.trim_end_matches(sep).split(sep).map(str::trim).collect();
    let [first, second, third] = parts[..] else {
        return Err(invalid());
    };

    let field = |s: &str| s.parse::<i16>().map_err(|_| invalid());

    let (year, month, day) = if first.len() == 4 {
        (field(first)?, field(second)?, field(third)?)
    } else {
        let (a, b, year) = (field(first)?, field(second)?, field(third)?);
        if sep != '/' || a > 12 { (year, b, a) } else { (year, a, b) }
    };

    let month = i8::try_from(month).map_err(|_| invalid())?;
    let day = i8::try_from(day).map_err(|_| invalid())?;
    Date::new(year, month, day).map_err(|_| invalid())
}
