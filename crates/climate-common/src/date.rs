//! Observation date handling.
//!
//! Dates are stored as `YYYY-MM-DD` text, so every date that ends up in a
//! SQL comparison must be rendered in that exact zero-padded form. String
//! order then equals chronological order.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{ClimateError, ClimateResult};

/// Storage and wire format for observation dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of the lookback window, in days.
pub const LOOKBACK_DAYS: u64 = 365;

/// Years that render as exactly four digits under [`DATE_FORMAT`].
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

/// Parse a caller-supplied date parameter.
///
/// Input must be exactly `YYYY-MM-DD` with a zero-padded four-digit year,
/// so the rendered date compares correctly against stored text. `param`
/// names the offending parameter in the error.
pub fn parse_observation_date(param: &str, raw: &str) -> ClimateResult<NaiveDate> {
    let invalid = |detail: String| ClimateError::InvalidDate {
        param: param.to_string(),
        message: format!("expected YYYY-MM-DD, got '{}' ({})", raw, detail),
    };

    let date =
        NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| invalid(e.to_string()))?;
    if !YEAR_RANGE.contains(&date.year()) {
        return Err(invalid(format!("year {} out of range", date.year())));
    }
    if format_date(date) != raw {
        return Err(invalid("date is not in canonical form".to_string()));
    }
    Ok(date)
}

/// Render a date in storage format.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// The inclusive interval of [`LOOKBACK_DAYS`] days ending at the most
/// recent observation in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LookbackWindow {
    /// Window ending at `end`.
    pub fn ending_at(end: NaiveDate) -> Self {
        let start = end
            .checked_sub_days(Days::new(LOOKBACK_DAYS))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Window anchored at a maximum date read back from the store.
    ///
    /// A stored value that is not a valid date means the dataset itself is
    /// broken, which is reported as [`ClimateError::CorruptData`].
    pub fn from_stored_max(raw: &str) -> ClimateResult<Self> {
        let end = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
            ClimateError::CorruptData(format!("stored max date '{}' is not a date: {}", raw, e))
        })?;
        Ok(Self::ending_at(end))
    }

    pub fn start_str(&self) -> String {
        format_date(self.start)
    }

    pub fn end_str(&self) -> String {
        format_date(self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_date() {
        let date = parse_observation_date("start_date", "2017-08-23").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2017, 8, 23).unwrap());
        assert_eq!(format_date(date), "2017-08-23");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_observation_date("start_date", "not-a-date").unwrap_err();
        match err {
            ClimateError::InvalidDate { param, message } => {
                assert_eq!(param, "start_date");
                assert!(message.contains("not-a-date"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_impossible_and_trailing() {
        assert!(parse_observation_date("d", "2017-02-30").is_err());
        assert!(parse_observation_date("d", "2017-13-01").is_err());
        assert!(parse_observation_date("d", "2017-01-01T00:00").is_err());
        assert!(parse_observation_date("d", "").is_err());
    }

    #[test]
    fn test_window_spans_365_days() {
        let window = LookbackWindow::from_stored_max("2017-08-23").unwrap();
        assert_eq!(window.start_str(), "2016-08-23");
        assert_eq!(window.end_str(), "2017-08-23");
        assert_eq!((window.end - window.start).num_days(), 365);
    }

    #[test]
    fn test_window_across_leap_day() {
        let window = LookbackWindow::ending_at(NaiveDate::from_ymd_opt(2016, 3, 1).unwrap());
        assert_eq!(window.start_str(), "2015-03-02");
    }

    #[test]
    fn test_parse_rejects_years_outside_four_digits() {
        for raw in ["+10000-01-01", "-0001-01-01", "+2017-08-23"] {
            match parse_observation_date("start_date", raw) {
                Err(ClimateError::InvalidDate { param, message }) => {
                    assert_eq!(param, "start_date");
                    assert!(message.contains("YYYY-MM-DD"), "{}", message);
                }
                other => panic!("{} should be rejected, got {:?}", raw, other),
            }
        }

        let edge = parse_observation_date("d", "9999-12-31").unwrap();
        assert_eq!(format_date(edge), "9999-12-31");
        let edge = parse_observation_date("d", "0000-01-01").unwrap();
        assert_eq!(format_date(edge), "0000-01-01");
    }

    #[test]
    fn test_parse_rejects_non_canonical_input() {
        assert!(parse_observation_date("d", " 2017-08-01").is_err());
        assert!(parse_observation_date("d", "2017-08-01 ").is_err());
        assert!(parse_observation_date("d", "2017-8-1").is_err());
    }

    #[test]
    fn test_corrupt_stored_max() {
        let err = LookbackWindow::from_stored_max("23/08/2017").unwrap_err();
        assert!(matches!(err, ClimateError::CorruptData(_)));
    }
}
