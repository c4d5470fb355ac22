//! Date normalizer: turns a scanned candidate into a calendar date.
//!
//! Numeric `a/b/y` dates are read month-first. When the first group cannot be
//! a month but the second can (`31/12/2025`), the groups are read day-first
//! instead. Two-digit years pivot at [`TWO_DIGIT_YEAR_PIVOT`].

use chrono::NaiveDate;
use thiserror::Error;

use crate::scanner::{self, DateCandidate, DateGrammar};

/// Two-digit years below this map to 20xx, the rest to 19xx (`%y` rule).
pub const TWO_DIGIT_YEAR_PIVOT: i32 = 69;

/// Why a candidate could not be turned into a date.
///
/// Never fatal: the resolver skips the candidate and keeps looking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("no date-like text found")]
    NoDate,

    #[error("malformed date component {0:?}")]
    Malformed(String),

    #[error("unknown month {0:?}")]
    UnknownMonth(String),

    #[error("month {0} out of range")]
    MonthOutOfRange(u32),

    #[error("day {day} out of range for {year:04}-{month:02}")]
    DayOutOfRange { year: i32, month: u32, day: u32 },

    #[error("year {0} out of range")]
    YearOutOfRange(i32),
}

/// Interpret a scanned candidate as a calendar date.
pub fn normalize(candidate: &DateCandidate<'_>) -> Result<NaiveDate, ParseFailure> {
    let caps = candidate
        .grammar
        .regex()
        .captures(candidate.text)
        .ok_or(ParseFailure::NoDate)?;

    let (year, month, day) = match candidate.grammar {
        DateGrammar::NumericMonthFirst => {
            let first = component(&caps[1])?;
            let second = component(&caps[2])?;
            let year = expand_year(&caps[3])?;
            if first > 12 && second <= 12 {
                (year, second, first)
            } else {
                (year, first, second)
            }
        }
        DateGrammar::IsoYearFirst => (
            expand_year(&caps[1])?,
            component(&caps[2])?,
            component(&caps[3])?,
        ),
        DateGrammar::DayMonthName => (
            expand_year(&caps[3])?,
            month_from_abbreviation(&caps[2])?,
            component(&caps[1])?,
        ),
        DateGrammar::MonthNameDay => (
            expand_year(&caps[3])?,
            month_from_abbreviation(&caps[1])?,
            component(&caps[2])?,
        ),
    };

    calendar_date(year, month, day)
}

/// Find and interpret the first usable date in arbitrary text.
///
/// Surrounding noise is ignored. Candidates are tried in grammar priority
/// order; the last failure is reported if none of them works.
pub fn normalize_fuzzy(text: &str) -> Result<NaiveDate, ParseFailure> {
    let mut failure = ParseFailure::NoDate;
    for candidate in scanner::candidates(text) {
        match normalize(&candidate) {
            Ok(date) => return Ok(date),
            Err(e) => failure = e,
        }
    }
    Err(failure)
}

/// Expand a 2-, 3- or 4-digit year. Only 2-digit years are pivoted.
pub fn expand_year(digits: &str) -> Result<i32, ParseFailure> {
    let year: i32 = digits
        .parse()
        .map_err(|_| ParseFailure::Malformed(digits.to_string()))?;
    let year = if digits.len() <= 2 {
        if year < TWO_DIGIT_YEAR_PIVOT { 2000 + year } else { 1900 + year }
    } else {
        year
    };
    if year == 0 {
        return Err(ParseFailure::YearOutOfRange(year));
    }
    Ok(year)
}

fn component(digits: &str) -> Result<u32, ParseFailure> {
    digits
        .parse()
        .map_err(|_| ParseFailure::Malformed(digits.to_string()))
}

fn month_from_abbreviation(name: &str) -> Result<u32, ParseFailure> {
    let month = match name.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return Err(ParseFailure::UnknownMonth(name.to_string())),
    };
    Ok(month)
}

fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, ParseFailure> {
    if !(1..=12).contains(&month) {
        return Err(ParseFailure::MonthOutOfRange(month));
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or(ParseFailure::DayOutOfRange {
        year,
        month,
        day,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn normalize_text(text: &str) -> Result<NaiveDate, ParseFailure> {
        normalize(&scanner::scan(text).expect("candidate"))
    }

    #[test]
    fn numeric_dates_are_month_first() {
        assert_eq!(normalize_text("03/04/2026"), Ok(date(2026, 3, 4)));
        assert_eq!(normalize_text("12-31-25"), Ok(date(2025, 12, 31)));
    }

    #[test]
    fn impossible_month_falls_back_to_day_first() {
        assert_eq!(normalize_text("31/12/2025"), Ok(date(2025, 12, 31)));
    }

    #[test]
    fn day_32_is_a_failure_not_a_panic() {
        assert_eq!(
            normalize_text("02/32/2025"),
            Err(ParseFailure::DayOutOfRange { year: 2025, month: 2, day: 32 })
        );
        assert_eq!(
            normalize_text("02/29/2025"),
            Err(ParseFailure::DayOutOfRange { year: 2025, month: 2, day: 29 })
        );
        assert_eq!(normalize_text("02/29/2024"), Ok(date(2024, 2, 29)));
    }

    #[test]
    fn both_groups_too_large_is_month_out_of_range() {
        assert_eq!(normalize_text("13/13/2025"), Err(ParseFailure::MonthOutOfRange(13)));
        assert_eq!(normalize_text("2025-00-10"), Err(ParseFailure::MonthOutOfRange(0)));
    }

    #[test]
    fn iso_and_month_name_forms() {
        assert_eq!(normalize_text("2026/1/5"), Ok(date(2026, 1, 5)));
        assert_eq!(normalize_text("7 Mar 2027"), Ok(date(2027, 3, 7)));
        assert_eq!(normalize_text("NOV 09, 26"), Ok(date(2026, 11, 9)));
    }

    #[test]
    fn two_digit_years_pivot_at_69() {
        assert_eq!(expand_year("00"), Ok(2000));
        assert_eq!(expand_year("68"), Ok(2068));
        assert_eq!(expand_year("69"), Ok(1969));
        assert_eq!(expand_year("99"), Ok(1999));
        assert_eq!(expand_year("202"), Ok(202));
        assert_eq!(expand_year("0000"), Err(ParseFailure::YearOutOfRange(0)));
    }

    #[test]
    fn fuzzy_parse_ignores_surrounding_noise() {
        assert_eq!(normalize_fuzzy("~~BEST BY:: 06/01/26 ##"), Ok(date(2026, 6, 1)));
        assert_eq!(normalize_fuzzy("lot 99 no date here"), Err(ParseFailure::NoDate));
    }

    #[test]
    fn fuzzy_parse_moves_past_failed_candidates() {
        assert_eq!(normalize_fuzzy("02/32/2025 or 2026-02-01"), Ok(date(2026, 2, 1)));
        assert!(matches!(
            normalize_fuzzy("13/13/2025"),
            Err(ParseFailure::MonthOutOfRange(13))
        ));
    }
}
