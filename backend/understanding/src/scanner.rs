//! Date candidate scanner: finds date-like substrings in noisy OCR text.
//!
//! Pure pattern matching over a fixed, ordered set of grammars. Nothing here
//! decides what a match means; that is [`crate::normalize`]'s job.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Match, Regex};
use serde::Serialize;

/// The printed date forms we recognize, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateGrammar {
    /// `12/31/2025`, `12-31-25`. Month-first or day-first is ambiguous.
    NumericMonthFirst,
    /// `2025-12-31`, `2025/1/5`.
    IsoYearFirst,
    /// `31 Dec 2025`.
    DayMonthName,
    /// `Dec 31, 2025`.
    MonthNameDay,
}

impl DateGrammar {
    /// Grammars in the order they are tried; the first match wins.
    pub const PRIORITY: [DateGrammar; 4] = [
        DateGrammar::NumericMonthFirst,
        DateGrammar::IsoYearFirst,
        DateGrammar::DayMonthName,
        DateGrammar::MonthNameDay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DateGrammar::NumericMonthFirst => "numeric_month_first",
            DateGrammar::IsoYearFirst => "iso_year_first",
            DateGrammar::DayMonthName => "day_month_name",
            DateGrammar::MonthNameDay => "month_name_day",
        }
    }

    pub(crate) fn regex(self) -> &'static Regex {
        match self {
            DateGrammar::NumericMonthFirst => &NUMERIC_RE,
            DateGrammar::IsoYearFirst => &ISO_RE,
            DateGrammar::DayMonthName => &DAY_MONTH_NAME_RE,
            DateGrammar::MonthNameDay => &MONTH_NAME_DAY_RE,
        }
    }
}

impl fmt::Display for DateGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Compiled regexes ---
// Capture groups are read back by the normalizer, keep them in sync.
// Month names fold ASCII case only (`(?-u:...)`), matching the normalizer's
// lookup; `ſep` is not `sep`.

const MONTH_ABBREVIATIONS: &str = "jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{1,2})[/-]([0-9]{1,2})[/-]([0-9]{2,4})").unwrap()
});

static ISO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{4})[/-]([0-9]{1,2})[/-]([0-9]{1,2})").unwrap()
});

static DAY_MONTH_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)([0-9]{{1,2}})\s+((?-u:{MONTH_ABBREVIATIONS}))\s+([0-9]{{2,4}})"
    ))
    .unwrap()
});

static MONTH_NAME_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)((?-u:{MONTH_ABBREVIATIONS}))\s+([0-9]{{1,2}}),\s+([0-9]{{2,4}})"
    ))
    .unwrap()
});

/// A substring suspected of encoding a date, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCandidate<'a> {
    /// The matched text.
    pub text: &'a str,
    /// The line (or whole block) the match was found in.
    pub line: &'a str,
    pub grammar: DateGrammar,
    /// Byte offsets of `text` within `line`.
    pub start: usize,
    pub end: usize,
}

/// First match of a single grammar anywhere in `text`.
pub fn find(grammar: DateGrammar, text: &str) -> Option<DateCandidate<'_>> {
    let m = find_isolated(grammar.regex(), text)?;
    Some(DateCandidate {
        text: m.as_str(),
        line: text,
        grammar,
        start: m.start(),
        end: m.end(),
    })
}

/// First match of each grammar that matches, in priority order.
///
/// Lazy, so a caller that stops at the first usable candidate never runs the
/// remaining patterns.
pub fn candidates(text: &str) -> impl Iterator<Item = DateCandidate<'_>> + '_ {
    DateGrammar::PRIORITY
        .into_iter()
        .filter_map(move |grammar| find(grammar, text))
}

/// The highest-priority match in `text`, if any.
pub fn scan(text: &str) -> Option<DateCandidate<'_>> {
    candidates(text).next()
}

/// Leftmost match that does not split a longer run of digits.
///
/// Without this, `25-12-31` would be carved out of `2025-12-31` by the
/// numeric grammar and the ISO grammar could never fire.
fn find_isolated<'t>(re: &Regex, text: &'t str) -> Option<Match<'t>> {
    let bytes = text.as_bytes();
    let mut from = 0;
    while from <= text.len() {
        let m = re.find_at(text, from)?;
        let digit_before = m.start() > 0 && bytes[m.start() - 1].is_ascii_digit();
        let digit_after = bytes.get(m.end()).is_some_and(u8::is_ascii_digit);
        if !digit_before && !digit_after {
            return Some(m);
        }
        let step = text[m.start()..].chars().next().map_or(1, char::len_utf8);
        from = m.start() + step;
    }
    None
}
