//! Expiration date resolver.
//!
//! Two phases, and the first one to produce a date wins:
//!
//! 1. Keyword-anchored: the first line mentioning `exp`, `use by`, `best by`
//!    or `sell by` is scanned grammar by grammar until a candidate normalizes.
//! 2. Fallback: the whole block is scanned the same way. The first candidate
//!    that normalizes decides the outcome. It is returned only if it is not in
//!    the past, since an unanchored past date is more likely a packing date.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::normalize;
use crate::scanner::{self, DateGrammar};

/// Cues that mark a line as carrying the expiration date.
pub const EXPIRY_KEYWORDS: [&str; 4] = ["exp", "use by", "best by", "sell by"];

/// Which keyword-bearing lines phase 1 examines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordScope {
    /// Only the first line containing a keyword. If it yields nothing, phase 1
    /// gives up even when later lines carry keywords too.
    #[default]
    FirstLine,
    /// Every keyword line, in order, until one yields a date.
    AllLines,
}

impl FromStr for KeywordScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first_line" => Ok(Self::FirstLine),
            "all" | "all_lines" => Ok(Self::AllLines),
            other => Err(format!("unknown keyword scope {other:?} (expected \"first\" or \"all\")")),
        }
    }
}

/// The phase that produced a resolved date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPhase {
    Keyword,
    Fallback,
}

impl ResolutionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionPhase::Keyword => "keyword",
            ResolutionPhase::Fallback => "fallback",
        }
    }
}

/// A resolved expiration date and how it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedExpiry {
    pub date: NaiveDate,
    pub phase: ResolutionPhase,
    pub grammar: DateGrammar,
}

#[derive(Debug, Clone, Default)]
pub struct ExpiryResolver {
    keyword_scope: KeywordScope,
}

impl ExpiryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyword_scope(mut self, keyword_scope: KeywordScope) -> Self {
        self.keyword_scope = keyword_scope;
        self
    }

    pub fn keyword_scope(&self) -> KeywordScope {
        self.keyword_scope
    }

    /// Resolve at most one expiration date from an OCR text block.
    pub fn resolve(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        self.resolve_detailed(text, today).map(|found| found.date)
    }

    pub fn resolve_detailed(&self, text: &str, today: NaiveDate) -> Option<ResolvedExpiry> {
        self.keyword_phase(text)
            .or_else(|| fallback_phase(text, today))
    }

    fn keyword_phase(&self, text: &str) -> Option<ResolvedExpiry> {
        let mut keyword_lines = text.lines().filter(|line| has_expiry_keyword(line));
        match self.keyword_scope {
            KeywordScope::FirstLine => keyword_lines.next().and_then(first_date_on_line),
            KeywordScope::AllLines => keyword_lines.find_map(first_date_on_line),
        }
    }
}

/// Case-insensitive check for any of [`EXPIRY_KEYWORDS`].
pub fn has_expiry_keyword(line: &str) -> bool {
    let lower = line.to_lowercase();
    EXPIRY_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

fn first_date_on_line(line: &str) -> Option<ResolvedExpiry> {
    for candidate in scanner::candidates(line) {
        match normalize(&candidate) {
            Ok(date) => {
                return Some(ResolvedExpiry {
                    date,
                    phase: ResolutionPhase::Keyword,
                    grammar: candidate.grammar,
                });
            }
            Err(failure) => {
                debug!(grammar = %candidate.grammar, text = candidate.text, %failure, "Skipping keyword candidate");
                continue;
            }
        }
    }
    None
}

fn fallback_phase(text: &str, today: NaiveDate) -> Option<ResolvedExpiry> {
    for candidate in scanner::candidates(text) {
        let date = match normalize(&candidate) {
            Ok(date) => date,
            Err(failure) => {
                debug!(grammar = %candidate.grammar, text = candidate.text, %failure, "Skipping fallback candidate");
                continue;
            }
        };
        if date >= today {
            return Some(ResolvedExpiry {
                date,
                phase: ResolutionPhase::Fallback,
                grammar: candidate.grammar,
            });
        }
        debug!(%date, %today, "Discarding past date found without a keyword");
        return None;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 6, 15)
    }

    fn resolve(text: &str) -> Option<NaiveDate> {
        ExpiryResolver::new().resolve(text, today())
    }

    #[test]
    fn no_keyword_and_no_date_is_absent() {
        assert_eq!(resolve("ORGANIC WHOLE MILK\nVitamin D\n1 GAL (3.78 L)"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn exp_line_with_us_date_is_month_first() {
        assert_eq!(resolve("LOT 42\nEXP 03/04/2026\n"), Some(date(2026, 3, 4)));
        assert_eq!(resolve("exp12/31/2024"), Some(date(2024, 12, 31)));
    }

    #[test]
    fn keyword_date_may_be_in_the_past() {
        let found = ExpiryResolver::new()
            .resolve_detailed("Best By: 01/02/2020", today())
            .unwrap();
        assert_eq!(found.date, date(2020, 1, 2));
        assert_eq!(found.phase, ResolutionPhase::Keyword);
    }

    #[test]
    fn keyword_line_wins_over_earlier_unanchored_date() {
        let text = "PACKED 2026-01-01\nUSE BY 15 Jul 2026";
        let found = ExpiryResolver::new().resolve_detailed(text, today()).unwrap();
        assert_eq!(found.date, date(2026, 7, 15));
        assert_eq!(found.grammar, DateGrammar::DayMonthName);
    }

    #[test]
    fn keyword_line_skips_unparseable_candidate() {
        assert_eq!(resolve("exp 02/32/2025 2026-03-01"), Some(date(2026, 3, 1)));
    }

    #[test]
    fn only_first_keyword_line_is_examined() {
        // The second keyword line is never read in phase 1, and the fallback
        // rejects the date because it is in the past.
        let text = "EXPIRES SOON\nSell by 08/01/2024";
        assert_eq!(resolve(text), None);
        let found = ExpiryResolver::new()
            .with_keyword_scope(KeywordScope::AllLines)
            .resolve_detailed(text, today())
            .unwrap();
        assert_eq!(found.date, date(2024, 8, 1));
        assert_eq!(found.phase, ResolutionPhase::Keyword);
    }

    #[test]
    fn unparseable_first_keyword_line_is_not_retried_on_later_ones() {
        // Phase 2 sees the same bad numeric candidate first and skips it, so
        // nothing is found even though the second keyword line is valid.
        assert_eq!(resolve("exp 02/32/2025\nbest by 03/01/2030"), None);

        let found = ExpiryResolver::new()
            .resolve_detailed("exp 02/32/2025\nbest by 2030-03-01", today())
            .unwrap();
        assert_eq!(found.date, date(2030, 3, 1));
        assert_eq!(found.phase, ResolutionPhase::Fallback);

        let found = ExpiryResolver::new()
            .with_keyword_scope(KeywordScope::AllLines)
            .resolve_detailed("exp 02/32/2025\nbest by 03/01/2030", today())
            .unwrap();
        assert_eq!(found.date, date(2030, 3, 1));
        assert_eq!(found.phase, ResolutionPhase::Keyword);
    }

    #[test]
    fn failed_keyword_line_falls_back_to_whole_block() {
        let text = "exp: see lid\n10/10/2025";
        let found = ExpiryResolver::new().resolve_detailed(text, today()).unwrap();
        assert_eq!(found.date, date(2025, 10, 10));
        assert_eq!(found.phase, ResolutionPhase::Fallback);
    }

    #[test]
    fn unanchored_past_date_is_absent() {
        assert_eq!(resolve("PACKED ON 01/15/2024"), None);
    }

    #[test]
    fn unanchored_future_date_is_returned() {
        assert_eq!(resolve("11/30/2025"), Some(date(2025, 11, 30)));
        assert_eq!(resolve("2025-06-15"), Some(today()));
    }

    #[test]
    fn past_fallback_date_stops_the_search() {
        // The numeric past date is found first; the later future ISO date is
        // never considered.
        assert_eq!(resolve("01/15/2024\n2027-01-01"), None);
    }

    #[test]
    fn fallback_skips_unparseable_candidates() {
        assert_eq!(resolve("02/32/2025\nJan 3, 2027"), Some(date(2027, 1, 3)));
    }

    #[test]
    fn keyword_matching_ignores_case() {
        assert!(has_expiry_keyword("BEST BY"));
        assert!(has_expiry_keyword("Expiry"));
        assert!(!has_expiry_keyword("best before"));
    }

    #[test]
    fn keyword_scope_parses_from_config_strings() {
        assert_eq!("first".parse::<KeywordScope>(), Ok(KeywordScope::FirstLine));
        assert_eq!("ALL".parse::<KeywordScope>(), Ok(KeywordScope::AllLines));
        assert!("some".parse::<KeywordScope>().is_err());
        let resolver = ExpiryResolver::new().with_keyword_scope(KeywordScope::AllLines);
        assert_eq!(resolver.keyword_scope(), KeywordScope::AllLines);
    }
}
