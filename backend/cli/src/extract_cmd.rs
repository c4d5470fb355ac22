//! CLI Extract Command
//!
//! Runs only the date resolver over a text block, e.g. saved OCR output.

use std::path::Path;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};

use freshscan_understanding::{ExpiryResolver, ResolvedExpiry};

use crate::config::Config;
use crate::scan_cmd::read_input;

pub async fn run(config: &Config, input: Option<&Path>, today: Option<NaiveDate>) -> Result<()> {
    let text = read_input(input).await?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let resolver = ExpiryResolver::new().with_keyword_scope(config.keyword_scope);
    let resolved = resolver.resolve_detailed(&text, today);
    println!("{}", render(resolved.as_ref()));
    Ok(())
}

fn render(resolved: Option<&ResolvedExpiry>) -> Value {
    match resolved {
        Some(found) => json!({
            "expiration_date": found.date,
            "phase": found.phase,
            "grammar": found.grammar,
        }),
        None => json!({
            "expiration_date": null,
            "phase": null,
            "grammar": null,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_resolution_details() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let found = ExpiryResolver::new().resolve_detailed("EXP 03/04/2026", today);
        assert_eq!(
            render(found.as_ref()),
            json!({
                "expiration_date": "2026-03-04",
                "phase": "keyword",
                "grammar": "numeric_month_first",
            })
        );
    }

    #[test]
    fn renders_absence_as_nulls() {
        assert_eq!(render(None)["expiration_date"], Value::Null);
    }
}
