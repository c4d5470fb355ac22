//! Object/date assignment.
//!
//! One image yields at most one date, and nothing tells us which object it
//! was printed on. With a single object the date goes to it. With several,
//! only labels mentioning [`DATE_BEARING_KEYWORD`] receive it.

use chrono::NaiveDate;

use freshscan_core::{ItemRecord, LabelSet};

/// Name used when a date was found but no object was detected.
pub const UNKNOWN_ITEM: &str = "unknown_item";

/// Substring marking a label as the likely carrier of the date when several
/// objects are detected.
pub const DATE_BEARING_KEYWORD: &str = "milk";

/// Pair the resolved date (if any) with the detected labels.
pub fn assign_dates(labels: &LabelSet, date: Option<NaiveDate>) -> Vec<ItemRecord> {
    match labels.len() {
        0 => date
            .map(|date| ItemRecord::new(UNKNOWN_ITEM, Some(date)))
            .into_iter()
            .collect(),
        1 => labels.iter().map(|label| ItemRecord::new(label, date)).collect(),
        _ => labels
            .iter()
            .map(|label| ItemRecord::new(label, date.filter(|_| is_date_bearing(label))))
            .collect(),
    }
}

pub fn is_date_bearing(label: &str) -> bool {
    label.to_lowercase().contains(DATE_BEARING_KEYWORD)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn labels(names: &[&str]) -> LabelSet {
        names.iter().copied().collect()
    }

    #[test]
    fn single_label_always_gets_the_date() {
        assert_eq!(
            assign_dates(&labels(&["milk"]), date(2025, 12, 31)),
            vec![ItemRecord::new("milk", date(2025, 12, 31))]
        );
        assert_eq!(
            assign_dates(&labels(&["bottle"]), date(2025, 12, 31)),
            vec![ItemRecord::new("bottle", date(2025, 12, 31))]
        );
    }

    #[test]
    fn single_label_without_date_is_still_reported() {
        assert_eq!(
            assign_dates(&labels(&["banana"]), None),
            vec![ItemRecord::new("banana", None)]
        );
    }

    #[test]
    fn several_labels_only_date_milk() {
        let items = assign_dates(&labels(&["milk", "bread"]), date(2025, 12, 31));
        assert_eq!(
            items,
            vec![
                ItemRecord::new("milk", date(2025, 12, 31)),
                ItemRecord::new("bread", None),
            ]
        );
    }

    #[test]
    fn milk_match_is_case_insensitive_substring() {
        let items = assign_dates(&labels(&["cup", "Oat MILK carton"]), date(2026, 1, 2));
        assert_eq!(items[0].expiration_date, None);
        assert_eq!(items[1].expiration_date, date(2026, 1, 2));
    }

    #[test]
    fn several_labels_without_date_are_all_undated() {
        let items = assign_dates(&labels(&["milk", "bread", "apple"]), None);
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| item.expiration_date.is_none()));
    }

    #[test]
    fn no_labels_and_no_date_is_empty() {
        assert!(assign_dates(&LabelSet::new(), None).is_empty());
    }

    #[test]
    fn no_labels_with_date_is_unknown_item() {
        assert_eq!(
            assign_dates(&LabelSet::new(), date(2025, 6, 1)),
            vec![ItemRecord::new("unknown_item", date(2025, 6, 1))]
        );
    }
}
