use chrono::NaiveDate;
use rate_model::Currency;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Trimmed, capped and lower-cased; the characters themselves are kept.
pub fn sanitize_search(term: String) -> String {
    return term
        .trim()
        .chars()
        .take(20)
        .collect::<String>()
        .to_lowercase();
}

/// Comma separated codes; unknown ones are dropped.
pub fn parse_currencies(list: &str) -> BTreeSet<Currency> {
    return list
        .split(',')
        .filter_map(|code| Currency::from_str(&code.trim().to_uppercase()).ok())
        .collect();
}

/// Empty or unreadable dates leave the bound open.
pub fn parse_date_bound(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
