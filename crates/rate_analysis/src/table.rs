use chrono::NaiveDate;
use rate_model::{Currency, RateRecord};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::format;

/// Rows beyond this are never shown.
pub const TABLE_ROW_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TableSort {
    DateDesc,
    DateAsc,
    ValueDesc,
    ValueAsc,
    /// Keeps the filtered order.
    #[default]
    Unsorted,
}

impl TableSort {
    /// Literal sort keys; anything unrecognised keeps the current order.
    pub fn from_key(key: &str) -> Self {
        match key {
            "date-desc" => TableSort::DateDesc,
            "date-asc" => TableSort::DateAsc,
            "value-desc" => TableSort::ValueDesc,
            "value-asc" => TableSort::ValueAsc,
            _ => TableSort::Unsorted,
        }
    }

    /// Clicking a column header flips between its two directions.
    pub fn toggle_date(self) -> Self {
        match self {
            TableSort::DateDesc => TableSort::DateAsc,
            _ => TableSort::DateDesc,
        }
    }

    pub fn toggle_value(self) -> Self {
        match self {
            TableSort::ValueDesc => TableSort::ValueAsc,
            _ => TableSort::ValueDesc,
        }
    }

    fn compare(self, a: &TableRow, b: &TableRow) -> Ordering {
        match self {
            TableSort::DateDesc => b.date.cmp(&a.date),
            TableSort::DateAsc => a.date.cmp(&b.date),
            TableSort::ValueDesc => b.value.total_cmp(&a.value),
            TableSort::ValueAsc => a.value.total_cmp(&b.value),
            TableSort::Unsorted => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub date: NaiveDate,
    pub currency: Currency,
    pub value: f64,
    /// Change against the closest earlier row of the same currency that
    /// survived the search, not against the whole dataset.
    pub change_percent: f64,
}

pub fn matches_search(record: &RateRecord, term: &str) -> bool {
    record.currency.as_ref().to_lowercase().contains(term)
        || record.date.format("%Y-%m-%d").to_string().contains(term)
        || format::value(record.value).contains(term)
}

/// Searches, annotates, sorts and caps the filtered records.
pub fn build(filtered: &[RateRecord], search: &str, sort: TableSort) -> Vec<TableRow> {
    let term = search.to_lowercase();
    let visible: Vec<&RateRecord> = filtered
        .iter()
        .filter(|r| matches_search(r, &term))
        .collect();

    let mut history: HashMap<Currency, Vec<(NaiveDate, f64)>> = HashMap::new();
    for record in &visible {
        history
            .entry(record.currency)
            .or_default()
            .push((record.date, record.value));
    }
    for series in history.values_mut() {
        series.sort_by_key(|(date, _)| *date);
    }

    let mut rows: Vec<TableRow> = visible
        .iter()
        .map(|record| {
            let previous = history
                .get(&record.currency)
                .and_then(|series| previous_value(series, record.date));
            TableRow {
                date: record.date,
                currency: record.currency,
                value: record.value,
                change_percent: previous
                    .map(|p| format::percent_change(record.value, p))
                    .unwrap_or(0.0),
            }
        })
        .collect();

    rows.sort_by(|a, b| sort.compare(a, b));
    rows.truncate(TABLE_ROW_LIMIT);
    rows
}

/// Value of the latest entry strictly before `date` in a date-ascending series.
fn previous_value(series: &[(NaiveDate, f64)], date: NaiveDate) -> Option<f64> {
    let earlier = series.partition_point(|(d, _)| *d < date);
    earlier.checked_sub(1).map(|i| series[i].1)
}
