use chrono::NaiveDate;
use rate_model::{Currency, DateRange, RateRecord, sort_by_date};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::format;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub date: NaiveDate,
    pub percent_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSeries {
    pub currency: Currency,
    pub baseline: f64,
    pub points: Vec<ComparisonPoint>,
}

/// Percent change of each compared currency against its first value in `range`.
///
/// Works on the whole dataset, so the main currency selection has no effect.
/// Currencies without records in the window are left out.
pub fn build(
    dataset: &[RateRecord],
    range: &DateRange,
    currencies: &BTreeSet<Currency>,
) -> Vec<ComparisonSeries> {
    currencies
        .iter()
        .filter_map(|currency| series_for(dataset, range, *currency))
        .collect()
}

fn series_for(
    dataset: &[RateRecord],
    range: &DateRange,
    currency: Currency,
) -> Option<ComparisonSeries> {
    let mut window: Vec<RateRecord> = dataset
        .iter()
        .filter(|r| r.currency == currency && range.contains(r.date))
        .copied()
        .collect();
    sort_by_date(&mut window);

    let baseline = window.first()?.value;
    let points = window
        .iter()
        .map(|r| ComparisonPoint {
            date: r.date,
            percent_change: format::percent_change(r.value, baseline),
        })
        .collect();

    Some(ComparisonSeries {
        currency,
        baseline,
        points,
    })
}
