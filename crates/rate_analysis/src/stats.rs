use rate_model::{Currency, RateRecord, sort_by_date};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::format;

/// Summary of one currency over the filtered window.
///
/// Values are full precision except `latest_change_percent`, which is already
/// rounded to 2 places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyStats {
    pub currency: Currency,
    pub latest_value: f64,
    pub latest_change_percent: f64,
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

/// One entry per selected currency that has data, in canonical currency order.
pub fn compute(filtered: &[RateRecord], selected: &BTreeSet<Currency>) -> Vec<CurrencyStats> {
    selected
        .iter()
        .filter_map(|currency| currency_stats(filtered, *currency))
        .collect()
}

fn currency_stats(filtered: &[RateRecord], currency: Currency) -> Option<CurrencyStats> {
    let mut series: Vec<RateRecord> = filtered
        .iter()
        .filter(|r| r.currency == currency)
        .copied()
        .collect();
    sort_by_date(&mut series);

    let latest = series.last()?;
    let latest_change_percent = match series.len() {
        0 | 1 => 0.0,
        n => format::percent_change(latest.value, series[n - 2].value),
    };

    let values = series.iter().map(|r| r.value);
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
    let average = values.sum::<f64>() / series.len() as f64;

    Some(CurrencyStats {
        currency,
        latest_value: latest.value,
        latest_change_percent,
        min,
        max,
        average,
    })
}
