//! Point series handed to the chart renderer.

use chrono::NaiveDate;
use rate_model::{Currency, RateRecord, sort_by_date};
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::comparison::ComparisonSeries;

const PALETTE: [&str; 8] = [
    "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316", "#6366f1", "#84cc16", "#06b6d4",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: NaiveDate,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub border_color: String,
    pub background_color: String,
    pub points: Vec<ChartPoint>,
}

/// Fixed colour for supported currencies, a stable palette pick for any other code.
pub fn color_for(code: &str) -> &'static str {
    match Currency::from_str(code) {
        Ok(currency) => currency.border_color(),
        Err(_) => palette_color(code),
    }
}

fn palette_color(code: &str) -> &'static str {
    let hash = code.chars().fold(0i32, |hash, c| {
        (c as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    });
    PALETTE[hash.unsigned_abs() as usize % PALETTE.len()]
}

/// One series per selected currency, date ascending, even when it has no points.
pub fn line_series(filtered: &[RateRecord], selected: &BTreeSet<Currency>) -> Vec<ChartSeries> {
    selected
        .iter()
        .map(|currency| {
            let mut records: Vec<RateRecord> = filtered
                .iter()
                .filter(|r| r.currency == *currency)
                .copied()
                .collect();
            sort_by_date(&mut records);

            ChartSeries {
                label: currency.to_string(),
                border_color: currency.border_color().to_string(),
                background_color: currency.background_color().to_string(),
                points: records
                    .iter()
                    .map(|r| ChartPoint {
                        x: r.date,
                        y: r.value,
                    })
                    .collect(),
            }
        })
        .collect()
}

pub fn comparison_series(series: &[ComparisonSeries]) -> Vec<ChartSeries> {
    series
        .iter()
        .map(|s| ChartSeries {
            label: format!("{} (variație %)", s.currency),
            border_color: color_for(s.currency.as_ref()).to_string(),
            background_color: "transparent".to_string(),
            points: s
                .points
                .iter()
                .map(|p| ChartPoint {
                    x: p.date,
                    y: p.percent_change,
                })
                .collect(),
        })
        .collect()
}
