use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Foreign currencies tracked against the RON.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Eur, Currency::Usd, Currency::Gbp];

    pub fn border_color(self) -> &'static str {
        match self {
            Currency::Eur => "#2563eb",
            Currency::Usd => "#22c55e",
            Currency::Gbp => "#f59e0b",
        }
    }

    pub fn background_color(self) -> &'static str {
        match self {
            Currency::Eur => "rgba(37, 99, 235, 0.1)",
            Currency::Usd => "rgba(34, 197, 94, 0.1)",
            Currency::Gbp => "rgba(245, 158, 11, 0.1)",
        }
    }

    /// Typical RON rate, used as the anchor of simulated series.
    pub fn base_rate(self) -> f64 {
        match self {
            Currency::Eur => 4.97,
            Currency::Usd => 4.55,
            Currency::Gbp => 5.78,
        }
    }

    /// Maximum relative day-to-day move of simulated series.
    pub fn volatility(self) -> f64 {
        match self {
            Currency::Eur => 0.02,
            Currency::Usd => 0.03,
            Currency::Gbp => 0.04,
        }
    }
}

/// One published rate: `value` RON for one unit of `currency` on `date`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub date: NaiveDate,
    pub currency: Currency,
    pub value: f64,
}

/// Inclusive date window; an absent bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        return DateRange { start, end };
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

/// Stable ascending sort on date only; same-day records keep insertion order.
pub fn sort_by_date(records: &mut [RateRecord]) {
    records.sort_by_key(|r| r.date);
}
