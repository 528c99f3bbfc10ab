//! Stand-in series used when no archive could be retrieved.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use log::debug;
use rand::Rng;
use rate_model::{Currency, RateRecord};

pub const WINDOW_DAYS: i64 = 365;

/// Clamp bounds around each currency's base rate.
const LOWER_BOUND: f64 = 0.9;
const UPPER_BOUND: f64 = 1.1;

pub fn generate(today: NaiveDate) -> Vec<RateRecord> {
    generate_with_rng(today, &mut rand::thread_rng())
}

/// Random walk per currency over every weekday of the trailing window.
///
/// Each step moves the running rate by a uniform relative change in
/// `±volatility / 2`, then clamps it into `[base * 0.9, base * 1.1]`.
pub fn generate_with_rng<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> Vec<RateRecord> {
    let start = today - Duration::days(WINDOW_DAYS);
    let mut running: Vec<f64> = Currency::ALL.iter().map(|c| c.base_rate()).collect();
    let mut records = Vec::new();

    for date in start.iter_days().take_while(|d| *d <= today) {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        for (currency, rate) in Currency::ALL.iter().zip(running.iter_mut()) {
            let change = (rng.r#gen::<f64>() - 0.5) * currency.volatility();
            let base = currency.base_rate();
            *rate = (*rate * (1.0 + change)).clamp(base * LOWER_BOUND, base * UPPER_BOUND);

            records.push(RateRecord {
                date,
                currency: *currency,
                value: *rate,
            });
        }
    }

    debug!(
        "generate_with_rng | from: {} | to: {} | records: {}",
        start,
        today,
        records.len()
    );
    records
}
