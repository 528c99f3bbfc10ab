//! Presentation rounding. Stored values always keep full precision.

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Rate as shown to users and written to exports.
pub fn value(rate: f64) -> String {
    format!("{:.4}", rate)
}

pub fn percent(change: f64) -> String {
    format!("{:.2}", change)
}

/// Relative change in percent, rounded to 2 places; 0 without a usable previous value.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    round_to((current - previous) / previous * 100.0, 2)
}
