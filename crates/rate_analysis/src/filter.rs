use rate_model::{Currency, DateRange, RateRecord};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub currencies: BTreeSet<Currency>,
    pub range: DateRange,
}

impl FilterCriteria {
    pub fn new(currencies: impl IntoIterator<Item = Currency>, range: DateRange) -> Self {
        return FilterCriteria {
            currencies: currencies.into_iter().collect(),
            range,
        };
    }

    pub fn all_currencies() -> Self {
        FilterCriteria::new(Currency::ALL, DateRange::default())
    }

    pub fn matches(&self, record: &RateRecord) -> bool {
        self.currencies.contains(&record.currency) && self.range.contains(record.date)
    }
}

/// Records matching both the currency selection and the date window, in input order.
pub fn apply(records: &[RateRecord], criteria: &FilterCriteria) -> Vec<RateRecord> {
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .copied()
        .collect()
}
