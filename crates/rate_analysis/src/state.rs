//! Immutable application snapshot.
//!
//! Every user action yields a new `AppState` from the previous one; nothing is
//! mutated in place. The dataset is shared between snapshots and only ever
//! replaced as a whole when a new acquisition lands.

use bnr_api::{Acquisition, DataOrigin};
use chrono::{Months, NaiveDate};
use log::debug;
use rate_model::{Currency, DateRange, RateRecord};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::chart::{self, ChartSeries};
use crate::comparison::{self, ComparisonSeries};
use crate::export::{self, ExportError};
use crate::filter::{self, FilterCriteria};
use crate::stats::{self, CurrencyStats};
use crate::table::{self, TableRow, TableSort};

#[derive(Debug, Clone)]
pub enum Action {
    DatasetLoaded(Acquisition),
    SelectCurrencies(BTreeSet<Currency>),
    SetDateRange(DateRange),
    SetSearch(String),
    SetSort(TableSort),
    /// Header clicks flip the direction of that column's sort.
    ToggleDateSort,
    ToggleValueSort,
    SetComparison(BTreeSet<Currency>),
    ToggleComparison(Currency),
}

#[derive(Debug, Clone)]
pub struct AppState {
    dataset: Arc<[RateRecord]>,
    origin: Option<DataOrigin>,
    criteria: FilterCriteria,
    comparison: BTreeSet<Currency>,
    search: String,
    sort: TableSort,
    filtered: Arc<[RateRecord]>,
}

impl AppState {
    /// Empty state with every currency selected and the last month as window.
    pub fn new(today: NaiveDate) -> Self {
        let start = today.checked_sub_months(Months::new(1)).unwrap_or(today);
        return AppState {
            dataset: Arc::from(Vec::new()),
            origin: None,
            criteria: FilterCriteria::new(Currency::ALL, DateRange::new(Some(start), Some(today))),
            comparison: Currency::ALL.into_iter().collect(),
            search: String::new(),
            sort: TableSort::DateDesc,
            filtered: Arc::from(Vec::new()),
        };
    }

    pub fn apply(&self, action: Action) -> AppState {
        let mut next = self.clone();
        let mut refilter = false;

        match action {
            Action::DatasetLoaded(acquisition) => {
                next.dataset = Arc::from(acquisition.records);
                next.origin = Some(acquisition.origin);
                refilter = true;
            }
            Action::SelectCurrencies(currencies) => {
                next.criteria.currencies = currencies;
                refilter = true;
            }
            Action::SetDateRange(range) => {
                next.criteria.range = range;
                refilter = true;
            }
            Action::SetSearch(search) => next.search = search,
            Action::SetSort(sort) => next.sort = sort,
            Action::ToggleDateSort => next.sort = next.sort.toggle_date(),
            Action::ToggleValueSort => next.sort = next.sort.toggle_value(),
            Action::SetComparison(currencies) => next.comparison = currencies,
            Action::ToggleComparison(currency) => {
                if !next.comparison.remove(&currency) {
                    next.comparison.insert(currency);
                }
            }
        }

        if refilter {
            next.filtered = Arc::from(filter::apply(&next.dataset, &next.criteria));
            debug!(
                "apply | dataset: {} | filtered: {}",
                next.dataset.len(),
                next.filtered.len()
            );
        }
        next
    }

    pub fn dataset(&self) -> &[RateRecord] {
        &self.dataset
    }

    pub fn origin(&self) -> Option<&DataOrigin> {
        self.origin.as_ref()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn comparison_currencies(&self) -> &BTreeSet<Currency> {
        &self.comparison
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> TableSort {
        self.sort
    }

    pub fn filtered(&self) -> &[RateRecord] {
        &self.filtered
    }

    /// Passive notice shown when the data is simulated.
    pub fn notice(&self) -> Option<&'static str> {
        match self.origin {
            Some(DataOrigin::Synthetic) => {
                Some("BNR rates could not be retrieved; showing simulated data")
            }
            _ => None,
        }
    }

    pub fn stats(&self) -> Vec<CurrencyStats> {
        stats::compute(&self.filtered, &self.criteria.currencies)
    }

    pub fn table(&self) -> Vec<TableRow> {
        table::build(&self.filtered, &self.search, self.sort)
    }

    pub fn comparison(&self) -> Vec<ComparisonSeries> {
        comparison::build(&self.dataset, &self.criteria.range, &self.comparison)
    }

    pub fn chart(&self) -> Vec<ChartSeries> {
        chart::line_series(&self.filtered, &self.criteria.currencies)
    }

    pub fn comparison_chart(&self) -> Vec<ChartSeries> {
        chart::comparison_series(&self.comparison())
    }

    pub fn export_csv(&self) -> Result<String, ExportError> {
        export::to_csv(&self.filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(d: &str, currency: Currency, value: f64) -> RateRecord {
        RateRecord {
            date: date(d),
            currency,
            value,
        }
    }

    fn loaded() -> AppState {
        let acquisition = Acquisition {
            records: vec![
                record("2024-01-02", Currency::Eur, 4.97),
                record("2024-01-02", Currency::Usd, 4.55),
                record("2024-01-03", Currency::Eur, 4.98),
                record("2024-01-03", Currency::Usd, 4.60),
                record("2024-03-01", Currency::Eur, 5.00),
            ],
            origin: DataOrigin::Archive { years: vec![2024] },
        };
        AppState::new(date("2024-01-31")).apply(Action::DatasetLoaded(acquisition))
    }

    #[test]
    fn new_pass_defaults() {
        let state = AppState::new(date("2024-03-31"));
        assert_eq!(
            state.criteria().range,
            DateRange::new(Some(date("2024-02-29")), Some(date("2024-03-31")))
        );
        assert_eq!(state.criteria().currencies.len(), 3);
        assert_eq!(state.comparison_currencies().len(), 3);
        assert_eq!(state.sort(), TableSort::DateDesc);
        assert!(state.filtered().is_empty());
        assert!(state.origin().is_none());
    }

    #[test]
    fn apply_pass_dataset_loaded_filters_by_default_window() {
        let state = loaded();
        assert_eq!(state.dataset().len(), 5);
        assert_eq!(state.filtered().len(), 4);
        assert!(state.notice().is_none());
    }

    #[test]
    fn apply_pass_leaves_previous_snapshot_untouched() {
        let before = loaded();
        let after = before.apply(Action::SelectCurrencies([Currency::Usd].into_iter().collect()));

        assert_eq!(before.filtered().len(), 4);
        assert_eq!(after.filtered().len(), 2);
        assert!(after.filtered().iter().all(|r| r.currency == Currency::Usd));
    }

    #[test]
    fn apply_pass_comparison_ignores_main_selection() {
        let state = loaded()
            .apply(Action::SelectCurrencies([Currency::Usd].into_iter().collect()))
            .apply(Action::SetDateRange(DateRange::default()));

        let compared: Vec<Currency> = state.comparison().iter().map(|s| s.currency).collect();
        assert_eq!(compared, vec![Currency::Eur, Currency::Usd]);
        assert_eq!(state.stats().len(), 1);
    }

    #[test]
    fn apply_pass_toggle_comparison() {
        let state = loaded().apply(Action::ToggleComparison(Currency::Eur));
        assert!(!state.comparison_currencies().contains(&Currency::Eur));
        let compared: Vec<Currency> = state.comparison().iter().map(|s| s.currency).collect();
        assert_eq!(compared, vec![Currency::Usd]);

        let state = state.apply(Action::ToggleComparison(Currency::Eur));
        assert!(state.comparison_currencies().contains(&Currency::Eur));
    }

    #[test]
    fn apply_pass_search_and_sort_feed_table() {
        let state = loaded()
            .apply(Action::SetSearch("usd".to_string()))
            .apply(Action::SetSort(TableSort::ValueDesc));
        let table = state.table();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].value, 4.60);
        assert_eq!(table[0].change_percent, 1.1);
        assert_eq!(state.filtered().len(), 4);
    }

    #[test]
    fn apply_pass_header_toggles_sort() {
        let state = loaded().apply(Action::ToggleDateSort);
        assert_eq!(state.sort(), TableSort::DateAsc);
        let state = state.apply(Action::ToggleValueSort);
        assert_eq!(state.sort(), TableSort::ValueDesc);
        let state = state.apply(Action::ToggleValueSort);
        assert_eq!(state.sort(), TableSort::ValueAsc);
    }

    #[test]
    fn export_csv_pass_filtered_records() {
        let state = loaded().apply(Action::SelectCurrencies([Currency::Eur].into_iter().collect()));
        assert_eq!(
            state.export_csv().unwrap(),
            "Data,Valuta,Curs (RON)\n2024-01-02,EUR,4.9700\n2024-01-03,EUR,4.9800\n"
        );
    }

    #[test]
    fn export_csv_fail_nothing_filtered() {
        let state = loaded().apply(Action::SetDateRange(DateRange::new(
            Some(date("2025-01-01")),
            None,
        )));
        assert!(matches!(state.export_csv(), Err(ExportError::Empty)));
    }

    #[test]
    fn notice_pass_synthetic_origin() {
        let state = AppState::new(date("2024-01-31"))
            .apply(Action::DatasetLoaded(Acquisition::synthetic(date("2024-01-31"))));
        assert!(state.notice().is_some());
        assert!(!state.filtered().is_empty());
    }
}
