use chrono::{Datelike, NaiveDate};
use log::{error, info, warn};
use rate_model::{RateRecord, sort_by_date};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

use crate::api::BnrAPI;
use crate::error::BnrError;
use crate::{parser, synthetic};

/// Anything that can hand out a yearly rate archive.
pub trait ArchiveSource {
    /// Name used for the archive in logs and parse errors.
    fn document_name(&self, year: i32) -> String;

    fn fetch_archive(&self, year: i32) -> impl Future<Output = Result<String, BnrError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DataOrigin {
    Archive { years: Vec<i32> },
    Synthetic,
}

#[derive(Debug, Clone)]
pub struct Acquisition {
    pub records: Vec<RateRecord>,
    pub origin: DataOrigin,
}

impl Acquisition {
    pub fn synthetic(today: NaiveDate) -> Self {
        return Acquisition {
            records: synthetic::generate(today),
            origin: DataOrigin::Synthetic,
        };
    }

    pub fn is_synthetic(&self) -> bool {
        self.origin == DataOrigin::Synthetic
    }
}

/// Current year first, then the one before.
pub fn target_years(today: NaiveDate) -> [i32; 2] {
    [today.year(), today.year() - 1]
}

/// Fetches every target year once; failed years are skipped, not retried.
///
/// Falls back to one synthetic series when no year yields a record.
pub async fn acquire<S: ArchiveSource>(source: &S, today: NaiveDate) -> Acquisition {
    let mut records = Vec::new();
    let mut years = Vec::new();

    for year in target_years(today) {
        let document = source.document_name(year);
        let parsed = match source.fetch_archive(year).await {
            Ok(xml) => parser::parse_rates(&document, &xml),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(year_records) => {
                info!("acquire | {} | records: {}", document, year_records.len());
                if !year_records.is_empty() {
                    years.push(year);
                }
                records.extend(year_records);
            }
            Err(e) => warn!("acquire | skipping {}: {}", year, e),
        }
    }

    if records.is_empty() {
        warn!("acquire | no archive data, using simulated rates");
        return Acquisition::synthetic(today);
    }

    sort_by_date(&mut records);
    Acquisition {
        records,
        origin: DataOrigin::Archive { years },
    }
}

/// Builds the BNR client and acquires; a client that cannot be built also
/// ends in the synthetic fallback.
pub async fn load(archive_base_url: &str, timeout: Duration, today: NaiveDate) -> Acquisition {
    acquire_with(BnrAPI::with_base_url(archive_base_url, timeout), today).await
}

async fn acquire_with<S: ArchiveSource>(
    source: Result<S, BnrError>,
    today: NaiveDate,
) -> Acquisition {
    match source {
        Ok(source) => acquire(&source, today).await,
        Err(e) => {
            error!("load | could not create BNR client: {}", e);
            Acquisition::synthetic(today)
        }
    }
}
