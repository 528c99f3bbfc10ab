use chrono::NaiveDate;
use log::debug;
use rate_model::RateRecord;

use crate::format;

pub const CSV_HEADER: [&str; 3] = ["Data", "Valuta", "Curs (RON)"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No data to export")]
    Empty,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),
}

/// Download name for an export made on `date`.
pub fn file_name(date: NaiveDate) -> String {
    format!("cursuri_valutare_{}.csv", date.format("%Y-%m-%d"))
}

/// One line per record in the given order; an empty set never yields a header-only file.
pub fn to_csv(records: &[RateRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record([
            record.date.format("%Y-%m-%d").to_string(),
            record.currency.to_string(),
            format::value(record.value),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    debug!("to_csv | rows: {} | bytes: {}", records.len(), bytes.len());

    String::from_utf8(bytes).map_err(|e| ExportError::Buffer(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rate_model::Currency;

    fn record(d: &str, currency: Currency, value: f64) -> RateRecord {
        RateRecord {
            date: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
            currency,
            value,
        }
    }

    #[test]
    fn to_csv_pass_single_record() {
        let csv = to_csv(&[record("2024-01-01", Currency::Eur, 4.9753)]).unwrap();
        assert_eq!(csv, "Data,Valuta,Curs (RON)\n2024-01-01,EUR,4.9753\n");
    }

    #[test]
    fn to_csv_pass_keeps_input_order() {
        let csv = to_csv(&[
            record("2024-01-03", Currency::Usd, 4.5),
            record("2024-01-01", Currency::Gbp, 5.78123),
        ])
        .unwrap();
        assert_eq!(
            csv,
            "Data,Valuta,Curs (RON)\n2024-01-03,USD,4.5000\n2024-01-01,GBP,5.7812\n"
        );
    }

    #[test]
    fn to_csv_fail_empty() {
        assert!(matches!(to_csv(&[]), Err(ExportError::Empty)));
    }

    #[test]
    fn file_name_pass_embeds_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(file_name(date), "cursuri_valutare_2024-03-09.csv");
    }
}
