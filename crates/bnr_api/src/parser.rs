//! Reader for the BNR reference-rate XML documents.
//!
//! Both the daily feed and the yearly archives share one layout:
//! `DataSet > Body > Cube[@date] > Rate[@currency, @multiplier]`, with the
//! rate for `multiplier` units of the currency as the element text.
//!
//! The document is streamed one `Cube` at a time. A block only contributes
//! its records once its closing tag is read, so a document cut short keeps
//! every block before the cut.

use chrono::NaiveDate;
use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use rate_model::{Currency, RateRecord};
use std::str::FromStr;

use crate::error::BnrError;

const CUBE: &[u8] = b"Cube";
const RATE: &[u8] = b"Rate";

#[derive(Debug, Default)]
struct RateEntry {
    currency: Option<String>,
    multiplier: Option<String>,
    value: String,
}

/// Flattens a rate document into records, in document order.
///
/// `document` only names the source in errors and logs. Blocks without a
/// valid date and entries for unsupported currencies are skipped. Markup that
/// stops being well-formed ends the read: the blocks completed so far are
/// returned, and `BnrError::Parse` is raised only when there are none.
pub fn parse_rates(document: &str, xml: &str) -> Result<Vec<RateRecord>, BnrError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut blocks = 0usize;
    // Open block: its date, when readable, and the rates read so far.
    let mut block: Option<(Option<NaiveDate>, Vec<RateRecord>)> = None;
    let mut rate: Option<RateEntry> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(source) if blocks == 0 => {
                return Err(BnrError::Parse {
                    document: document.to_string(),
                    source,
                });
            }
            Err(err) => {
                warn!(
                    "parse_rates | stopped at byte {} | document: {} | blocks kept: {} | {}",
                    reader.buffer_position(),
                    document,
                    blocks,
                    err
                );
                break;
            }
        };

        match event {
            Event::Start(tag) if tag.local_name().as_ref() == CUBE => {
                block = Some((cube_date(document, &tag), Vec::new()));
            }
            Event::Empty(tag) if tag.local_name().as_ref() == CUBE => {
                cube_date(document, &tag);
                blocks += 1;
            }
            Event::Start(tag) if tag.local_name().as_ref() == RATE => {
                rate = Some(rate_entry(&tag));
            }
            Event::Text(text) => {
                if let Some(entry) = rate.as_mut() {
                    entry.value.push_str(&text.unescape().unwrap_or_default());
                }
            }
            Event::End(tag) if tag.local_name().as_ref() == RATE => {
                if let (Some(entry), Some((Some(date), rates))) = (rate.take(), block.as_mut()) {
                    if let Some(record) = to_record(*date, &entry) {
                        rates.push(record);
                    }
                }
            }
            Event::End(tag) if tag.local_name().as_ref() == CUBE => {
                if let Some((_, rates)) = block.take() {
                    records.extend(rates);
                    blocks += 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(
        "parse_rates | document: {} | blocks: {} | records: {}",
        document,
        blocks,
        records.len()
    );
    Ok(records)
}

fn attribute(tag: &BytesStart, name: &[u8]) -> Option<String> {
    tag.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.into_owned())
}

fn cube_date(document: &str, tag: &BytesStart) -> Option<NaiveDate> {
    let date = attribute(tag, b"date").as_deref().and_then(parse_date);
    if date.is_none() {
        debug!("parse_rates | skipping block without date | document: {}", document);
    }
    date
}

fn rate_entry(tag: &BytesStart) -> RateEntry {
    return RateEntry {
        currency: attribute(tag, b"currency"),
        multiplier: attribute(tag, b"multiplier"),
        value: String::new(),
    };
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn to_record(date: NaiveDate, rate: &RateEntry) -> Option<RateRecord> {
    let currency = Currency::from_str(rate.currency.as_deref()?.trim()).ok()?;
    let raw_value: f64 = rate.value.trim().parse().ok()?;
    let value = raw_value / parse_multiplier(rate.multiplier.as_deref()) as f64;

    if !value.is_finite() || value <= 0.0 {
        debug!("to_record | dropping non-positive rate | {} {}", date, currency);
        return None;
    }

    Some(RateRecord {
        date,
        currency,
        value,
    })
}

fn parse_multiplier(raw: Option<&str>) -> u32 {
    match raw.and_then(|m| m.trim().parse::<u32>().ok()) {
        Some(0) | None => 1,
        Some(multiplier) => multiplier,
    }
}
