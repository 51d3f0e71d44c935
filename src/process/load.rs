// src/process/load.rs
//
// Reads a zip-compressed SEBRA registry dump into typed records. The zip is
// buffered into memory entry-by-entry and the archive (with its file
// handle) is dropped before parsing starts.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Serialize;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{Result, SebraError};
use crate::process::transform::lowercase_columns;

/// One row of the SEBRA registry.
///
/// Both dates are midnight-truncated at load; `reg_year` stays `None` until
/// [`crate::process::transform::add_reg_year`] derives it. The receiver
/// name is nullable in the dumps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub client_receiver_acc: String,
    pub client_name_hash: String,
    pub client_receiver_name: Option<String>,
    pub primary_organization: String,
    pub amount: f64,
    pub reg_date: NaiveDate,
    pub settlement_date: NaiveDate,
    pub reg_year: Option<i32>,
}

/// Column names after lowercasing, in the order the loader needs them.
const REQUIRED_COLUMNS: &[&str] = &[
    "client_receiver_acc",
    "client_name_hash",
    "client_receiver_name",
    "primary_organization",
    "amount",
    "reg_date",
    "settlement_date",
];

/// Accepted timestamp shapes in the dumps; time-of-day is dropped.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];
const DAY_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d"];

/// Parse one registry timestamp cell to a calendar date.
pub fn parse_registry_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DAY_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Load the registry from `zip_path`: first `.csv` entry, headers
/// lowercased, the two date columns truncated to calendar days.
pub fn load_transactions<P: AsRef<Path>>(zip_path: P) -> Result<Vec<Transaction>> {
    let source_id = zip_path.as_ref().display().to_string();

    // 1) buffer the CSV entry, then drop the archive and its handle
    let file = File::open(&zip_path).map_err(|e| SebraError::unavailable(&source_id, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| SebraError::unavailable(&source_id, e))?;

    let mut buf = Vec::new();
    let mut found = false;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| SebraError::unavailable(&source_id, e))?;
        if entry.is_file() && entry.name().to_lowercase().ends_with(".csv") {
            buf.reserve(entry.size() as usize);
            entry
                .read_to_end(&mut buf)
                .map_err(|e| SebraError::unavailable(&source_id, e))?;
            found = true;
            break;
        }
    }
    drop(archive);
    if !found {
        return Err(SebraError::empty(&source_id, "no .csv entry in archive"));
    }
    debug!(bytes = buf.len(), "buffered csv entry");

    // 2) lowercase the header row and resolve the required columns
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(buf));
    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| SebraError::unavailable(&source_id, e))?
        .iter()
        .map(str::to_string)
        .collect();
    let headers = lowercase_columns(&headers).map_err(|e| match e {
        SebraError::SchemaMismatch { column, reason, .. } => {
            SebraError::schema(&source_id, column, reason)
        }
        other => other,
    })?;

    let index: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(ix, name)| (name.as_str(), ix))
        .collect();
    let mut cols = HashMap::new();
    for &name in REQUIRED_COLUMNS {
        let ix = *index
            .get(name)
            .ok_or_else(|| SebraError::schema(&source_id, name, "column absent"))?;
        cols.insert(name, ix);
    }

    // 3) parse every record
    let get = |record: &csv::StringRecord, name: &str| -> String {
        record.get(cols[name]).unwrap_or("").trim().to_string()
    };
    let date = |record: &csv::StringRecord, name: &str| -> Result<NaiveDate> {
        let raw = get(record, name);
        parse_registry_date(&raw).ok_or_else(|| {
            SebraError::parse(&source_id, &raw, format!("column '{name}' is not a date"))
        })
    };

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| SebraError::unavailable(&source_id, e))?;

        let amount_raw = get(&record, "amount");
        let amount: f64 = amount_raw.parse().map_err(|e| {
            SebraError::parse(&source_id, &amount_raw, format!("column 'amount': {e}"))
        })?;

        let receiver_name = match get(&record, "client_receiver_name") {
            name if name.is_empty() => None,
            name => Some(name),
        };

        rows.push(Transaction {
            client_receiver_acc: get(&record, "client_receiver_acc"),
            client_name_hash: get(&record, "client_name_hash"),
            client_receiver_name: receiver_name,
            primary_organization: get(&record, "primary_organization"),
            amount,
            reg_date: date(&record, "reg_date")?,
            settlement_date: date(&record, "settlement_date")?,
            reg_year: None,
        });
    }

    info!(n_rows = rows.len(), source = %source_id, "registry loaded");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    use zip::write::{ExtendedFileOptions, FileOptions};
    use zip::CompressionMethod;

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,sebradata::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn zip_fixture(csv_content: &str) -> NamedTempFile {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = FileOptions::<ExtendedFileOptions>::default()
                .compression_method(CompressionMethod::Stored);
            zip.start_file("sebra.csv", options).unwrap();
            zip.write_all(csv_content.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        let tmp = NamedTempFile::new().unwrap();
        tmp.reopen().unwrap().write_all(&buf).unwrap();
        tmp
    }

    const SAMPLE: &str = "\
REG_DATE,SETTLEMENT_DATE,CLIENT_RECEIVER_ACC,CLIENT_NAME_HASH,CLIENT_RECEIVER_NAME,PRIMARY_ORGANIZATION,AMOUNT
2020-03-01 00:00:00,2020-03-02 11:30:15,BG11UNCR0001,abc123,Фирма ЕООД,Министерство на финансите,1500.50
2020-03-04,2020-03-05,BG11UNCR0001,abc123,,Министерство на финансите,99.10
";

    #[test]
    fn test_load_truncates_dates_and_lowercases_headers() {
        init_test_logging();
        let tmp = zip_fixture(SAMPLE);
        let rows = load_transactions(tmp.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].reg_date,
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()
        );
        // time-of-day dropped
        assert_eq!(
            rows[0].settlement_date,
            NaiveDate::from_ymd_opt(2020, 3, 2).unwrap()
        );
        assert_eq!(rows[0].amount, 1500.50);
        assert_eq!(rows[0].reg_year, None);
        assert_eq!(rows[1].client_receiver_name, None);
    }

    #[test]
    fn test_load_missing_column_is_schema_mismatch() {
        let tmp = zip_fixture("REG_DATE,SETTLEMENT_DATE\n2020-01-01,2020-01-01\n");
        let err = load_transactions(tmp.path()).unwrap_err();
        match err {
            SebraError::SchemaMismatch { column, .. } => {
                assert_eq!(column, "client_receiver_acc")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_missing_amount_column_names_it() {
        let tmp = zip_fixture(
            "\
REG_DATE,SETTLEMENT_DATE,CLIENT_RECEIVER_ACC,CLIENT_NAME_HASH,CLIENT_RECEIVER_NAME,PRIMARY_ORGANIZATION
2020-03-01,2020-03-02,BG11UNCR0001,abc123,Фирма ЕООД,Министерство на финансите
",
        );
        let err = load_transactions(tmp.path()).unwrap_err();
        match err {
            SebraError::SchemaMismatch { column, .. } => assert_eq!(column, "amount"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_bad_date_is_parse_failure() {
        let bad = SAMPLE.replace("2020-03-01 00:00:00", "not-a-date");
        let tmp = zip_fixture(&bad);
        let err = load_transactions(tmp.path()).unwrap_err();
        assert!(matches!(err, SebraError::ParseFailure { .. }));
    }

    #[test]
    fn test_load_missing_file_is_source_unavailable() {
        let err = load_transactions("/no/such/file.zip").unwrap_err();
        assert!(matches!(err, SebraError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_load_zip_without_csv_is_empty_result() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = FileOptions::<ExtendedFileOptions>::default()
                .compression_method(CompressionMethod::Stored);
            zip.start_file("readme.txt", options).unwrap();
            zip.write_all(b"nothing tabular").unwrap();
            zip.finish().unwrap();
        }
        let tmp = NamedTempFile::new().unwrap();
        tmp.reopen().unwrap().write_all(&buf).unwrap();

        let err = load_transactions(tmp.path()).unwrap_err();
        assert!(matches!(err, SebraError::EmptyResult { .. }));
    }

    #[test]
    fn test_parse_registry_date_shapes() {
        let want = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        for raw in [
            "2021-12-31 23:59:59",
            "2021-12-31T23:59:59",
            "31.12.2021 08:00:00",
            "2021-12-31",
            "31.12.2021",
            "2021/12/31",
        ] {
            assert_eq!(parse_registry_date(raw), Some(want), "{raw}");
        }
        assert_eq!(parse_registry_date("31/12/2021 xx"), None);
    }
}
