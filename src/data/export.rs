//! Delimited-text persistence for daily performance records.
//!
//! Column order is fixed: `date,campaign_id,campaign_name,spend,impressions,
//! clicks,conversions,conversion_value`.

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::data::DailyRecord;

/// Header row written ahead of every record table.
pub const RECORD_COLUMNS: [&str; 8] = [
    "date",
    "campaign_id",
    "campaign_name",
    "spend",
    "impressions",
    "clicks",
    "conversions",
    "conversion_value",
];

/// Serialise rows with a header to any writer.
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Read daily records from any reader; the header must name every column.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<DailyRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    for column in RECORD_COLUMNS {
        anyhow::ensure!(
            headers.iter().any(|h| h == column),
            "missing column `{column}` in record table"
        );
    }
    let mut rows = Vec::new();
    for (line, result) in csv_reader.deserialize().enumerate() {
        let row: DailyRecord = result.with_context(|| format!("parse record row {}", line + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Write records to `path`, creating parent directories as needed.
pub fn save_records(path: &Path, records: &[DailyRecord]) -> Result<()> {
    save_rows(path, records)?;
    info!(path = %path.display(), rows = records.len(), "wrote daily records");
    Ok(())
}

/// Load records from a CSV file.
pub fn load_records(path: &Path) -> Result<Vec<DailyRecord>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let records = read_records(file).with_context(|| format!("read {}", path.display()))?;
    info!(path = %path.display(), rows = records.len(), "loaded daily records");
    Ok(records)
}

/// Write any serialisable table to `path`.
pub fn save_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_rows(file, rows)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(campaign: &str, spend: f64) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            campaign_id: campaign.to_string(),
            campaign_name: format!("Loyalty - Instagram - {campaign}"),
            spend,
            impressions: 40_000,
            clicks: 500,
            conversions: 12,
            conversion_value: 610.25,
        }
    }

    #[test]
    fn header_follows_documented_column_order() {
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &[record("CMP_001", 250.5)]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, RECORD_COLUMNS.join(","));
        assert_eq!(
            text.lines().nth(1).unwrap(),
            "2024-03-01,CMP_001,Loyalty - Instagram - CMP_001,250.5,40000,500,12,610.25"
        );
    }

    #[test]
    fn reads_back_written_rows() {
        let rows = vec![record("CMP_001", 250.5), record("CMP_002", 999.99)];
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &rows).unwrap();
        assert_eq!(read_records(buffer.as_slice()).unwrap(), rows);
    }

    #[test]
    fn missing_column_is_reported() {
        let text = "date,campaign_id,spend\n2024-03-01,CMP_001,10.0\n";
        let err = read_records(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("campaign_name"));
    }
}
