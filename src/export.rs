//! CSV export of the current reading set

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::data::LatencyReading;
use crate::error::Result;

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "Latency (ms)")]
    latency: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`
pub fn iso_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn export_file_name(now: &DateTime<Utc>) -> String {
    format!("latency-data-{}.csv", iso_timestamp(now))
}

/// Header plus one row per reading
pub fn write_csv<W: io::Write>(writer: W, readings: &[LatencyReading]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().terminator(csv::Terminator::Any(b'\n')).from_writer(writer);

    if readings.is_empty() {
        wtr.write_record(["From", "To", "Latency (ms)", "Timestamp"])?;
    }
    for r in readings {
        wtr.serialize(CsvRow {
            from: &r.from,
            to: &r.to,
            latency: format!("{:.2}", r.latency),
            timestamp: iso_timestamp(&r.timestamp),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `latency-data-<timestamp>.csv` into `dir`, creating it if needed
pub fn export_to_dir(dir: &Path, readings: &[LatencyReading], now: DateTime<Utc>) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(&now));
    let file = fs::File::create(&path)?;
    write_csv(io::BufWriter::new(file), readings)?;
    info!(path = %path.display(), rows = readings.len(), "exported latency readings");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_readings, EXCHANGES};
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn to_csv_string(readings: &[LatencyReading]) -> Result<String> {
        let mut buf = Vec::new();
        write_csv(&mut buf, readings)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn sample() -> Vec<LatencyReading> {
        let mut rng = StdRng::seed_from_u64(21);
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        generate_readings(EXCHANGES, &mut rng, now)
    }

    #[test]
    fn one_row_per_reading() {
        let readings = sample();
        let csv = to_csv_string(&readings).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "From,To,Latency (ms),Timestamp");
        assert_eq!(lines.len(), readings.len() + 1);
    }

    #[test]
    fn row_format() {
        let readings = sample();
        let csv = to_csv_string(&readings).unwrap();
        let first = csv.lines().nth(1).unwrap();
        let fields: Vec<&str> = first.split(',').collect();
        assert_eq!(fields[0], "binance-tokyo");
        assert_eq!(fields[1], "okx-singapore");
        assert_eq!(fields[2], format!("{:.2}", readings[0].latency));
        assert_eq!(fields[3], "2024-03-09T14:05:07.000Z");
    }

    #[test]
    fn timestamps_parse_back() {
        let csv = to_csv_string(&sample()).unwrap();
        for line in csv.lines().skip(1) {
            let ts = line.rsplit(',').next().unwrap();
            assert!(DateTime::parse_from_rfc3339(ts).is_ok(), "bad timestamp {ts}");
        }
    }

    #[test]
    fn empty_export_has_header_only() {
        let csv = to_csv_string(&[]).unwrap();
        assert_eq!(csv, "From,To,Latency (ms),Timestamp\n");
    }

    #[test]
    fn writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let path = export_to_dir(&dir.path().join("out"), &sample(), now).unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), "latency-data-2025-01-02T03:04:05.000Z.csv");
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 29);
    }
}
