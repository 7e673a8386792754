use csv::{ReaderBuilder, StringRecord};
use shared::models::Candle;
use shared::ChartTime;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{EngineError, EngineResult};

const TIME_HEADERS: [&str; 3] = ["time", "timestamp", "date"];

/// Reads `time,open,high,low,close[,volume]` files into candles.
///
/// Columns are located by header name (case-insensitive), so their order does
/// not matter. `time` may hold epoch seconds or an ISO-like date string.
#[derive(Debug, Clone)]
pub struct CandleCsvParser {
    delimiter: u8,
}

impl Default for CandleCsvParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

struct Columns {
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl CandleCsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn load_candles_from_csv(&self, file_path: impl AsRef<Path>) -> EngineResult<Vec<Candle>> {
        let path = file_path.as_ref();
        let file = File::open(path)?;
        let candles = self.parse_reader(BufReader::new(file))?;
        tracing::info!(path = %path.display(), count = candles.len(), "Loaded candles from CSV");
        Ok(candles)
    }

    pub fn parse_reader<R: Read>(&self, reader: R) -> EngineResult<Vec<Candle>> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns = Self::locate_columns(&headers)?;

        let mut candles = Vec::new();
        let mut dropped = 0usize;
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result?;

            let Some(time) = Self::parse_time(Self::field(&record, columns.time, "time", line)?) else {
                dropped += 1;
                continue;
            };
            let open = Self::parse_price(&record, columns.open, "open", line)?;
            let high = Self::parse_price(&record, columns.high, "high", line)?;
            let low = Self::parse_price(&record, columns.low, "low", line)?;
            let close = Self::parse_price(&record, columns.close, "close", line)?;
            let volume = match columns.volume.and_then(|i| record.get(i)).filter(|s| !s.is_empty()) {
                Some(raw) => Some(Self::parse_number(raw, "volume", line)?),
                None => None,
            };

            candles.push(Candle::new(time, open, high, low, close, volume));
        }

        if dropped > 0 {
            tracing::debug!(dropped, "Dropped CSV rows with non-positive or unreadable time");
        }
        Ok(candles)
    }

    fn locate_columns(headers: &StringRecord) -> EngineResult<Columns> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|header| names.iter().any(|name| header.eq_ignore_ascii_case(name)))
        };
        let require = |name: &'static str| {
            find(&[name]).ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing '{}' column", name)))
        };

        Ok(Columns {
            time: find(&TIME_HEADERS)
                .ok_or_else(|| EngineError::CsvDataFormatError("Missing 'time' column".to_string()))?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find(&["volume"]),
        })
    }

    fn field<'a>(record: &'a StringRecord, index: usize, name: &str, line: usize) -> EngineResult<&'a str> {
        record
            .get(index)
            .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing '{}' field at line {}", name, line)))
    }

    /// Seconds since the epoch, or `None` for rows that cannot be placed on the time axis.
    fn parse_time(raw: &str) -> Option<i64> {
        let secs = match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => v.trunc() as i64,
            Ok(_) => return None,
            Err(_) => ChartTime::Text(raw.to_string()).to_timestamp()?,
        };
        (secs > 0).then_some(secs)
    }

    fn parse_price(record: &StringRecord, index: usize, name: &str, line: usize) -> EngineResult<f64> {
        Self::parse_number(Self::field(record, index, name, line)?, name, line)
    }

    fn parse_number(raw: &str, name: &str, line: usize) -> EngineResult<f64> {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| EngineError::CsvDataFormatError(format!("Error parsing '{}' at line {}: '{}'", name, line, raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_candles_from_csv_valid_data() {
        let csv_content = "\
time,open,high,low,close,volume
1625065200,1.2,1.25,1.19,1.22,100
2021-06-30T15:01:00Z,1.22,1.23,1.21,1.21,";
        let tmp_file = create_test_csv(csv_content);
        let candles = CandleCsvParser::new().load_candles_from_csv(tmp_file.path()).unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 1_625_065_200);
        assert_eq!(candles[0].high, 1.25);
        assert_eq!(candles[0].volume, Some(100.0));
        assert_eq!(candles[1].time, 1_625_065_260);
        assert_eq!(candles[1].volume, None);
    }

    #[test]
    fn test_columns_found_by_name_with_custom_delimiter() {
        let csv_content = "Close;Low;High;Open;Timestamp\n4;1;5;2;1000";
        let candles = CandleCsvParser::new()
            .with_delimiter(b';')
            .parse_reader(csv_content.as_bytes())
            .unwrap();
        assert_eq!(candles, vec![Candle::new(1000, 2.0, 5.0, 1.0, 4.0, None)]);
    }

    #[test]
    fn test_rows_with_invalid_time_are_dropped() {
        let csv_content = "time,open,high,low,close\n0,1,1,1,1\n-60,1,1,1,1\nNaN,1,1,1,1\nsoon,1,1,1,1\n60,1,1,1,1";
        let candles = CandleCsvParser::new().parse_reader(csv_content.as_bytes()).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].time, 60);
    }

    #[test]
    fn test_load_candles_from_csv_empty_file() {
        let tmp_file = create_test_csv("time,open,high,low,close");
        let candles = CandleCsvParser::new().load_candles_from_csv(tmp_file.path()).unwrap();
        assert!(candles.is_empty());
    }

    #[test]
    fn test_missing_column() {
        let result = CandleCsvParser::new().parse_reader("time,open,high,low\n60,1,1,1".as_bytes());
        let err = result.unwrap_err();
        assert!(matches!(err, EngineError::CsvDataFormatError(_)));
        assert!(err.to_string().contains("Missing 'close' column"));
    }

    #[test]
    fn test_invalid_price_reports_line() {
        let csv_content = "time,open,high,low,close\n60,1,1,1,1\n120,invalid,1,1,1";
        let err = CandleCsvParser::new().parse_reader(csv_content.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Error parsing 'open' at line 3"));
    }

    #[test]
    fn test_missing_file() {
        let err = CandleCsvParser::new().load_candles_from_csv("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, EngineError::IoError { .. }));
    }
}
