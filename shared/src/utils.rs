// Time normalisation helpers shared by the engine and any rendering adapter.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A time value as a rendering surface may report it.
///
/// Surfaces are free to hand back a plain number, an ISO-like string or a
/// calendar day; everything is folded into seconds since the epoch before it
/// reaches chart logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartTime {
    Timestamp(f64),
    BusinessDay { year: i32, month: u32, day: u32 },
    Text(String),
}

impl ChartTime {
    pub fn to_timestamp(&self) -> Option<i64> {
        match self {
            ChartTime::Timestamp(secs) => {
                if secs.is_finite() {
                    Some(secs.trunc() as i64)
                } else {
                    None
                }
            }
            ChartTime::BusinessDay { year, month, day } => {
                let date = NaiveDate::from_ymd_opt(*year, *month, *day)?;
                Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
            }
            ChartTime::Text(text) => parse_time_text(text.trim()),
        }
    }
}

impl From<i64> for ChartTime {
    fn from(secs: i64) -> Self {
        ChartTime::Timestamp(secs as f64)
    }
}

fn parse_time_text(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().timestamp());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
    }
    // Numeric strings are seconds as well.
    text.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_time() {
        assert_eq!(ChartTime::Timestamp(1_700_000_000.7).to_timestamp(), Some(1_700_000_000));
        assert_eq!(ChartTime::Timestamp(f64::NAN).to_timestamp(), None);
        assert_eq!(ChartTime::Timestamp(f64::INFINITY).to_timestamp(), None);
    }

    #[test]
    fn test_business_day() {
        let t = ChartTime::BusinessDay { year: 2021, month: 6, day: 28 };
        assert_eq!(t.to_timestamp(), Some(1_624_838_400));
        let bad = ChartTime::BusinessDay { year: 2021, month: 2, day: 30 };
        assert_eq!(bad.to_timestamp(), None);
    }

    #[test]
    fn test_text_formats() {
        assert_eq!(ChartTime::Text("2021-06-28".into()).to_timestamp(), Some(1_624_838_400));
        assert_eq!(ChartTime::Text("2021-06-28T00:00:10Z".into()).to_timestamp(), Some(1_624_838_410));
        assert_eq!(ChartTime::Text("2021-06-28 00:01:00".into()).to_timestamp(), Some(1_624_838_460));
        assert_eq!(ChartTime::Text("1624838400".into()).to_timestamp(), Some(1_624_838_400));
        assert_eq!(ChartTime::Text("yesterday".into()).to_timestamp(), None);
    }

    #[test]
    fn test_untagged_deserialize() {
        let num: ChartTime = serde_json::from_str("1000").unwrap();
        assert_eq!(num.to_timestamp(), Some(1000));
        let day: ChartTime = serde_json::from_str(r#"{"year":2021,"month":6,"day":28}"#).unwrap();
        assert_eq!(day.to_timestamp(), Some(1_624_838_400));
        let text: ChartTime = serde_json::from_str(r#""2021-06-28""#).unwrap();
        assert_eq!(text.to_timestamp(), Some(1_624_838_400));
    }
}
