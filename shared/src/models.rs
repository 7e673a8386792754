use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar. `time` is the bar open in seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: Option<f64>) -> Self {
        Self { time, open, high, low, close, volume }
    }

    /// Non-positive timestamps never come out of a healthy feed; aggregation drops them.
    pub fn has_valid_time(&self) -> bool {
        self.time > 0
    }

    pub fn volume_or_zero(&self) -> f64 {
        self.volume.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    pub symbol: String,
    pub candles: Vec<Candle>,
    pub timeframe: TimeFrame,
}

/// Chart intervals, declared finest to coarsest so `Ord` follows interval length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeFrame {
    Minute1,
    Minute5,
    Minute15,
    Minute30,
    Hour1,
    Hour4,
    Day1,
    Week1,
    Month1,
}

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

impl TimeFrame {
    /// Nominal interval length in seconds. Months count as 30 days; bucketing
    /// for `Month1` uses calendar months, this value only sizes bar ratios.
    pub fn interval_secs(self) -> i64 {
        match self {
            TimeFrame::Minute1 => MINUTE,
            TimeFrame::Minute5 => 5 * MINUTE,
            TimeFrame::Minute15 => 15 * MINUTE,
            TimeFrame::Minute30 => 30 * MINUTE,
            TimeFrame::Hour1 => HOUR,
            TimeFrame::Hour4 => 4 * HOUR,
            TimeFrame::Day1 => DAY,
            TimeFrame::Week1 => 7 * DAY,
            TimeFrame::Month1 => 30 * DAY,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeFrame::Minute1 => "1m",
            TimeFrame::Minute5 => "5m",
            TimeFrame::Minute15 => "15m",
            TimeFrame::Minute30 => "30m",
            TimeFrame::Hour1 => "1h",
            TimeFrame::Hour4 => "4h",
            TimeFrame::Day1 => "1d",
            TimeFrame::Week1 => "1w",
            TimeFrame::Month1 => "1M",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|tf| tf.label() == label)
    }

    pub fn all() -> &'static [TimeFrame] {
        &[
            TimeFrame::Minute1,
            TimeFrame::Minute5,
            TimeFrame::Minute15,
            TimeFrame::Minute30,
            TimeFrame::Hour1,
            TimeFrame::Hour4,
            TimeFrame::Day1,
            TimeFrame::Week1,
            TimeFrame::Month1,
        ]
    }

    pub fn is_finer_than(self, other: TimeFrame) -> bool {
        self < other
    }

    /// Aligned bucket start for `time`, or `None` when the timestamp is invalid.
    ///
    /// Intraday and daily intervals align by modulo (daily lands on UTC
    /// midnight), weekly on Monday 00:00 UTC, monthly on the 1st at 00:00 UTC.
    pub fn bucket_start(self, time: i64) -> Option<i64> {
        if time <= 0 {
            return None;
        }
        match self {
            TimeFrame::Week1 => {
                let date = DateTime::<Utc>::from_timestamp(time, 0)?.date_naive();
                let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
                Some(monday.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
            }
            TimeFrame::Month1 => {
                let date = DateTime::<Utc>::from_timestamp(time, 0)?.date_naive();
                let first = date.with_day(1)?;
                Some(first.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
            }
            _ => {
                let interval = self.interval_secs();
                Some(time - time.rem_euclid(interval))
            }
        }
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
