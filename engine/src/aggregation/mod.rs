//! Folding candle series into coarser timeframes.
//!
//! Buckets follow [`TimeFrame::bucket_start`]: intraday intervals align by
//! modulo, daily/weekly/monthly on UTC calendar boundaries. Within a bucket
//! the first candle seen supplies `open`, the last one `close`, highs and lows
//! are running extremes and volumes are summed (missing volume counts as 0).

pub mod stream;

use shared::models::{Candle, TimeFrame};
use std::collections::BTreeMap;

pub use stream::{stream_aggregate, stream_aggregate_latest, AggregationGate, AggregationTicket};

/// Accumulates candles into aligned buckets. Feeding the same candles in any
/// number of batches yields the same result as feeding them at once.
#[derive(Debug, Clone)]
pub struct BucketAccumulator {
    target: TimeFrame,
    buckets: BTreeMap<i64, Candle>,
    skipped: usize,
}

impl BucketAccumulator {
    pub fn new(target: TimeFrame) -> Self {
        Self { target, buckets: BTreeMap::new(), skipped: 0 }
    }

    pub fn push(&mut self, candle: &Candle) {
        let Some(bucket) = self.target.bucket_start(candle.time).filter(|_| candle.has_valid_time()) else {
            self.skipped += 1;
            return;
        };
        self.buckets
            .entry(bucket)
            .and_modify(|agg| {
                agg.high = agg.high.max(candle.high);
                agg.low = agg.low.min(candle.low);
                agg.close = candle.close;
                agg.volume = Some(agg.volume_or_zero() + candle.volume_or_zero());
            })
            .or_insert_with(|| Candle {
                time: bucket,
                open: candle.open,
                high: candle.high,
                low: candle.low,
                close: candle.close,
                volume: Some(candle.volume_or_zero()),
            });
    }

    pub fn extend<'a>(&mut self, candles: impl IntoIterator<Item = &'a Candle>) {
        for candle in candles {
            self.push(candle);
        }
    }

    /// Number of candles dropped for carrying an invalid timestamp.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Buckets in ascending time order.
    pub fn finish(self) -> Vec<Candle> {
        if self.skipped > 0 {
            tracing::debug!(skipped = self.skipped, target = %self.target, "Dropped candles with invalid timestamps");
        }
        self.buckets.into_values().collect()
    }
}

/// How a source/target pair should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationPlan {
    /// Source and target match: hand the input back untouched.
    Identity,
    /// Target is finer than the source; buckets cannot be split.
    Degenerate,
    Bucket,
}

pub fn plan(source: TimeFrame, target: TimeFrame) -> AggregationPlan {
    if source == target {
        AggregationPlan::Identity
    } else if target.is_finer_than(source) {
        AggregationPlan::Degenerate
    } else {
        AggregationPlan::Bucket
    }
}

/// Aggregates `candles` (interval `source`) into `target` bars.
///
/// Asking for a target finer than the source is a degraded case: the input is
/// returned unchanged and a warning is logged.
pub fn aggregate(candles: &[Candle], source: TimeFrame, target: TimeFrame) -> Vec<Candle> {
    match plan(source, target) {
        AggregationPlan::Identity => candles.to_vec(),
        AggregationPlan::Degenerate => {
            tracing::warn!(%source, %target, "Target timeframe is finer than source; returning input unchanged");
            candles.to_vec()
        }
        AggregationPlan::Bucket => {
            let mut acc = BucketAccumulator::new(target);
            acc.extend(candles);
            acc.finish()
        }
    }
}
