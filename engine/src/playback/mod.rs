//! Bar reconstruction for tick playback.
//!
//! During replay only the ticks up to the playback cursor "have happened".
//! The reconstructor folds that prefix into the view timeframe using the same
//! bucket rules as [`crate::aggregation`], so every completed bar matches the
//! full aggregation and the trailing bar is the one still forming.

pub mod session;

use shared::models::{Candle, TimeFrame};

use crate::aggregation::{plan, AggregationPlan, BucketAccumulator};

pub use session::PlaybackSession;

/// Target bars as they stood once `base_ticks[..=cursor]` had been consumed.
///
/// `None` (cursor before the first tick) or an empty series yields no bars. A
/// cursor past the end is clamped to the last tick. When the target is not
/// coarser than the base timeframe the raw prefix is returned.
pub fn aggregate_up_to_index(
    base_ticks: &[Candle],
    base_timeframe: TimeFrame,
    target_timeframe: TimeFrame,
    cursor: Option<usize>,
) -> Vec<Candle> {
    let Some(cursor) = cursor else {
        return Vec::new();
    };
    if base_ticks.is_empty() {
        return Vec::new();
    }
    let end = cursor.min(base_ticks.len() - 1);
    let prefix = &base_ticks[..=end];

    match plan(base_timeframe, target_timeframe) {
        AggregationPlan::Identity => prefix.to_vec(),
        AggregationPlan::Degenerate => {
            tracing::warn!(
                base = %base_timeframe,
                target = %target_timeframe,
                "Playback target is finer than base data; showing raw ticks"
            );
            prefix.to_vec()
        }
        AggregationPlan::Bucket => {
            let mut acc = BucketAccumulator::new(target_timeframe);
            acc.extend(prefix);
            acc.finish()
        }
    }
}

/// Base ticks that make up one target bar, never less than 1.
pub fn ticks_per_bar(base: TimeFrame, target: TimeFrame) -> usize {
    let ratio = target.interval_secs() / base.interval_secs();
    usize::try_from(ratio).unwrap_or(0).max(1)
}
