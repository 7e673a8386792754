// Chunked aggregation that yields to the runtime between chunks
use shared::models::{Candle, TimeFrame};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{aggregate, plan, AggregationPlan, BucketAccumulator};

/// Hands out generation tickets so a newer aggregation request supersedes
/// older ones still in flight.
#[derive(Debug, Default)]
pub struct AggregationGate {
    generation: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationTicket(u64);

impl AggregationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket for a new request; every earlier ticket becomes stale.
    pub fn issue(&self) -> AggregationTicket {
        AggregationTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: AggregationTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }
}

/// Same output as [`aggregate`], computed `chunk_size` candles at a time.
///
/// `on_progress(processed, total)` runs after every chunk with strictly
/// increasing `processed`, the last call reporting `(total, total)`.
pub async fn stream_aggregate<F>(
    candles: &[Candle],
    source: TimeFrame,
    target: TimeFrame,
    chunk_size: usize,
    on_progress: F,
) -> Vec<Candle>
where
    F: FnMut(usize, usize),
{
    run_chunks(candles, source, target, chunk_size, on_progress, || true)
        .await
        .unwrap_or_default()
}

/// Like [`stream_aggregate`] but abandons the work at the next chunk boundary
/// once `ticket` has been superseded, resolving to `None`.
pub async fn stream_aggregate_latest<F>(
    gate: &AggregationGate,
    ticket: AggregationTicket,
    candles: &[Candle],
    source: TimeFrame,
    target: TimeFrame,
    chunk_size: usize,
    on_progress: F,
) -> Option<Vec<Candle>>
where
    F: FnMut(usize, usize),
{
    let result = run_chunks(candles, source, target, chunk_size, on_progress, || gate.is_current(ticket)).await;
    if result.is_none() {
        tracing::warn!(%target, total = candles.len(), "Aggregation superseded by a newer request; result discarded");
    }
    result
}

async fn run_chunks<F, C>(
    candles: &[Candle],
    source: TimeFrame,
    target: TimeFrame,
    chunk_size: usize,
    mut on_progress: F,
    still_wanted: C,
) -> Option<Vec<Candle>>
where
    F: FnMut(usize, usize),
    C: Fn() -> bool,
{
    let total = candles.len();
    if !still_wanted() {
        return None;
    }
    if plan(source, target) != AggregationPlan::Bucket || candles.is_empty() {
        let out = aggregate(candles, source, target);
        on_progress(total, total);
        return Some(out);
    }

    let mut acc = BucketAccumulator::new(target);
    let mut processed = 0;
    for chunk in candles.chunks(chunk_size.max(1)) {
        if !still_wanted() {
            return None;
        }
        acc.extend(chunk);
        processed += chunk.len();
        on_progress(processed, total);
        if processed < total {
            tokio::task::yield_now().await;
        }
    }
    if !still_wanted() {
        return None;
    }
    tracing::debug!(%source, %target, total, buckets = acc.len(), "Streaming aggregation finished");
    Some(acc.finish())
}
