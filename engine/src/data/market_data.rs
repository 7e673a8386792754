// Holds imported datasets and caches their aggregated views per timeframe
use shared::models::{Candle, MarketData, TimeFrame};
use std::collections::HashMap;

use crate::aggregation::{aggregate, stream_aggregate_latest, AggregationGate};
use crate::error::{EngineError, EngineResult};

pub struct MarketDataStore {
    datasets: HashMap<String, MarketData>,
    aggregated: HashMap<(String, TimeFrame), Vec<Candle>>,
}

impl MarketDataStore {
    pub fn new() -> Self {
        MarketDataStore {
            datasets: HashMap::new(),
            aggregated: HashMap::new(),
        }
    }

    /// Merges `new_candles` into the dataset, keeping times strictly increasing.
    ///
    /// A dataset keeps the timeframe it was created with; adding candles of a
    /// different interval is an error. Candles with invalid times are dropped.
    pub fn add_candles(&mut self, dataset_id: &str, timeframe: TimeFrame, new_candles: Vec<Candle>) -> EngineResult<()> {
        let dataset = self.datasets.entry(dataset_id.to_string()).or_insert_with(|| MarketData {
            symbol: dataset_id.to_string(),
            candles: Vec::new(),
            timeframe,
        });
        if dataset.timeframe != timeframe {
            return Err(EngineError::MarketDataError(format!(
                "dataset '{}' holds {} candles, cannot add {} candles",
                dataset_id, dataset.timeframe, timeframe
            )));
        }

        let before = dataset.candles.len() + new_candles.len();
        dataset.candles.extend(new_candles.into_iter().filter(Candle::has_valid_time));
        dataset.candles.sort_by_key(|c| c.time);
        dataset.candles.dedup_by_key(|c| c.time);
        let dropped = before - dataset.candles.len();
        if dropped > 0 {
            tracing::debug!(dataset = dataset_id, dropped, "Dropped invalid or duplicate candles");
        }

        self.aggregated.retain(|(id, _), _| id != dataset_id);
        tracing::info!(dataset = dataset_id, %timeframe, count = dataset.candles.len(), "Dataset updated");
        Ok(())
    }

    pub fn dataset(&self, dataset_id: &str) -> Option<&MarketData> {
        self.datasets.get(dataset_id)
    }

    /// The dataset aggregated to `timeframe`, computed once and then served from cache.
    pub fn candles(&mut self, dataset_id: &str, timeframe: TimeFrame) -> EngineResult<&[Candle]> {
        let dataset = self.datasets.get(dataset_id).ok_or_else(|| Self::unknown(dataset_id))?;
        if dataset.timeframe == timeframe {
            return Ok(dataset.candles.as_slice());
        }
        let key = (dataset_id.to_string(), timeframe);
        let bars = self
            .aggregated
            .entry(key)
            .or_insert_with(|| aggregate(&dataset.candles, dataset.timeframe, timeframe));
        Ok(bars.as_slice())
    }

    /// Streams the aggregation instead of blocking, caching the result unless superseded.
    pub async fn candles_streamed<F>(
        &mut self,
        dataset_id: &str,
        timeframe: TimeFrame,
        chunk_size: usize,
        gate: &AggregationGate,
        on_progress: F,
    ) -> EngineResult<Option<Vec<Candle>>>
    where
        F: FnMut(usize, usize),
    {
        let key = (dataset_id.to_string(), timeframe);
        if let Some(cached) = self.aggregated.get(&key) {
            return Ok(Some(cached.clone()));
        }
        let ticket = gate.issue();
        let dataset = self.datasets.get(dataset_id).ok_or_else(|| Self::unknown(dataset_id))?;
        let result = stream_aggregate_latest(
            gate,
            ticket,
            &dataset.candles,
            dataset.timeframe,
            timeframe,
            chunk_size,
            on_progress,
        )
        .await;
        if let Some(bars) = &result {
            if dataset.timeframe != timeframe {
                self.aggregated.insert(key, bars.clone());
            }
        }
        Ok(result)
    }

    /// Candles of `timeframe` whose time falls in the inclusive range.
    pub fn get_candles(
        &mut self,
        dataset_id: &str,
        timeframe: TimeFrame,
        from_time: Option<i64>,
        to_time: Option<i64>,
    ) -> EngineResult<Vec<Candle>> {
        let candles = self.candles(dataset_id, timeframe)?;
        Ok(candles
            .iter()
            .filter(|c| from_time.map_or(true, |start| c.time >= start))
            .filter(|c| to_time.map_or(true, |end| c.time <= end))
            .copied()
            .collect())
    }

    fn unknown(dataset_id: &str) -> EngineError {
        EngineError::MarketDataError(format!("unknown dataset '{}'", dataset_id))
    }
}

impl Default for MarketDataStore {
    fn default() -> Self {
        Self::new()
    }
}
