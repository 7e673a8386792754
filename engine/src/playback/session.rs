//! Playback cursor management over a base tick series.

use shared::models::{Candle, TimeFrame};

use super::{aggregate_up_to_index, ticks_per_bar};

/// Steps through a base series, exposing the bars that exist at the cursor.
///
/// The cursor is an index into the base series; `None` means playback has
/// not consumed any tick yet.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    base: Vec<Candle>,
    base_timeframe: TimeFrame,
    cursor: Option<usize>,
}

impl PlaybackSession {
    pub fn new(base: Vec<Candle>, base_timeframe: TimeFrame) -> Self {
        Self { base, base_timeframe, cursor: None }
    }

    /// Restores a session at a previously persisted cursor (clamped to the data).
    pub fn with_cursor(base: Vec<Candle>, base_timeframe: TimeFrame, cursor: Option<usize>) -> Self {
        let mut session = Self::new(base, base_timeframe);
        if let Some(index) = cursor {
            session.seek(index);
        }
        session
    }

    pub fn base(&self) -> &[Candle] {
        &self.base
    }

    pub fn base_timeframe(&self) -> TimeFrame {
        self.base_timeframe
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        !self.base.is_empty() && self.cursor == Some(self.base.len() - 1)
    }

    /// Time of the most recently consumed tick.
    pub fn current_time(&self) -> Option<i64> {
        self.cursor.and_then(|i| self.base.get(i)).map(|c| c.time)
    }

    pub fn reset(&mut self) {
        self.cursor = None;
    }

    /// Moves the cursor to `index`, clamped to the last tick.
    pub fn seek(&mut self, index: usize) {
        if self.base.is_empty() {
            self.cursor = None;
            return;
        }
        self.cursor = Some(index.min(self.base.len() - 1));
    }

    /// Places the cursor on the last tick at or before `timestamp`.
    pub fn seek_time(&mut self, timestamp: i64) {
        let after = self.base.partition_point(|c| c.time <= timestamp);
        self.cursor = after.checked_sub(1);
    }

    /// Consumes `steps` more ticks. Returns whether the cursor moved.
    pub fn step_forward(&mut self, steps: usize) -> bool {
        if self.base.is_empty() || steps == 0 || self.is_finished() {
            return false;
        }
        let last = self.base.len() - 1;
        let next = match self.cursor {
            None => steps - 1,
            Some(i) => i.saturating_add(steps),
        };
        self.cursor = Some(next.min(last));
        true
    }

    /// Un-consumes `steps` ticks, stopping at the first tick.
    pub fn step_backward(&mut self, steps: usize) -> bool {
        match self.cursor {
            Some(i) if i > 0 && steps > 0 => {
                self.cursor = Some(i.saturating_sub(steps));
                true
            }
            _ => false,
        }
    }

    /// Advances by one whole bar of `target`.
    pub fn step_bar(&mut self, target: TimeFrame) -> bool {
        self.step_forward(ticks_per_bar(self.base_timeframe, target))
    }

    /// Bars of `target` that exist at the cursor, the last one possibly forming.
    pub fn bars(&self, target: TimeFrame) -> Vec<Candle> {
        aggregate_up_to_index(&self.base, self.base_timeframe, target, self.cursor)
    }

    pub fn forming_bar(&self, target: TimeFrame) -> Option<Candle> {
        self.bars(target).pop()
    }
}
