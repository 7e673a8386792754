//! Versioned state container shared between the engine and its observers.
//!
//! Every mutation builds a complete new value and publishes it in one step,
//! so subscribers only ever see whole versions.

use shared::{Drawing, DrawingId};
use std::sync::Arc;
use tokio::sync::watch;

use crate::annotation::ActiveTool;

pub struct Store<T> {
    tx: Arc<watch::Sender<Arc<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self { tx: Arc::clone(&self.tx) }
    }
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Store<T> {
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(value));
        Self { tx: Arc::new(tx) }
    }

    /// The current version.
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn set(&self, value: T) {
        self.tx.send_replace(Arc::new(value));
    }

    /// Publishes the value `f` derives from the current version.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.get());
        self.set(next);
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

impl<T: Clone> Store<T> {
    /// Clones the current version, lets `f` edit the copy, then publishes it.
    pub fn modify<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let mut next = T::clone(&self.get());
        f(&mut next);
        self.set(next);
    }
}

/// Per-dataset state the rendering layer observes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    pub dataset_id: Option<String>,
    pub drawings: Vec<Drawing>,
    pub selected: Option<DrawingId>,
    pub active_tool: ActiveTool,
    pub playback_cursor: Option<usize>,
}

impl Workspace {
    pub fn drawing(&self, id: DrawingId) -> Option<&Drawing> {
        self.drawings.iter().find(|d| d.id() == id)
    }

    pub fn selected_drawing(&self) -> Option<&Drawing> {
        self.selected.and_then(|id| self.drawing(id))
    }

    /// Replaces the drawing with the same id; returns whether one was found.
    pub fn replace_drawing(&mut self, drawing: Drawing) -> bool {
        match self.drawings.iter_mut().find(|d| d.id() == drawing.id()) {
            Some(slot) => {
                *slot = drawing;
                true
            }
            None => false,
        }
    }
}
