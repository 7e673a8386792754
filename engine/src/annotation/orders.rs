//! Read-only view of the order collaborator, used for the lock relation.

use serde::{Deserialize, Serialize};
use shared::DrawingId;
use std::collections::HashSet;

use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Resting, not yet filled.
    Pending,
    /// Filled and still open.
    Active,
    Closed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    #[serde(default)]
    pub drawing_id: Option<DrawingId>,
    pub status: OrderStatus,
}

impl OrderRecord {
    pub fn is_live(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Active)
    }
}

/// Anything that can list the current orders.
pub trait OrderSource: Send + Sync {
    fn orders(&self) -> Vec<OrderRecord>;

    /// Drawings referenced by a live order.
    fn locked_drawings(&self) -> HashSet<DrawingId> {
        self.orders()
            .into_iter()
            .filter(OrderRecord::is_live)
            .filter_map(|order| order.drawing_id)
            .collect()
    }
}

impl OrderSource for Store<Vec<OrderRecord>> {
    fn orders(&self) -> Vec<OrderRecord> {
        self.get().as_ref().clone()
    }
}

/// An order source that never has orders.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOrders;

impl OrderSource for NoOrders {
    fn orders(&self) -> Vec<OrderRecord> {
        Vec::new()
    }
}
