use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::common::errors::Result;
use crate::common::traits::StateStore;
use crate::common::types::{HistoryPoint, PositionRecord};

/// Simple in-memory store, lost on restart
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    record: RwLock<PositionRecord>,
    history: RwLock<Vec<HistoryPoint>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record
    pub fn with_position(record: PositionRecord) -> Self {
        Self {
            record: RwLock::new(record),
            history: RwLock::default(),
        }
    }

    pub async fn history(&self) -> Vec<HistoryPoint> {
        self.history.read().await.clone()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load_position(&self) -> Result<PositionRecord> {
        Ok(*self.record.read().await)
    }

    async fn save_position(&self, record: &PositionRecord) -> Result<()> {
        *self.record.write().await = *record;
        Ok(())
    }

    async fn record_history(&self, point: &HistoryPoint) -> Result<()> {
        self.history.write().await.push(*point);
        Ok(())
    }
}
