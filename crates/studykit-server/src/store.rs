//! Learning content storage
//!
//! Records live in process memory. Ids come from a counter starting at 1 and
//! are never reused.

use crate::error::Result;
use crate::model::{LearningContent, Materials, NewContent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert a record without materials and return it
    async fn create(&self, content: NewContent) -> Result<LearningContent>;

    async fn get(&self, id: u64) -> Result<Option<LearningContent>>;

    /// Attach generated materials; `None` when the id is unknown
    async fn attach_materials(
        &self,
        id: u64,
        materials: Materials,
    ) -> Result<Option<LearningContent>>;
}

/// In-memory store
pub struct MemStore {
    records: RwLock<HashMap<u64, LearningContent>>,
    next_id: AtomicU64,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ContentStore for MemStore {
    async fn create(&self, content: NewContent) -> Result<LearningContent> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = LearningContent::new(id, content);
        self.records.write().await.insert(id, record.clone());
        debug!(id, content_type = %record.content_type, "Stored content");
        Ok(record)
    }

    async fn get(&self, id: u64) -> Result<Option<LearningContent>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn attach_materials(
        &self,
        id: u64,
        materials: Materials,
    ) -> Result<Option<LearningContent>> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(&id).map(|record| {
            record.attach(materials);
            record.clone()
        }))
    }
}
