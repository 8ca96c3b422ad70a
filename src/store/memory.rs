//! In-process store. Records live for the lifetime of the value.

use super::{Clock, ListQuery, ResourceStore, SystemClock};
use crate::error::AppError;
use crate::model::Resource;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Table<R> {
    next_id: i64,
    /// Ids only grow, so key order is insertion order.
    records: BTreeMap<i64, R>,
}

/// Counter and index share one lock; `create` bumps the counter and inserts
/// under the same write guard.
pub struct MemoryStore<R> {
    table: RwLock<Table<R>>,
    clock: Arc<dyn Clock>,
}

impl<R: Resource> MemoryStore<R> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        MemoryStore {
            table: RwLock::new(Table {
                next_id: 1,
                records: BTreeMap::new(),
            }),
            clock,
        }
    }

    /// Number of live records.
    pub async fn len(&self) -> usize {
        self.table.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<R: Resource> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Resource> ResourceStore<R> for MemoryStore<R> {
    async fn create(&self, fields: R::Create) -> Result<R, AppError> {
        let now = self.clock.now();
        let mut table = self.table.write().await;
        let id = table.next_id;
        table.next_id += 1;
        let record = R::build(id, fields, now);
        table.records.insert(id, record.clone());
        tracing::debug!(kind = R::KIND, id, "created");
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<R, AppError> {
        let table = self.table.read().await;
        table
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(R::KIND, id))
    }

    async fn list(&self, query: ListQuery<R::Filter>) -> Result<Vec<R>, AppError> {
        let limit = query.effective_limit(R::DEFAULT_LIMIT);
        let table = self.table.read().await;
        let rows: Vec<R> = table
            .records
            .values()
            .filter(|r| query.filter.as_ref().map_or(true, |f| r.matches(f)))
            .skip(query.offset)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        tracing::debug!(
            kind = R::KIND,
            offset = query.offset,
            limit = ?limit,
            count = rows.len(),
            "listed"
        );
        Ok(rows)
    }

    async fn update(&self, id: i64, patch: R::Patch) -> Result<R, AppError> {
        let now = self.clock.now();
        let mut table = self.table.write().await;
        let stored = table
            .records
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(R::KIND, id))?;
        let mut next = stored.clone();
        next.apply_patch(patch, now);
        *stored = next.clone();
        tracing::debug!(kind = R::KIND, id, "updated");
        Ok(next)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut table = self.table.write().await;
        match table.records.remove(&id) {
            Some(_) => {
                tracing::debug!(kind = R::KIND, id, "deleted");
                Ok(())
            }
            None => Err(AppError::not_found(R::KIND, id)),
        }
    }
}
