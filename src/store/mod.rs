//! Record stores: the `ResourceStore` contract and its in-memory and
//! PostgreSQL implementations.

mod clock;
mod memory;
mod postgres;

pub use clock::{Clock, FixedClock, SystemClock};
pub use memory::MemoryStore;
pub use postgres::PgTaskStore;

use crate::error::AppError;
use crate::model::Resource;
use async_trait::async_trait;

/// Filter and window for [`ResourceStore::list`].
#[derive(Clone, Debug)]
pub struct ListQuery<F> {
    pub filter: Option<F>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl<F> Default for ListQuery<F> {
    fn default() -> Self {
        ListQuery {
            filter: None,
            offset: 0,
            limit: None,
        }
    }
}

impl<F> ListQuery<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Option<F>) -> Self {
        self.filter = filter;
        self
    }

    pub fn skip(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn take(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Requested limit, or `default` when none was given. `None` means no
    /// window: every match after `offset` is returned.
    pub fn effective_limit(&self, default: Option<usize>) -> Option<usize> {
        self.limit.or(default)
    }
}

/// Identifier-keyed collection of one record kind.
///
/// Every operation is atomic with respect to the store: ids are never handed
/// out twice and no caller observes a half-applied write.
#[async_trait]
pub trait ResourceStore<R: Resource>: Send + Sync {
    /// Insert a record under a new, never reused id.
    async fn create(&self, fields: R::Create) -> Result<R, AppError>;

    async fn get(&self, id: i64) -> Result<R, AppError>;

    /// Matching records in insertion order, windowed by offset and limit.
    async fn list(&self, query: ListQuery<R::Filter>) -> Result<Vec<R>, AppError>;

    /// Merge `patch` into the record and return the result.
    async fn update(&self, id: i64, patch: R::Patch) -> Result<R, AppError>;

    /// Remove the record for good. Deleting an id twice fails the second time.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_limit_falls_back_to_default() {
        let q: ListQuery<()> = ListQuery::new();
        assert_eq!(q.effective_limit(Some(10)), Some(10));
        assert_eq!(q.effective_limit(None), None);
        assert_eq!(q.clone().take(3).effective_limit(Some(10)), Some(3));
        assert_eq!(q.clone().take(3).effective_limit(None), Some(3));
        assert_eq!(q.take(50_000).effective_limit(Some(10)), Some(50_000));
    }
}
