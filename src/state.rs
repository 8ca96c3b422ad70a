//! Shared application state: one store handle per record kind.

use crate::error::AppError;
use crate::model::{Item, Task};
use crate::settings::{Environment, Settings};
use crate::store::{MemoryStore, PgTaskStore, ResourceStore};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Items are always held in memory.
    pub items: Arc<dyn ResourceStore<Item>>,
    pub tasks: Arc<dyn ResourceStore<Task>>,
    pub environment: Environment,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

impl AppState {
    pub fn in_memory() -> Self {
        AppState {
            items: Arc::new(MemoryStore::<Item>::new()),
            tasks: Arc::new(MemoryStore::<Task>::new()),
            environment: Environment::default(),
        }
    }

    /// Connect the task store to PostgreSQL when `database_url` is set and
    /// create its table; otherwise fall back to memory.
    pub async fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let tasks: Arc<dyn ResourceStore<Task>> = match &settings.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .connect(url)
                    .await?;
                let store = PgTaskStore::new(pool, &settings.tasks_table)?
                    .echo_sql(settings.echo_sql());
                store.ensure_table().await?;
                tracing::info!(table = %store.table(), "task store on postgres");
                Arc::new(store)
            }
            None => {
                tracing::warn!("DATABASE_URL not set; tasks are kept in memory");
                Arc::new(MemoryStore::<Task>::new())
            }
        };
        Ok(AppState {
            items: Arc::new(MemoryStore::<Item>::new()),
            tasks,
            environment: settings.environment,
        })
    }

    pub fn info(&self) -> ServiceInfo {
        ServiceInfo {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            status: "operational",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewTask, TaskStatus};
    use crate::store::ListQuery;

    #[tokio::test]
    async fn falls_back_to_memory_without_database_url() {
        let settings = Settings {
            environment: Environment::Test,
            ..Settings::default()
        };
        let state = AppState::from_settings(&settings).await.unwrap();
        assert_eq!(state.environment, Environment::Test);

        let task = state
            .tasks
            .create(NewTask {
                title: "Write report".into(),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(state.tasks.list(ListQuery::new()).await.unwrap(), vec![task]);
        assert!(state.items.list(ListQuery::new()).await.unwrap().is_empty());
    }

    #[test]
    fn info_reports_package() {
        let info = AppState::in_memory().info();
        assert_eq!(info.name, "resource-store");
        assert_eq!(info.status, "operational");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }
}
