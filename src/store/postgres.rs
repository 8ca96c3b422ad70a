//! Task store on PostgreSQL. Ids come from a `BIGSERIAL` key; every write
//! runs in its own transaction.

use super::{Clock, ListQuery, ResourceStore, SystemClock};
use crate::error::AppError;
use crate::model::{NewTask, Resource, Task, TaskFilter, TaskPatch, TaskStatus};
use crate::settings::validate_table_name;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use std::sync::Arc;

const COLUMNS: &str = "id, title, description, status, created_at, updated_at";

impl<'r> FromRow<'r, PgRow> for Task {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = TaskStatus::ALL
            .into_iter()
            .find(|s| s.as_str() == status)
            .ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "status".into(),
                source: format!("unknown task status {:?}", status).into(),
            })?;
        Ok(Task {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
    table: String,
    clock: Arc<dyn Clock>,
    echo_sql: bool,
}

impl PgTaskStore {
    /// `table` may be schema-qualified (`app.tasks`).
    pub fn new(pool: PgPool, table: &str) -> Result<Self, AppError> {
        let table = validate_table_name("TASKS_TABLE", table)?;
        Ok(PgTaskStore {
            pool,
            table,
            clock: Arc::new(SystemClock),
            echo_sql: false,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Log every statement at info level instead of debug.
    pub fn echo_sql(mut self, on: bool) -> Self {
        self.echo_sql = on;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the table if missing.
    pub async fn ensure_table(&self) -> Result<(), AppError> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                title VARCHAR(200) NOT NULL,
                description VARCHAR(1000),
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
            self.table
        );
        self.log_sql(&ddl);
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn drop_table(&self) -> Result<(), AppError> {
        let sql = format!("DROP TABLE IF EXISTS {}", self.table);
        self.log_sql(&sql);
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    fn log_sql(&self, sql: &str) {
        if self.echo_sql {
            tracing::info!(sql = %sql, "query");
        } else {
            tracing::debug!(sql = %sql, "query");
        }
    }
}

#[async_trait]
impl ResourceStore<Task> for PgTaskStore {
    async fn create(&self, fields: NewTask) -> Result<Task, AppError> {
        // id is a placeholder; the database assigns the real one
        let draft = Task::build(0, fields, self.clock.now());
        let sql = format!(
            "INSERT INTO {} (title, description, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            self.table, COLUMNS
        );
        self.log_sql(&sql);
        let mut tx = self.pool.begin().await?;
        let task: Task = sqlx::query_as(&sql)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.status.as_str())
            .bind(draft.created_at)
            .bind(draft.updated_at)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::debug!(kind = Task::KIND, id = task.id, "created");
        Ok(task)
    }

    async fn get(&self, id: i64) -> Result<Task, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, self.table);
        self.log_sql(&sql);
        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found(Task::KIND, id))
    }

    async fn list(&self, query: ListQuery<TaskFilter>) -> Result<Vec<Task>, AppError> {
        let limit = query.effective_limit(Task::DEFAULT_LIMIT);
        let status = query.filter.map(|TaskFilter::Status(s)| s);
        let sql = match status {
            Some(_) => format!(
                "SELECT {} FROM {} WHERE status = $1 ORDER BY id LIMIT $2 OFFSET $3",
                COLUMNS, self.table
            ),
            None => format!(
                "SELECT {} FROM {} ORDER BY id LIMIT $1 OFFSET $2",
                COLUMNS, self.table
            ),
        };
        self.log_sql(&sql);
        let mut q = sqlx::query_as::<_, Task>(&sql);
        if let Some(status) = status {
            q = q.bind(status.as_str());
        }
        // `LIMIT NULL` is `LIMIT ALL`; windows past i64 saturate rather than wrap.
        let limit = limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX));
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);
        let rows = q
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update(&self, id: i64, patch: TaskPatch) -> Result<Task, AppError> {
        let select = format!("SELECT {} FROM {} WHERE id = $1 FOR UPDATE", COLUMNS, self.table);
        let write = format!(
            "UPDATE {} SET title = $2, description = $3, status = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {}",
            self.table, COLUMNS
        );
        let mut tx = self.pool.begin().await?;
        self.log_sql(&select);
        // dropping `tx` on any early return rolls it back
        let mut task: Task = sqlx::query_as(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(Task::KIND, id))?;
        task.apply_patch(patch, self.clock.now());
        self.log_sql(&write);
        let task: Task = sqlx::query_as(&write)
            .bind(id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status.as_str())
            .bind(task.updated_at)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::debug!(kind = Task::KIND, id, "updated");
        Ok(task)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        self.log_sql(&sql);
        let done = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if done.rows_affected() == 0 {
            return Err(AppError::not_found(Task::KIND, id));
        }
        tracing::debug!(kind = Task::KIND, id, "deleted");
        Ok(())
    }
}
