//! Resource store: identifier-keyed record collections for small CRUD services.

pub mod error;
pub mod model;
pub mod service;
pub mod settings;
pub mod state;
pub mod store;
pub mod telemetry;

pub use error::{AppError, ConfigError};
pub use model::{
    parse_status_filter, Item, ItemChanges, ItemDraft, ItemFilter, ItemPatch, NewItem, NewTask,
    Patch, Resource, Task, TaskChanges, TaskDraft, TaskFilter, TaskPatch, TaskStatus,
};
pub use service::{FieldError, ValidationErrors};
pub use settings::{Environment, Settings};
pub use state::{AppState, ServiceInfo};
pub use store::{Clock, FixedClock, ListQuery, MemoryStore, PgTaskStore, ResourceStore, SystemClock};
pub use telemetry::init_tracing;
