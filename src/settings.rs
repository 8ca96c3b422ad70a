//! Runtime settings from environment variables (and `.env`, when present).

use crate::error::ConfigError;
use regex::Regex;
use std::str::FromStr;

pub const DEFAULT_TASKS_TABLE: &str = "tasks";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::Invalid {
                key: "ENVIRONMENT",
                value: s.to_string(),
                reason: "expected development, test or production".into(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// PostgreSQL URL for the task store. Unset keeps tasks in memory.
    pub database_url: Option<String>,
    pub environment: Environment,
    /// Possibly schema-qualified table holding tasks.
    pub tasks_table: String,
    pub max_connections: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: None,
            environment: Environment::default(),
            tasks_table: DEFAULT_TASKS_TABLE.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Settings {
    /// Read `DATABASE_URL`, `ENVIRONMENT`, `TASKS_TABLE` and `DB_MAX_CONNECTIONS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match get("ENVIRONMENT") {
            Some(v) => v.parse()?,
            None => Environment::default(),
        };
        let tasks_table = match get("TASKS_TABLE") {
            Some(v) => validate_table_name("TASKS_TABLE", &v)?,
            None => DEFAULT_TASKS_TABLE.into(),
        };
        let max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "DB_MAX_CONNECTIONS",
                    value: v.clone(),
                    reason: "expected a positive integer".into(),
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Settings {
            database_url: get("DATABASE_URL"),
            environment,
            tasks_table,
            max_connections,
        })
    }

    /// SQL is echoed at info level in development.
    pub fn echo_sql(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn default_log_filter(&self) -> &'static str {
        match self.environment {
            Environment::Development => "resource_store=debug",
            Environment::Test | Environment::Production => "resource_store=info",
        }
    }
}

/// Accept `table` or `schema.table` made of plain PostgreSQL identifiers, so
/// the name can be spliced into SQL unquoted.
pub fn validate_table_name(key: &'static str, name: &str) -> Result<String, ConfigError> {
    const PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]{0,62}(\.[A-Za-z_][A-Za-z0-9_]{0,62})?$";
    let re = Regex::new(PATTERN).map_err(|e| {
        ConfigError::Invalid {
            key,
            value: name.to_string(),
            reason: e.to_string(),
        }
    })?;
    if re.is_match(name) {
        Ok(name.to_string())
    } else {
        Err(ConfigError::Invalid {
            key,
            value: name.to_string(),
            reason: "expected an identifier, optionally schema-qualified".into(),
        })
    }
}
