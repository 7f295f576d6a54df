use std::env;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the process environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub sql_logging: bool,
    pub environment: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(value) => value.parse::<u32>().map_err(|_| ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                value,
            })?,
            Err(_) => 10,
        };

        let sql_logging = env::var("DATABASE_SQL_LOGGING")
            .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Self {
            database_url,
            max_connections,
            sql_logging,
            environment,
        })
    }

    pub async fn connect(&self) -> Result<DatabaseConnection, DbErr> {
        let mut options = ConnectOptions::new(self.database_url.clone());
        options
            .max_connections(self.max_connections)
            .connect_timeout(Duration::from_secs(8))
            .sqlx_logging(self.sql_logging);

        info!("Connecting to database...");
        let db = Database::connect(options).await?;
        info!("Database connected successfully");
        Ok(db)
    }
}
