use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::schema::Collection;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection pool setup and table bootstrap for the PostgreSQL store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool against `database.url`
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config.url.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(parsed.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;

        info!(
            "Created database pool for: {}{}",
            parsed.host_str().unwrap_or("localhost"),
            parsed.path()
        );
        Ok(pool)
    }

    /// Create one JSONB document table per collection plus the unique
    /// expression indexes its schema declares
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        for collection in Collection::ALL {
            for statement in Self::schema_statements(collection) {
                sqlx::query(&statement).execute(pool).await?;
            }
        }
        info!("Document tables ready");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    fn schema_statements(collection: Collection) -> Vec<String> {
        let table = collection.table_name();
        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS {} (id UUID PRIMARY KEY, doc JSONB NOT NULL, created_at TIMESTAMPTZ NOT NULL DEFAULT now())",
            Self::quote_identifier(table)
        )];
        for fields in collection.schema().unique {
            let index = format!("{}_{}_key", table, fields.join("_"));
            let columns = fields
                .iter()
                .map(|f| format!("(doc ->> '{}')", f))
                .collect::<Vec<_>>()
                .join(", ");
            statements.push(format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
                Self::quote_identifier(&index),
                Self::quote_identifier(table),
                columns
            ));
        }
        statements
    }

    /// Quote SQL identifier to prevent injection
    fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_table_and_unique_indexes() {
        let statements = DatabaseManager::schema_statements(Collection::Reviews);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS \"reviews\""));
        assert_eq!(
            statements[1],
            "CREATE UNIQUE INDEX IF NOT EXISTS \"reviews_bootcamp_user_key\" ON \"reviews\" ((doc ->> 'bootcamp'), (doc ->> 'user'))"
        );
    }

    #[test]
    fn courses_have_no_unique_index() {
        assert_eq!(DatabaseManager::schema_statements(Collection::Courses).len(), 1);
    }

    #[tokio::test]
    async fn rejects_non_postgres_urls() {
        let config = DatabaseConfig {
            url: Some("mysql://localhost/devcamper".to_string()),
            max_connections: 1,
        };
        assert!(matches!(
            DatabaseManager::connect(&config).await,
            Err(DatabaseError::InvalidDatabaseUrl)
        ));
    }
}
