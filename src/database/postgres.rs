use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use tracing::error;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::schema::Collection;
use crate::database::store::{document_id, Document, DocumentStore, StoreError};
use crate::filter::{Filter, SqlParam};

const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL document store: one `(id, doc JSONB, created_at)` table per
/// collection, queried through SQL rendered by `Filter`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Text(s) => query.bind(s.clone()),
            SqlParam::Number(n) => query.bind(*n),
            SqlParam::Bool(b) => query.bind(*b),
            SqlParam::Timestamp(t) => query.bind(*t),
            SqlParam::TextArray(v) => query.bind(v.clone()),
            SqlParam::NumberArray(v) => query.bind(v.clone()),
        };
    }
    query
}

fn row_document(row: &PgRow) -> Result<Document, StoreError> {
    match row.try_get::<Value, _>("doc")? {
        Value::Object(doc) => Ok(doc),
        other => Err(StoreError::Backend(format!("stored document is not an object: {}", other))),
    }
}

fn created_at(doc: &Document) -> DateTime<Utc> {
    doc.get("createdAt")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => StoreError::Duplicate,
        _ => {
            error!("Document write failed: {}", err);
            StoreError::Sqlx(err)
        }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find(&self, _collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let sql = filter.to_sql()?;
        let rows = bind_params(sqlx::query(&sql.query), &sql.params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_document).collect()
    }

    async fn count(&self, _collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let sql = filter.to_count_sql()?;
        let row = bind_params(sqlx::query(&sql.query), &sql.params)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError> {
        let query = format!("SELECT doc FROM \"{}\" WHERE id = $1", collection.table_name());
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_document).transpose()
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<Document, StoreError> {
        let id = document_id(&doc)?;
        let query = format!(
            "INSERT INTO \"{}\" (id, doc, created_at) VALUES ($1, $2, $3)",
            collection.table_name()
        );
        sqlx::query(&query)
            .bind(id)
            .bind(Value::Object(doc.clone()))
            .bind(created_at(&doc))
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(doc)
    }

    async fn replace(&self, collection: Collection, doc: Document) -> Result<Document, StoreError> {
        let id = document_id(&doc)?;
        let query = format!("UPDATE \"{}\" SET doc = $2 WHERE id = $1", collection.table_name());
        let result = sqlx::query(&query)
            .bind(id)
            .bind(Value::Object(doc.clone()))
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { collection: collection.label(), id });
        }
        Ok(doc)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError> {
        let query = format!("DELETE FROM \"{}\" WHERE id = $1", collection.table_name());
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, _collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let sql = filter.to_delete_sql()?;
        let result = bind_params(sqlx::query(&sql.query), &sql.params)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}
