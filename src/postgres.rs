//! [`Driver`] implementation for PostgreSQL on top of sqlx.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{Column, PgPool, Postgres, Row as _, TypeInfo, ValueRef};

use uuid::Uuid;

use crate::driver::{Driver, Transaction};
use crate::{DatabaseConfig, DriverError, DriverResult, Kind, Row, Statement, Value};

/// PostgreSQL driver backed by a sqlx connection pool.
#[derive(Clone, Debug)]
pub struct PgDriver {
    pool: PgPool,
}

impl PgDriver {
    /// Create a new PgDriver with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool using the given settings.
    pub async fn connect(config: &DatabaseConfig) -> DriverResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;
        tracing::debug!(max_connections = config.max_connections, "connected to postgres");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Driver for PgDriver {
    type Transaction = PgTransaction;

    async fn begin(&self) -> DriverResult<Self::Transaction> {
        let tx = self.pool.begin().await?;
        Ok(PgTransaction { inner: tx })
    }

    async fn execute(&self, statement: &Statement) -> DriverResult<u64> {
        let result = build(statement).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_optional(&self, statement: &Statement) -> DriverResult<Option<Row>> {
        let row = build(statement).fetch_optional(&self.pool).await?;
        row.as_ref().map(decode_row).transpose()
    }

    async fn fetch_all(&self, statement: &Statement) -> DriverResult<Vec<Row>> {
        let rows = build(statement).fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }
}

/// An open PostgreSQL transaction.
///
/// Dropping it without committing rolls it back (sqlx queues the rollback
/// on the connection before returning it to the pool).
#[derive(Debug)]
pub struct PgTransaction {
    inner: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn execute(&mut self, statement: &Statement) -> DriverResult<u64> {
        let result = build(statement).execute(&mut *self.inner).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_optional(&mut self, statement: &Statement) -> DriverResult<Option<Row>> {
        let row = build(statement).fetch_optional(&mut *self.inner).await?;
        row.as_ref().map(decode_row).transpose()
    }

    async fn fetch_all(&mut self, statement: &Statement) -> DriverResult<Vec<Row>> {
        let rows = build(statement).fetch_all(&mut *self.inner).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn commit(self) -> DriverResult<()> {
        self.inner.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> DriverResult<()> {
        self.inner.rollback().await?;
        Ok(())
    }
}

fn build(statement: &Statement) -> Query<'_, Postgres, PgArguments> {
    statement
        .args()
        .iter()
        .fold(sqlx::query(statement.sql()), |query, arg| match arg {
            Value::Null(kind) => bind_null(query, *kind),
            Value::Bool(v) => query.bind(*v),
            Value::Int(v) => query.bind(*v),
            Value::Float(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
            Value::Bytes(v) => query.bind(v.as_slice()),
            Value::Uuid(v) => query.bind(*v),
            Value::TimestampTz(v) => query.bind(*v),
            Value::Timestamp(v) => query.bind(*v),
            Value::Date(v) => query.bind(*v),
            Value::Json(v) => query.bind(Json(v)),
        })
}

/// Binds a NULL with the parameter type Postgres expects for `kind`.
fn bind_null(
    query: Query<'_, Postgres, PgArguments>,
    kind: Kind,
) -> Query<'_, Postgres, PgArguments> {
    match kind {
        Kind::Bool => query.bind(None::<bool>),
        Kind::Int => query.bind(None::<i64>),
        Kind::Float => query.bind(None::<f64>),
        // An unknown type is sent as text, which only text-like columns accept.
        Kind::Text | Kind::Unknown => query.bind(None::<String>),
        Kind::Bytes => query.bind(None::<Vec<u8>>),
        Kind::Uuid => query.bind(None::<Uuid>),
        Kind::TimestampTz => query.bind(None::<DateTime<Utc>>),
        Kind::Timestamp => query.bind(None::<NaiveDateTime>),
        Kind::Date => query.bind(None::<NaiveDate>),
        Kind::Json => query.bind(None::<Json<serde_json::Value>>),
    }
}

fn kind_of(type_name: &str) -> Option<Kind> {
    let kind = match type_name {
        "BOOL" => Kind::Bool,
        "INT2" | "INT4" | "INT8" => Kind::Int,
        "FLOAT4" | "FLOAT8" => Kind::Float,
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => Kind::Text,
        "BYTEA" => Kind::Bytes,
        "UUID" => Kind::Uuid,
        "TIMESTAMPTZ" => Kind::TimestampTz,
        "TIMESTAMP" => Kind::Timestamp,
        "DATE" => Kind::Date,
        "JSON" | "JSONB" => Kind::Json,
        _ => return None,
    };
    Some(kind)
}

fn decode_row(row: &PgRow) -> DriverResult<Row> {
    let mut decoded = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let type_name = column.type_info().name();
        let kind = kind_of(type_name);

        if row.try_get_raw(index)?.is_null() {
            decoded.push(column.name(), Value::Null(kind.unwrap_or(Kind::Unknown)));
            continue;
        }

        let value = match kind {
            Some(Kind::Bool) => Value::Bool(row.try_get(index)?),
            Some(Kind::Int) => match type_name {
                "INT2" => Value::Int(row.try_get::<i16, _>(index)?.into()),
                "INT4" => Value::Int(row.try_get::<i32, _>(index)?.into()),
                _ => Value::Int(row.try_get(index)?),
            },
            Some(Kind::Float) => match type_name {
                "FLOAT4" => Value::Float(row.try_get::<f32, _>(index)?.into()),
                _ => Value::Float(row.try_get(index)?),
            },
            Some(Kind::Text) => Value::Text(row.try_get(index)?),
            Some(Kind::Bytes) => Value::Bytes(row.try_get(index)?),
            Some(Kind::Uuid) => Value::Uuid(row.try_get(index)?),
            Some(Kind::TimestampTz) => Value::TimestampTz(row.try_get(index)?),
            Some(Kind::Timestamp) => Value::Timestamp(row.try_get(index)?),
            Some(Kind::Date) => Value::Date(row.try_get(index)?),
            Some(Kind::Json) => Value::Json(row.try_get(index)?),
            Some(Kind::Unknown) | None => {
                return Err(DriverError::UnsupportedType(type_name.to_owned()))
            }
        };
        decoded.push(column.name(), value);
    }
    Ok(decoded)
}
