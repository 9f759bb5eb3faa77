use async_trait::async_trait;

use crate::{DriverResult, Row, Statement};

/// The underlying connection or pool.
///
/// A driver is shared for the lifetime of the process and is never opened
/// or closed by this crate. It runs queries directly and opens transactions.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    type Transaction: Transaction;

    /// Open a new transaction.
    async fn begin(&self) -> DriverResult<Self::Transaction>;

    /// Run a statement and return the number of affected rows.
    async fn execute(&self, statement: &Statement) -> DriverResult<u64>;

    async fn fetch_optional(&self, statement: &Statement) -> DriverResult<Option<Row>>;

    async fn fetch_all(&self, statement: &Statement) -> DriverResult<Vec<Row>>;
}

/// An open transaction.
///
/// Supports the same queries as [`Driver`] plus the two finalizing
/// operations, which consume the handle. Dropping a handle that was never
/// finalized must roll the transaction back.
#[async_trait]
pub trait Transaction: Send + 'static {
    async fn execute(&mut self, statement: &Statement) -> DriverResult<u64>;

    async fn fetch_optional(&mut self, statement: &Statement) -> DriverResult<Option<Row>>;

    async fn fetch_all(&mut self, statement: &Statement) -> DriverResult<Vec<Row>>;

    async fn commit(self) -> DriverResult<()>;

    async fn rollback(self) -> DriverResult<()>;
}
