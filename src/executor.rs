use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::driver::{Driver, Transaction};
use crate::{DriverError, DriverResult, Row, Statement};

type SharedTransaction<D> = Arc<Mutex<Option<<D as Driver>::Transaction>>>;

enum Target<D: Driver> {
    Plain(Arc<D>),
    Transaction(SharedTransaction<D>),
}

/// Executor is the query target held by repositories.
///
/// It points either at the plain driver or at one open transaction. The
/// transaction is shared behind a mutex so that every repository bound to
/// it within a unit of work runs its queries on the same handle. The query
/// methods behave the same for both targets, so repository code never
/// needs to know whether it is running inside a transaction.
pub struct Executor<D: Driver> {
    target: Target<D>,
}

impl<D: Driver> Executor<D> {
    /// Creates an Executor that runs queries directly on the driver.
    pub fn new(driver: Arc<D>) -> Self {
        Self {
            target: Target::Plain(driver),
        }
    }

    pub(crate) fn for_transaction(tx: D::Transaction) -> Self {
        Self {
            target: Target::Transaction(Arc::new(Mutex::new(Some(tx)))),
        }
    }

    pub fn is_transactional(&self) -> bool {
        matches!(self.target, Target::Transaction(_))
    }

    /// Whether both executors run their queries on the same driver or
    /// transaction handle.
    pub fn same_target(&self, other: &Self) -> bool {
        match (&self.target, &other.target) {
            (Target::Plain(a), Target::Plain(b)) => Arc::ptr_eq(a, b),
            (Target::Transaction(a), Target::Transaction(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub async fn execute(&self, statement: &Statement) -> DriverResult<u64> {
        match &self.target {
            Target::Plain(driver) => driver.execute(statement).await,
            Target::Transaction(slot) => {
                let mut tx_guard = slot.lock().await;
                let tx = tx_guard.as_mut().ok_or(DriverError::Finalized)?;
                tx.execute(statement).await
            }
        }
    }

    pub async fn fetch_optional(&self, statement: &Statement) -> DriverResult<Option<Row>> {
        match &self.target {
            Target::Plain(driver) => driver.fetch_optional(statement).await,
            Target::Transaction(slot) => {
                let mut tx_guard = slot.lock().await;
                let tx = tx_guard.as_mut().ok_or(DriverError::Finalized)?;
                tx.fetch_optional(statement).await
            }
        }
    }

    /// Fetches exactly one row, failing with [`DriverError::RowNotFound`]
    /// when the query returns none.
    pub async fn fetch_one(&self, statement: &Statement) -> DriverResult<Row> {
        self.fetch_optional(statement)
            .await?
            .ok_or(DriverError::RowNotFound)
    }

    pub async fn fetch_all(&self, statement: &Statement) -> DriverResult<Vec<Row>> {
        match &self.target {
            Target::Plain(driver) => driver.fetch_all(statement).await,
            Target::Transaction(slot) => {
                let mut tx_guard = slot.lock().await;
                let tx = tx_guard.as_mut().ok_or(DriverError::Finalized)?;
                tx.fetch_all(statement).await
            }
        }
    }

    /// Takes ownership of the transaction, leaving None in its place.
    /// This should only be called when committing or rolling back.
    pub(crate) async fn take_transaction(&self) -> DriverResult<D::Transaction> {
        match &self.target {
            Target::Transaction(slot) => slot.lock().await.take().ok_or(DriverError::Finalized),
            Target::Plain(_) => Err(DriverError::Finalized),
        }
    }

    /// Drops the transaction if it is still open and not in use, which
    /// rolls it back. Returns whether a handle was discarded.
    pub(crate) fn discard(&self) -> bool {
        match &self.target {
            Target::Transaction(slot) => match slot.try_lock() {
                Ok(mut tx_guard) => tx_guard.take().is_some(),
                Err(_) => false,
            },
            Target::Plain(_) => false,
        }
    }
}

impl<D: Driver> Clone for Executor<D> {
    fn clone(&self) -> Self {
        let target = match &self.target {
            Target::Plain(driver) => Target::Plain(Arc::clone(driver)),
            Target::Transaction(slot) => Target::Transaction(Arc::clone(slot)),
        };
        Self { target }
    }
}

impl<D: Driver> fmt::Debug for Executor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match self.target {
            Target::Plain(_) => "plain",
            Target::Transaction(_) => "transaction",
        };
        f.debug_struct("Executor").field("target", &target).finish()
    }
}
