use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::driver::{Driver, Transaction};
use crate::{Executor, Transactable, TransactionError};

/// Runs units of work inside a transaction.
///
/// Services depend on this trait rather than on [`TransactionManager`] so
/// they can be driven by a test double that simply hands them a resource.
#[async_trait]
pub trait Transactor<R: Send>: Send + Sync {
    /// Run `f` against a resource bound to a fresh transaction.
    ///
    /// The transaction is committed when `f` succeeds and rolled back when
    /// it fails. Failures are labelled with the stage that produced them.
    async fn in_tx<F, Fut, T, E>(&self, f: F) -> Result<T, TransactionError<E>>
    where
        F: FnOnce(R) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Send;
}

/// Default implementation of [`Transactor`] on top of a [`Driver`].
///
/// Holds the shared driver and an unbound resource. Each call binds a new
/// copy of the resource to its own transaction; the manager itself keeps
/// no per-call state, so one instance can serve concurrent callers.
pub struct TransactionManager<D: Driver, R> {
    driver: Arc<D>,
    resource: R,
}

impl<D: Driver, R: Transactable<D>> TransactionManager<D, R> {
    /// Create a new TransactionManager over the given driver and resource.
    pub fn new(driver: Arc<D>, resource: R) -> Self {
        Self { driver, resource }
    }

    /// The shared driver transactions are opened on.
    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    /// The unbound resource, for work that does not need a transaction.
    pub fn resource(&self) -> &R {
        &self.resource
    }
}

#[async_trait]
impl<D, R> Transactor<R> for TransactionManager<D, R>
where
    D: Driver,
    R: Transactable<D>,
{
    async fn in_tx<F, Fut, T, E>(&self, f: F) -> Result<T, TransactionError<E>>
    where
        F: FnOnce(R) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Send,
    {
        let tx = self.driver.begin().await.map_err(TransactionError::Begin)?;
        tracing::debug!("transaction started");

        let executor = Executor::<D>::for_transaction(tx);
        let _guard = RollbackGuard {
            executor: &executor,
        };

        match f(self.resource.with_tx(&executor)).await {
            Ok(value) => {
                let tx = executor
                    .take_transaction()
                    .await
                    .map_err(TransactionError::Commit)?;
                tx.commit().await.map_err(TransactionError::Commit)?;
                tracing::debug!("transaction committed");
                Ok(value)
            }
            Err(source) => {
                let rollback = match executor.take_transaction().await {
                    Ok(tx) => tx.rollback().await.err(),
                    Err(err) => Some(err),
                };
                match &rollback {
                    Some(err) => tracing::warn!(
                        error = %err,
                        "rollback after failed unit of work did not complete"
                    ),
                    None => tracing::debug!("transaction rolled back"),
                }
                Err(TransactionError::Callback { source, rollback })
            }
        }
    }
}

/// Releases the transaction on exit paths that skip explicit finalization,
/// such as a panicking unit of work or a caller dropping the future.
/// A no-op once the transaction was committed or rolled back.
struct RollbackGuard<'a, D: Driver> {
    executor: &'a Executor<D>,
}

impl<D: Driver> Drop for RollbackGuard<'_, D> {
    fn drop(&mut self) {
        if self.executor.discard() {
            tracing::debug!("transaction dropped before finalization, rolling back");
        }
    }
}
