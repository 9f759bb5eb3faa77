use crate::driver::Driver;
use crate::Executor;

/// Trait for resources that can be rebound to an open transaction.
///
/// A repository holds an [`Executor`] and runs all of its queries through
/// it. Binding returns a new repository whose executor targets the given
/// transaction; the original keeps targeting whatever it targeted before
/// and can still be used concurrently outside the transaction.
///
/// Adapters that aggregate several repositories implement this by binding
/// each of them to the same executor and assembling a new adapter.
pub trait Transactable<D: Driver>: Send + Sync + Sized {
    /// Returns a copy of this resource that runs its queries on `tx`.
    fn with_tx(&self, tx: &Executor<D>) -> Self;
}

impl<D: Driver> Transactable<D> for Executor<D> {
    fn with_tx(&self, tx: &Executor<D>) -> Self {
        tx.clone()
    }
}

impl<D, A, B> Transactable<D> for (A, B)
where
    D: Driver,
    A: Transactable<D>,
    B: Transactable<D>,
{
    fn with_tx(&self, tx: &Executor<D>) -> Self {
        (self.0.with_tx(tx), self.1.with_tx(tx))
    }
}

impl<D, A, B, C> Transactable<D> for (A, B, C)
where
    D: Driver,
    A: Transactable<D>,
    B: Transactable<D>,
    C: Transactable<D>,
{
    fn with_tx(&self, tx: &Executor<D>) -> Self {
        (self.0.with_tx(tx), self.1.with_tx(tx), self.2.with_tx(tx))
    }
}

impl<D: Driver, T: Transactable<D>> Transactable<D> for std::sync::Arc<T> {
    fn with_tx(&self, tx: &Executor<D>) -> Self {
        std::sync::Arc::new(T::with_tx(&**self, tx))
    }
}
