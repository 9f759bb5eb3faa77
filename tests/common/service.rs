use postgres_transactor::{Driver, DriverError, TransactionError, Transactor};

use super::entities::{Order, User};
use super::repositories::Adapter;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("create user: {0}")]
    CreateUser(#[source] DriverError),

    #[error("create order: {0}")]
    CreateOrder(#[source] DriverError),
}

/// Creates a user and their first order atomically.
pub async fn register<D, X>(
    transactor: &X,
    user: User,
    order: Order,
) -> Result<(), TransactionError<ServiceError>>
where
    D: Driver,
    X: Transactor<Adapter<D>>,
{
    transactor
        .in_tx(move |repo| async move {
            repo.create_user(&user)
                .await
                .map_err(ServiceError::CreateUser)?;
            repo.create_order(&order)
                .await
                .map_err(ServiceError::CreateOrder)?;
            Ok::<(), ServiceError>(())
        })
        .await
}
