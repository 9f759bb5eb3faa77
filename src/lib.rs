//! Postgres Transactor
//!
//! This crate runs units of work inside database transactions. A
//! [`TransactionManager`] begins a transaction, binds a repository (or an
//! adapter aggregating several repositories) to it, runs the caller's
//! closure, and then commits or rolls back depending on its result.
//! Repositories stay agnostic of transaction plumbing: they run every query
//! through an [`Executor`] and implement [`Transactable`] to produce a copy
//! bound to an open transaction.

pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod postgres;
pub mod statement;
pub mod transactable;
pub mod transactor;
pub mod value;

pub use config::DatabaseConfig;
pub use driver::{Driver, Transaction};
pub use error::{BoxError, ConfigError, DriverError, DriverResult, TransactionError};
pub use executor::Executor;
pub use postgres::{PgDriver, PgTransaction};
pub use statement::Statement;
pub use transactable::Transactable;
pub use transactor::{TransactionManager, Transactor};
pub use value::{FromValue, Kind, Row, Typed, Value};
