/// Boxed error used by drivers that are not backed by sqlx.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for driver and executor operations
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Transaction already finalized")]
    Finalized,

    #[error("No row returned by a query that expected one")]
    RowNotFound,

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column index {index} out of bounds (row has {len} columns)")]
    ColumnIndexOutOfBounds { index: usize, len: usize },

    #[error("Column {column} holds {found}, expected {expected}")]
    Decode {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unsupported column type: {0}")]
    UnsupportedType(String),

    #[error("{0}")]
    Other(BoxError),
}

impl DriverError {
    /// Wraps an arbitrary driver failure.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }
}

/// Result type for driver and executor operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Failure of a transactional run, labelled with the stage that failed.
///
/// `E` is the error type of the unit of work. For the callback stage the
/// original error stays reachable through [`std::error::Error::source`] and
/// [`TransactionError::callback_error`].
#[derive(Debug, thiserror::Error)]
pub enum TransactionError<E> {
    #[error("begin tx: {0}")]
    Begin(#[source] DriverError),

    #[error("callback: {source}")]
    Callback {
        #[source]
        source: E,
        /// Set when the rollback issued after the failure did not complete.
        rollback: Option<DriverError>,
    },

    #[error("commit tx: {0}")]
    Commit(#[source] DriverError),
}

impl<E> TransactionError<E> {
    pub fn is_begin(&self) -> bool {
        matches!(self, Self::Begin(_))
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, Self::Callback { .. })
    }

    pub fn is_commit(&self) -> bool {
        matches!(self, Self::Commit(_))
    }

    /// The error returned by the unit of work, if that is what failed.
    pub fn callback_error(&self) -> Option<&E> {
        match self {
            Self::Callback { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn into_callback_error(self) -> Option<E> {
        match self {
            Self::Callback { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The rollback failure that followed a failed unit of work.
    pub fn rollback_error(&self) -> Option<&DriverError> {
        match self {
            Self::Callback { rollback, .. } => rollback.as_ref(),
            _ => None,
        }
    }

    /// The driver failure behind a begin or commit error.
    pub fn driver_error(&self) -> Option<&DriverError> {
        match self {
            Self::Begin(err) | Self::Commit(err) => Some(err),
            Self::Callback { .. } => None,
        }
    }
}

/// Error raised while reading connection settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
