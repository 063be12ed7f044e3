//! [`Database`] abstractions and implementations.

#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Operation executable on a database.
pub use common::Handler as Database;

/// Possible [`Database`] errors.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] database error.
    Postgres(postgres::Error),
}
