//! Postgres [`Database`] implementation.

pub mod client;
pub mod connection;
mod impls;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::{error::SqlState, NoTls};
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
};

pub use deadpool_postgres::Config;

/// Postgres [`Database`] client, either [`NonTx`] or [`Tx`].
#[derive(Clone, Copy, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Creates a new [`Postgres`] client over a [`connection::Pool`] built
    /// from the provided [`Config`].
    ///
    /// No connection is opened until the first statement.
    ///
    /// # Errors
    ///
    /// If the [`Config`] cannot describe a [`connection::Pool`].
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self(NonTx::from_pool(pool)))
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// [`Connection`] error.
    #[display("`Connection` error: {_0}")]
    Connection(connection::Error),

    /// Error of creating a new [`connection::Pool`] client.
    #[display("Failed to create a new `connection::Pool`: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// [`connection::Pool`] error.
    #[display("`connection::Pool` error: {_0}")]
    PoolError(connection::PoolError),

    /// Statement issued to an already committed transaction.
    #[display("Transaction is committed already")]
    Committed,
}

impl Error {
    /// Checks whether this [`Error`] violates the provided unique
    /// `constraint`.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        let Self::Connection(e) = self else {
            return false;
        };
        e.code() == Some(&SqlState::UNIQUE_VIOLATION)
            && e.as_db_error().and_then(|e| e.constraint()) == Some(constraint)
    }
}
