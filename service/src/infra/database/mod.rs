//! [`Database`]-related implementations.

#[cfg(test)]
pub(crate) mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    #[cfg(test)]
    /// In-memory test [`Database`] failure.
    #[display("in-memory `Database` failed: {_0}")]
    #[from(ignore)]
    Memory(#[error(not(source))] &'static str),

    #[cfg(test)]
    /// In-memory test [`Database`] unique constraint violation.
    #[display("in-memory `{_0}` constraint violated")]
    #[from(ignore)]
    MemoryConflict(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks whether this [`Error`] violates the provided unique
    /// [`constraint`].
    #[must_use]
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        match *self {
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.is_unique_violation(constraint),
            #[cfg(test)]
            Self::Memory(_) => false,
            #[cfg(test)]
            Self::MemoryConflict(c) => c == constraint,
        }
    }
}

/// Names of the unique constraints a [`Database`] enforces.
pub mod constraint {
    /// One [`User`] per email, ignoring case.
    ///
    /// [`User`]: crate::domain::User
    pub const USER_EMAIL: &str = "users_email_key";

    /// One [`Role`] per [`User`].
    ///
    /// [`Role`]: crate::domain::user::Role
    /// [`User`]: crate::domain::User
    pub const USER_ROLE: &str = "user_roles_pkey";
}
