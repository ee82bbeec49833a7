//! [`Storage`] of uploaded objects.

pub mod file_system;

use derive_more::{Display, Error as StdError, From};

pub use self::file_system::FileSystem;

/// Object storage operation.
pub use common::Handler as Storage;

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`FileSystem`] error.
    #[display("`FileSystem` storage failed: {_0}")]
    FileSystem(std::io::Error),
}
