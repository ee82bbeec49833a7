//! [`Handler`] abstractions.

use std::future::Future;

/// Asynchronous handler of `Args`.
///
/// Commands, queries, database and storage operations, and background tasks
/// are all expressed as [`Handler`]s parametrized by the operation they
/// handle.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
