//! [`Background`] runner of long-living [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
};

use derive_more::{Display, Error as StdError};
use futures::{future::LocalBoxFuture, FutureExt as _};
use tokio::task::{self, JoinError, JoinSet, LocalSet};
use tracing as log;

#[cfg(doc)]
use crate::Task;

/// Runner of long-living [`Task`]s alongside the HTTP server.
///
/// [`Task`]s are not required to be [`Send`], so they are driven by a
/// [`LocalSet`] once this [`Background`] is awaited.
#[derive(Debug, Default)]
pub struct Background {
    /// [`LocalSet`] driving the spawned [`Task`]s.
    set: LocalSet,

    /// Spawned [`Task`]s.
    tasks: JoinSet<Result<(), Failure>>,
}

impl Background {
    /// Spawns the provided named [`Task`] future.
    ///
    /// It doesn't start running until this [`Background`] is awaited.
    pub fn spawn<F, E>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        log::debug!("spawning `{name}` background task");
        drop(self.tasks.spawn_local_on(
            future.map(move |res| {
                res.map_err(|e| Failure::Failed {
                    task: name,
                    error: Box::new(e),
                })
            }),
            &self.set,
        ));
    }
}

impl IntoFuture for Background {
    type Output = Result<(), Failure>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    /// Runs all the spawned [`Task`]s until the first one fails, or until all
    /// of them complete.
    fn into_future(self) -> Self::IntoFuture {
        let Self { set, mut tasks } = self;
        async move {
            set.run_until(async move {
                while let Some(joined) = tasks.join_next().await {
                    joined.map_err(Failure::Aborted)??;
                }
                Ok::<_, Failure>(())
            })
            .await
        }
        .boxed_local()
    }
}

/// Failure of a [`Task`] running in the [`Background`].
#[derive(Debug, Display, StdError)]
pub enum Failure {
    /// [`Task`] returned an error.
    #[display("`{task}` background task failed: {error}")]
    Failed {
        /// Name of the failed [`Task`].
        #[error(not(source))]
        task: &'static str,

        /// Error returned by the [`Task`].
        #[error(not(source))]
        error: Box<dyn Error>,
    },

    /// [`Task`] panicked or was cancelled.
    #[display("background task aborted: {_0}")]
    Aborted(JoinError),
}
