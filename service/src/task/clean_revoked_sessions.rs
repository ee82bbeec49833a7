//! [`CleanRevokedSessions`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Delete, Perform, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::user::Session;
use crate::{
    domain::user::session::{self, Revocation},
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`CleanRevokedSessions`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between [`Revocation`]s cleaning.
    pub interval: time::Duration,
}

/// [`Task`] for forgetting [`Revocation`]s of already expired [`Session`]s.
#[derive(Clone, Copy, Debug)]
pub struct CleanRevokedSessions<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, St> Task<Start<By<CleanRevokedSessions<Self>, Config>>>
    for Service<Db, St>
where
    CleanRevokedSessions<Service<Db, St>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<CleanRevokedSessions<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = CleanRevokedSessions {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::CleanRevokedSessions` failed: {e}");
            });
        }
    }
}

impl<Db, St> Task<Perform<()>> for CleanRevokedSessions<Service<Db, St>>
where
    Db: Database<
        Delete<By<Revocation, session::ExpirationDateTime>>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        self.service
            .database()
            .execute(Delete(By::new(session::ExpirationDateTime::now())))
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

/// Error of [`CleanRevokedSessions`] execution.
pub type ExecutionError = Traced<database::Error>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::operations::{By, Perform, Select};

    use crate::{
        command::{Command as _, DeleteUserSession},
        domain::user::session::{self, Fingerprint, Revocation, Token},
        infra::{database::memory::Memory, Database as _},
        service_for_tests,
    };

    use super::{CleanRevokedSessions, Config, Task as _};

    #[tokio::test]
    async fn forgets_only_expired_revocations() {
        let db = Memory::default();
        let svc = service_for_tests(db.clone());
        let now = session::ExpirationDateTime::now();
        let expired: Token = "expired".parse().unwrap();
        let alive: Token = "alive".parse().unwrap();

        svc.execute(DeleteUserSession {
            token: expired.clone(),
            expires_at: now,
        })
        .await
        .unwrap();
        svc.execute(DeleteUserSession {
            token: alive.clone(),
            expires_at: now + Duration::from_secs(3600),
        })
        .await
        .unwrap();

        let task = CleanRevokedSessions {
            config: Config {
                interval: Duration::from_secs(60),
            },
            service: svc,
        };
        task.execute(Perform(())).await.unwrap();

        let find = |token: &Token| {
            db.execute(Select(By::<Option<Revocation>, _>::new(
                Fingerprint::of(token),
            )))
        };
        assert!(find(&expired).await.unwrap().is_none());
        assert!(find(&alive).await.unwrap().is_some());
    }
}
