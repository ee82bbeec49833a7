//! [`Command`] for signing out a [`User`].

use common::operations::Insert;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{user::Session, User};
use crate::{
    domain::user::session::{self, Fingerprint, Revocation},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for revoking an authorized [`Session`].
///
/// The [`session::Token`] stays revoked until it expires on its own.
#[derive(Clone, Debug)]
pub struct DeleteUserSession {
    /// [`session::Token`] to revoke.
    pub token: session::Token,

    /// [`session::ExpirationDateTime`] of the [`Session`] to revoke.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db, St> Command<DeleteUserSession> for Service<Db, St>
where
    Db: Database<Insert<Revocation>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(
        &self,
        cmd: DeleteUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        let DeleteUserSession { token, expires_at } = cmd;

        self.database()
            .execute(Insert(Revocation {
                fingerprint: Fingerprint::of(&token),
                expires_at,
            }))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`DeleteUserSession`] [`Command`] execution.
pub type ExecutionError = Traced<database::Error>;
