//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{
            self,
            session::{self, Fingerprint, Revocation},
            Role, Session,
        },
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`].
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

/// Output of [`AuthorizeUserSession`] [`Command`].
#[derive(Clone, Copy, Debug)]
pub struct Output {
    /// Authorized [`Session`].
    pub session: Session,

    /// Current [`Role`] of the [`Session`] owner, if any.
    pub role: Option<Role>,
}

impl<Db, St> Command<AuthorizeUserSession> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Role>, user::Id>>,
            Ok = Option<Role>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Revocation>, Fingerprint>>,
            Ok = Option<Revocation>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        let revocation = self
            .database()
            .execute(Select(By::<Option<Revocation>, _>::new(
                Fingerprint::of(&token),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if revocation.is_some() {
            return Err(tracerr::new!(E::SessionRevoked));
        }

        drop(
            self.database()
                .execute(Select(By::<Option<User>, _>::new(session.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::UserNotExists(session.user_id))
                .map_err(tracerr::wrap!())?,
        );

        let role = self
            .database()
            .execute(Select(By::<Option<Role>, _>::new(session.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output { session, role })
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`Session`] has been revoked by signing out.
    #[display("`Session` has been revoked")]
    SessionRevoked,

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
