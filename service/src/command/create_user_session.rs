//! [`Command`] for signing in a [`User`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email, Password};
use crate::{
    domain::{
        user::{self, session, Role, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Email`] of a [`User`].
        email: user::Email,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new [`Session`] for the [`User`] with the provided ID, right
    /// after the [`User`] was created.
    ByUserId(user::Id),
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`Role`] of the [`User`], if one was assigned.
    pub role: Option<Role>,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db, St> Command<CreateUserSession> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Role>, user::Id>>,
            Ok = Option<Role>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { email, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(&email)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or_else(|| E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;

                if !user.password_hash.verify(password.expose_secret()) {
                    return Err(tracerr::new!(E::WrongCredentials));
                }

                user
            }
            Cmd::ByUserId(user_id) => self
                .database()
                .execute(Select(By::<Option<User>, _>::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        };

        let role = self
            .database()
            .execute(Select(By::<Option<Role>, _>::new(user.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let expires_at = (DateTime::now() + self.config().session_ttl).coerce();
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                expires_at,
            },
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            user,
            role,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`CreateUserSession::ByCredentials`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::{AuthorizeUserSession, CreateUser},
        domain::user::{self, Role},
        infra::database::memory::Memory,
        service_for_tests, Command as _,
    };

    use super::{CreateUserSession, ExecutionError};

    fn password(s: &str) -> SecretBox<user::Password> {
        SecretBox::new(Box::new(user::Password::new(s).unwrap()))
    }

    #[tokio::test]
    async fn signs_in_with_valid_credentials_only() {
        let svc = service_for_tests(Memory::default());
        let created = svc
            .execute(CreateUser {
                name: user::Name::new("Maria Silva").unwrap(),
                email: user::Email::new("maria@example.com").unwrap(),
                password: password("segredo1"),
                password_confirmation: "segredo1".to_owned().into(),
                requested_role: None,
            })
            .await
            .unwrap();

        let out = svc
            .execute(CreateUserSession::ByCredentials {
                email: user::Email::new("Maria@Example.com").unwrap(),
                password: password("segredo1"),
            })
            .await
            .unwrap();
        assert_eq!(out.user.id, created.user.id);
        assert_eq!(out.role, Some(Role::Student));

        let authorized = svc
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap();
        assert_eq!(authorized.session.user_id, created.user.id);
        assert_eq!(authorized.role, Some(Role::Student));

        let err = svc
            .execute(CreateUserSession::ByCredentials {
                email: user::Email::new("maria@example.com").unwrap(),
                password: password("errado12"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));

        let err = svc
            .execute(CreateUserSession::ByCredentials {
                email: user::Email::new("joao@example.com").unwrap(),
                password: password("segredo1"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }
}
