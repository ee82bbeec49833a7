//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use secrecy::{SecretBox, SecretString};
use service::{
    command,
    domain::user::{self, Role},
    navigation::{guard, Viewer},
    Command as _,
};

use crate::{api, define_error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Signs up a new `User` and signs them in right away.
    ///
    /// Choosing the `student` role (or none) grants it immediately, while
    /// the `instructor` role is granted only by the instructor registration.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is used by another `User`;
    /// - `PASSWORD_MISMATCH` - `passwordConfirmation` differs from the
    ///                         `password`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
            role = ?role,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        email: api::user::Email,
        password: api::user::Password,
        password_confirmation: String,
        role: Option<api::user::Role>,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let requested_role = role.map(Into::into);
        let created = ctx
            .service()
            .execute(command::CreateUser {
                name: name.into(),
                email: email.into(),
                password: SecretBox::init_with(move || password.into()),
                password_confirmation: SecretString::from(
                    password_confirmation,
                ),
                requested_role,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByUserId(created.user.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        let redirect_to = Self::redirect_to(
            output.user.id,
            output.role,
            requested_role,
            None,
        );
        Ok(Self::sign_in(output, redirect_to, ctx).await)
    }

    /// Signs in with the provided credentials.
    ///
    /// `from` is the location the visitor was sent to sign in from, which
    /// the returned `redirectTo` leads back to whenever it's allowed.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials do not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            from = ?from,
            gql.name = "createUserSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        email: api::user::Email,
        password: api::user::Password,
        from: Option<String>,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                email: email.into(),
                password: SecretBox::init_with(move || password.into()),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        let redirect_to = Self::redirect_to(
            output.user.id,
            output.role,
            None,
            from.as_deref(),
        );
        Ok(Self::sign_in(output, redirect_to, ctx).await)
    }

    /// Signs out, revoking the current `Session` token.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteUserSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_user_session(ctx: &Context) -> Result<bool, Error> {
        let session = ctx.current_session().await?;

        ctx.service()
            .execute(command::DeleteUserSession {
                token: session.token,
                expires_at: session.expires_at.coerce(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(true)
    }

    /// Assigns the provided `Role` to the authenticated `User`, if they have
    /// none yet.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `ROLE_ALREADY_ASSIGNED` - the `User` has a `Role` already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "assignUserRole",
            otel.name = Self::SPAN_NAME,
            role = %role,
        ),
    )]
    pub async fn assign_user_role(
        role: api::user::Role,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;

        _ = ctx
            .service()
            .execute(command::AssignUserRole {
                user_id: my_id.into(),
                role: role.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        // SAFETY: The `User` exists, as the `Role` was just assigned to it.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let user = unsafe { api::User::new_unchecked(my_id) };
        Ok(user)
    }
}

impl Mutation {
    /// Computes the path to open once the [`User`] with the provided ID and
    /// [`Role`] signs in, coming `from` the provided location, if any.
    ///
    /// [`User`]: api::User
    fn redirect_to(
        user_id: user::Id,
        role: Option<Role>,
        requested_role: Option<Role>,
        from: Option<&str>,
    ) -> String {
        guard::after_sign_in(Viewer { user_id, role }, requested_role, from)
    }

    /// Remembers the created [`Session`] in the provided [`Context`] and
    /// wraps it into a [`api::user::session::CreateResult`].
    async fn sign_in(
        output: command::create_user_session::Output,
        redirect_to: String,
        ctx: &Context,
    ) -> api::user::session::CreateResult {
        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            role: output.role,
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        api::user::session::CreateResult::new(output, redirect_to)
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserEmail` is used by another `User`"]
                EmailOccupied,

                #[code = "PASSWORD_MISMATCH"]
                #[status = BAD_REQUEST]
                #[message = "Password confirmation doesn't match"]
                PasswordMismatch,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
            Self::PasswordMismatch => Some(Error::PasswordMismatch.into()),
            Self::PasswordHashing(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = FORBIDDEN]
                #[message = "Provided credentials do not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::assign_user_role::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ROLE_ALREADY_ASSIGNED"]
                #[status = CONFLICT]
                #[message = "`User` has a `Role` assigned already"]
                RoleAlreadyAssigned,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::RoleAlreadyAssigned(_) | Self::RoleTaken => {
                Some(Error::RoleAlreadyAssigned.into())
            }
            Self::UserNotExists(_) => {
                Some(api::query::UserError::NotExists.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::domain::user::{self, Role};

    use super::Mutation;

    #[test]
    fn session_redirects_back_to_allowed_origin() {
        let to = Mutation::redirect_to(
            user::Id::new(),
            Some(Role::Student),
            None,
            Some("/buscar?localizacao=Moema#lista"),
        );

        assert_eq!(to, "/buscar?localizacao=Moema#lista");
    }

    #[test]
    fn session_redirects_home_from_forbidden_origin() {
        let to = Mutation::redirect_to(
            user::Id::new(),
            Some(Role::Student),
            None,
            Some("/dashboard-instrutor"),
        );

        assert_eq!(to, "/home");
    }

    #[test]
    fn session_redirects_home_without_origin() {
        let to = Mutation::redirect_to(
            user::Id::new(),
            Some(Role::Instructor),
            None,
            None,
        );

        assert_eq!(to, "/dashboard-instrutor");
    }

    #[test]
    fn sign_up_as_instructor_continues_registration() {
        let to = Mutation::redirect_to(
            user::Id::new(),
            None,
            Some(Role::Instructor),
            None,
        );

        assert_eq!(to, "/cadastro-instrutor");
    }
}
