//! [`User`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLScalar, InputValue, ScalarValue, Value};
use service::{domain, query, Query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A [`User`] of the system.
#[derive(Clone, Debug, From)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`domain::User`] representing this [`User`].
    user: OnceCell<domain::User>,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id.into(),
            user: OnceCell::new_with(Some(user)),
        }
    }
}

impl User {
    /// Creates a new [`User`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`User`] with the provided ID exists,
    /// otherwise accessing this [`User`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            user: OnceCell::new(),
        }
    }

    /// Returns the [`domain::User`] representing this [`User`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::User`] doesn't exist.
    async fn user(&self, ctx: &Context) -> Result<&domain::User, Error> {
        let id = self.id.into();
        self.user
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::user::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|u| {
                        future::ready(u.ok_or_else(|| {
                            api::query::UserError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A `User` of the system.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.user(ctx).await?.name.clone().into())
    }

    /// Initials of this `User`'s name, shown instead of a photo.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.avatar",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn avatar(&self, ctx: &Context) -> Result<String, Error> {
        Ok(self.user(ctx).await?.name.initials())
    }

    /// Email of this `User`.
    ///
    /// Visible to this `User` only.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn email(&self, ctx: &Context) -> Result<Option<Email>, Error> {
        let my_id = ctx.try_current_session().await?.map(|s| s.user_id);
        if Some(self.id) != my_id {
            return Ok(None);
        }
        Ok(Some(self.user(ctx).await?.email.clone().into()))
    }

    /// `Role` of this `User`, if one was assigned already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.role",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn role(&self, ctx: &Context) -> Result<Option<Role>, Error> {
        ctx.service()
            .execute(query::user::RoleById::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|r| r.map(Into::into))
    }

    /// `DateTime` when this `User` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.user(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `User`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::user::Id)]
#[into(domain::user::Id)]
#[graphql(name = "UserId", transparent)]
pub struct Id(Uuid);

/// Name of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserName",
    with = scalar::Via::<domain::user::Name>,
)]
pub struct Name(domain::user::Name);

/// Email of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserEmail",
    with = scalar::Via::<domain::user::Email>,
)]
pub struct Email(domain::user::Email);

/// Password of a `User`.
///
/// Accepted as input only, never revealed.
#[derive(Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(name = "UserPassword", with = Self, parse_token(String))]
pub struct Password(domain::user::Password);

impl Password {
    /// Masks this [`Password`] as a scalar [`Value`].
    fn to_output<S: ScalarValue>(_: &Self) -> Value<S> {
        Value::scalar("******".to_owned())
    }

    /// Parses a [`Password`] out of the provided [`InputValue`].
    fn from_input<S: ScalarValue>(
        input: &InputValue<S>,
    ) -> Result<Self, String> {
        input
            .as_string_value()
            .ok_or_else(|| format!("Expected `String`, found: {input}"))?
            .parse::<domain::user::Password>()
            .map(Self)
            .map_err(|e| format!("Cannot parse `UserPassword`: {e}"))
    }
}

/// Role of a `User` on the platform.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserRole",
    with = scalar::Via::<domain::user::Role>,
)]
pub struct Role(domain::user::Role);

pub mod session {
    //! [`Session`]-related definitions.
    //!
    //! [`Session`]: crate::Session

    use common::DateTime;
    use derive_more::{AsRef, From, Into};
    use juniper::{GraphQLObject, GraphQLScalar};
    use service::{command, domain};

    use crate::{
        api::{self, scalar},
        Context,
    };

    /// `Session` access token.
    #[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
    #[graphql(
        name = "UserAuthToken",
        with = scalar::Via::<domain::user::session::Token>,
    )]
    pub struct Token(domain::user::session::Token);

    /// Result of a `Session` creation.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "CreateSessionResult")]
    pub struct CreateResult {
        /// Access token of the created `Session`.
        pub token: Token,

        /// `User` associated with the created `Session`.
        pub user: api::User,

        /// `Role` of the `User`, if one was assigned already.
        pub role: Option<super::Role>,

        /// `DateTime` when the created `Session` expires.
        pub expires_at: DateTime,

        /// Path of the view to open after signing in.
        pub redirect_to: String,
    }

    impl CreateResult {
        /// Creates a new [`CreateResult`] out of the provided
        /// [`command::create_user_session::Output`], redirecting to the
        /// provided path.
        #[must_use]
        pub fn new(
            output: command::create_user_session::Output,
            redirect_to: String,
        ) -> Self {
            let command::create_user_session::Output {
                token,
                user,
                role,
                expires_at,
            } = output;
            Self {
                token: token.into(),
                user: user.into(),
                role: role.map(Into::into),
                expires_at: expires_at.coerce(),
                redirect_to,
            }
        }
    }
}
