//! [`Context`]-related definitions.

use std::{
    future,
    sync::atomic::{self, AtomicU16},
};

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use common::DateTime;
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::{
    command::{self, Command as _},
    domain::user::{session, Role},
    navigation::{SessionState, Viewer},
};
use tokio::sync::OnceCell;

#[cfg(doc)]
use crate::api::User;
use crate::{api, define_error, AsError, Error, JuniperResponse, Service};

/// Per-request context of the GraphQL API and the REST endpoints.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] handling the request.
    service: Service,

    /// Status code to respond with if any [`Error`] occurs.
    error_status_code: AtomicU16,

    /// Parts of the HTTP request.
    parts: http::request::Parts,

    /// [`Session`] created while handling the request, if any.
    signed_in: OnceCell<Session>,

    /// Outcome of authorizing the request's bearer token.
    authorized: OnceCell<Result<Session, Error>>,
}

impl Context {
    /// Returns the [`Service`] handling the request.
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the status code to respond with if any [`Error`] occurs.
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Remembers the status code of the provided [`Error`] and returns it
    /// back, for using in [`Result::map_err()`].
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.error_status_code
                .store(err.status_code.as_u16(), atomic::Ordering::Relaxed);
            err
        }
    }

    /// Remembers the [`Session`] just created by signing in, so the rest of
    /// the request is handled on its behalf.
    pub async fn set_current_session(&self, session: Session) {
        _ = self
            .signed_in
            .get_or_init(|| future::ready(session))
            .await;
    }

    /// Returns the current [`Session`], if the request is authenticated.
    ///
    /// # Errors
    ///
    /// If the provided token is malformed, expired or revoked.
    pub async fn try_current_session(&self) -> Result<Option<Session>, Error> {
        match self.current_session().await {
            Ok(session) => Ok(Some(session)),
            Err(e)
                if e.code
                    == Error::from(AuthError::AuthorizationRequired).code =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns the current [`Session`].
    ///
    /// # Errors
    ///
    /// If the request is not authenticated or its token is malformed,
    /// expired or revoked.
    pub async fn current_session(&self) -> Result<Session, Error> {
        if let Some(session) = self.signed_in.get() {
            return Ok(session.clone());
        }
        self.authorized
            .get_or_init(|| self.authorize())
            .await
            .clone()
            .map_err(self.error())
    }

    /// Puts the `authToken` variable provided on a GraphQL subscription
    /// initialization into the `Authorization` header.
    ///
    /// # Errors
    ///
    /// If the `authToken` is not a string or not a valid header value.
    pub(crate) fn apply_subscription_variables(
        &mut self,
        vars: &juniper::Variables,
    ) -> Result<(), Error> {
        let Some(token) = vars.get("authToken") else {
            return Ok(());
        };
        let header = token
            .as_string_value()
            .and_then(|t| format!("Bearer {t}").parse().ok())
            .ok_or_else(|| Error::from(AuthError::InvalidVariables))?;
        drop(self.parts.headers.insert(http::header::AUTHORIZATION, header));
        Ok(())
    }

    /// Resolves the [`SessionState`] of the request for the navigation
    /// guard.
    ///
    /// Any authentication failure resolves to no signed-in [`Viewer`].
    pub async fn session_state(&self) -> SessionState {
        SessionState::Resolved(self.current_session().await.ok().map(|s| {
            Viewer {
                user_id: s.user_id.into(),
                role: s.role,
            }
        }))
    }

    /// Authorizes the bearer token of the request.
    async fn authorize(&self) -> Result<Session, Error> {
        let TypedHeader(Authorization(bearer)) = self
            .parts
            .clone()
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                if e.is_missing() {
                    AuthError::AuthorizationRequired.into()
                } else {
                    e.into_error()
                }
            })?;

        #[expect(unsafe_code, reason = "specified in correct header")]
        let token =
            unsafe { session::Token::new_unchecked(bearer.token().to_owned()) };
        Session::authorize(&self.service, token).await
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service =
            parts.extensions.get::<Service>().cloned().ok_or_else(|| {
                JuniperResponse {
                    status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
                    response: GraphQLBatchResponse::Single(
                        GraphQLResponse::error(
                            Error::internal(&"missing `Service` extension")
                                .into_field_error(),
                        ),
                    ),
                }
            })?;

        Ok(Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            parts: parts.clone(),
            signed_in: OnceCell::new(),
            authorized: OnceCell::new(),
        })
    }
}

/// User session.
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the [`User`] associated with this [`Session`].
    pub user_id: api::user::Id,

    /// [`Role`] of the [`User`] at the moment of authentication, if any.
    pub role: Option<Role>,

    /// Authentication token.
    pub token: session::Token,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: DateTime,
}

impl Session {
    /// Authorizes the provided [`session::Token`] anew, picking up its
    /// revocation and the current [`Role`] of its [`User`].
    ///
    /// # Errors
    ///
    /// If the [`session::Token`] is malformed, expired or revoked.
    pub async fn authorize(
        service: &Service,
        token: session::Token,
    ) -> Result<Self, Error> {
        let out = service
            .execute(command::AuthorizeUserSession {
                token: token.clone(),
            })
            .await
            .map_err(AsError::into_error)?;

        Ok(Self {
            user_id: out.session.user_id.into(),
            role: out.role,
            token,
            expires_at: out.session.expires_at.coerce(),
        })
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_)
            | Self::SessionRevoked
            | Self::UserNotExists(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_VARIABLES"]
        #[status = BAD_REQUEST]
        #[message = "Invalid subscription authorization variables"]
        InvalidVariables,
    }
}
