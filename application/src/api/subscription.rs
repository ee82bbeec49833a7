//! GraphQL [`Subscription`]s definitions.

use std::time;

use common::DateTime;
use futures::{
    future,
    stream::{self, BoxStream},
    StreamExt as _,
};
use juniper::{graphql_subscription, GraphQLObject};

use crate::{api, context, Context, Error, Service, Session};

/// Root of all GraphQL subscription.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

impl Subscription {
    /// Interval of re-authorizing the session of an `authState`
    /// subscription.
    const RECHECK_INTERVAL: time::Duration = time::Duration::from_secs(30);
}

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Subscription to the authentication state of the current session.
    ///
    /// Emits the signed-in `AuthState` at once, and then again whenever the
    /// `User`'s `Role` changes. The session is re-checked every 30 seconds,
    /// so the subscription fails within this period after the session is
    /// revoked by `deleteUserSession`, and right when it expires.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the current session is not
    ///                              authenticated, expired or revoked.
    pub async fn auth_state(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<AuthState, Error>>, Error> {
        let session = ctx.current_session().await?;
        let service = ctx.service().clone();
        let first = AuthState::from(&session);

        let changes = stream::unfold(Some(session), move |last| {
            let service = service.clone();
            async move {
                let last = last?;
                match Self::next_change(&service, last).await {
                    Ok(session) => {
                        Some((Ok(AuthState::from(&session)), Some(session)))
                    }
                    Err(e) => Some((Err(e), None)),
                }
            }
        });
        Ok(stream::once(future::ready(Ok(first))).chain(changes).boxed())
    }
}

impl Subscription {
    /// Waits until the [`Role`] of the `last` [`Session`] changes.
    ///
    /// # Errors
    ///
    /// As soon as the [`Session`] expires or is found revoked.
    ///
    /// [`Role`]: service::domain::user::Role
    async fn next_change(
        service: &Service,
        last: Session,
    ) -> Result<Session, Error> {
        loop {
            let left = last.expires_at - DateTime::now();
            if left.is_zero() {
                return Err(context::AuthError::AuthorizationRequired.into());
            }
            tokio::time::sleep(left.min(Self::RECHECK_INTERVAL)).await;

            let current =
                Session::authorize(service, last.token.clone()).await?;
            if current.role != last.role {
                return Ok(current);
            }
        }
    }
}

/// Authentication state of a signed-in session.
#[derive(Clone, Debug, GraphQLObject)]
pub struct AuthState {
    /// ID of the signed-in `User`.
    pub user_id: api::user::Id,

    /// `Role` of the signed-in `User`, if one was assigned already.
    pub role: Option<api::user::Role>,

    /// `DateTime` when the session expires.
    pub expires_at: DateTime,
}

impl From<&Session> for AuthState {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            role: session.role.map(Into::into),
            expires_at: session.expires_at,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use service::domain::user::{self, session, Role};

    use crate::Session;

    use super::AuthState;

    #[test]
    fn mirrors_session() {
        #[expect(unsafe_code, reason = "test token")]
        let token = unsafe { session::Token::new_unchecked("token".into()) };
        let session = Session {
            user_id: user::Id::new().into(),
            role: Some(Role::Instructor),
            token,
            expires_at: DateTime::now(),
        };

        let state = AuthState::from(&session);

        assert_eq!(state.user_id, session.user_id);
        assert_eq!(
            state.role.map(Role::from),
            Some(Role::Instructor),
        );
        assert_eq!(state.expires_at, session.expires_at);
    }
}
