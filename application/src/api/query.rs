//! GraphQL [`Query`]s definitions.

use juniper::{graphql_object, GraphQLObject};
use service::{
    domain::user::Role,
    navigation::{guard, Decision, Route},
    query, Query as _,
};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `USER_NOT_EXISTS` - the authenticated `User` does not exist anymore.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Searches the `Instructor`s satisfying the provided `filter`.
    ///
    /// The listing keeps its stable order. Omitted `filter` returns every
    /// `Instructor`. The `location` argument, when provided, overrides the
    /// `filter`'s one.
    #[tracing::instrument(
        skip_all,
        fields(
            filter = ?filter,
            gql.name = "instructors",
            location = ?location,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn instructors(
        filter: Option<api::instructor::Filter>,
        location: Option<String>,
        ctx: &Context,
    ) -> Result<Vec<api::Instructor>, Error> {
        let filter = filter.unwrap_or_default().with_location(location);

        ctx.service()
            .execute(query::instructors::Search {
                filter: filter.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }

    /// Returns the public profile of the `Instructor` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INSTRUCTOR_NOT_EXISTS` - the `Instructor` with the specified ID
    ///                             does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "instructor",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn instructor(
        id: api::instructor::Id,
        ctx: &Context,
    ) -> Result<api::instructor::Profile, Error> {
        ctx.service()
            .execute(query::instructor::ProfileById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| InstructorError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `InstructorRegistration` of the authenticated instructor,
    /// shown on their dashboard.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NOT_INSTRUCTOR` - the authenticated `User` is not an instructor;
    /// - `REGISTRATION_NOT_EXISTS` - the instructor has no registration.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "instructorDashboard",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn instructor_dashboard(
        ctx: &Context,
    ) -> Result<api::instructor::Registration, Error> {
        let session = ctx.current_session().await?;
        if session.role != Some(Role::Instructor) {
            return Err(ctx.error()(api::PrivilegeError::Instructor.into()));
        }

        ctx.service()
            .execute(query::registration::ByUserId::by(
                session.user_id.into(),
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| RegistrationError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Decides whether the view at the provided `location` may be shown to
    /// the current visitor.
    ///
    /// Never fails: an invalid or revoked token is treated as no session.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "access",
            location = %location,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn access(location: String, ctx: &Context) -> AccessDecision {
        let route = Route::parse(&location);
        guard::access(ctx.session_state().await, &route, &location).into()
    }
}

/// Outcome of the navigation guard for a view.
#[derive(Clone, Debug, GraphQLObject)]
pub struct AccessDecision {
    /// Indicator whether the view may be shown.
    pub allowed: bool,

    /// Path to navigate to instead, if any.
    pub redirect_to: Option<String>,

    /// Location to return to after signing in, if the visitor is sent to
    /// sign in.
    pub from: Option<String>,
}

impl From<Decision> for AccessDecision {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allow => Self {
                allowed: true,
                redirect_to: None,
                from: None,
            },
            // Sessions are always resolved on the server.
            Decision::Wait => Self {
                allowed: false,
                redirect_to: None,
                from: None,
            },
            Decision::RedirectToLogin { from } => Self {
                allowed: false,
                redirect_to: Some(Route::Auth.path()),
                from: Some(from),
            },
            Decision::Redirect(route) => Self {
                allowed: false,
                redirect_to: Some(route.path()),
                from: None,
            },
        }
    }
}

define_error! {
    enum InstructorError {
        #[code = "INSTRUCTOR_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Instructor` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum RegistrationError {
        #[code = "REGISTRATION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Instructor registration does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}

#[cfg(test)]
mod spec {
    use service::navigation::{Decision, Route};

    use super::AccessDecision;

    #[test]
    fn allows_view() {
        let decision = AccessDecision::from(Decision::Allow);

        assert!(decision.allowed);
        assert_eq!(decision.redirect_to, None);
        assert_eq!(decision.from, None);
    }

    #[test]
    fn sends_to_sign_in_with_origin() {
        let decision = AccessDecision::from(Decision::RedirectToLogin {
            from: "/home?aba=aulas".into(),
        });

        assert!(!decision.allowed);
        assert_eq!(decision.redirect_to, Some(Route::Auth.path()));
        assert_eq!(decision.from.as_deref(), Some("/home?aba=aulas"));
    }

    #[test]
    fn redirects_to_route() {
        let decision =
            AccessDecision::from(Decision::Redirect(Route::StudentHome));

        assert!(!decision.allowed);
        assert_eq!(decision.redirect_to, Some(Route::StudentHome.path()));
        assert_eq!(decision.from, None);
    }

    #[test]
    fn neither_allows_nor_redirects_while_waiting() {
        let decision = AccessDecision::from(Decision::Wait);

        assert!(!decision.allowed);
        assert_eq!(decision.redirect_to, None);
        assert_eq!(decision.from, None);
    }
}
