//! Access guard deciding whether a [`Route`] may be shown.
//!
//! Every decision is a pure function of the [`SessionState`] and the target
//! [`Route`], the guard never fails: a session that could not be resolved is
//! treated as no session at all.

use crate::domain::user::{self, Role};

use super::route::{GuestRedirect, Policy, Route};

/// State of the visitor's session, as seen by the client.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    /// Session is still being resolved.
    Loading,

    /// Session is resolved, with the signed-in [`Viewer`], if any.
    Resolved(Option<Viewer>),
}

/// Signed-in user looking at the views.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Viewer {
    /// ID of the signed-in user.
    pub user_id: user::Id,

    /// [`Role`] of the signed-in user, if one was assigned already.
    pub role: Option<Role>,
}

/// Outcome of the guard.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Nothing is decided until the session is resolved.
    Wait,

    /// Visitor must sign in first.
    RedirectToLogin {
        /// Location to return to after signing in.
        from: String,
    },

    /// Visitor is sent to another [`Route`].
    Redirect(Route),

    /// [`Route`] may be shown.
    Allow,
}

/// Guards a protected view opened at the provided `location`.
///
/// [`None`] `allowed_roles` allow any signed-in user. A signed-in user
/// without any [`Role`] yet is let through as well, only a [`Role`] outside
/// the `allowed_roles` is redirected.
#[must_use]
pub fn protect(
    session: SessionState,
    allowed_roles: Option<&[Role]>,
    location: &str,
) -> Decision {
    let SessionState::Resolved(viewer) = session else {
        return Decision::Wait;
    };
    let Some(viewer) = viewer else {
        return Decision::RedirectToLogin {
            from: location.to_owned(),
        };
    };

    let Some(allowed) = allowed_roles else {
        return Decision::Allow;
    };
    match viewer.role {
        Some(role) if !allowed.contains(&role) => {
            Decision::Redirect(home_of(role))
        }
        Some(_) | None => Decision::Allow,
    }
}

/// Decides whether the provided `route` may be shown for the `session`,
/// according to the [`Route::policy()`].
///
/// `location` is the full location the `route` was parsed from, so the
/// visitor can come back to it after signing in.
#[must_use]
pub fn access(session: SessionState, route: &Route, location: &str) -> Decision {
    match route.policy() {
        Policy::Public => Decision::Allow,
        Policy::Protected { allowed_roles } => {
            protect(session, allowed_roles, location)
        }
        Policy::GuestOnly(redirect) => match session {
            SessionState::Loading => Decision::Wait,
            SessionState::Resolved(None) => Decision::Allow,
            SessionState::Resolved(Some(viewer)) => {
                Decision::Redirect(match redirect {
                    GuestRedirect::Root => Route::Root,
                    GuestRedirect::AfterSignIn => landing(viewer, None),
                })
            }
        },
    }
}

/// Returns the location a freshly signed-in `viewer` is sent to.
///
/// `requested_role` is the [`Role`] chosen at sign up, if any. `from` is the
/// location the viewer was redirected to the login from: it wins, with its
/// query and fragment intact, whenever the `viewer` may open it.
#[must_use]
pub fn after_sign_in(
    viewer: Viewer,
    requested_role: Option<Role>,
    from: Option<&str>,
) -> String {
    if let Some(location) = from {
        let route = Route::parse(location);
        let session = SessionState::Resolved(Some(viewer));
        if access(session, &route, location) == Decision::Allow {
            return location.to_owned();
        }
    }

    landing(viewer, requested_role).path()
}

/// Returns the [`Route`] a signed-in `viewer` lands on by default.
const fn landing(viewer: Viewer, requested_role: Option<Role>) -> Route {
    match (viewer.role, requested_role) {
        (Some(role), _) => home_of(role),
        (None, Some(Role::Instructor)) => Route::InstructorRegistration,
        (None, Some(Role::Student) | None) => Route::StudentHome,
    }
}

/// Returns the [`Route`] a signed-in user with the provided [`Role`] is sent
/// to when a view is not meant for them.
const fn home_of(role: Role) -> Route {
    match role {
        Role::Instructor => Route::InstructorDashboard,
        Role::Student => Route::StudentHome,
    }
}

#[cfg(test)]
mod spec {
    use uuid::Uuid;

    use crate::{
        domain::user::{self, Role},
        navigation::Route,
    };

    use super::{access, after_sign_in, protect, Decision, SessionState, Viewer};

    fn viewer(role: Option<Role>) -> Viewer {
        Viewer {
            user_id: user::Id::from(Uuid::nil()),
            role,
        }
    }

    fn signed_in(role: Option<Role>) -> SessionState {
        SessionState::Resolved(Some(viewer(role)))
    }

    const STUDENTS: Option<&[Role]> = Some(&[Role::Student]);

    #[test]
    fn waits_while_loading() {
        assert_eq!(
            protect(SessionState::Loading, STUDENTS, "/home"),
            Decision::Wait,
        );
        assert_eq!(
            access(SessionState::Loading, &Route::Auth, "/auth"),
            Decision::Wait,
        );
    }

    #[test]
    fn sends_guests_to_login_with_origin() {
        assert_eq!(
            protect(SessionState::Resolved(None), STUDENTS, "/home?tab=2"),
            Decision::RedirectToLogin {
                from: "/home?tab=2".into(),
            },
        );
    }

    #[test]
    fn redirects_wrong_role_by_priority() {
        assert_eq!(
            protect(signed_in(Some(Role::Instructor)), STUDENTS, "/home"),
            Decision::Redirect(Route::InstructorDashboard),
        );
        assert_eq!(
            protect(
                signed_in(Some(Role::Student)),
                Some(&[Role::Instructor]),
                "/dashboard-instrutor",
            ),
            Decision::Redirect(Route::StudentHome),
        );
    }

    #[test]
    fn lets_users_without_role_through() {
        assert_eq!(
            protect(signed_in(None), STUDENTS, "/home"),
            Decision::Allow,
        );
        assert_eq!(
            access(
                signed_in(None),
                &Route::InstructorDashboard,
                "/dashboard-instrutor",
            ),
            Decision::Allow,
        );

        let home = after_sign_in(viewer(None), None, None);
        assert_eq!(
            access(signed_in(None), &Route::parse(&home), &home),
            Decision::Allow,
        );
    }

    #[test]
    fn allows_matching_role() {
        assert_eq!(
            protect(signed_in(Some(Role::Student)), STUDENTS, "/home"),
            Decision::Allow,
        );
        assert_eq!(
            protect(signed_in(None), None, "/anywhere"),
            Decision::Allow,
        );
    }

    #[test]
    fn public_routes_are_always_allowed() {
        for session in [
            SessionState::Loading,
            SessionState::Resolved(None),
            signed_in(Some(Role::Instructor)),
        ] {
            assert_eq!(
                access(session, &Route::Search, "/buscar"),
                Decision::Allow,
            );
        }
    }

    #[test]
    fn guest_only_routes_redirect_signed_in_users() {
        assert_eq!(
            access(SessionState::Resolved(None), &Route::Auth, "/auth"),
            Decision::Allow,
        );
        assert_eq!(
            access(signed_in(Some(Role::Student)), &Route::Auth, "/auth"),
            Decision::Redirect(Route::StudentHome),
        );
        assert_eq!(
            access(
                signed_in(Some(Role::Student)),
                &Route::InstructorRegistration,
                "/cadastro-instrutor",
            ),
            Decision::Redirect(Route::Root),
        );
    }

    #[test]
    fn after_sign_in_follows_role() {
        assert_eq!(
            after_sign_in(viewer(Some(Role::Instructor)), None, None),
            "/dashboard-instrutor",
        );
        assert_eq!(
            after_sign_in(viewer(Some(Role::Student)), None, None),
            "/home",
        );
        assert_eq!(
            after_sign_in(viewer(None), Some(Role::Instructor), None),
            "/cadastro-instrutor",
        );
        assert_eq!(
            after_sign_in(viewer(None), Some(Role::Student), None),
            "/home",
        );
        assert_eq!(after_sign_in(viewer(None), None, None), "/home");
    }

    #[test]
    fn after_sign_in_returns_to_allowed_origin() {
        assert_eq!(
            after_sign_in(viewer(Some(Role::Student)), None, Some("/buscar")),
            "/buscar",
        );
        assert_eq!(
            after_sign_in(
                viewer(Some(Role::Student)),
                None,
                Some("/dashboard-instrutor"),
            ),
            "/home",
        );
        assert_eq!(
            after_sign_in(viewer(Some(Role::Instructor)), None, Some("/auth")),
            "/dashboard-instrutor",
        );
    }

    #[test]
    fn after_sign_in_keeps_query_and_fragment_of_origin() {
        assert_eq!(
            after_sign_in(
                viewer(Some(Role::Student)),
                None,
                Some("/buscar?localizacao=Moema"),
            ),
            "/buscar?localizacao=Moema",
        );
        assert_eq!(
            after_sign_in(
                viewer(Some(Role::Student)),
                None,
                Some("/home#aulas"),
            ),
            "/home#aulas",
        );
    }
}
