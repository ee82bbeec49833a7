//! [`Route`] definitions.

use std::fmt;

use crate::domain::{instructor, user::Role};

/// Named client view.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Route {
    /// Splash screen.
    Root,

    /// Sign in and sign up view.
    Auth,

    /// Choice between signing up as a student or as an instructor.
    ProfileSelection,

    /// Instructor registration wizard.
    InstructorRegistration,

    /// Home of a signed-in student.
    StudentHome,

    /// Instructor search.
    Search,

    /// Public profile of the [`Instructor`] with the provided ID.
    ///
    /// [`Instructor`]: crate::domain::Instructor
    InstructorProfile(instructor::Id),

    /// Dashboard of a signed-in instructor.
    InstructorDashboard,

    /// Any path not matching other [`Route`]s.
    NotFound(String),
}

impl Route {
    /// Parses the provided `location` into a [`Route`].
    ///
    /// Query string and fragment are ignored, a single trailing slash is
    /// tolerated.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let trimmed = match path.strip_suffix('/') {
            Some(p) if !p.is_empty() => p,
            _ => path,
        };

        match trimmed {
            "/" => Self::Root,
            "/auth" => Self::Auth,
            "/selecionar-perfil" => Self::ProfileSelection,
            "/cadastro-instrutor" => Self::InstructorRegistration,
            "/home" => Self::StudentHome,
            "/buscar" => Self::Search,
            "/dashboard-instrutor" => Self::InstructorDashboard,
            other => other
                .strip_prefix("/instrutor/")
                .and_then(|id| id.parse().ok())
                .map_or_else(
                    || Self::NotFound(path.to_owned()),
                    Self::InstructorProfile,
                ),
        }
    }

    /// Returns the path of this [`Route`].
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Root => "/".into(),
            Self::Auth => "/auth".into(),
            Self::ProfileSelection => "/selecionar-perfil".into(),
            Self::InstructorRegistration => "/cadastro-instrutor".into(),
            Self::StudentHome => "/home".into(),
            Self::Search => "/buscar".into(),
            Self::InstructorProfile(id) => format!("/instrutor/{id}"),
            Self::InstructorDashboard => "/dashboard-instrutor".into(),
            Self::NotFound(path) => path.clone(),
        }
    }

    /// Returns the access [`Policy`] of this [`Route`].
    #[must_use]
    pub const fn policy(&self) -> Policy {
        match self {
            Self::Root
            | Self::ProfileSelection
            | Self::Search
            | Self::InstructorProfile(_)
            | Self::NotFound(_) => Policy::Public,
            Self::Auth => Policy::GuestOnly(GuestRedirect::AfterSignIn),
            Self::InstructorRegistration => {
                Policy::GuestOnly(GuestRedirect::Root)
            }
            Self::StudentHome => Policy::Protected {
                allowed_roles: Some(&[Role::Student]),
            },
            Self::InstructorDashboard => Policy::Protected {
                allowed_roles: Some(&[Role::Instructor]),
            },
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Access policy of a [`Route`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Policy {
    /// Anybody may open the [`Route`].
    Public,

    /// Only visitors without a session may open the [`Route`], signed-in
    /// users are sent elsewhere.
    GuestOnly(GuestRedirect),

    /// Only signed-in users may open the [`Route`].
    Protected {
        /// [`Role`]s allowed to open the [`Route`].
        ///
        /// [`None`] allows any signed-in user.
        allowed_roles: Option<&'static [Role]>,
    },
}

/// Destination of a signed-in user opening a [`Policy::GuestOnly`] [`Route`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GuestRedirect {
    /// Wherever a fresh sign in would lead.
    AfterSignIn,

    /// [`Route::Root`].
    Root,
}

#[cfg(test)]
mod spec {
    use uuid::Uuid;

    use crate::domain::user::Role;

    use super::{GuestRedirect, Policy, Route};

    #[test]
    fn parses_named_paths() {
        for route in [
            Route::Root,
            Route::Auth,
            Route::ProfileSelection,
            Route::InstructorRegistration,
            Route::StudentHome,
            Route::Search,
            Route::InstructorDashboard,
            Route::InstructorProfile(Uuid::nil().into()),
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn tolerates_trailing_slash_and_query() {
        assert_eq!(Route::parse("/home/"), Route::StudentHome);
        assert_eq!(Route::parse("/buscar?localizacao=Moema"), Route::Search);
        assert_eq!(Route::parse("/"), Route::Root);
        assert_eq!(Route::parse(""), Route::NotFound(String::new()));
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(
            Route::parse("/instrutor/1"),
            Route::NotFound("/instrutor/1".into()),
        );
        assert_eq!(
            Route::parse("/admin"),
            Route::NotFound("/admin".into()),
        );
        assert_eq!(Route::parse("/admin").path(), "/admin");
        assert_eq!(Route::parse("/admin").policy(), Policy::Public);
    }

    #[test]
    fn assigns_policies() {
        assert_eq!(Route::Search.policy(), Policy::Public);
        assert_eq!(
            Route::Auth.policy(),
            Policy::GuestOnly(GuestRedirect::AfterSignIn),
        );
        assert_eq!(
            Route::InstructorRegistration.policy(),
            Policy::GuestOnly(GuestRedirect::Root),
        );
        assert_eq!(
            Route::InstructorDashboard.policy(),
            Policy::Protected {
                allowed_roles: Some(&[Role::Instructor]),
            },
        );
    }
}
