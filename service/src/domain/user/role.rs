//! [`Role`] definitions.

use common::define_kind;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

define_kind! {
    #[doc = "Role of a [`User`] on the platform."]
    enum Role {
        #[doc = "Student searching for instructors."]
        #[str = "student"]
        Student = 1,

        #[doc = "Driving instructor offering lessons."]
        #[str = "instructor"]
        Instructor = 2,
    }
}

/// [`Role`] granted to a [`User`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Assignment {
    /// ID of the [`User`] the [`Role`] is granted to.
    pub user_id: user::Id,

    /// Granted [`Role`].
    pub role: Role,
}

#[cfg(test)]
mod spec {
    use super::Role;

    #[test]
    fn parses_lowercase_names() {
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert_eq!("instructor".parse::<Role>().unwrap(), Role::Instructor);
        assert!("admin".parse::<Role>().is_err());

        assert_eq!(Role::Instructor.to_string(), "instructor");
        assert_eq!(Role::ALL, &[Role::Student, Role::Instructor]);
    }
}
