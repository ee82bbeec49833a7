//! GraphQL API definitions.

pub mod instructor;
mod mutation;
mod query;
pub mod scalar;
mod subscription;
pub mod user;

use crate::define_error;

pub use self::{
    instructor::Instructor,
    mutation::Mutation,
    query::{AccessDecision, Query},
    subscription::{AuthState, Subscription},
    user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum PrivilegeError {
        #[code = "NOT_INSTRUCTOR"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be an instructor"]
        Instructor,
    }
}
