//! [`Command`] definition.

pub mod assign_user_role;
pub mod authorize_user_session;
pub mod create_user;
pub mod create_user_session;
pub mod delete_user_session;
pub mod register_instructor;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    assign_user_role::AssignUserRole,
    authorize_user_session::AuthorizeUserSession, create_user::CreateUser,
    create_user_session::CreateUserSession,
    delete_user_session::DeleteUserSession,
    register_instructor::RegisterInstructor,
};
