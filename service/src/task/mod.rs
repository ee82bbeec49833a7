//! Background [`Task`]s definitions.

pub mod background;
pub mod clean_revoked_sessions;

pub use common::Handler as Task;

pub use self::{
    background::Background, clean_revoked_sessions::CleanRevokedSessions,
};
