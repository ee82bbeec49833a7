//! Domain definitions.

pub mod document;
pub mod instructor;
pub mod registration;
pub mod user;

pub use self::{
    document::Document, instructor::Instructor, registration::Registration,
    user::User,
};
