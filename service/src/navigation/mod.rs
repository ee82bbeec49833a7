//! Navigation rules of the client views.
//!
//! Views are addressed by [`Route`]s, and every [`Route`] carries a
//! [`Policy`] the [`guard`] enforces for the current [`SessionState`].

pub mod guard;
pub mod route;

pub use self::{
    guard::{Decision, SessionState, Viewer},
    route::{Policy, Route},
};
