//! Marker types distinguishing same-typed values of an entity.

/// Marker of the moment an entity was created at.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker of the moment something expires at.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
