//! Read entities definitions.

pub mod instructor;
