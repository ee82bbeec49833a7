//! [`Query`] collection related to a single [`Instructor`].

use common::operations::By;

use crate::domain::instructor::{self, Profile};
#[cfg(doc)]
use crate::{domain::Instructor, Query};

use super::DatabaseQuery;

/// Queries a [`Profile`] of an [`Instructor`] by its [`instructor::Id`].
pub type ProfileById = DatabaseQuery<By<Option<Profile>, instructor::Id>>;
