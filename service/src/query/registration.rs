//! [`Query`] collection related to an instructor [`Registration`].

use common::operations::By;

use crate::domain::{user, Registration};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Registration`] by the [`user::Id`] of its applicant.
pub type ByUserId = DatabaseQuery<By<Option<Registration>, user::Id>>;
