//! [`Query`] collection related to a [`User`] account.

use common::operations::By;

use crate::domain::{
    user::{self, Role},
    User,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`User`] account by its [`user::Id`].
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;

/// Queries the [`Role`] assigned to a [`User`], if any.
///
/// [`User`]s have no [`Role`] between signing up and choosing one.
pub type RoleById = DatabaseQuery<By<Option<Role>, user::Id>>;
