//! Read-only [`Query`]s of the marketplace.
//!
//! Lookups of a single row are [`DatabaseQuery`] aliases, while the
//! [`instructors::Search`] narrows the whole listing.

pub mod instructor;
pub mod instructors;
pub mod registration;
pub mod user;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] passing a [`Select`] of a `T`ype straight to the [`Database`],
/// with no checks of its own.
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W`hat by the provided
    /// `B`y value.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, St, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db, St>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}
