//! [`Query`] collection related to the [`Instructor`] listing.

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Instructor;
use crate::{
    infra::{database, Database},
    read::instructor::list::{Filter, Listing},
    Service,
};

use super::Query;

/// Searches the [`Instructor`] listing with the provided [`Filter`].
///
/// The whole listing is loaded and narrowed in memory, keeping its order.
#[derive(Clone, Debug, Default)]
pub struct Search {
    /// [`Filter`] to apply.
    pub filter: Filter,
}

impl<Db, St> Query<Search> for Service<Db, St>
where
    Db: Database<
        Select<By<Listing, ()>>,
        Ok = Listing,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Listing;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Search { filter }: Search,
    ) -> Result<Self::Ok, Self::Err> {
        let listing = self
            .database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(filter.apply(listing))
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::{By, Select}, Money};
    use rust_decimal::Decimal;
    use tracerr::Traced;
    use uuid::Uuid;

    use crate::{
        domain::{
            instructor::{
                Category, Experience, Location, Rating, ReviewCount,
                Transmission,
            },
            user, Instructor,
        },
        infra::{database, Database},
        read::instructor::list::{Filter, Listing},
        service_for_tests, Query as _,
    };

    use super::Search;

    #[derive(Clone, Debug)]
    struct Catalog(Listing);

    impl Database<Select<By<Listing, ()>>> for Catalog {
        type Ok = Listing;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Select<By<Listing, ()>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(self.0.clone())
        }
    }

    fn instructor(n: u128, name: &str, transmission: Transmission) -> Instructor {
        Instructor {
            id: Uuid::from_u128(n).into(),
            name: user::Name::new(name).unwrap(),
            location: Location::new("São Paulo, SP - Moema").unwrap(),
            rating: Rating::new(Decimal::new(48, 1)).unwrap(),
            review_count: ReviewCount::new(3).unwrap(),
            price_per_hour: Money::brl(Decimal::from(80)),
            categories: vec![Category::B],
            transmission,
            verified: false,
            has_car_for_test: true,
            experience: Experience::new(2).unwrap(),
        }
    }

    #[tokio::test]
    async fn narrows_loaded_listing() {
        let svc = service_for_tests(Catalog(vec![
            instructor(1, "Carlos Oliveira", Transmission::Manual),
            instructor(2, "Juliana Lima", Transmission::Automatic),
        ]));

        let found = svc
            .execute(Search {
                filter: Filter {
                    transmissions: [Transmission::Automatic].into(),
                    ..Filter::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.to_string(), "Juliana Lima");

        let all = svc.execute(Search::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
