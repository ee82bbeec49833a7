//! [`Instructor`]-related read definitions.
//!
//! [`Instructor`]: crate::domain::Instructor

pub mod list {
    //! [`Instructor`] search listing definitions.

    use std::collections::HashSet;

    use rust_decimal::Decimal;
    use smart_default::SmartDefault;

    #[cfg(doc)]
    use crate::domain::Instructor;
    use crate::domain::instructor::{self, Category, Rating, Transmission};

    /// Whole [`Instructor`] listing, in its stable order.
    pub type Listing = Vec<crate::domain::Instructor>;

    /// Closed interval of hourly prices, in reais.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, SmartDefault)]
    pub struct PriceRange {
        /// Lowest accepted price, inclusive.
        #[default(Decimal::ZERO)]
        pub min: Decimal,

        /// Highest accepted price, inclusive.
        #[default(Decimal::MAX)]
        pub max: Decimal,
    }

    impl PriceRange {
        /// Checks whether the provided `price` lies within this
        /// [`PriceRange`], bounds included.
        #[must_use]
        pub fn contains(&self, price: Decimal) -> bool {
            (self.min..=self.max).contains(&price)
        }
    }

    /// Criteria of an [`Instructor`] search.
    ///
    /// An empty or default criterion imposes no constraint, so
    /// [`Filter::default()`] matches every [`Instructor`].
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Filter {
        /// [`Category`]s of which at least one must be taught.
        pub categories: HashSet<Category>,

        /// [`PriceRange`] the hourly price must fall into.
        pub price_range: PriceRange,

        /// Minimum [`Rating`], if any.
        pub min_rating: Option<Rating>,

        /// [`Transmission`]s of which the lesson car must have one.
        pub transmissions: HashSet<Transmission>,

        /// Required car-for-test availability, if any.
        pub has_car_for_test: Option<bool>,

        /// Part of the [`Instructor`]'s location to look for, ignoring case.
        pub location: Option<String>,
    }

    impl Filter {
        /// Checks whether the provided [`Instructor`] satisfies every active
        /// criterion of this [`Filter`].
        #[must_use]
        pub fn matches(&self, instructor: &instructor::Instructor) -> bool {
            let Self {
                categories,
                price_range,
                min_rating,
                transmissions,
                has_car_for_test,
                location,
            } = self;

            (categories.is_empty()
                || instructor.categories.iter().any(|c| categories.contains(c)))
                && price_range.contains(instructor.price_per_hour.amount)
                && min_rating.map_or(true, |min| instructor.rating >= min)
                && (transmissions.is_empty()
                    || transmissions.contains(&instructor.transmission))
                && has_car_for_test
                    .map_or(true, |has| instructor.has_car_for_test == has)
                && location
                    .as_deref()
                    .map_or(true, |query| instructor.location.contains(query))
        }

        /// Selects the [`Instructor`]s of the provided `listing` satisfying
        /// this [`Filter`], preserving their order.
        #[must_use]
        pub fn apply(&self, listing: Listing) -> Listing {
            listing.into_iter().filter(|i| self.matches(i)).collect()
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Money;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::domain::{
        instructor::{
            Category, Experience, Location, Rating, ReviewCount, Transmission,
        },
        user, Instructor,
    };

    use super::list::{Filter, PriceRange};

    #[expect(clippy::too_many_arguments, reason = "test fixture")]
    fn instructor(
        n: u128,
        name: &str,
        bairro: &str,
        rating: (i64, u32),
        price: i64,
        categories: &[Category],
        transmission: Transmission,
        has_car_for_test: bool,
    ) -> Instructor {
        Instructor {
            id: Uuid::from_u128(n).into(),
            name: user::Name::new(name).unwrap(),
            location: Location::new(format!("São Paulo, SP - {bairro}"))
                .unwrap(),
            rating: Rating::new(Decimal::new(rating.0, rating.1)).unwrap(),
            review_count: ReviewCount::new(10).unwrap(),
            price_per_hour: Money::brl(Decimal::from(price)),
            categories: categories.to_vec(),
            transmission,
            verified: true,
            has_car_for_test,
            experience: Experience::new(5).unwrap(),
        }
    }

    #[rustfmt::skip]
    fn listing() -> Vec<Instructor> {
        use Category as C;
        use Transmission as T;

        vec![
            instructor(1, "Carlos Oliveira", "Pinheiros", (49, 1), 85, &[C::B], T::Manual, true),
            instructor(2, "Ana Paula Santos", "Moema", (48, 1), 95, &[C::A, C::B], T::Automatic, true),
            instructor(3, "Roberto Silva", "Santana", (47, 1), 70, &[C::B], T::Manual, false),
            instructor(4, "Fernanda Costa", "Itaim Bibi", (50, 1), 120, &[C::B], T::Automatic, true),
            instructor(5, "Marcos Pereira", "Vila Mariana", (46, 1), 75, &[C::A, C::B, C::C], T::Manual, true),
            instructor(6, "Juliana Lima", "Tatuapé", (49, 1), 90, &[C::B], T::Automatic, true),
        ]
    }

    fn names(listing: &[Instructor]) -> Vec<&str> {
        listing
            .iter()
            .map(|i| AsRef::<str>::as_ref(&i.name))
            .collect()
    }

    #[test]
    fn default_filter_keeps_everything_in_order() {
        let all = listing();
        assert_eq!(Filter::default().apply(all.clone()), all);
    }

    #[test]
    fn category_filter_intersects() {
        let filter = Filter {
            categories: [Category::A].into(),
            price_range: PriceRange {
                min: Decimal::from(50),
                max: Decimal::from(200),
            },
            ..Filter::default()
        };

        assert_eq!(
            names(&filter.apply(listing())),
            ["Ana Paula Santos", "Marcos Pereira"],
        );

        let filter = Filter {
            categories: [Category::C, Category::D].into(),
            ..Filter::default()
        };
        assert_eq!(names(&filter.apply(listing())), ["Marcos Pereira"]);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let filter = Filter {
            price_range: PriceRange {
                min: Decimal::from(85),
                max: Decimal::from(95),
            },
            ..Filter::default()
        };

        assert_eq!(
            names(&filter.apply(listing())),
            ["Carlos Oliveira", "Ana Paula Santos", "Juliana Lima"],
        );
    }

    #[test]
    fn rating_transmission_and_car_criteria() {
        let filter = Filter {
            min_rating: Rating::new(Decimal::new(49, 1)),
            transmissions: [Transmission::Automatic].into(),
            has_car_for_test: Some(true),
            ..Filter::default()
        };
        assert_eq!(
            names(&filter.apply(listing())),
            ["Fernanda Costa", "Juliana Lima"],
        );

        let filter = Filter {
            has_car_for_test: Some(false),
            ..Filter::default()
        };
        assert_eq!(names(&filter.apply(listing())), ["Roberto Silva"]);
    }

    #[test]
    fn location_matches_substring_ignoring_case() {
        let filter = Filter {
            location: Some("vila".into()),
            ..Filter::default()
        };
        assert_eq!(names(&filter.apply(listing())), ["Marcos Pereira"]);

        let filter = Filter {
            location: Some(String::new()),
            ..Filter::default()
        };
        assert_eq!(filter.apply(listing()).len(), 6);
    }

    #[test]
    fn whitespace_location_is_matched_literally() {
        let filter = Filter {
            location: Some(" ".into()),
            ..Filter::default()
        };
        assert_eq!(filter.apply(listing()).len(), 6);

        let filter = Filter {
            location: Some("  ".into()),
            ..Filter::default()
        };
        assert!(filter.apply(listing()).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let filter = Filter {
            categories: [Category::B].into(),
            price_range: PriceRange {
                min: Decimal::from(70),
                max: Decimal::from(100),
            },
            transmissions: [Transmission::Manual].into(),
            ..Filter::default()
        };

        let once = filter.apply(listing());
        assert_eq!(filter.apply(once.clone()), once);
    }
}
