//! [`Instructor`] definitions.

pub mod profile;

use common::{define_kind, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;

pub use self::profile::Profile;

/// Driving instructor as shown in the search listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Instructor {
    /// ID of this [`Instructor`].
    pub id: Id,

    /// Display name of this [`Instructor`].
    pub name: user::Name,

    /// [`Location`] where this [`Instructor`] gives lessons.
    pub location: Location,

    /// Average [`Rating`] of this [`Instructor`].
    pub rating: Rating,

    /// Number of reviews the [`Rating`] is computed from.
    pub review_count: ReviewCount,

    /// Price of a one hour lesson.
    pub price_per_hour: Money,

    /// License [`Category`]s this [`Instructor`] teaches.
    pub categories: Vec<Category>,

    /// [`Transmission`] of the lesson car.
    pub transmission: Transmission,

    /// Indicator whether documents of this [`Instructor`] were verified.
    pub verified: bool,

    /// Indicator whether this [`Instructor`] lends a car for the driving
    /// test.
    pub has_car_for_test: bool,

    /// Teaching [`Experience`] of this [`Instructor`].
    pub experience: Experience,
}

impl Instructor {
    /// Returns the avatar text of this [`Instructor`].
    #[must_use]
    pub fn avatar(&self) -> String {
        self.name.initials()
    }
}

/// ID of an [`Instructor`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

/// Human-readable location of an [`Instructor`], like
/// `São Paulo, SP - Pinheiros`.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`] if the given `location` is not blank.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        (!location.trim().is_empty()).then_some(Self(location))
    }

    /// Checks whether this [`Location`] contains the provided `query`,
    /// ignoring case.
    #[must_use]
    pub fn contains(&self, query: &str) -> bool {
        self.0.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Average rating of an [`Instructor`] from `0.0` to `5.0`.
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Rating(Decimal);

impl Rating {
    /// Maximum possible [`Rating`].
    pub const MAX: Self = Self(Decimal::from_parts(5, 0, 0, false, 0));

    /// Lowest [`Rating`], meaning "no minimum" in filters.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Rating`] if the given `value` is in `0.0..=5.0`.
    ///
    /// The value is rounded to one decimal place.
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Self::MAX.0)
            .contains(&value)
            .then(|| Self(value.round_dp(1)))
    }
}

impl std::str::FromStr for Rating {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| "not a decimal number")?;
        Self::new(value).ok_or("`Rating` must be in `0.0..=5.0`")
    }
}

/// Number of reviews of an [`Instructor`].
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ReviewCount(i32);

impl ReviewCount {
    /// Creates a new [`ReviewCount`] if the given `count` is not negative.
    #[must_use]
    pub fn new(count: i32) -> Option<Self> {
        (count >= 0).then_some(Self(count))
    }
}

/// Years of teaching experience of an [`Instructor`].
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Experience(i16);

impl Experience {
    /// Creates a new [`Experience`] if the given number of `years` is not
    /// negative.
    #[must_use]
    pub fn new(years: i16) -> Option<Self> {
        (years >= 0).then_some(Self(years))
    }
}

define_kind! {
    #[doc = "Brazilian driving license (CNH) category."]
    enum Category {
        #[doc = "Motorcycles."]
        #[str = "A"]
        A = 1,

        #[doc = "Cars."]
        #[str = "B"]
        B = 2,

        #[doc = "Motorcycles and cars."]
        #[str = "AB"]
        Ab = 3,

        #[doc = "Trucks."]
        #[str = "C"]
        C = 4,

        #[doc = "Buses."]
        #[str = "D"]
        D = 5,

        #[doc = "Articulated vehicles."]
        #[str = "E"]
        E = 6,
    }
}

define_kind! {
    #[doc = "Transmission of a lesson car."]
    enum Transmission {
        #[doc = "Manual gearbox."]
        #[str = "Manual"]
        Manual = 1,

        #[doc = "Automatic gearbox."]
        #[str = "Automático"]
        Automatic = 2,
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Location, Rating, Transmission};

    #[test]
    fn rating_is_bounded() {
        assert!(Rating::new(Decimal::new(49, 1)).is_some());
        assert!(Rating::new(Decimal::ZERO).is_some());
        assert_eq!(Rating::new(Decimal::new(5, 0)), Some(Rating::MAX));
        assert!(Rating::new(Decimal::new(51, 1)).is_none());
        assert!(Rating::new(Decimal::new(-1, 1)).is_none());

        assert_eq!("4.5".parse::<Rating>().unwrap().to_string(), "4.5");
        assert!("5.5".parse::<Rating>().is_err());
        assert!("high".parse::<Rating>().is_err());
    }

    #[test]
    fn location_matches_ignoring_case() {
        let location = Location::new("São Paulo, SP - Pinheiros").unwrap();

        assert!(location.contains("pinheiros"));
        assert!(location.contains("SÃO PAULO"));
        assert!(location.contains(""));
        assert!(!location.contains("Moema"));
    }

    #[test]
    fn transmission_keeps_listing_labels() {
        assert_eq!(Transmission::Automatic.to_string(), "Automático");
        assert_eq!(
            "Manual".parse::<Transmission>().unwrap(),
            Transmission::Manual,
        );
    }
}
