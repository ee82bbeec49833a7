//! [`Profile`] definitions.

use common::{Date, Money};
use derive_more::{AsRef, Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use crate::domain::user;

use super::{Instructor, Transmission};

/// Full public page of an [`Instructor`].
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    /// [`Instructor`] this [`Profile`] describes.
    pub instructor: Instructor,

    /// Free-form presentation text.
    pub bio: String,

    /// Price of a discounted first lesson, if offered.
    pub trial_price: Option<Money>,

    /// [`Vehicle`]s used for lessons.
    pub vehicles: Vec<Vehicle>,

    /// Lesson [`Package`]s on sale.
    pub packages: Vec<Package>,

    /// Short [`PraiseTag`]s students left most often.
    pub praise_tags: Vec<PraiseTag>,

    /// Latest [`Review`]s, newest first.
    pub reviews: Vec<Review>,
}

/// Car used for lessons.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vehicle {
    /// Model and year, like `Chevrolet Onix 2023`.
    pub model: String,

    /// [`Transmission`] of this [`Vehicle`].
    pub transmission: Transmission,

    /// Safety and comfort features of this [`Vehicle`].
    pub features: VehicleFeatures,
}

/// Safety and comfort features of a [`Vehicle`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct VehicleFeatures {
    /// Air conditioning is available.
    pub air_conditioning: bool,

    /// Power steering is available.
    pub power_steering: bool,

    /// Dual brake pedal for the instructor.
    pub dual_command: bool,

    /// The vehicle passed the official inspection.
    pub inspected: bool,
}

/// Bundle of lesson hours sold at once.
#[derive(Clone, Debug, PartialEq)]
pub struct Package {
    /// Display name, like `Pacote 5 aulas`.
    pub name: String,

    /// Number of lesson hours included.
    pub hours: Hours,

    /// Total price of this [`Package`].
    pub price: Money,

    /// [`Discount`] compared to buying single lessons, if any.
    pub discount: Option<Discount>,

    /// Indicator whether this [`Package`] is the trial lesson.
    pub is_trial_lesson: bool,
}

/// Number of lesson hours in a [`Package`].
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Hours(i16);

impl Hours {
    /// Creates new [`Hours`] if the given `hours` are positive.
    #[must_use]
    pub fn new(hours: i16) -> Option<Self> {
        (hours > 0).then_some(Self(hours))
    }
}

/// Discount of a [`Package`] in whole percents.
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Discount(i16);

impl Discount {
    /// Creates a new [`Discount`] if the given `percent` is in `1..=100`.
    #[must_use]
    pub fn new(percent: i16) -> Option<Self> {
        (1..=100).contains(&percent).then_some(Self(percent))
    }
}

/// Short praise students give an [`Instructor`], like `Pontual`.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PraiseTag(String);

impl PraiseTag {
    /// Creates a new [`PraiseTag`] if the given `tag` is not blank.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Option<Self> {
        let tag = tag.into();
        (!tag.trim().is_empty()).then_some(Self(tag))
    }
}

/// Review a student left on an [`Instructor`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Review {
    /// Name of the reviewing student.
    pub author: user::Name,

    /// [`Stars`] given.
    pub stars: Stars,

    /// [`Date`] the review was written.
    pub date: Date,

    /// Review text.
    pub text: String,
}

/// Stars of a single [`Review`] from 1 to 5.
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Stars(i16);

impl Stars {
    /// Creates new [`Stars`] if the given `stars` are in `1..=5`.
    #[must_use]
    pub fn new(stars: i16) -> Option<Self> {
        (1..=5).contains(&stars).then_some(Self(stars))
    }
}
