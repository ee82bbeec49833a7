//! [`Instructor`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{
    graphql_object, GraphQLInputObject, GraphQLObject, GraphQLScalar,
};
use rust_decimal::Decimal;
use service::{domain, read};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    Context,
};

/// Driving instructor as shown in the search listing.
#[derive(Clone, Debug, From)]
pub struct Instructor(domain::Instructor);

/// Driving instructor as shown in the search listing.
#[graphql_object(context = Context)]
impl Instructor {
    /// Unique identifier of this `Instructor`.
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Display name of this `Instructor`.
    pub fn name(&self) -> api::user::Name {
        self.0.name.clone().into()
    }

    /// Initials shown instead of a photo.
    pub fn avatar(&self) -> String {
        self.0.avatar()
    }

    /// Location where this `Instructor` gives lessons, like
    /// `São Paulo, SP - Pinheiros`.
    pub fn location(&self) -> &str {
        AsRef::<str>::as_ref(&self.0.location)
    }

    /// Average rating from `0.0` to `5.0`.
    pub fn rating(&self) -> Rating {
        self.0.rating.into()
    }

    /// Number of reviews the rating is computed from.
    pub fn review_count(&self) -> i32 {
        self.0.review_count.into()
    }

    /// Price of a one hour lesson.
    pub fn price_per_hour(&self) -> Money {
        self.0.price_per_hour
    }

    /// License categories this `Instructor` teaches.
    pub fn categories(&self) -> Vec<Category> {
        self.0.categories.iter().copied().map(Into::into).collect()
    }

    /// Transmission of the lesson car.
    pub fn transmission(&self) -> Transmission {
        self.0.transmission.into()
    }

    /// Indicator whether documents of this `Instructor` were verified.
    pub fn verified(&self) -> bool {
        self.0.verified
    }

    /// Indicator whether this `Instructor` lends a car for the driving test.
    pub fn has_car_for_test(&self) -> bool {
        self.0.has_car_for_test
    }

    /// Years of teaching experience.
    pub fn experience(&self) -> i32 {
        i16::from(self.0.experience).into()
    }
}

/// Unique identifier of an `Instructor`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::instructor::Id)]
#[into(domain::instructor::Id)]
#[graphql(name = "InstructorId", transparent)]
pub struct Id(Uuid);

/// Average rating of an `Instructor`, like `4.9`.
#[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "InstructorRating",
    with = scalar::Via::<domain::instructor::Rating>,
)]
pub struct Rating(domain::instructor::Rating);

/// Driving license category, like `B` or `AB`.
#[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "LicenseCategory",
    with = scalar::Via::<domain::instructor::Category>,
)]
pub struct Category(domain::instructor::Category);

/// Transmission of a lesson car, either `Manual` or `Automático`.
#[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "Transmission",
    with = scalar::Via::<domain::instructor::Transmission>,
)]
pub struct Transmission(domain::instructor::Transmission);

/// Criteria of an `Instructor` search.
///
/// Omitted criteria impose no constraint.
#[derive(Clone, Debug, Default, GraphQLInputObject)]
#[graphql(name = "InstructorFilter")]
pub struct Filter {
    /// Categories of which at least one must be taught.
    pub categories: Option<Vec<Category>>,

    /// Lowest hourly price in reais, inclusive.
    pub min_price: Option<i32>,

    /// Highest hourly price in reais, inclusive.
    pub max_price: Option<i32>,

    /// Minimum average rating.
    pub min_rating: Option<Rating>,

    /// Transmissions of which the lesson car must have one.
    pub transmissions: Option<Vec<Transmission>>,

    /// Required car-for-test availability.
    pub has_car_for_test: Option<bool>,

    /// Part of the location to look for, ignoring case.
    ///
    /// Matched as is, so an empty string imposes no constraint, while a
    /// whitespace-only one still has to be found in the location.
    pub location: Option<String>,
}

impl Filter {
    /// Replaces the `location` of this [`Filter`] with the provided one, if
    /// any.
    #[must_use]
    pub fn with_location(mut self, location: Option<String>) -> Self {
        if location.is_some() {
            self.location = location;
        }
        self
    }
}

impl From<Filter> for read::instructor::list::Filter {
    fn from(filter: Filter) -> Self {
        let Filter {
            categories,
            min_price,
            max_price,
            min_rating,
            transmissions,
            has_car_for_test,
            location,
        } = filter;

        let default = read::instructor::list::PriceRange::default();
        Self {
            categories: categories
                .into_iter()
                .flatten()
                .map(Into::into)
                .collect(),
            price_range: read::instructor::list::PriceRange {
                min: min_price.map_or(default.min, Decimal::from),
                max: max_price.map_or(default.max, Decimal::from),
            },
            min_rating: min_rating.map(Into::into),
            transmissions: transmissions
                .into_iter()
                .flatten()
                .map(Into::into)
                .collect(),
            has_car_for_test,
            location,
        }
    }
}

/// Full public page of an `Instructor`.
#[derive(Clone, Debug, From)]
pub struct Profile(domain::instructor::Profile);

/// Full public page of an `Instructor`.
#[graphql_object(context = Context, name = "InstructorProfile")]
impl Profile {
    /// `Instructor` this `InstructorProfile` describes.
    pub fn instructor(&self) -> Instructor {
        self.0.instructor.clone().into()
    }

    /// Free-form presentation text.
    pub fn bio(&self) -> &str {
        &self.0.bio
    }

    /// Price of a discounted first lesson, if offered.
    pub fn trial_price(&self) -> Option<Money> {
        self.0.trial_price
    }

    /// Cars used for lessons.
    pub fn vehicles(&self) -> Vec<Vehicle> {
        self.0.vehicles.iter().cloned().map(Into::into).collect()
    }

    /// Lesson packages on sale.
    pub fn packages(&self) -> Vec<Package> {
        self.0.packages.iter().cloned().map(Into::into).collect()
    }

    /// Short praises students left most often.
    pub fn praise_tags(&self) -> Vec<String> {
        self.0.praise_tags.iter().map(|t| t.to_string()).collect()
    }

    /// Latest reviews, newest first.
    pub fn reviews(&self) -> Vec<Review> {
        self.0.reviews.iter().cloned().map(Into::into).collect()
    }
}

/// Car used for lessons.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "InstructorVehicle")]
pub struct Vehicle {
    /// Model and year, like `Chevrolet Onix 2023`.
    pub model: String,

    /// Transmission of this car.
    pub transmission: Transmission,

    /// Air conditioning is available.
    pub air_conditioning: bool,

    /// Power steering is available.
    pub power_steering: bool,

    /// Dual brake pedal for the instructor.
    pub dual_command: bool,

    /// The car passed the official inspection.
    pub inspected: bool,
}

impl From<domain::instructor::profile::Vehicle> for Vehicle {
    fn from(vehicle: domain::instructor::profile::Vehicle) -> Self {
        let domain::instructor::profile::Vehicle {
            model,
            transmission,
            features,
        } = vehicle;
        Self {
            model,
            transmission: transmission.into(),
            air_conditioning: features.air_conditioning,
            power_steering: features.power_steering,
            dual_command: features.dual_command,
            inspected: features.inspected,
        }
    }
}

/// Bundle of lesson hours sold at once.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "LessonPackage")]
pub struct Package {
    /// Display name, like `Pacote 5 aulas`.
    pub name: String,

    /// Number of lesson hours included.
    pub hours: i32,

    /// Total price.
    pub price: Money,

    /// Discount in whole percents, if any.
    pub discount: Option<i32>,

    /// Indicator whether this is the trial lesson.
    pub is_trial_lesson: bool,
}

impl From<domain::instructor::profile::Package> for Package {
    fn from(package: domain::instructor::profile::Package) -> Self {
        let domain::instructor::profile::Package {
            name,
            hours,
            price,
            discount,
            is_trial_lesson,
        } = package;
        Self {
            name,
            hours: i16::from(hours).into(),
            price,
            discount: discount.map(|d| i16::from(d).into()),
            is_trial_lesson,
        }
    }
}

/// Review a student left on an `Instructor`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "InstructorReview")]
pub struct Review {
    /// Name of the reviewing student.
    pub author: api::user::Name,

    /// Initials of the reviewing student.
    pub avatar: String,

    /// Stars given, from 1 to 5.
    pub stars: i32,

    /// Date the review was written.
    pub date: Date,

    /// Review text.
    pub text: String,
}

impl From<domain::instructor::profile::Review> for Review {
    fn from(review: domain::instructor::profile::Review) -> Self {
        let domain::instructor::profile::Review {
            author,
            stars,
            date,
            text,
        } = review;
        Self {
            avatar: author.initials(),
            author: author.into(),
            stars: i16::from(stars).into(),
            date,
            text,
        }
    }
}

/// Application of a `User` to teach as an `Instructor`.
#[derive(Clone, Debug, From)]
pub struct Registration(domain::Registration);

/// Application of a `User` to teach as an `Instructor`.
#[graphql_object(context = Context, name = "InstructorRegistration")]
impl Registration {
    /// `User` who applied.
    #[expect(unsafe_code, reason = "invariants are preserved")]
    pub fn user(&self) -> api::User {
        // SAFETY: A `Registration` is stored together with its `User`.
        unsafe { api::User::new_unchecked(self.0.user_id) }
    }

    /// CPF of the applicant, in the `000.000.000-00` mask.
    pub fn cpf(&self) -> String {
        self.0.cpf.masked()
    }

    /// Full legal name of the applicant.
    pub fn full_name(&self) -> &str {
        AsRef::<str>::as_ref(&self.0.full_name)
    }

    /// Date of birth of the applicant.
    pub fn birth_date(&self) -> Date {
        self.0.birth_date
    }

    /// Declared teaching experience, like `1-3`.
    pub fn years_of_experience(&self) -> String {
        self.0.years_of_experience.to_string()
    }

    /// Six-digit instructor license number.
    pub fn license_number(&self) -> &str {
        self.0.license_number.as_ref()
    }

    /// Transmission of the applicant's own vehicle, if they have one.
    pub fn own_vehicle(&self) -> Option<String> {
        self.0.own_vehicle.map(|t| t.to_string())
    }

    /// Public URL of the profile photo, if uploaded.
    pub fn profile_photo_url(&self) -> Option<&str> {
        self.0
            .profile_photo_url
            .as_ref()
            .map(AsRef::<str>::as_ref)
    }

    /// Public URL of the license photo, if uploaded.
    pub fn license_photo_url(&self) -> Option<&str> {
        self.0
            .license_photo_url
            .as_ref()
            .map(AsRef::<str>::as_ref)
    }

    /// `DateTime` when this registration was submitted.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;
    use service::{domain, read::instructor::list};

    use super::{Category, Filter, Transmission};

    #[test]
    fn converts_omitted_criteria_to_no_constraint() {
        assert_eq!(
            list::Filter::from(Filter::default()),
            list::Filter::default(),
        );
    }

    #[test]
    fn converts_prices_to_inclusive_bounds() {
        let filter = list::Filter::from(Filter {
            min_price: Some(80),
            max_price: Some(120),
            ..Filter::default()
        });

        assert_eq!(filter.price_range.min, Decimal::from(80));
        assert_eq!(filter.price_range.max, Decimal::from(120));
        assert!(filter.price_range.contains(Decimal::from(80)));
        assert!(filter.price_range.contains(Decimal::from(120)));
        assert!(!filter.price_range.contains(Decimal::from(121)));
    }

    #[test]
    fn keeps_default_bound_for_omitted_price() {
        let filter = list::Filter::from(Filter {
            max_price: Some(90),
            ..Filter::default()
        });

        assert_eq!(filter.price_range.min, list::PriceRange::default().min);
        assert_eq!(filter.price_range.max, Decimal::from(90));
    }

    #[test]
    fn collects_categories_and_transmissions() {
        let filter = list::Filter::from(Filter {
            categories: Some(vec![
                domain::instructor::Category::B.into(),
                domain::instructor::Category::B.into(),
            ]),
            transmissions: Some(vec![Transmission::from(
                domain::instructor::Transmission::Manual,
            )]),
            has_car_for_test: Some(true),
            ..Filter::default()
        });

        assert_eq!(
            filter.categories,
            [domain::instructor::Category::B].into(),
        );
        assert_eq!(
            filter.transmissions,
            [domain::instructor::Transmission::Manual].into(),
        );
        assert_eq!(filter.has_car_for_test, Some(true));
    }

    #[test]
    fn passes_location_as_is() {
        let filter = list::Filter::from(Filter {
            location: Some("  ".into()),
            ..Filter::default()
        });

        assert_eq!(filter.location.as_deref(), Some("  "));
    }

    #[test]
    fn location_argument_overrides_filter() {
        let filter = Filter {
            location: Some("Moema".into()),
            ..Filter::default()
        };

        let overridden =
            filter.clone().with_location(Some("Pinheiros".into()));
        assert_eq!(overridden.location.as_deref(), Some("Pinheiros"));

        let kept = filter.with_location(None);
        assert_eq!(kept.location.as_deref(), Some("Moema"));
    }

    #[test]
    fn category_wraps_domain_one() {
        let category = Category::from(domain::instructor::Category::Ab);

        assert_eq!(
            domain::instructor::Category::from(category),
            domain::instructor::Category::Ab,
        );
    }
}
