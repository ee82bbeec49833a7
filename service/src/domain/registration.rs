//! Instructor [`Registration`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateTimeOf};
use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;

use crate::domain::{document, user};
#[cfg(doc)]
use crate::domain::{Instructor, User};

/// Application of a [`User`] to teach as an [`Instructor`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Registration {
    /// ID of the [`User`] who applied.
    pub user_id: user::Id,

    /// [`Cpf`] of the applicant.
    pub cpf: Cpf,

    /// [`FullName`] of the applicant, as in the documents.
    pub full_name: FullName,

    /// [`Date`] of birth of the applicant.
    pub birth_date: Date,

    /// Public URL of the profile photo, if uploaded.
    pub profile_photo_url: Option<document::PublicUrl>,

    /// Declared teaching experience.
    pub years_of_experience: YearsOfExperience,

    /// Instructor [`LicenseNumber`].
    pub license_number: LicenseNumber,

    /// Public URL of the instructor license photo, if uploaded.
    pub license_photo_url: Option<document::PublicUrl>,

    /// [`TransmissionType`] of the applicant's own vehicle, if they have one.
    pub own_vehicle: Option<TransmissionType>,

    /// [`DateTime`] when this [`Registration`] was submitted.
    pub created_at: CreationDateTime,
}

impl Registration {
    /// Minimum age, in calendar years, to register as an [`Instructor`].
    pub const MIN_AGE: i32 = 21;

    /// Indicator whether the applicant has their own vehicle.
    #[must_use]
    pub fn has_own_vehicle(&self) -> bool {
        self.own_vehicle.is_some()
    }

    /// Checks whether a person born on the provided `birth_date` is old
    /// enough to register as of `today`.
    ///
    /// Only calendar years are compared, so everybody born in a given year
    /// becomes eligible on January 1st.
    #[must_use]
    pub fn is_old_enough(birth_date: Date, today: Date) -> bool {
        birth_date.calendar_years_until(today) >= Self::MIN_AGE
    }
}

/// Brazilian individual taxpayer number, stored as 11 digits.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Cpf(String);

impl Cpf {
    /// Parses a [`Cpf`] typed in the `000.000.000-00` mask.
    #[must_use]
    pub fn from_masked(input: &str) -> Option<Self> {
        /// Regular expression checking the `000.000.000-00` mask.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[0-9]{3}\.[0-9]{3}\.[0-9]{3}-[0-9]{2}$")
                .expect("valid regex")
        });

        REGEX.is_match(input).then(|| {
            Self(input.chars().filter(char::is_ascii_digit).collect())
        })
    }

    /// Formats this [`Cpf`] back into the `000.000.000-00` mask.
    #[must_use]
    pub fn masked(&self) -> String {
        let d = &self.0;
        format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..])
    }
}

/// Full legal name of a [`Registration`] applicant.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct FullName(String);

impl FullName {
    /// Minimum number of characters in a [`FullName`].
    pub const MIN_LEN: usize = 3;

    /// Creates a new [`FullName`] if the given `name` is long enough.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (name.chars().count() >= Self::MIN_LEN).then_some(Self(name))
    }
}

/// Six-digit instructor license number.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct LicenseNumber(String);

impl LicenseNumber {
    /// Creates a new [`LicenseNumber`] if the given `number` consists of
    /// exactly 6 digits.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        (number.len() == 6 && number.chars().all(|c| c.is_ascii_digit()))
            .then_some(Self(number))
    }
}

define_kind! {
    #[doc = "Teaching experience declared in a [`Registration`]."]
    enum YearsOfExperience {
        #[doc = "Less than a year."]
        #[str = "less-than-1"]
        LessThanOne = 1,

        #[doc = "From one to three years."]
        #[str = "1-3"]
        OneToThree = 2,

        #[doc = "From three to five years."]
        #[str = "3-5"]
        ThreeToFive = 3,

        #[doc = "From five to ten years."]
        #[str = "5-10"]
        FiveToTen = 4,

        #[doc = "More than ten years."]
        #[str = "more-than-10"]
        MoreThanTen = 5,
    }
}

define_kind! {
    #[doc = "Transmission of a [`Registration`] applicant's own vehicle."]
    enum TransmissionType {
        #[doc = "Manual gearbox."]
        #[str = "manual"]
        Manual = 1,

        #[doc = "Automatic gearbox."]
        #[str = "automatic"]
        Automatic = 2,

        #[doc = "Both a manual and an automatic vehicle."]
        #[str = "both"]
        Both = 3,
    }
}

/// [`DateTime`] when a [`Registration`] was submitted.
pub type CreationDateTime = DateTimeOf<(Registration, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::Date;

    use super::{Cpf, FullName, LicenseNumber, Registration, YearsOfExperience};

    #[test]
    fn cpf_requires_mask() {
        let cpf = Cpf::from_masked("123.456.789-09").unwrap();
        assert_eq!(cpf.as_ref(), "12345678909");
        assert_eq!(cpf.masked(), "123.456.789-09");

        assert!(Cpf::from_masked("12345678909").is_none());
        assert!(Cpf::from_masked("123.456.789-0").is_none());
        assert!(Cpf::from_masked("123.456.789-0a").is_none());
        assert!(Cpf::from_masked(" 123.456.789-09").is_none());
    }

    #[test]
    fn license_number_is_six_digits() {
        assert!(LicenseNumber::new("123456").is_some());
        assert!(LicenseNumber::new("12345").is_none());
        assert!(LicenseNumber::new("1234567").is_none());
        assert!(LicenseNumber::new("12345a").is_none());
    }

    #[test]
    fn full_name_has_three_chars() {
        assert!(FullName::new("Ana").is_some());
        assert!(FullName::new("Jo").is_none());
    }

    #[test]
    fn age_compares_calendar_years() {
        let today = Date::from_calendar_date(2025, 3, 10).unwrap();

        let born = |y, m, d| Date::from_calendar_date(y, m, d).unwrap();
        assert!(Registration::is_old_enough(born(2004, 12, 31), today));
        assert!(Registration::is_old_enough(born(1980, 1, 1), today));
        assert!(!Registration::is_old_enough(born(2005, 1, 1), today));
    }

    #[test]
    fn years_of_experience_uses_form_values() {
        assert_eq!(
            "less-than-1".parse::<YearsOfExperience>().unwrap(),
            YearsOfExperience::LessThanOne,
        );
        assert_eq!(YearsOfExperience::FiveToTen.to_string(), "5-10");
        assert!("".parse::<YearsOfExperience>().is_err());
    }
}
