//! [`User`] definitions.

pub mod role;
pub mod session;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHasher as _, PasswordVerifier as _,
        SaltString,
    },
    Argon2,
};
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::{role::Role, session::Session};

/// Account of a student or an instructor.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`], used for signing in.
    pub email: Email,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Display name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Returns initials of the first two words of this [`Name`].
    ///
    /// `Ana Paula Santos` becomes `AP`.
    #[must_use]
    pub fn initials(&self) -> String {
        self.0
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.chars().count() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Plain-text password of a [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Minimum number of characters in a [`Password`].
    pub const MIN_LEN: usize = 6;

    /// Maximum number of characters in a [`Password`].
    pub const MAX_LEN: usize = 128;

    /// Creates a new [`Password`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `password` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let len = password.as_ref().chars().count();
        (Self::MIN_LEN..=Self::MAX_LEN).contains(&len)
    }
}

impl PartialEq<str> for Password {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Argon2 hash of a [`User`]'s [`Password`], in the PHC string format.
///
/// Every hash carries its own random salt, so equal passwords produce
/// different hashes.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the given [`Password`] with a freshly generated salt.
    ///
    /// # Errors
    ///
    /// If the hashing fails.
    pub fn new(password: &Password) -> Result<Self, password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.0.as_bytes(), &salt)?
            .to_string();
        Ok(Self(hash))
    }

    /// Checks whether this [`PasswordHash`] matches the given [`Password`].
    ///
    /// A malformed stored hash matches nothing.
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        password_hash::PasswordHash::new(&self.0).is_ok_and(|hash| {
            Argon2::default()
                .verify_password(password.0.as_bytes(), &hash)
                .is_ok()
        })
    }
}

/// Email address of a [`User`].
///
/// Always stored lower-cased, so lookups are case-insensitive.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format and
    /// is lower-cased.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl AsRef<str>) -> Option<Self> {
        let address = address.as_ref().trim().to_lowercase();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking `local@domain.tld` shape of an
        /// [`Email`].
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                r"^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([a-z0-9]([a-z0-9-]*[a-z0-9])?\.)+[a-z0-9]([a-z0-9-]*[a-z0-9])?$",
            )
            .expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 254 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Email, Name, Password, PasswordHash};

    #[test]
    fn email_is_normalized() {
        let email = Email::new("  Maria.Silva@Example.COM ").unwrap();
        assert_eq!(email.to_string(), "maria.silva@example.com");

        assert!(Email::new("maria@").is_none());
        assert!(Email::new("maria.example.com").is_none());
        assert!(Email::new("maria@example").is_none());
        assert!(Email::new("").is_none());
    }

    #[test]
    fn password_length_is_bounded() {
        assert!(Password::new("12345").is_none());
        assert!(Password::new("123456").is_some());
        assert!(Password::new("x".repeat(128)).is_some());
        assert!(Password::new("x".repeat(129)).is_none());
    }

    #[test]
    fn password_hash_verifies_only_its_password() {
        let password = Password::new("segredo1").unwrap();

        let hash = PasswordHash::new(&password).unwrap();

        assert!(hash.to_string().starts_with("$argon2id$"));
        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("segredo2").unwrap()));
    }

    #[test]
    fn password_hash_is_salted() {
        let password = Password::new("segredo1").unwrap();

        let (first, second) = (
            PasswordHash::new(&password).unwrap(),
            PasswordHash::new(&password).unwrap(),
        );

        assert_ne!(first, second);
        assert!(first.verify(&password));
        assert!(second.verify(&password));
    }

    #[test]
    fn malformed_password_hash_matches_nothing() {
        let hash = PasswordHash("not-a-phc-string".into());

        assert!(!hash.verify(&Password::new("segredo1").unwrap()));
    }

    #[test]
    fn initials_use_first_two_words() {
        assert_eq!(Name::new("Ana Paula Santos").unwrap().initials(), "AP");
        assert_eq!(Name::new("Carlos Oliveira").unwrap().initials(), "CO");
        assert_eq!(Name::new("juliana").unwrap().initials(), "J");
    }

    #[test]
    fn name_rejects_padding() {
        assert!(Name::new(" Maria").is_none());
        assert!(Name::new("").is_none());
        assert!(Name::new("Maria Silva").is_some());
    }
}
