//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use xxhash_rust::xxh3;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Claims of a signed-in [`User`] session.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Bearer access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
#[as_ref(str)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// Record of a [`Token`] revoked by signing out.
///
/// Kept until the [`Token`] would have expired on its own.
#[derive(Clone, Copy, Debug)]
pub struct Revocation {
    /// [`Fingerprint`] of the revoked [`Token`].
    pub fingerprint: Fingerprint,

    /// [`DateTime`] when the revoked [`Token`] expires.
    pub expires_at: ExpirationDateTime,
}

/// Fingerprint identifying a [`Token`] without storing it.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "postgres",
    derive(postgres_types::FromSql, postgres_types::ToSql),
    postgres(transparent)
)]
pub struct Fingerprint(Uuid);

impl Fingerprint {
    /// Computes the [`Fingerprint`] of the provided [`Token`].
    #[must_use]
    pub fn of(token: &Token) -> Self {
        Self(Uuid::from_u128(xxh3::xxh3_128(token.0.as_bytes())))
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

#[cfg(test)]
mod spec {
    use super::{Fingerprint, Token};

    #[test]
    fn fingerprint_is_stable() {
        let token: Token = "header.claims.signature".parse().unwrap();
        let other: Token = "header.claims.other".parse().unwrap();

        assert_eq!(Fingerprint::of(&token), Fingerprint::of(&token));
        assert_ne!(Fingerprint::of(&token), Fingerprint::of(&other));
    }
}
