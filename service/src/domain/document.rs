//! [`Document`] definitions.

use common::define_kind;
use derive_more::{AsRef, Debug, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use crate::domain::user;
#[cfg(doc)]
use crate::domain::Registration;

/// Photo of a document attached to a [`Registration`].
#[derive(Clone, Debug)]
pub struct Document {
    /// [`Kind`] of this [`Document`].
    pub kind: Kind,

    /// ID of the [`user::User`] this [`Document`] belongs to.
    pub owner: user::Id,

    /// [`ContentType`] of the photo.
    pub content_type: ContentType,

    /// Raw bytes of the photo.
    #[debug(skip)]
    pub bytes: Vec<u8>,
}

impl Document {
    /// [`Bucket`] all the [`Document`]s are stored in.
    pub const BUCKET: Bucket = Bucket("instructor-documents");

    /// Default maximum size of a [`Document`], in bytes.
    pub const MAX_SIZE: usize = 5 * 1024 * 1024;

    /// Returns the [`Key`] this [`Document`] is stored under.
    ///
    /// Uploading the same [`Kind`] for the same owner again replaces the
    /// stored object.
    #[must_use]
    pub fn key(&self) -> Key {
        Key(format!(
            "{}/{}.{}",
            self.owner,
            self.kind,
            self.content_type.extension(),
        ))
    }
}

define_kind! {
    #[doc = "Kind of a [`Document`]."]
    enum Kind {
        #[doc = "Photo of the applicant shown on their profile."]
        #[str = "profile-photo"]
        ProfilePhoto = 1,

        #[doc = "Photo of the applicant's instructor license."]
        #[str = "license-photo"]
        LicensePhoto = 2,
    }
}

define_kind! {
    #[doc = "Accepted image format of a [`Document`]."]
    enum ContentType {
        #[doc = "JPEG image."]
        #[str = "image/jpeg"]
        Jpeg = 1,

        #[doc = "PNG image."]
        #[str = "image/png"]
        Png = 2,

        #[doc = "WebP image."]
        #[str = "image/webp"]
        Webp = 3,
    }
}

impl ContentType {
    /// Returns the file extension for this [`ContentType`].
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// Named group of stored objects.
#[derive(AsRef, Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str)]
pub struct Bucket(&'static str);

/// Path of a stored [`Document`] inside its [`Bucket`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str)]
pub struct Key(String);

/// Publicly reachable URL of a stored [`Document`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PublicUrl(String);

impl PublicUrl {
    /// Builds the [`PublicUrl`] of the object stored under the provided
    /// [`Key`] in the provided [`Bucket`], served from the `base` URL.
    #[must_use]
    pub fn new(base: &str, bucket: Bucket, key: &Key) -> Self {
        Self(format!("{}/{bucket}/{key}", base.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod spec {
    use uuid::Uuid;

    use crate::domain::user;

    use super::{ContentType, Document, Kind, PublicUrl};

    #[test]
    fn key_is_scoped_by_owner() {
        let owner = user::Id::from(
            Uuid::parse_str("6e1f1a52-8f0c-4a5b-9d1e-0c2b4f3a7d10").unwrap(),
        );
        let doc = Document {
            kind: Kind::LicensePhoto,
            owner,
            content_type: ContentType::Webp,
            bytes: vec![],
        };

        let key = doc.key();
        assert_eq!(
            key.as_ref(),
            "6e1f1a52-8f0c-4a5b-9d1e-0c2b4f3a7d10/license-photo.webp",
        );
        let url = PublicUrl::new(
            "http://localhost:8080/storage/",
            Document::BUCKET,
            &key,
        );
        assert_eq!(
            url.to_string(),
            "http://localhost:8080/storage/instructor-documents/\
             6e1f1a52-8f0c-4a5b-9d1e-0c2b4f3a7d10/license-photo.webp",
        );
    }

    #[test]
    fn accepts_only_images() {
        assert_eq!(
            "image/png".parse::<ContentType>().unwrap(),
            ContentType::Png,
        );
        assert!("application/pdf".parse::<ContentType>().is_err());
        assert_eq!(ContentType::Jpeg.extension(), "jpg");
    }
}
