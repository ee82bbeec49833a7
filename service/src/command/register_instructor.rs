//! [`Command`] for registering a new instructor.

use common::{
    operations::{By, Commit, Delete, Insert, Select, Transact, Transacted},
    Date, DateTime,
};
use derive_more::{Debug, Display, Error, From};
use secrecy::{ExposeSecret, SecretBox, SecretString};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Instructor;
use crate::{
    domain::{
        document::{self, ContentType},
        registration::{
            Cpf, FullName, LicenseNumber, TransmissionType, YearsOfExperience,
        },
        user::{self, role, Role},
        Document, Registration, User,
    },
    infra::{
        database::{self, constraint},
        storage, Database, Storage,
    },
    Service,
};

use super::Command;

/// [`Command`] for signing up a new [`User`] applying to teach as an
/// [`Instructor`].
///
/// Uploaded [`Document`]s are deleted again if the [`Registration`] fails to
/// be stored.
#[derive(Debug)]
pub struct RegisterInstructor {
    /// [`Cpf`] of the applicant.
    pub cpf: Cpf,

    /// [`FullName`] of the applicant, also used as the [`User`] name.
    pub full_name: FullName,

    /// [`Date`] of birth of the applicant.
    pub birth_date: Date,

    /// Declared teaching experience.
    pub years_of_experience: YearsOfExperience,

    /// Instructor [`LicenseNumber`].
    pub license_number: LicenseNumber,

    /// [`TransmissionType`] of the applicant's own vehicle, if any.
    pub own_vehicle: Option<TransmissionType>,

    /// [`user::Email`] to sign in with.
    pub email: user::Email,

    /// [`user::Password`] to sign in with.
    pub password: SecretBox<user::Password>,

    /// Repeated [`user::Password`].
    pub password_confirmation: SecretString,

    /// Profile [`Photo`], if attached.
    pub profile_photo: Option<Photo>,

    /// License [`Photo`], if attached.
    pub license_photo: Option<Photo>,
}

/// Uploaded photo to be stored as a [`Document`].
#[derive(Clone, Debug)]
pub struct Photo {
    /// [`ContentType`] of the photo.
    pub content_type: ContentType,

    /// Raw bytes of the photo.
    #[debug(skip)]
    pub bytes: Vec<u8>,
}

/// Output of [`RegisterInstructor`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Created [`User`].
    pub user: User,

    /// Stored [`Registration`].
    pub registration: Registration,
}

impl<Db, St> Command<RegisterInstructor> for Service<Db, St>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Insert<Registration>, Err = Traced<database::Error>>
        + Database<Insert<role::Assignment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    St: Storage<
            Insert<Document>,
            Ok = document::PublicUrl,
            Err = Traced<storage::Error>,
        > + Storage<
            Delete<By<Document, document::Key>>,
            Ok = (),
            Err = Traced<storage::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RegisterInstructor,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterInstructor {
            cpf,
            full_name,
            birth_date,
            years_of_experience,
            license_number,
            own_vehicle,
            email,
            password,
            password_confirmation,
            profile_photo,
            license_photo,
        } = cmd;

        if *password.expose_secret() != *password_confirmation.expose_secret()
        {
            return Err(tracerr::new!(E::PasswordMismatch));
        }
        if !Registration::is_old_enough(birth_date, Date::today()) {
            return Err(tracerr::new!(E::TooYoung));
        }
        let name = user::Name::new(AsRef::<str>::as_ref(&full_name))
            .ok_or(E::InvalidName)
            .map_err(tracerr::wrap!())?;
        let photos = [
            (document::Kind::ProfilePhoto, profile_photo),
            (document::Kind::LicensePhoto, license_photo),
        ];
        for (kind, photo) in &photos {
            if photo
                .as_ref()
                .is_some_and(|p| p.bytes.len() > self.config().max_document_size)
            {
                return Err(tracerr::new!(E::DocumentTooLarge(*kind)));
            }
        }

        let existing = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let id = user::Id::new();
        let user = User {
            id,
            name,
            email,
            password_hash: user::PasswordHash::new(password.expose_secret())
                .map_err(E::PasswordHashing)
                .map_err(tracerr::wrap!())?,
            created_at: DateTime::now().coerce(),
        };

        let mut uploaded = Vec::new();
        let outcome = async {
            let mut urls = [None, None];
            for (url, (kind, photo)) in urls.iter_mut().zip(photos) {
                let Some(Photo {
                    content_type,
                    bytes,
                }) = photo
                else {
                    continue;
                };
                let doc = Document {
                    kind,
                    owner: id,
                    content_type,
                    bytes,
                };
                let key = doc.key();
                *url = Some(
                    self.storage()
                        .execute(Insert(doc))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))?,
                );
                uploaded.push(key);
            }
            let [profile_photo_url, license_photo_url] = urls;

            let registration = Registration {
                user_id: id,
                cpf,
                full_name,
                birth_date,
                profile_photo_url,
                years_of_experience,
                license_number,
                license_photo_url,
                own_vehicle,
                created_at: DateTime::now().coerce(),
            };

            let tx = self
                .database()
                .execute(Transact)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            tx.execute(Insert(user.clone()))
                .await
                .map_err(|e| {
                    if e.as_ref().is_unique_violation(constraint::USER_EMAIL) {
                        tracerr::new!(E::EmailOccupied(user.email.clone()))
                    } else {
                        tracerr::map_from_and_wrap!(=> E)(e)
                    }
                })
                .map(drop)?;
            tx.execute(Insert(registration.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            tx.execute(Insert(role::Assignment {
                user_id: id,
                role: Role::Instructor,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            Ok::<_, Traced<E>>(registration)
        }
        .await;

        match outcome {
            Ok(registration) => Ok(Output { user, registration }),
            Err(e) => {
                for key in uploaded {
                    if let Err(err) =
                        self.storage().execute(Delete(By::new(key.clone()))).await
                    {
                        log::warn!(
                            "failed to delete `{key}` document of a failed \
                             registration: {err}",
                        );
                    }
                }
                Err(e)
            }
        }
    }
}

/// Error of [`RegisterInstructor`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Document`] exceeds the maximum allowed size.
    #[display("`{_0}` document is too large")]
    DocumentTooLarge(#[error(not(source))] document::Kind),

    /// [`user::Email`] is already registered.
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`user::Password`] hashing failed.
    #[display("Failed to hash password: {_0}")]
    PasswordHashing(argon2::password_hash::Error),

    /// [`FullName`] is not a valid [`user::Name`].
    #[display("Full name is not a valid `User` name")]
    InvalidName,

    /// [`RegisterInstructor::password_confirmation`] differs from the
    /// [`RegisterInstructor::password`].
    #[display("Password confirmation doesn't match")]
    PasswordMismatch,

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),

    /// Applicant is younger than [`Registration::MIN_AGE`].
    #[display("Applicant is younger than {} years", Registration::MIN_AGE)]
    TooYoung,
}

#[cfg(test)]
mod spec {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use common::{
        operations::{By, Delete, Insert},
        Date,
    };
    use secrecy::{SecretBox, SecretString};
    use tracerr::Traced;

    use crate::{
        domain::{
            document::{self, ContentType},
            registration::{
                Cpf, FullName, LicenseNumber, TransmissionType,
                YearsOfExperience,
            },
            user::{self, Role},
            Document,
        },
        infra::{database::memory::Memory, storage, Storage},
        service_with_storage, Command as _,
    };

    use super::{ExecutionError, Photo, RegisterInstructor};

    #[derive(Clone, Debug, Default)]
    struct Bucket(Arc<Mutex<HashMap<String, Vec<u8>>>>);

    impl Bucket {
        fn keys(&self) -> Vec<String> {
            let mut keys: Vec<_> =
                self.0.lock().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        }
    }

    impl Storage<Insert<Document>> for Bucket {
        type Ok = document::PublicUrl;
        type Err = Traced<storage::Error>;

        async fn execute(
            &self,
            Insert(doc): Insert<Document>,
        ) -> Result<Self::Ok, Self::Err> {
            let key = doc.key();
            drop(self.0.lock().unwrap().insert(key.to_string(), doc.bytes));
            Ok(document::PublicUrl::new(
                "http://localhost/storage",
                Document::BUCKET,
                &key,
            ))
        }
    }

    impl Storage<Delete<By<Document, document::Key>>> for Bucket {
        type Ok = ();
        type Err = Traced<storage::Error>;

        async fn execute(
            &self,
            Delete(by): Delete<By<Document, document::Key>>,
        ) -> Result<Self::Ok, Self::Err> {
            drop(self.0.lock().unwrap().remove(&by.into_inner().to_string()));
            Ok(())
        }
    }

    fn photo() -> Option<Photo> {
        Some(Photo {
            content_type: ContentType::Jpeg,
            bytes: vec![0xFF, 0xD8, 0xFF],
        })
    }

    fn registration(birth_year: i32) -> RegisterInstructor {
        RegisterInstructor {
            cpf: Cpf::from_masked("123.456.789-09").unwrap(),
            full_name: FullName::new("Carlos Oliveira").unwrap(),
            birth_date: Date::from_calendar_date(birth_year, 3, 14).unwrap(),
            years_of_experience: YearsOfExperience::FiveToTen,
            license_number: LicenseNumber::new("123456").unwrap(),
            own_vehicle: Some(TransmissionType::Manual),
            email: user::Email::new("carlos@example.com").unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new("segredo1").unwrap(),
            )),
            password_confirmation: SecretString::from("segredo1".to_owned()),
            profile_photo: photo(),
            license_photo: photo(),
        }
    }

    #[tokio::test]
    async fn stores_documents_and_grants_instructor_role() {
        let (db, bucket) = (Memory::default(), Bucket::default());
        let svc = service_with_storage(db.clone(), bucket.clone());

        let out = svc.execute(registration(1985)).await.unwrap();

        let id = out.user.id;
        assert_eq!(db.role_of(id), Some(Role::Instructor));
        assert_eq!(
            bucket.keys(),
            [format!("{id}/license-photo.jpg"), format!("{id}/profile-photo.jpg")],
        );
        assert_eq!(
            out.registration.profile_photo_url.as_ref().unwrap().to_string(),
            format!(
                "http://localhost/storage/instructor-documents/\
                 {id}/profile-photo.jpg",
            ),
        );
        assert!(out.registration.has_own_vehicle());
    }

    #[tokio::test]
    async fn deletes_uploaded_documents_when_storing_fails() {
        let (db, bucket) = (Memory::default(), Bucket::default());
        db.fail_registrations();
        let svc = service_with_storage(db.clone(), bucket.clone());

        let err = svc.execute(registration(1985)).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        assert!(bucket.keys().is_empty());
        assert_eq!(db.users_count(), 0);
    }

    #[tokio::test]
    async fn reports_email_taken_concurrently_and_deletes_documents() {
        let (db, bucket) = (Memory::default(), Bucket::default());
        let svc = service_with_storage(db.clone(), bucket.clone());
        drop(svc.execute(registration(1985)).await.unwrap());
        let stored = bucket.keys();

        db.stale_reads();
        let err = svc.execute(registration(1985)).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
        assert_eq!(bucket.keys(), stored);
        assert_eq!(db.users_count(), 1);
    }

    #[tokio::test]
    async fn rejects_before_uploading() {
        let (db, bucket) = (Memory::default(), Bucket::default());
        let svc = service_with_storage(db.clone(), bucket.clone());

        let too_young = Date::today().year() - 20;
        let err = svc.execute(registration(too_young)).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::TooYoung));

        let mut cmd = registration(1985);
        cmd.license_photo = Some(Photo {
            content_type: ContentType::Png,
            bytes: vec![0; svc.config().max_document_size + 1],
        });
        let err = svc.execute(cmd).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::DocumentTooLarge(document::Kind::LicensePhoto),
        ));

        assert!(bucket.keys().is_empty());
        assert_eq!(db.users_count(), 0);
    }
}
