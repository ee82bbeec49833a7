//! REST endpoint registering a new instructor from a multipart form.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{
        multipart::{Field, MultipartError},
        Multipart,
    },
    Extension, Json,
};
use common::Date;
use secrecy::{SecretBox, SecretString};
use serde::Serialize;
use service::{
    command::{self, register_instructor::Photo, Command as _},
    domain::{
        document,
        registration::{
            Cpf, FullName, LicenseNumber, TransmissionType, YearsOfExperience,
        },
        user, Registration,
    },
    navigation::Route,
};
use tracing as log;

use crate::{define_error, AsError, Error, Service};

/// Registers a new instructor, signing them in right away.
///
/// # Errors
///
/// Responds with a JSON `{ "code", "message" }` body if the form is invalid
/// or the registration fails.
#[tracing::instrument(
    skip_all,
    fields(http.route = "/registrations/instructor"),
)]
pub async fn register_instructor(
    Extension(service): Extension<Service>,
    multipart: Multipart,
) -> Result<(http::StatusCode, Json<Registered>), Error> {
    let cmd = Form::read(multipart).await?.into_command(Date::today())?;

    let registered = service
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;
    let session = service
        .execute(command::CreateUserSession::ByUserId(registered.user.id))
        .await
        .map_err(AsError::into_error)?;

    log::info!("instructor `{}` registered", registered.user.id);

    Ok((
        http::StatusCode::CREATED,
        Json(Registered {
            token: session.token.to_string(),
            user_id: registered.user.id.to_string(),
            expires_at: session.expires_at.to_rfc3339(),
            redirect_to: Route::Root.path(),
        }),
    ))
}

/// Successful registration response.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registered {
    /// Access token of the created session.
    pub token: String,

    /// ID of the registered user.
    pub user_id: String,

    /// RFC 3339 date and time when the session expires.
    pub expires_at: String,

    /// Path of the view to open next.
    pub redirect_to: String,
}

/// Uploaded file, not checked yet.
#[derive(Debug)]
struct Upload {
    /// Declared MIME type.
    content_type: Option<String>,

    /// Contents.
    bytes: Bytes,
}

/// Fields of the registration form, as submitted.
#[derive(Debug, Default)]
struct Form {
    /// Text fields by their names.
    text: HashMap<String, String>,

    /// `profilePhoto` file field.
    profile_photo: Option<Upload>,

    /// `licensePhoto` file field.
    license_photo: Option<Upload>,
}

impl Form {
    /// Reads all the fields of the provided [`Multipart`] body.
    ///
    /// Empty file fields count as missing.
    async fn read(mut multipart: Multipart) -> Result<Self, Error> {
        let mut form = Self::default();
        while let Some(field) =
            multipart.next_field().await.map_err(AsError::into_error)?
        {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "profilePhoto" => {
                    form.profile_photo = Upload::read(field).await?;
                }
                "licensePhoto" => {
                    form.license_photo = Upload::read(field).await?;
                }
                _ => {
                    let value =
                        field.text().await.map_err(AsError::into_error)?;
                    drop(form.text.insert(name, value));
                }
            }
        }
        Ok(form)
    }

    /// Returns the text field with the provided `name`, or an empty string.
    fn get(&self, name: &str) -> &str {
        self.text.get(name).map_or("", String::as_str)
    }

    /// Validates this [`Form`] as of `today`, in the order the fields are
    /// shown to the applicant.
    fn into_command(
        self,
        today: Date,
    ) -> Result<command::RegisterInstructor, Error> {
        use RegistrationError as E;

        let cpf = Cpf::from_masked(self.get("cpf")).ok_or(E::InvalidCpf)?;
        let full_name =
            FullName::new(self.get("fullName")).ok_or(E::InvalidFullName)?;
        let birth_date = self
            .get("birthDate")
            .parse::<Date>()
            .map_err(|_| E::InvalidBirthDate)?;
        if !Registration::is_old_enough(birth_date, today) {
            return Err(E::TooYoung.into());
        }
        let years_of_experience = self
            .get("yearsOfExperience")
            .parse::<YearsOfExperience>()
            .map_err(|_| E::InvalidYearsOfExperience)?;
        let license_number = LicenseNumber::new(
            self.get("instructorLicenseNumber"),
        )
        .ok_or(E::InvalidLicenseNumber)?;
        let own_vehicle = match self.get("hasOwnVehicle") {
            "yes" => Some(
                self.get("transmissionType")
                    .parse::<TransmissionType>()
                    .map_err(|_| E::InvalidTransmission)?,
            ),
            "no" => None,
            _ => return Err(E::InvalidOwnVehicle.into()),
        };
        let email =
            user::Email::new(self.get("email")).ok_or(E::InvalidEmail)?;
        let password = user::Password::new(self.get("password"))
            .ok_or(E::InvalidPassword)?;
        let confirmation = self.get("confirmPassword").to_owned();
        if !password.eq(confirmation.as_str()) {
            return Err(E::PasswordMismatch.into());
        }

        let Self {
            profile_photo,
            license_photo,
            ..
        } = self;

        Ok(command::RegisterInstructor {
            cpf,
            full_name,
            birth_date,
            years_of_experience,
            license_number,
            own_vehicle,
            email,
            password: SecretBox::init_with(move || password),
            password_confirmation: SecretString::from(confirmation),
            profile_photo: profile_photo.map(Upload::into_photo).transpose()?,
            license_photo: license_photo.map(Upload::into_photo).transpose()?,
        })
    }
}

impl Upload {
    /// Reads the provided file [`Field`].
    async fn read(field: Field<'_>) -> Result<Option<Self>, Error> {
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(AsError::into_error)?;
        Ok((!bytes.is_empty()).then_some(Self {
            content_type,
            bytes,
        }))
    }

    /// Checks this [`Upload`] to be an image of an accepted
    /// [`document::ContentType`].
    fn into_photo(self) -> Result<Photo, Error> {
        let content_type = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.parse::<document::ContentType>().ok())
            .ok_or(RegistrationError::InvalidDocument)?;
        Ok(Photo {
            content_type,
            bytes: self.bytes.to_vec(),
        })
    }
}

impl AsError for MultipartError {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "INVALID_FORM",
            status_code: self.status(),
            message: self.body_text(),
            backtrace: None,
        })
    }
}

impl AsError for command::register_instructor::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use RegistrationError as E;

        let err = match self {
            Self::Db(e) => return e.try_as_error(),
            Self::DocumentTooLarge(_) => E::DocumentTooLarge,
            Self::EmailOccupied(_) => E::EmailOccupied,
            Self::InvalidName => E::InvalidFullName,
            Self::PasswordMismatch => E::PasswordMismatch,
            Self::PasswordHashing(_) => return None,
            Self::Storage(_) => E::DocumentUploadFailed,
            Self::TooYoung => E::TooYoung,
        };
        Some(err.into())
    }
}

define_error! {
    enum RegistrationError {
        #[code = "INVALID_CPF"]
        #[status = BAD_REQUEST]
        #[message = "CPF inválido"]
        InvalidCpf,

        #[code = "INVALID_FULL_NAME"]
        #[status = BAD_REQUEST]
        #[message = "Nome deve ter pelo menos 3 caracteres"]
        InvalidFullName,

        #[code = "INVALID_BIRTH_DATE"]
        #[status = BAD_REQUEST]
        #[message = "Data de nascimento inválida"]
        InvalidBirthDate,

        #[code = "TOO_YOUNG"]
        #[status = BAD_REQUEST]
        #[message = "Você deve ter pelo menos 21 anos"]
        TooYoung,

        #[code = "INVALID_YEARS_OF_EXPERIENCE"]
        #[status = BAD_REQUEST]
        #[message = "Selecione o tempo de experiência"]
        InvalidYearsOfExperience,

        #[code = "INVALID_LICENSE_NUMBER"]
        #[status = BAD_REQUEST]
        #[message = "Registro deve ter 6 dígitos"]
        InvalidLicenseNumber,

        #[code = "INVALID_OWN_VEHICLE"]
        #[status = BAD_REQUEST]
        #[message = "Informe se possui veículo próprio"]
        InvalidOwnVehicle,

        #[code = "INVALID_TRANSMISSION"]
        #[status = BAD_REQUEST]
        #[message = "Selecione o tipo de câmbio"]
        InvalidTransmission,

        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "Email inválido"]
        InvalidEmail,

        #[code = "INVALID_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "Senha deve ter pelo menos 6 caracteres"]
        InvalidPassword,

        #[code = "PASSWORD_MISMATCH"]
        #[status = BAD_REQUEST]
        #[message = "As senhas não coincidem"]
        PasswordMismatch,

        #[code = "INVALID_DOCUMENT"]
        #[status = UNSUPPORTED_MEDIA_TYPE]
        #[message = "Envie uma imagem JPEG, PNG ou WebP"]
        InvalidDocument,

        #[code = "DOCUMENT_TOO_LARGE"]
        #[status = PAYLOAD_TOO_LARGE]
        #[message = "Imagem muito grande"]
        DocumentTooLarge,

        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Email já cadastrado"]
        EmailOccupied,

        #[code = "DOCUMENT_UPLOAD_FAILED"]
        #[status = INTERNAL_SERVER_ERROR]
        #[message = "Falha ao enviar documentos"]
        DocumentUploadFailed,
    }
}
