//! [`Command`] for signing up a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox, SecretString};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password};
use crate::{
    domain::{
        user::{self, role, Role},
        User,
    },
    infra::{
        database::{self, constraint},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for signing up a new [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// Repeated [`Password`], which must match the [`CreateUser::password`].
    pub password_confirmation: SecretString,

    /// [`Role`] the [`User`] chose when signing up, if any.
    ///
    /// [`Role::Student`] is granted right away when it's chosen or nothing
    /// is chosen. [`Role::Instructor`] is granted only once the instructor
    /// registration is complete.
    pub requested_role: Option<Role>,
}

/// Output of [`CreateUser`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Created [`User`].
    pub user: User,

    /// [`Role`] granted to the created [`User`], if any.
    pub role: Option<Role>,
}

impl<Db, St> Command<CreateUser> for Service<Db, St>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Insert<role::Assignment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            email,
            password,
            password_confirmation,
            requested_role,
        } = cmd;

        if *password.expose_secret() != *password_confirmation.expose_secret()
        {
            return Err(tracerr::new!(E::PasswordMismatch));
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
        let role = match requested_role {
            Some(Role::Student) | None => Some(Role::Student),
            Some(Role::Instructor) => None,
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
        if let Some(role) = role {
            tx.execute(Insert(role::Assignment { user_id: id, role }))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Output { user, role })
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Email`] is already registered.
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`user::Password`] hashing failed.
    #[display("Failed to hash password: {_0}")]
    PasswordHashing(argon2::password_hash::Error),

    /// [`CreateUser::password_confirmation`] differs from the
    /// [`CreateUser::password`].
    #[display("Password confirmation doesn't match")]
    PasswordMismatch,
}

#[cfg(test)]
mod spec {
    use secrecy::{SecretBox, SecretString};

    use crate::{
        domain::user::{self, Role},
        infra::database::memory::Memory,
        service_for_tests, Command as _,
    };

    use super::{CreateUser, ExecutionError};

    fn sign_up(email: &str, requested_role: Option<Role>) -> CreateUser {
        CreateUser {
            name: user::Name::new("Maria Silva").unwrap(),
            email: user::Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new("segredo1").unwrap(),
            )),
            password_confirmation: SecretString::from("segredo1".to_owned()),
            requested_role,
        }
    }

    #[tokio::test]
    async fn grants_student_role_unless_instructor_requested() {
        let db = Memory::default();
        let svc = service_for_tests(db.clone());

        let student = svc
            .execute(sign_up("aluna@example.com", Some(Role::Student)))
            .await
            .unwrap();
        assert_eq!(student.role, Some(Role::Student));
        assert_eq!(db.role_of(student.user.id), Some(Role::Student));

        let unspecified = svc
            .execute(sign_up("outra@example.com", None))
            .await
            .unwrap();
        assert_eq!(db.role_of(unspecified.user.id), Some(Role::Student));

        let instructor = svc
            .execute(sign_up("instrutor@example.com", Some(Role::Instructor)))
            .await
            .unwrap();
        assert_eq!(instructor.role, None);
        assert_eq!(db.role_of(instructor.user.id), None);
    }

    #[tokio::test]
    async fn rejects_occupied_email_ignoring_case() {
        let svc = service_for_tests(Memory::default());

        drop(svc.execute(sign_up("maria@example.com", None)).await.unwrap());
        let err = svc
            .execute(sign_up("MARIA@example.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
    }

    #[tokio::test]
    async fn reports_email_taken_concurrently_as_occupied() {
        let db = Memory::default();
        let svc = service_for_tests(db.clone());

        drop(svc.execute(sign_up("maria@example.com", None)).await.unwrap());
        db.stale_reads();
        let err = svc
            .execute(sign_up("maria@example.com", None))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
        assert_eq!(db.users_count(), 1);
    }

    #[tokio::test]
    async fn rejects_mismatched_confirmation_before_storage() {
        let db = Memory::default();
        let svc = service_for_tests(db.clone());

        let mut cmd = sign_up("maria@example.com", None);
        cmd.password_confirmation = SecretString::from("segredo2".to_owned());
        let err = svc.execute(cmd).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PasswordMismatch));
        assert_eq!(db.users_count(), 0);
    }
}
