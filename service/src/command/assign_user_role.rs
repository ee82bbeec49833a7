//! [`Command`] for assigning a [`Role`] to a [`User`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

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

/// [`Command`] for assigning a [`Role`] to a [`User`] having none yet.
#[derive(Clone, Copy, Debug)]
pub struct AssignUserRole {
    /// ID of the [`User`] to assign the [`Role`] to.
    pub user_id: user::Id,

    /// [`Role`] to assign.
    pub role: Role,
}

impl<Db, St> Command<AssignUserRole> for Service<Db, St>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Role>, user::Id>>,
            Ok = Option<Role>,
            Err = Traced<database::Error>,
        > + Database<Insert<role::Assignment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Role;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AssignUserRole,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AssignUserRole { user_id, role } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        drop(
            tx.execute(Select(By::<Option<User>, _>::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        );

        let assigned = tx
            .execute(Select(By::<Option<Role>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(assigned) = assigned {
            return Err(tracerr::new!(E::RoleAlreadyAssigned(assigned)));
        }

        tx.execute(Insert(role::Assignment { user_id, role }))
            .await
            .map_err(|e| {
                if e.as_ref().is_unique_violation(constraint::USER_ROLE) {
                    tracerr::new!(E::RoleTaken)
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(role)
    }
}

/// Error of [`AssignUserRole`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] has a [`Role`] already.
    #[display("`User` has `{_0}` role already")]
    RoleAlreadyAssigned(#[error(not(source))] Role),

    /// [`User`] was assigned a [`Role`] concurrently.
    #[display("`User` was assigned a role concurrently")]
    RoleTaken,

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;
    use uuid::Uuid;

    use crate::{
        command::CreateUser,
        domain::user::{self, Role},
        infra::database::memory::Memory,
        service_for_tests, Command as _,
    };

    use super::{AssignUserRole, ExecutionError};

    #[tokio::test]
    async fn assigns_role_only_once() {
        let db = Memory::default();
        let svc = service_for_tests(db.clone());
        let created = svc
            .execute(CreateUser {
                name: user::Name::new("Carlos Oliveira").unwrap(),
                email: user::Email::new("carlos@example.com").unwrap(),
                password: SecretBox::new(Box::new(
                    user::Password::new("segredo1").unwrap(),
                )),
                password_confirmation: "segredo1".to_owned().into(),
                requested_role: Some(Role::Instructor),
            })
            .await
            .unwrap();
        let user_id = created.user.id;

        let role = svc
            .execute(AssignUserRole {
                user_id,
                role: Role::Instructor,
            })
            .await
            .unwrap();
        assert_eq!(role, Role::Instructor);
        assert_eq!(db.role_of(user_id), Some(Role::Instructor));

        let err = svc
            .execute(AssignUserRole {
                user_id,
                role: Role::Student,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::RoleAlreadyAssigned(Role::Instructor),
        ));
        assert_eq!(db.role_of(user_id), Some(Role::Instructor));
    }

    #[tokio::test]
    async fn reports_role_assigned_concurrently_as_taken() {
        let db = Memory::default();
        let svc = service_for_tests(db.clone());
        let created = svc
            .execute(CreateUser {
                name: user::Name::new("Ana Souza").unwrap(),
                email: user::Email::new("ana@example.com").unwrap(),
                password: SecretBox::new(Box::new(
                    user::Password::new("segredo1").unwrap(),
                )),
                password_confirmation: "segredo1".to_owned().into(),
                requested_role: Some(Role::Student),
            })
            .await
            .unwrap();

        db.stale_reads();
        let err = svc
            .execute(AssignUserRole {
                user_id: created.user.id,
                role: Role::Instructor,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::RoleTaken));
        assert_eq!(db.role_of(created.user.id), Some(Role::Student));
    }

    #[tokio::test]
    async fn fails_for_unknown_user() {
        let svc = service_for_tests(Memory::default());

        let err = svc
            .execute(AssignUserRole {
                user_id: Uuid::new_v4().into(),
                role: Role::Student,
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }
}
