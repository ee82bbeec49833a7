//! In-memory [`Database`] double for tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use common::operations::{By, Commit, Delete, Insert, Select, Transact};
use tracerr::Traced;

use crate::domain::{
    user::{
        self, role,
        session::{self, Fingerprint, Revocation},
        Role,
    },
    Registration, User,
};

use super::{constraint, Database, Error};

/// Stored rows.
#[derive(Clone, Debug, Default)]
struct State {
    /// [`User`]s in insertion order.
    users: Vec<User>,

    /// [`Role`]s by their owner.
    roles: HashMap<user::Id, Role>,

    /// [`Registration`]s by their applicant.
    registrations: HashMap<user::Id, Registration>,

    /// [`Revocation`]s by their [`Fingerprint`].
    revocations: HashMap<Fingerprint, Revocation>,
}

/// In-memory [`Database`].
///
/// A [`Transact`]ed [`Memory`] works on its own copy of the rows until
/// [`Commit`]ted. Dropping it without [`Commit`] discards the changes.
#[derive(Clone, Debug, Default)]
pub(crate) struct Memory {
    /// Committed rows.
    committed: Arc<Mutex<State>>,

    /// Rows of the open transaction, if any.
    staged: Option<Arc<Mutex<State>>>,

    /// Whether inserting a [`Registration`] fails.
    fail_registrations: Arc<AtomicBool>,

    /// Whether lookups of [`User`]s by email and of [`Role`]s miss.
    stale_reads: Arc<AtomicBool>,
}

impl Memory {
    /// Makes every following [`Registration`] insertion fail.
    pub(crate) fn fail_registrations(&self) {
        self.fail_registrations.store(true, Ordering::SeqCst);
    }

    /// Makes every following lookup of a [`User`] by email or of a [`Role`]
    /// miss, as if a concurrent write were not visible yet.
    pub(crate) fn stale_reads(&self) {
        self.stale_reads.store(true, Ordering::SeqCst);
    }

    /// Indicates whether lookups miss because of [`Memory::stale_reads()`].
    fn reads_are_stale(&self) -> bool {
        self.stale_reads.load(Ordering::SeqCst)
    }

    /// Returns the committed [`Role`] of the provided [`User`].
    pub(crate) fn role_of(&self, user_id: user::Id) -> Option<Role> {
        lock(&self.committed).roles.get(&user_id).copied()
    }

    /// Returns the number of committed [`User`]s.
    pub(crate) fn users_count(&self) -> usize {
        lock(&self.committed).users.len()
    }

    /// Returns the rows visible to this [`Memory`].
    fn state(&self) -> MutexGuard<'_, State> {
        lock(self.staged.as_ref().unwrap_or(&self.committed))
    }
}

/// Locks the provided [`State`], ignoring poisoning.
fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let copy = self.state().clone();
        Ok(Self {
            committed: Arc::clone(&self.committed),
            staged: Some(Arc::new(Mutex::new(copy))),
            fail_registrations: Arc::clone(&self.fail_registrations),
            stale_reads: Arc::clone(&self.stale_reads),
        })
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let staged = self
            .staged
            .as_ref()
            .ok_or(Error::Memory("no transaction to commit"))
            .map_err(tracerr::wrap!())?;
        let rows = lock(staged).clone();
        *lock(&self.committed) = rows;
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state().users.iter().find(|u| u.id == id).cloned())
    }
}

impl Database<Select<By<Option<User>, &user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        if self.reads_are_stale() {
            return Ok(None);
        }
        Ok(self.state().users.iter().find(|u| u.email == *email).cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(tracerr::new!(Error::MemoryConflict(
                constraint::USER_EMAIL,
            )));
        }
        state.users.push(user);
        Ok(())
    }
}

impl Database<Select<By<Option<Role>, user::Id>>> for Memory {
    type Ok = Option<Role>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Role>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.reads_are_stale() {
            return Ok(None);
        }
        Ok(self.state().roles.get(&by.into_inner()).copied())
    }
}

impl Database<Insert<role::Assignment>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(assignment): Insert<role::Assignment>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if state.roles.contains_key(&assignment.user_id) {
            return Err(tracerr::new!(Error::MemoryConflict(
                constraint::USER_ROLE,
            )));
        }
        drop(state.roles.insert(assignment.user_id, assignment.role));
        Ok(())
    }
}

impl Database<Select<By<Option<Registration>, user::Id>>> for Memory {
    type Ok = Option<Registration>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Registration>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().registrations.get(&by.into_inner()).cloned())
    }
}

impl Database<Insert<Registration>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(registration): Insert<Registration>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.fail_registrations.load(Ordering::SeqCst) {
            return Err(tracerr::new!(Error::Memory(
                "`Registration` insertion failed",
            )));
        }
        drop(
            self.state()
                .registrations
                .insert(registration.user_id, registration),
        );
        Ok(())
    }
}

impl Database<Select<By<Option<Revocation>, Fingerprint>>> for Memory {
    type Ok = Option<Revocation>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Revocation>, Fingerprint>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().revocations.get(&by.into_inner()).copied())
    }
}

impl Database<Insert<Revocation>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(revocation): Insert<Revocation>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.state()
                .revocations
                .insert(revocation.fingerprint, revocation),
        );
        Ok(())
    }
}

impl Database<Delete<By<Revocation, session::ExpirationDateTime>>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Revocation, session::ExpirationDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let deadline = by.into_inner();
        self.state().revocations.retain(|_, r| r.expires_at > deadline);
        Ok(())
    }
}
