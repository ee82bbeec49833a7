//! Operations a [`Handler`] is parametrized with.
//!
//! The wrapped value describes what the operation is applied to, so a single
//! [`Handler`] may support many kinds of the same operation.

use std::marker::PhantomData;

use crate::Handler;

/// Operation storing a new value, such as a user account or an uploaded file.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Operation removing a value, or values matched by a [`By`] selector.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Operation reading a value, usually via a [`By`] selector.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Operation starting a long-living process, such as a background task.
#[derive(Clone, Copy, Debug)]
pub struct Start<T>(pub T);

/// Operation performing a single iteration of some work.
#[derive(Clone, Copy, Debug)]
pub struct Perform<T>(pub T);

/// Operation opening a transaction, so the following operations are applied
/// atomically once [`Commit`]ted.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// [`Transact`]ed value.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Operation committing a [`Transact`]ed transaction.
///
/// Dropping a transaction without committing it discards all its changes.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of a `W`hat by a `B`y value.
///
/// For example, `By<Option<User>, Email>` selects a user by an email, if any.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the selected value.
    _what: PhantomData<W>,

    /// Value the selection is made by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector out of the provided value.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Unwraps the value this [`By`] selector is made by.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
