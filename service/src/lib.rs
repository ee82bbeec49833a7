//! Business logic of the driving-instructor marketplace.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod navigation;
pub mod query;
pub mod read;
pub mod task;

use std::time::Duration;

use common::operations::{By, Start};
use derive_more::{Debug, Error};

#[cfg(doc)]
use self::{
    domain::{user::Session, Document},
    infra::{Database, Storage},
};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Lifetime of a newly created [`Session`].
    pub session_ttl: Duration,

    /// Maximum size of an uploaded [`Document`], in bytes.
    pub max_document_size: usize,

    /// [`task::CleanRevokedSessions`] configuration.
    pub clean_revoked_sessions: task::clean_revoked_sessions::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, St> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Storage`] of this [`Service`].
    storage: St,
}

impl<Db, St> Service<Db, St> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        storage: St,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::CleanRevokedSessions<Self>,
                        task::clean_revoked_sessions::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            storage,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn("clean_revoked_sessions", async move {
            svc.execute(Start(By::new(svc.config().clean_revoked_sessions)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Storage`] of this [`Service`].
    #[must_use]
    pub fn storage(&self) -> &St {
        &self.storage
    }
}

/// Creates a [`Service`] over the provided [`Database`] test double, without
/// any [`Storage`].
#[cfg(test)]
pub(crate) fn service_for_tests<Db>(database: Db) -> Service<Db, ()> {
    service_with_storage(database, ())
}

/// Creates a [`Service`] over the provided test doubles, without spawning
/// background [`Task`]s.
#[cfg(test)]
pub(crate) fn service_with_storage<Db, St>(
    database: Db,
    storage: St,
) -> Service<Db, St> {
    const SECRET: &[u8] = b"test-secret";

    Service {
        config: Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(SECRET),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(SECRET),
            session_ttl: Duration::from_secs(30 * 60),
            max_document_size: domain::Document::MAX_SIZE,
            clean_revoked_sessions: task::clean_revoked_sessions::Config {
                interval: Duration::from_secs(60),
            },
        },
        database,
        storage,
    }
}
