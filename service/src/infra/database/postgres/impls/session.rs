//! [`Revocation`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::user::session::{self, Fingerprint, Revocation},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Revocation>, Fingerprint>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Revocation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Revocation>, Fingerprint>>,
    ) -> Result<Self::Ok, Self::Err> {
        let fingerprint = by.into_inner();

        const SQL: &str = "\
            SELECT expires_at \
            FROM revoked_sessions \
            WHERE fingerprint = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&fingerprint])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Revocation {
                fingerprint,
                expires_at: row.get("expires_at"),
            }))
    }
}

impl<C> Database<Insert<Revocation>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(revocation): Insert<Revocation>,
    ) -> Result<Self::Ok, Self::Err> {
        let Revocation {
            fingerprint,
            expires_at,
        } = revocation;

        const SQL: &str = "\
            INSERT INTO revoked_sessions (fingerprint, expires_at) \
            VALUES ($1::UUID, $2::TIMESTAMPTZ) \
            ON CONFLICT (fingerprint) DO NOTHING";
        self.exec(SQL, &[&fingerprint, &expires_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Revocation, session::ExpirationDateTime>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Revocation, session::ExpirationDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let deadline: session::ExpirationDateTime = by.into_inner();

        const SQL: &str = "\
            DELETE FROM revoked_sessions \
            WHERE expires_at <= $1::TIMESTAMPTZ";
        self.exec(SQL, &[&deadline])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
