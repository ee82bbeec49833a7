//! Postgres database clients.

use std::sync::Arc;

use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
///
/// Every statement runs on a connection taken from the [`connection::Pool`]
/// for its duration only.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to take connections from.
    pub(crate) pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub(crate) const fn from_pool(pool: connection::Pool) -> Self {
        Self { pool }
    }

    /// Starts a new [`Tx`] client, sharing the [`connection::Pool`] of this
    /// [`NonTx`] client.
    #[must_use]
    pub fn transaction(&self) -> Tx {
        Tx {
            pool: self.pool.clone(),
            tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Takes a connection from the [`connection::Pool`].
    pub(crate) async fn connection(
        &self,
    ) -> Result<connection::NonTx, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for NonTx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        conn.query(stmt, params).await.map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        conn.query_opt(stmt, params).await.map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        conn.exec(stmt, params).await.map_err(tracerr::wrap!())
    }
}

/// Transactional Postgres database client.
///
/// The transaction begins lazily on the first statement and holds its
/// connection until [`Tx::commit()`]ted. Dropping all the clones of an
/// uncommitted [`Tx`] rolls it back.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to take the connection from.
    pool: connection::Pool,

    /// Open [`connection::Tx`], if any statement ran already.
    tx: Arc<Mutex<Option<connection::Tx>>>,
}

impl Tx {
    /// Returns the open [`connection::Tx`], beginning it if needed.
    async fn connection(
        &self,
    ) -> Result<MappedMutexGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        let mut tx = self.tx.lock().await;
        if tx.is_none() {
            let conn = self
                .pool
                .get()
                .await
                .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                .map_err(tracerr::map_from)?;
            *tx = Some(
                connection::Tx::begin(conn)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }
        MutexGuard::try_map(tx, Option::as_mut)
            .map_err(|_| database::Error::Postgres(postgres::Error::Committed))
            .map_err(tracerr::wrap!())
    }

    /// Commits this [`Tx`] client, if any statement ran in it.
    ///
    /// # Errors
    ///
    /// If the `COMMIT` statement fails.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(tx) = self.tx.lock().await.take() else {
            return Ok(());
        };
        tx.commit().await.map_err(tracerr::wrap!())
    }
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let tx = self.connection().await.map_err(tracerr::wrap!())?;
        tx.query(stmt, params).await.map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let tx = self.connection().await.map_err(tracerr::wrap!())?;
        tx.query_opt(stmt, params).await.map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let tx = self.connection().await.map_err(tracerr::wrap!())?;
        tx.exec(stmt, params).await.map_err(tracerr::wrap!())
    }
}
