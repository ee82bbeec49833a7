//! [`User`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, role, Role},
        User,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C, IDs> Database<Select<By<HashMap<user::Id, User>, IDs>>> for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[user::Id]>,
{
    type Ok = HashMap<user::Id, User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<user::Id, User>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[user::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap_or(i32::MAX);

        const SQL: &str = "\
            SELECT id, name, email, password_hash, created_at \
            FROM users \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                (
                    id,
                    User {
                        id,
                        name: row.get("name"),
                        email: row.get("email"),
                        password_hash: row.get("password_hash"),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<user::Id, User>, [user::Id; 1]>>,
        Ok = HashMap<user::Id, User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Email>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM users \
            WHERE lower(email) = lower($1::VARCHAR) \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[email])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let user_id = row.get("id");
        self.execute(Select(By::new(user_id)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            name,
            email,
            password_hash,
            created_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (\
                id, name, email, password_hash, created_at\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::TIMESTAMPTZ\
            )";
        self.exec(SQL, &[&id, &name, &email, &password_hash, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Option<Role>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Role>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Role>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT role \
            FROM user_roles \
            WHERE user_id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| row.get("role")))
    }
}

impl<C> Database<Insert<role::Assignment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(assignment): Insert<role::Assignment>,
    ) -> Result<Self::Ok, Self::Err> {
        let role::Assignment { user_id, role } = assignment;

        const SQL: &str = "\
            INSERT INTO user_roles (user_id, role) \
            VALUES ($1::UUID, $2::INT2)";
        self.exec(SQL, &[&user_id, &role])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
