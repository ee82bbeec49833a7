//! [`Registration`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{user, Registration},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Registration>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Registration>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Registration>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT cpf, full_name, birth_date, profile_photo_url, \
                   years_of_experience, license_number, license_photo_url, \
                   own_vehicle, created_at \
            FROM instructor_registrations \
            WHERE user_id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Registration {
                user_id,
                cpf: row.get("cpf"),
                full_name: row.get("full_name"),
                birth_date: row.get("birth_date"),
                profile_photo_url: row.get("profile_photo_url"),
                years_of_experience: row.get("years_of_experience"),
                license_number: row.get("license_number"),
                license_photo_url: row.get("license_photo_url"),
                own_vehicle: row.get("own_vehicle"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Insert<Registration>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(registration): Insert<Registration>,
    ) -> Result<Self::Ok, Self::Err> {
        let Registration {
            user_id,
            cpf,
            full_name,
            birth_date,
            profile_photo_url,
            years_of_experience,
            license_number,
            license_photo_url,
            own_vehicle,
            created_at,
        } = registration;

        const SQL: &str = "\
            INSERT INTO instructor_registrations (\
                user_id, cpf, full_name, birth_date, profile_photo_url, \
                years_of_experience, license_number, license_photo_url, \
                own_vehicle, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::DATE, $5::VARCHAR, \
                $6::INT2, $7::VARCHAR, $8::VARCHAR, \
                $9::INT2, $10::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &user_id,
                &cpf,
                &full_name,
                &birth_date,
                &profile_photo_url,
                &years_of_experience,
                &license_number,
                &license_photo_url,
                &own_vehicle,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
