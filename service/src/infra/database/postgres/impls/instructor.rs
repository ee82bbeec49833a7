//! [`Instructor`]-related [`Database`] implementations.

use common::{
    operations::{By, Select},
    Money,
};
use rust_decimal::Decimal;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        instructor::{
            self,
            profile::{Package, Review, Vehicle, VehicleFeatures},
            Profile,
        },
        Instructor,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::instructor::list::Listing,
};

/// Columns of an [`Instructor`] row.
const COLUMNS: &str = "\
    id, name, location, rating, review_count, price_per_hour, \
    categories, transmission, verified, has_car_for_test, experience";

/// Builds an [`Instructor`] out of a [`Row`] selected with [`COLUMNS`].
fn instructor_from(row: &Row) -> Instructor {
    Instructor {
        id: row.get("id"),
        name: row.get("name"),
        location: row.get("location"),
        rating: row.get("rating"),
        review_count: row.get("review_count"),
        price_per_hour: Money::brl(row.get("price_per_hour")),
        categories: row.get("categories"),
        transmission: row.get("transmission"),
        verified: row.get("verified"),
        has_car_for_test: row.get("has_car_for_test"),
        experience: row.get("experience"),
    }
}

impl<C> Database<Select<By<Listing, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Listing;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Listing, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM instructors \
             ORDER BY position ASC"
        );
        Ok(self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(instructor_from)
            .collect())
    }
}

impl<C> Database<Select<By<Option<Profile>, instructor::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Profile>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Profile>, instructor::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: instructor::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS}, bio, trial_price \
             FROM instructors \
             WHERE id = $1::UUID"
        );
        let Some(row) = self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };
        let instructor = instructor_from(&row);
        let bio = row.get("bio");
        let trial_price =
            row.get::<_, Option<Decimal>>("trial_price").map(Money::brl);

        const VEHICLES_SQL: &str = "\
            SELECT model, transmission, \
                   air_conditioning, power_steering, dual_command, inspected \
            FROM instructor_vehicles \
            WHERE instructor_id = $1::UUID \
            ORDER BY position ASC";
        let vehicles = self
            .query(VEHICLES_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Vehicle {
                model: row.get("model"),
                transmission: row.get("transmission"),
                features: VehicleFeatures {
                    air_conditioning: row.get("air_conditioning"),
                    power_steering: row.get("power_steering"),
                    dual_command: row.get("dual_command"),
                    inspected: row.get("inspected"),
                },
            })
            .collect();

        const PACKAGES_SQL: &str = "\
            SELECT name, hours, price, discount, is_trial_lesson \
            FROM instructor_packages \
            WHERE instructor_id = $1::UUID \
            ORDER BY position ASC";
        let packages = self
            .query(PACKAGES_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Package {
                name: row.get("name"),
                hours: row.get("hours"),
                price: Money::brl(row.get("price")),
                discount: row.get("discount"),
                is_trial_lesson: row.get("is_trial_lesson"),
            })
            .collect();

        const PRAISE_TAGS_SQL: &str = "\
            SELECT tag \
            FROM instructor_praise_tags \
            WHERE instructor_id = $1::UUID \
            ORDER BY position ASC";
        let praise_tags = self
            .query(PRAISE_TAGS_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("tag"))
            .collect();

        const REVIEWS_SQL: &str = "\
            SELECT author, stars, date, text \
            FROM instructor_reviews \
            WHERE instructor_id = $1::UUID \
            ORDER BY position ASC";
        let reviews = self
            .query(REVIEWS_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Review {
                author: row.get("author"),
                stars: row.get("stars"),
                date: row.get("date"),
                text: row.get("text"),
            })
            .collect();

        Ok(Some(Profile {
            instructor,
            bio,
            trial_price,
            vehicles,
            packages,
            praise_tags,
            reviews,
        }))
    }
}
