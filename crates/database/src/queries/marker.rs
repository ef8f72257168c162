use annotations::database::{DatabaseError, Result};
use model::{marker::Marker, WithId};
use sqlx::{Executor, Postgres};
use utility::id::Id;

use crate::data_model::marker::MarkerRow;

use super::convert_error;

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Marker>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            id,
            type,
            name,
            price,
            latitude,
            longitude
        FROM
            markers
        ORDER BY
            seq ASC;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .into_iter()
    .map(|row: MarkerRow| row.to_model())
    .collect()
}

pub async fn get<'c, E>(executor: E, id: Id<Marker>) -> Result<WithId<Marker>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            id,
            type,
            name,
            price,
            latitude,
            longitude
        FROM
            markers
        WHERE
            id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .and_then(|row: MarkerRow| row.to_model())
}

pub async fn insert<'c, E>(executor: E, marker: Marker) -> Result<WithId<Marker>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO markers(
            type,
            name,
            price,
            latitude,
            longitude
        )
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, type, name, price, latitude, longitude;
        ",
    )
    .bind(marker.kind.tag())
    .bind(marker.name)
    .bind(marker.price)
    .bind(marker.coordinates.lat)
    .bind(marker.coordinates.lng)
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .and_then(|row: MarkerRow| row.to_model())
}

pub async fn delete<'c, E>(executor: E, id: Id<Marker>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query(
        "
        DELETE FROM
            markers
        WHERE
            id = $1;
        ",
    )
    .bind(id.raw())
    .execute(executor)
    .await
    .map_err(convert_error)?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }
    Ok(())
}
