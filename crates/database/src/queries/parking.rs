use annotations::database::{DatabaseError, Result};
use model::{parking::Parking, WithId};
use sqlx::PgConnection;
use utility::id::Id;

use crate::data_model::parking::{ParkingEdgeRow, ParkingRow};

use super::{convert_error, insert_all_returning, rows_per_statement};

const EDGE_COLUMNS: [&str; 4] = ["parking_id", "sequence", "latitude", "longitude"];

pub async fn get_all(connection: &mut PgConnection) -> Result<Vec<WithId<Parking>>> {
    let parkings: Vec<ParkingRow> = sqlx::query_as(
        "
        SELECT
            id,
            price
        FROM
            parkings
        ORDER BY
            seq ASC;
        ",
    )
    .fetch_all(&mut *connection)
    .await
    .map_err(convert_error)?;

    let edges: Vec<ParkingEdgeRow> = sqlx::query_as(
        "
        SELECT
            parking_id,
            sequence,
            latitude,
            longitude
        FROM
            parking_edges
        ORDER BY
            parking_id, sequence ASC;
        ",
    )
    .fetch_all(&mut *connection)
    .await
    .map_err(convert_error)?;

    Ok(parkings
        .into_iter()
        .map(|parking| {
            let own_edges = edges
                .iter()
                .filter(|edge| edge.parking_id == parking.id)
                .cloned()
                .collect::<Vec<_>>();
            parking.to_model(&own_edges)
        })
        .collect())
}

pub async fn get(
    connection: &mut PgConnection,
    id: Id<Parking>,
) -> Result<WithId<Parking>> {
    let parking: ParkingRow = sqlx::query_as(
        "
        SELECT
            id,
            price
        FROM
            parkings
        WHERE
            id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(&mut *connection)
    .await
    .map_err(convert_error)?;

    let edges: Vec<ParkingEdgeRow> = sqlx::query_as(
        "
        SELECT
            parking_id,
            sequence,
            latitude,
            longitude
        FROM
            parking_edges
        WHERE
            parking_id = $1
        ORDER BY
            sequence ASC;
        ",
    )
    .bind(id.raw())
    .fetch_all(&mut *connection)
    .await
    .map_err(convert_error)?;

    Ok(parking.to_model(&edges))
}

/// Writes the parking row and one row per edge. Callers run this inside a
/// transaction so a parking never exists without its edges.
pub async fn insert(
    connection: &mut PgConnection,
    parking: Parking,
) -> Result<WithId<Parking>> {
    let row: ParkingRow = sqlx::query_as(
        "
        INSERT INTO parkings(
            price
        )
        VALUES ($1)
        RETURNING id, price;
        ",
    )
    .bind(parking.price)
    .fetch_one(&mut *connection)
    .await
    .map_err(convert_error)?;

    let edge_rows = parking
        .edges
        .iter()
        .enumerate()
        .map(|(sequence, edge)| ParkingEdgeRow {
            parking_id: row.id.clone(),
            sequence: sequence as i32,
            latitude: edge.lat,
            longitude: edge.lng,
        })
        .collect::<Vec<_>>();

    let mut inserted: Vec<ParkingEdgeRow> = Vec::with_capacity(edge_rows.len());
    for chunk in edge_rows.chunks(rows_per_statement(EDGE_COLUMNS.len())) {
        let rows: Vec<ParkingEdgeRow> = insert_all_returning(
            &mut *connection,
            "parking_edges",
            &EDGE_COLUMNS,
            chunk,
            |query, edge| {
                query
                    .bind(edge.parking_id.clone())
                    .bind(edge.sequence)
                    .bind(edge.latitude)
                    .bind(edge.longitude)
            },
        )
        .await
        .map_err(convert_error)?;
        inserted.extend(rows);
    }
    inserted.sort_by_key(|edge| edge.sequence);

    Ok(row.to_model(&inserted))
}

pub async fn delete(connection: &mut PgConnection, id: Id<Parking>) -> Result<()> {
    // edges go with it through ON DELETE CASCADE
    let result = sqlx::query(
        "
        DELETE FROM
            parkings
        WHERE
            id = $1;
        ",
    )
    .bind(id.raw())
    .execute(&mut *connection)
    .await
    .map_err(convert_error)?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }
    Ok(())
}
