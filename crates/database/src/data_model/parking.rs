use model::{parking::Parking, point::Point, WithId};
use sqlx::prelude::FromRow;
use utility::id::Id;

#[derive(Debug, Clone, FromRow)]
pub struct ParkingRow {
    pub id: String,
    pub price: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ParkingEdgeRow {
    pub parking_id: String,
    pub sequence: i32,
    pub latitude: f64,
    pub longitude: f64,
}

impl ParkingEdgeRow {
    pub fn to_model(&self) -> Point {
        Point::new(self.latitude, self.longitude)
    }
}

impl ParkingRow {
    /// `edges` must already be ordered by sequence.
    pub fn to_model(self, edges: &[ParkingEdgeRow]) -> WithId<Parking> {
        WithId::new(
            Id::new(self.id),
            Parking {
                price: self.price,
                edges: edges.iter().map(ParkingEdgeRow::to_model).collect(),
            },
        )
    }
}
