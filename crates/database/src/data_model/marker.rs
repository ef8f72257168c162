use annotations::database::DatabaseError;
use model::{
    marker::{Marker, MarkerKind},
    point::Point,
    WithId,
};
use sqlx::prelude::FromRow;
use utility::id::Id;

#[derive(Debug, Clone, FromRow)]
pub struct MarkerRow {
    pub id: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub name: String,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl MarkerRow {
    /// Fails if the stored type tag is not one we know.
    pub fn to_model(self) -> Result<WithId<Marker>, DatabaseError> {
        let kind = self
            .kind
            .parse::<MarkerKind>()
            .map_err(|why| DatabaseError::Other(Box::new(why)))?;
        Ok(WithId::new(
            Id::new(self.id),
            Marker {
                kind,
                name: self.name,
                price: self.price,
                coordinates: Point::new(self.latitude, self.longitude),
            },
        ))
    }
}
