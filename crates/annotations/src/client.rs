use model::{marker::Marker, parking::Parking, Validate, WithId};
use utility::id::Id;

use crate::{
    database::{Database, DatabaseTransaction, Repo},
    RequestResult,
};

/// Service layer in front of the store. Every create is validated before the
/// store is touched, so invalid input never leaves a partial document behind.
#[derive(Debug, Clone)]
pub struct Client<D>
where
    D: Database,
{
    database: D,
}

impl<D> Client<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self { database }
    }
}

impl<D> Client<D>
where
    D: Database,
{
    pub async fn get_markers(&self) -> RequestResult<Vec<WithId<Marker>>> {
        Ok(Repo::<Marker>::get_all(&mut self.database.auto()).await?)
    }

    pub async fn get_marker(&self, id: Id<Marker>) -> RequestResult<WithId<Marker>> {
        Ok(Repo::<Marker>::get(&mut self.database.auto(), id).await?)
    }

    pub async fn create_marker(&self, marker: Marker) -> RequestResult<WithId<Marker>> {
        marker.validate()?;
        let created = Repo::<Marker>::insert(&mut self.database.auto(), marker).await?;
        log::info!("created marker {} ({})", created.id, created.content.kind);
        Ok(created)
    }

    pub async fn delete_marker(&self, id: Id<Marker>) -> RequestResult<()> {
        Repo::<Marker>::delete(&mut self.database.auto(), id.clone()).await?;
        log::info!("deleted marker {}", id);
        Ok(())
    }
}

impl<D> Client<D>
where
    D: Database,
{
    pub async fn get_parkings(&self) -> RequestResult<Vec<WithId<Parking>>> {
        Ok(Repo::<Parking>::get_all(&mut self.database.auto()).await?)
    }

    pub async fn get_parking(&self, id: Id<Parking>) -> RequestResult<WithId<Parking>> {
        Ok(Repo::<Parking>::get(&mut self.database.auto(), id).await?)
    }

    pub async fn create_parking(
        &self,
        parking: Parking,
    ) -> RequestResult<WithId<Parking>> {
        parking.validate()?;
        // the parking row and its edge rows are written together
        let mut tx = self.database.transaction().await?;
        let created = Repo::<Parking>::insert(&mut tx, parking).await?;
        tx.commit().await?;
        log::info!(
            "created parking {} with {} edges",
            created.id,
            created.content.edges.len()
        );
        Ok(created)
    }

    pub async fn delete_parking(&self, id: Id<Parking>) -> RequestResult<()> {
        Repo::<Parking>::delete(&mut self.database.auto(), id.clone()).await?;
        log::info!("deleted parking {}", id);
        Ok(())
    }
}
