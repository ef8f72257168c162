use std::{error, fmt, result};

use async_trait::async_trait;
use model::{marker::Marker, parking::Parking, WithId};
use utility::id::{HasId, Id};

#[derive(Debug)]
pub enum DatabaseError {
    NotFound,
    Other(Box<dyn error::Error + Send + Sync>),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "row not found"),
            Self::Other(why) => write!(f, "{}", why),
        }
    }
}

impl error::Error for DatabaseError {}

pub type Result<T> = result::Result<T, DatabaseError>;

/// Storage for one kind of document. The store owns identity: `insert`
/// returns the element together with the id it generated.
#[async_trait]
pub trait Repo<T>
where
    T: HasId<IdType = String> + Send + 'static,
{
    async fn get(&mut self, id: Id<T>) -> Result<WithId<T>>;
    async fn get_all(&mut self) -> Result<Vec<WithId<T>>>;
    async fn insert(&mut self, element: T) -> Result<WithId<T>>;
    /// Fails with `NotFound` if nothing was deleted.
    async fn delete(&mut self, id: Id<T>) -> Result<()>;
}

pub trait DatabaseOperations: Repo<Marker> + Repo<Parking> + Send {}

impl<O> DatabaseOperations for O where O: Repo<Marker> + Repo<Parking> + Send {}

#[async_trait]
pub trait DatabaseTransaction: DatabaseOperations {
    async fn commit(self) -> Result<()>;
}

pub trait DatabaseAutocommit: DatabaseOperations {}

#[async_trait]
pub trait Database: Clone + Send + Sync + Sized + 'static {
    type Transaction: DatabaseTransaction;
    type Autocommit: DatabaseAutocommit;

    fn auto(&self) -> Self::Autocommit;
    async fn transaction(&self) -> Result<Self::Transaction>;
}
