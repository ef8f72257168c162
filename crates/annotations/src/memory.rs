use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

use async_trait::async_trait;
use indexmap::IndexMap;
use model::{marker::Marker, parking::Parking, WithId};
use utility::id::{HasId, Id};

use crate::database::{
    Database, DatabaseAutocommit, DatabaseError, DatabaseTransaction, Repo, Result,
};

#[derive(Debug, Clone, Default)]
struct Documents {
    markers: IndexMap<String, Marker>,
    parkings: IndexMap<String, Parking>,
}

trait Collection: HasId<IdType = String> + Clone + Send + Sized + 'static {
    fn collection(documents: &Documents) -> &IndexMap<String, Self>;
    fn collection_mut(documents: &mut Documents) -> &mut IndexMap<String, Self>;
}

impl Collection for Marker {
    fn collection(documents: &Documents) -> &IndexMap<String, Self> {
        &documents.markers
    }

    fn collection_mut(documents: &mut Documents) -> &mut IndexMap<String, Self> {
        &mut documents.markers
    }
}

impl Collection for Parking {
    fn collection(documents: &Documents) -> &IndexMap<String, Self> {
        &documents.parkings
    }

    fn collection_mut(documents: &mut Documents) -> &mut IndexMap<String, Self> {
        &mut documents.parkings
    }
}

#[derive(Debug)]
struct Shared {
    documents: Mutex<Documents>,
    next_id: AtomicU64,
}

impl Shared {
    fn documents(&self) -> Result<MutexGuard<'_, Documents>> {
        self.documents
            .lock()
            .map_err(|why| DatabaseError::Other(why.to_string().into()))
    }

    /// 24 hex digits, the shape of a document store object id.
    fn generate_id(&self) -> String {
        format!("{:024x}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// An in-process store with the same behaviour as the postgres one. Used when
/// no database is configured and in tests.
#[derive(Debug, Clone)]
pub struct MemoryDatabase {
    shared: Arc<Shared>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                documents: Mutex::new(Documents::default()),
                next_id: AtomicU64::new(0),
            }),
        }
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MemoryAutocommit {
    shared: Arc<Shared>,
}

impl DatabaseAutocommit for MemoryAutocommit {}

#[derive(Debug, Clone)]
enum Write {
    InsertMarker(String, Marker),
    InsertParking(String, Parking),
    DeleteMarker(String),
    DeleteParking(String),
}

/// Works on a private copy of the documents; `commit` replays the recorded
/// writes onto the shared store.
pub struct MemoryTransaction {
    shared: Arc<Shared>,
    staged: Documents,
    writes: Vec<Write>,
}

#[async_trait]
impl DatabaseTransaction for MemoryTransaction {
    async fn commit(self) -> Result<()> {
        let mut documents = self.shared.documents()?;
        for write in self.writes {
            match write {
                Write::InsertMarker(id, marker) => {
                    documents.markers.insert(id, marker);
                }
                Write::InsertParking(id, parking) => {
                    documents.parkings.insert(id, parking);
                }
                Write::DeleteMarker(id) => {
                    documents.markers.shift_remove(&id);
                }
                Write::DeleteParking(id) => {
                    documents.parkings.shift_remove(&id);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    type Transaction = MemoryTransaction;
    type Autocommit = MemoryAutocommit;

    fn auto(&self) -> Self::Autocommit {
        MemoryAutocommit {
            shared: self.shared.clone(),
        }
    }

    async fn transaction(&self) -> Result<Self::Transaction> {
        let staged = self.shared.documents()?.clone();
        Ok(MemoryTransaction {
            shared: self.shared.clone(),
            staged,
            writes: vec![],
        })
    }
}

fn get<T: Collection>(documents: &Documents, id: Id<T>) -> Result<WithId<T>> {
    T::collection(documents)
        .get(id.raw_ref::<str>())
        .cloned()
        .map(|content| WithId::new(id, content))
        .ok_or(DatabaseError::NotFound)
}

fn get_all<T: Collection>(documents: &Documents) -> Vec<WithId<T>> {
    T::collection(documents)
        .iter()
        .map(|(id, content)| WithId::new(Id::new(id.clone()), content.clone()))
        .collect()
}

fn delete<T: Collection>(documents: &mut Documents, id: &Id<T>) -> Result<()> {
    T::collection_mut(documents)
        .shift_remove(id.raw_ref::<str>())
        .map(|_| ())
        .ok_or(DatabaseError::NotFound)
}

macro_rules! memory_repos {
    ($model:ty, $insert:ident, $delete:ident) => {
        #[async_trait]
        impl Repo<$model> for MemoryAutocommit {
            async fn get(&mut self, id: Id<$model>) -> Result<WithId<$model>> {
                get(&*self.shared.documents()?, id)
            }

            async fn get_all(&mut self) -> Result<Vec<WithId<$model>>> {
                Ok(get_all(&*self.shared.documents()?))
            }

            async fn insert(&mut self, element: $model) -> Result<WithId<$model>> {
                let id = self.shared.generate_id();
                <$model>::collection_mut(&mut *self.shared.documents()?)
                    .insert(id.clone(), element.clone());
                Ok(WithId::new(Id::new(id), element))
            }

            async fn delete(&mut self, id: Id<$model>) -> Result<()> {
                delete(&mut *self.shared.documents()?, &id)
            }
        }

        #[async_trait]
        impl Repo<$model> for MemoryTransaction {
            async fn get(&mut self, id: Id<$model>) -> Result<WithId<$model>> {
                get(&self.staged, id)
            }

            async fn get_all(&mut self) -> Result<Vec<WithId<$model>>> {
                Ok(get_all(&self.staged))
            }

            async fn insert(&mut self, element: $model) -> Result<WithId<$model>> {
                let id = self.shared.generate_id();
                <$model>::collection_mut(&mut self.staged)
                    .insert(id.clone(), element.clone());
                self.writes.push(Write::$insert(id.clone(), element.clone()));
                Ok(WithId::new(Id::new(id), element))
            }

            async fn delete(&mut self, id: Id<$model>) -> Result<()> {
                delete(&mut self.staged, &id)?;
                self.writes.push(Write::$delete(id.raw()));
                Ok(())
            }
        }
    };
}

memory_repos!(Marker, InsertMarker, DeleteMarker);
memory_repos!(Parking, InsertParking, DeleteParking);
