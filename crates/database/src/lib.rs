use std::{env, error::Error};

use annotations::database::{
    self, Database, DatabaseAutocommit, DatabaseTransaction, Repo,
};
use async_trait::async_trait;
use model::{marker::Marker, parking::Parking, WithId};
use queries::convert_error;
use sqlx::Transaction;
use utility::id::Id;

pub mod data_model;
pub mod queries;

pub struct DatabaseConnectionInfo {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub database: String,
}

impl DatabaseConnectionInfo {
    /// `None` unless every `DATABASE_*` variable is set.
    pub fn from_env() -> Option<Self> {
        let username = env::var("DATABASE_USER").ok()?;
        let password = env::var("DATABASE_PASSWORD").ok()?;
        let hostname = env::var("DATABASE_HOST").ok()?;
        let port: u16 = env::var("DATABASE_PORT").ok()?.parse().ok()?;
        let database = env::var("DATABASE_NAME").ok()?;
        Some(Self {
            username,
            password,
            hostname,
            port,
            database,
        })
    }

    pub(self) fn postgres_url(self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.hostname, self.port, self.database
        )
    }
}

#[derive(Debug, Clone)]
pub struct PgDatabase {
    connection: sqlx::PgPool,
}

pub struct PgDatabaseTransaction<'a> {
    tx: Transaction<'a, sqlx::Postgres>,
}

#[async_trait]
impl<'a> DatabaseTransaction for PgDatabaseTransaction<'a> {
    async fn commit(self) -> database::Result<()> {
        self.tx.commit().await.map_err(convert_error)
    }
}

pub struct PgDatabaseAutocommit {
    pool: sqlx::PgPool,
}

impl DatabaseAutocommit for PgDatabaseAutocommit {}

impl PgDatabase {
    pub async fn connect(
        database_connection_info: DatabaseConnectionInfo,
    ) -> Result<Self, Box<dyn Error>> {
        let url = database_connection_info.postgres_url();
        let pool = sqlx::postgres::PgPool::connect(&url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("connected to postgres, migrations applied");

        Ok(Self { connection: pool })
    }
}

#[async_trait]
impl Database for PgDatabase {
    type Transaction = PgDatabaseTransaction<'static>;
    type Autocommit = PgDatabaseAutocommit;

    fn auto(&self) -> Self::Autocommit {
        PgDatabaseAutocommit {
            pool: self.connection.clone(),
        }
    }

    async fn transaction(&self) -> database::Result<Self::Transaction> {
        let tx: Transaction<'static, sqlx::Postgres> =
            self.connection.begin().await.map_err(convert_error)?;

        Ok(PgDatabaseTransaction { tx })
    }
}

#[async_trait]
impl Repo<Marker> for PgDatabaseAutocommit {
    async fn get(&mut self, id: Id<Marker>) -> database::Result<WithId<Marker>> {
        queries::marker::get(&self.pool, id).await
    }

    async fn get_all(&mut self) -> database::Result<Vec<WithId<Marker>>> {
        queries::marker::get_all(&self.pool).await
    }

    async fn insert(&mut self, element: Marker) -> database::Result<WithId<Marker>> {
        queries::marker::insert(&self.pool, element).await
    }

    async fn delete(&mut self, id: Id<Marker>) -> database::Result<()> {
        queries::marker::delete(&self.pool, id).await
    }
}

#[async_trait]
impl<'a> Repo<Marker> for PgDatabaseTransaction<'a> {
    async fn get(&mut self, id: Id<Marker>) -> database::Result<WithId<Marker>> {
        queries::marker::get(&mut *self.tx, id).await
    }

    async fn get_all(&mut self) -> database::Result<Vec<WithId<Marker>>> {
        queries::marker::get_all(&mut *self.tx).await
    }

    async fn insert(&mut self, element: Marker) -> database::Result<WithId<Marker>> {
        queries::marker::insert(&mut *self.tx, element).await
    }

    async fn delete(&mut self, id: Id<Marker>) -> database::Result<()> {
        queries::marker::delete(&mut *self.tx, id).await
    }
}

#[async_trait]
impl Repo<Parking> for PgDatabaseAutocommit {
    async fn get(&mut self, id: Id<Parking>) -> database::Result<WithId<Parking>> {
        let mut connection = self.pool.acquire().await.map_err(convert_error)?;
        queries::parking::get(&mut connection, id).await
    }

    async fn get_all(&mut self) -> database::Result<Vec<WithId<Parking>>> {
        let mut connection = self.pool.acquire().await.map_err(convert_error)?;
        queries::parking::get_all(&mut connection).await
    }

    async fn insert(&mut self, element: Parking) -> database::Result<WithId<Parking>> {
        // an autocommit insert still needs its own transaction for the edges
        let mut tx = self.pool.begin().await.map_err(convert_error)?;
        let result = queries::parking::insert(&mut tx, element).await?;
        tx.commit().await.map_err(convert_error)?;
        Ok(result)
    }

    async fn delete(&mut self, id: Id<Parking>) -> database::Result<()> {
        let mut connection = self.pool.acquire().await.map_err(convert_error)?;
        queries::parking::delete(&mut connection, id).await
    }
}

#[async_trait]
impl<'a> Repo<Parking> for PgDatabaseTransaction<'a> {
    async fn get(&mut self, id: Id<Parking>) -> database::Result<WithId<Parking>> {
        queries::parking::get(&mut self.tx, id).await
    }

    async fn get_all(&mut self) -> database::Result<Vec<WithId<Parking>>> {
        queries::parking::get_all(&mut self.tx).await
    }

    async fn insert(&mut self, element: Parking) -> database::Result<WithId<Parking>> {
        queries::parking::insert(&mut self.tx, element).await
    }

    async fn delete(&mut self, id: Id<Parking>) -> database::Result<()> {
        queries::parking::delete(&mut self.tx, id).await
    }
}
