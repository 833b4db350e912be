use std::sync::Arc;

use mongodb::Database;

use crate::{
    document::Document,
    error::DbResult,
    memory::MemoryDatabase,
    migrate::IndexDefinition,
    mongo::{self, MongoRepository},
    repository::Repository,
    settings::{DatabaseBackend, DatabaseSettings},
};

/// Handle to the configured document store. Cheap to clone.
#[derive(Clone)]
pub enum Store {
    Mongo(Database),
    Memory(MemoryDatabase),
}

impl Store {
    /// Open the store selected by `settings.backend`.
    pub async fn connect(settings: &DatabaseSettings) -> DbResult<Self> {
        match settings.backend {
            DatabaseBackend::Mongo => Ok(Store::Mongo(mongo::connect(settings).await?)),
            DatabaseBackend::Memory => {
                tracing::info!(target: "shelf-db", "using in-memory document store");
                Ok(Store::memory())
            }
        }
    }

    /// A fresh, empty in-memory store.
    pub fn memory() -> Self {
        Store::Memory(MemoryDatabase::new())
    }

    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Store::Mongo(_) => DatabaseBackend::Mongo,
            Store::Memory(_) => DatabaseBackend::Memory,
        }
    }

    /// Repository over the collection named by `T::COLLECTION`.
    pub fn repository<T: Document>(&self) -> Arc<dyn Repository<T>> {
        match self {
            Store::Mongo(database) => Arc::new(MongoRepository::<T>::new(database)),
            Store::Memory(database) => Arc::new(database.repository::<T>()),
        }
    }

    pub async fn create_index(&self, collection: &str, index: &IndexDefinition) -> DbResult<()> {
        match self {
            Store::Mongo(database) => mongo::create_index(database, collection, index).await,
            Store::Memory(database) => database.create_index(collection, index),
        }
    }
}
