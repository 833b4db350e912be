//! MongoDB-backed repositories.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId},
    options::{IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};

use crate::{
    document::Document,
    error::{DbError, DbResult},
    id::parse_object_id,
    migrate::IndexDefinition,
    repository::{update_fields, Repository},
    settings::DatabaseSettings,
};

/// Connect to MongoDB and verify the deployment answers a ping.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<Database> {
    let client = mongodb::Client::with_uri_str(&settings.uri)
        .await
        .map_err(DbError::Driver)?;
    let database = client.database(&settings.name);

    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(DbError::Driver)?;

    tracing::info!(target: "shelf-db", database = %settings.name, "connected to mongodb");
    Ok(database)
}

/// Create an index on `collection` described by `index`.
pub async fn create_index(
    database: &Database,
    collection: &str,
    index: &IndexDefinition,
) -> DbResult<()> {
    let mut keys = bson::Document::new();
    for key in index.keys {
        keys.insert(*key, 1);
    }

    let model = IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .name(index.name.to_string())
                .unique(index.unique)
                .build(),
        )
        .build();

    database
        .collection::<bson::Document>(collection)
        .create_index(model)
        .await
        .map_err(|err| DbError::from_driver(err, collection))?;
    Ok(())
}

pub struct MongoRepository<T: Document> {
    collection: Collection<T>,
}

impl<T: Document> MongoRepository<T> {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(T::COLLECTION),
        }
    }

    fn driver_error(err: mongodb::error::Error) -> DbError {
        DbError::from_driver(err, T::COLLECTION)
    }
}

#[async_trait]
impl<T: Document> Repository<T> for MongoRepository<T> {
    async fn find(&self) -> DbResult<Vec<T>> {
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(Self::driver_error)?;
        cursor
            .try_collect::<Vec<T>>()
            .await
            .map_err(Self::driver_error)
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<T>> {
        let id = parse_object_id(id)?;
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(Self::driver_error)
    }

    async fn find_one(&self, filter: bson::Document) -> DbResult<Option<T>> {
        self.collection
            .find_one(filter)
            .await
            .map_err(Self::driver_error)
    }

    async fn create(&self, mut document: T) -> DbResult<T> {
        if document.id().is_none() {
            document.set_id(ObjectId::new());
        }

        self.collection
            .insert_one(&document)
            .await
            .map_err(Self::driver_error)?;
        Ok(document)
    }

    async fn find_one_and_update(&self, id: &str, document: T) -> DbResult<Option<T>> {
        let id = parse_object_id(id)?;
        let fields = update_fields(&document)?;

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": fields })
            .return_document(ReturnDocument::Before)
            .await
            .map_err(Self::driver_error)
    }

    async fn find_one_and_remove(&self, id: &str) -> DbResult<Option<T>> {
        let id = parse_object_id(id)?;
        self.collection
            .find_one_and_delete(doc! { "_id": id })
            .await
            .map_err(Self::driver_error)
    }
}
