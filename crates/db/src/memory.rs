//! In-process document store.
//!
//! Documents are kept as BSON so the backend encodes and decodes exactly like
//! the MongoDB one. Unique indexes created through migrations are enforced on
//! every write.

use std::{
    collections::{BTreeMap, HashMap},
    marker::PhantomData,
    sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use mongodb::bson::{self, oid::ObjectId, Bson};

use crate::{
    document::Document,
    error::{DbError, DbResult},
    id::parse_object_id,
    migrate::IndexDefinition,
    repository::{update_fields, Repository},
};

type SharedCollection = Arc<RwLock<MemoryCollection>>;

#[derive(Default)]
struct MemoryCollection {
    name: String,
    documents: BTreeMap<ObjectId, bson::Document>,
    unique_keys: Vec<&'static [&'static str]>,
}

impl MemoryCollection {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Whether `candidate` collides with another document on a unique index.
    fn violates_unique(&self, id: &ObjectId, candidate: &bson::Document) -> bool {
        self.unique_keys.iter().any(|keys| {
            let wanted: Vec<Option<&Bson>> = keys.iter().map(|key| candidate.get(*key)).collect();
            self.documents.iter().any(|(other_id, other)| {
                other_id != id
                    && keys
                        .iter()
                        .map(|key| other.get(*key))
                        .eq(wanted.iter().copied())
            })
        })
    }

    fn duplicate(&self) -> DbError {
        DbError::Duplicate {
            collection: self.name.clone(),
        }
    }
}

fn matches(document: &bson::Document, filter: &bson::Document) -> bool {
    filter
        .iter()
        .all(|(key, value)| document.get(key) == Some(value))
}

fn decode<T: Document>(document: &bson::Document) -> DbResult<T> {
    Ok(bson::from_document(document.clone())?)
}

/// A set of named in-memory collections. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    collections: Arc<Mutex<HashMap<String, SharedCollection>>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, name: &str) -> SharedCollection {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(MemoryCollection::named(name))))
            .clone()
    }

    /// Register an index. Only unique indexes change behaviour here.
    pub fn create_index(&self, collection: &str, index: &IndexDefinition) -> DbResult<()> {
        if !index.unique {
            return Ok(());
        }

        let shared = self.collection(collection);
        let mut guard = shared.write().unwrap_or_else(PoisonError::into_inner);
        if guard.unique_keys.contains(&index.keys) {
            return Ok(());
        }

        guard.unique_keys.push(index.keys);
        let collides = guard
            .documents
            .iter()
            .any(|(id, document)| guard.violates_unique(id, document));
        if collides {
            guard.unique_keys.pop();
            return Err(guard.duplicate());
        }
        Ok(())
    }

    pub fn repository<T: Document>(&self) -> MemoryRepository<T> {
        MemoryRepository {
            collection: self.collection(T::COLLECTION),
            _marker: PhantomData,
        }
    }
}

pub struct MemoryRepository<T: Document> {
    collection: SharedCollection,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> MemoryRepository<T> {
    fn read(&self) -> RwLockReadGuard<'_, MemoryCollection> {
        self.collection.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryCollection> {
        self.collection.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<T: Document> Repository<T> for MemoryRepository<T> {
    async fn find(&self) -> DbResult<Vec<T>> {
        self.read().documents.values().map(decode).collect()
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<T>> {
        let id = parse_object_id(id)?;
        self.read().documents.get(&id).map(decode).transpose()
    }

    async fn find_one(&self, filter: bson::Document) -> DbResult<Option<T>> {
        self.read()
            .documents
            .values()
            .find(|document| matches(document, &filter))
            .map(decode)
            .transpose()
    }

    async fn create(&self, mut document: T) -> DbResult<T> {
        let id = match document.id() {
            Some(id) => id,
            None => {
                let id = ObjectId::new();
                document.set_id(id);
                id
            }
        };
        let encoded = bson::to_document(&document)?;

        let mut collection = self.write();
        if collection.documents.contains_key(&id) || collection.violates_unique(&id, &encoded) {
            return Err(collection.duplicate());
        }
        collection.documents.insert(id, encoded);
        Ok(document)
    }

    async fn find_one_and_update(&self, id: &str, document: T) -> DbResult<Option<T>> {
        let id = parse_object_id(id)?;
        let fields = update_fields(&document)?;

        let mut collection = self.write();
        let Some(previous) = collection.documents.get(&id).cloned() else {
            return Ok(None);
        };

        let mut updated = previous.clone();
        updated.extend(fields);
        if collection.violates_unique(&id, &updated) {
            return Err(collection.duplicate());
        }
        collection.documents.insert(id, updated);

        decode(&previous).map(Some)
    }

    async fn find_one_and_remove(&self, id: &str) -> DbResult<Option<T>> {
        let id = parse_object_id(id)?;
        self.write().documents.remove(&id).as_ref().map(decode).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<ObjectId>,
        slug: String,
        body: String,
    }

    impl Note {
        fn new(slug: &str, body: &str) -> Self {
            Self {
                id: None,
                slug: slug.to_string(),
                body: body.to_string(),
            }
        }
    }

    impl Document for Note {
        const COLLECTION: &'static str = "notes";

        fn id(&self) -> Option<ObjectId> {
            self.id
        }

        fn set_id(&mut self, id: ObjectId) {
            self.id = Some(id);
        }
    }

    const SLUG_UNIQUE: IndexDefinition = IndexDefinition {
        name: "notes_slug_unique",
        keys: &["slug"],
        unique: true,
    };

    #[tokio::test]
    async fn create_assigns_an_id_and_find_returns_every_document() {
        let repo = MemoryDatabase::new().repository::<Note>();

        let first = repo.create(Note::new("a", "first")).await.unwrap();
        let second = repo.create(Note::new("b", "second")).await.unwrap();

        assert!(first.id.is_some());
        assert_eq!(repo.find().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn find_by_id_distinguishes_missing_from_malformed() {
        let repo = MemoryDatabase::new().repository::<Note>();

        let missing = repo.find_by_id(&ObjectId::new().to_hex()).await.unwrap();
        assert!(missing.is_none());

        let malformed = repo.find_by_id("1").await;
        assert!(matches!(malformed, Err(DbError::InvalidId(_))));
    }

    #[tokio::test]
    async fn update_returns_the_previous_document() {
        let repo = MemoryDatabase::new().repository::<Note>();
        let created = repo.create(Note::new("a", "draft")).await.unwrap();
        let id = created.id.unwrap().to_hex();

        let previous = repo
            .find_one_and_update(&id, Note::new("a", "final"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(previous.body, "draft");

        let current = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(current.body, "final");
        assert_eq!(current.id, created.id);
    }

    #[tokio::test]
    async fn remove_returns_the_document_once() {
        let repo = MemoryDatabase::new().repository::<Note>();
        let created = repo.create(Note::new("a", "gone")).await.unwrap();
        let id = created.id.unwrap().to_hex();

        let removed = repo.find_one_and_remove(&id).await.unwrap();
        assert_eq!(removed, Some(created));
        assert!(repo.find_one_and_remove(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_one_matches_every_filter_field() {
        let repo = MemoryDatabase::new().repository::<Note>();
        repo.create(Note::new("a", "x")).await.unwrap();
        let target = repo.create(Note::new("b", "x")).await.unwrap();

        let found = repo
            .find_one(doc! { "slug": "b", "body": "x" })
            .await
            .unwrap();
        assert_eq!(found, Some(target));
        assert!(repo
            .find_one(doc! { "slug": "b", "body": "y" })
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicates() {
        let database = MemoryDatabase::new();
        database.create_index("notes", &SLUG_UNIQUE).unwrap();
        let repo = database.repository::<Note>();

        repo.create(Note::new("a", "one")).await.unwrap();
        let second = repo.create(Note::new("b", "two")).await.unwrap();

        let duplicate = repo.create(Note::new("a", "three")).await;
        assert!(matches!(duplicate, Err(DbError::Duplicate { .. })));

        let renamed = repo
            .find_one_and_update(&second.id.unwrap().to_hex(), Note::new("a", "two"))
            .await;
        assert!(matches!(renamed, Err(DbError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn unique_index_creation_fails_on_existing_duplicates() {
        let database = MemoryDatabase::new();
        let repo = database.repository::<Note>();
        repo.create(Note::new("a", "one")).await.unwrap();
        repo.create(Note::new("a", "two")).await.unwrap();

        assert!(database.create_index("notes", &SLUG_UNIQUE).is_err());
        repo.create(Note::new("a", "three")).await.unwrap();
    }
}
