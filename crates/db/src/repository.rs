use async_trait::async_trait;
use mongodb::bson;

use crate::{document::Document, error::DbResult};

/// Data access for one collection.
///
/// Identifiers arrive as raw strings and are cast inside the repository, so a
/// malformed id surfaces as [`crate::DbError::InvalidId`].
#[async_trait]
pub trait Repository<T: Document>: Send + Sync {
    /// All documents in the collection
    async fn find(&self) -> DbResult<Vec<T>>;

    async fn find_by_id(&self, id: &str) -> DbResult<Option<T>>;

    /// First document whose fields equal every entry of `filter`
    async fn find_one(&self, filter: bson::Document) -> DbResult<Option<T>>;

    /// Insert a document, assigning an id when it has none.
    async fn create(&self, document: T) -> DbResult<T>;

    /// Overwrite every field of the stored document except `_id` and return
    /// the document as it was before the update.
    async fn find_one_and_update(&self, id: &str, document: T) -> DbResult<Option<T>>;

    /// Remove the document and return it.
    async fn find_one_and_remove(&self, id: &str) -> DbResult<Option<T>>;
}

/// Encode a document as a `$set` payload, dropping its identifier.
pub(crate) fn update_fields<T: Document>(document: &T) -> DbResult<bson::Document> {
    let mut fields = bson::to_document(document)?;
    fields.remove("_id");
    Ok(fields)
}
