use mongodb::bson::oid::ObjectId;
use serde::{de::DeserializeOwned, Serialize};

/// A type persisted as one document of a named collection.
///
/// The identifier is stored under `_id`; implementors should serialize it with
/// `#[serde(rename = "_id", skip_serializing_if = "Option::is_none")]`.
pub trait Document: Serialize + DeserializeOwned + Clone + Unpin + Send + Sync + 'static {
    /// Collection holding documents of this type
    const COLLECTION: &'static str;

    fn id(&self) -> Option<ObjectId>;

    fn set_id(&mut self, id: ObjectId);
}
