use mongodb::bson::oid::ObjectId;

use crate::error::{DbError, DbResult};

/// Parse a 24 character hex string into an [`ObjectId`].
pub fn parse_object_id(raw: &str) -> DbResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| DbError::InvalidId(raw.to_string()))
}
