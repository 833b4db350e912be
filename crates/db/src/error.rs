use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

const DUPLICATE_KEY_CODE: i32 = 11000;

pub type DbResult<T> = Result<T, DbError>;

/// Errors surfaced by repositories and the store.
#[derive(Error, Debug)]
pub enum DbError {
    /// The identifier could not be cast to an ObjectId.
    #[error("invalid document id '{0}'")]
    InvalidId(String),

    /// A unique index rejected the write.
    #[error("duplicate key in collection '{collection}'")]
    Duplicate { collection: String },

    #[error("failed to encode document: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    #[error("failed to decode document: {0}")]
    Decode(#[from] mongodb::bson::de::Error),

    #[error(transparent)]
    Driver(mongodb::error::Error),
}

impl DbError {
    /// Translate a driver error, recognising duplicate key failures.
    pub fn from_driver(err: mongodb::error::Error, collection: &str) -> Self {
        let duplicate = match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY_CODE,
            ErrorKind::Command(command) => command.code == DUPLICATE_KEY_CODE,
            _ => false,
        };

        if duplicate {
            DbError::Duplicate {
                collection: collection.to_string(),
            }
        } else {
            DbError::Driver(err)
        }
    }
}
