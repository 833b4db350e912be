use serde::{Deserialize, Serialize};
use shelf_db::{bson::oid::ObjectId, Document};
use shelf_http::{extract::require_non_blank, FieldError, Validate};

/// A book as stored in the `books` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub authors: String,
    pub favorite: String,
}

impl Document for Book {
    const COLLECTION: &'static str = "books";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

/// Request body for creating or replacing a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub description: String,
    pub authors: String,
    pub favorite: String,
}

impl Validate for CreateBook {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require_non_blank("title", &self.title, &mut errors);
        require_non_blank("authors", &self.authors, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<CreateBook> for Book {
    fn from(book: CreateBook) -> Self {
        Self {
            id: None,
            title: book.title,
            description: book.description,
            authors: book.authors,
            favorite: book.favorite,
        }
    }
}

/// JSON representation returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub authors: String,
    pub favorite: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: book.title,
            description: book.description,
            authors: book.authors,
            favorite: book.favorite,
        }
    }
}
