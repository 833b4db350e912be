use std::sync::Arc;

use shelf_db::{DbResult, Repository};

use super::models::{Book, CreateBook};

/// Book operations, each a single repository call.
#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn Repository<Book>>,
}

impl BookService {
    pub fn new(books: Arc<dyn Repository<Book>>) -> Self {
        Self { books }
    }

    pub async fn find_all(&self) -> DbResult<Vec<Book>> {
        self.books.find().await
    }

    pub async fn get_book(&self, id: &str) -> DbResult<Option<Book>> {
        self.books.find_by_id(id).await
    }

    pub async fn create(&self, book: CreateBook) -> DbResult<Book> {
        let created = self.books.create(book.into()).await?;
        tracing::debug!(book_id = ?created.id, "book created");
        Ok(created)
    }

    /// Replace the book's fields, returning it as it was before the update.
    pub async fn update_book(&self, id: &str, book: CreateBook) -> DbResult<Option<Book>> {
        self.books.find_one_and_update(id, book.into()).await
    }

    /// Remove the book, returning the removed document.
    pub async fn delete_book(&self, id: &str) -> DbResult<Option<Book>> {
        self.books.find_one_and_remove(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shelf_db::{bson, bson::oid::ObjectId, DbError};
    use std::sync::Mutex;

    /// Repository returning canned answers and recording the calls it saw.
    #[derive(Default)]
    struct CannedBooks {
        answer: Option<Book>,
        all: Vec<Book>,
        calls: Mutex<Vec<String>>,
    }

    impl CannedBooks {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl Repository<Book> for CannedBooks {
        async fn find(&self) -> DbResult<Vec<Book>> {
            self.record("find".to_string());
            Ok(self.all.clone())
        }

        async fn find_by_id(&self, id: &str) -> DbResult<Option<Book>> {
            self.record(format!("find_by_id:{id}"));
            if id == "bad" {
                return Err(DbError::InvalidId(id.to_string()));
            }
            Ok(self.answer.clone())
        }

        async fn find_one(&self, _filter: bson::Document) -> DbResult<Option<Book>> {
            unreachable!("book service never filters")
        }

        async fn create(&self, document: Book) -> DbResult<Book> {
            self.record(format!("create:{}", document.title));
            Ok(self.answer.clone().unwrap_or(document))
        }

        async fn find_one_and_update(&self, id: &str, document: Book) -> DbResult<Option<Book>> {
            self.record(format!("update:{id}:{}", document.title));
            Ok(self.answer.clone())
        }

        async fn find_one_and_remove(&self, id: &str) -> DbResult<Option<Book>> {
            self.record(format!("remove:{id}"));
            Ok(self.answer.clone())
        }
    }

    fn books() -> Vec<Book> {
        vec![
            Book {
                id: Some(ObjectId::new()),
                title: "New Book ".to_string(),
                description: "New Book Description".to_string(),
                authors: "John Black".to_string(),
                favorite: "1".to_string(),
            },
            Book {
                id: Some(ObjectId::new()),
                title: "New Book Again".to_string(),
                description: "New Book Description  Again".to_string(),
                authors: "John Black  Again".to_string(),
                favorite: "2 Again".to_string(),
            },
        ]
    }

    fn dto(book: &Book) -> CreateBook {
        CreateBook {
            title: book.title.clone(),
            description: book.description.clone(),
            authors: book.authors.clone(),
            favorite: book.favorite.clone(),
        }
    }

    fn service(repo: CannedBooks) -> (BookService, Arc<CannedBooks>) {
        let repo = Arc::new(repo);
        (BookService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn find_all_returns_repository_result() {
        let all = books();
        let (service, repo) = service(CannedBooks {
            all: all.clone(),
            ..CannedBooks::default()
        });

        assert_eq!(service.find_all().await.unwrap(), all);
        assert_eq!(*repo.calls.lock().unwrap(), vec!["find"]);
    }

    #[tokio::test]
    async fn get_book_returns_repository_result() {
        let book = books().remove(0);
        let id = book.id.unwrap().to_hex();
        let (service, repo) = service(CannedBooks {
            answer: Some(book.clone()),
            ..CannedBooks::default()
        });

        assert_eq!(service.get_book(&id).await.unwrap(), Some(book));
        assert_eq!(*repo.calls.lock().unwrap(), vec![format!("find_by_id:{id}")]);
    }

    #[tokio::test]
    async fn get_book_propagates_repository_errors() {
        let (service, _) = service(CannedBooks::default());
        assert!(matches!(
            service.get_book("bad").await,
            Err(DbError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn create_returns_repository_result() {
        let book = books().remove(0);
        let (service, repo) = service(CannedBooks {
            answer: Some(book.clone()),
            ..CannedBooks::default()
        });

        assert_eq!(service.create(dto(&book)).await.unwrap(), book);
        assert_eq!(*repo.calls.lock().unwrap(), vec!["create:New Book "]);
    }

    #[tokio::test]
    async fn update_returns_repository_result() {
        let book = books().remove(1);
        let (service, repo) = service(CannedBooks {
            answer: Some(book.clone()),
            ..CannedBooks::default()
        });

        assert_eq!(
            service.update_book("0", dto(&book)).await.unwrap(),
            Some(book)
        );
        assert_eq!(
            *repo.calls.lock().unwrap(),
            vec!["update:0:New Book Again"]
        );
    }

    #[tokio::test]
    async fn delete_returns_repository_result() {
        let book = books().remove(1);
        let (service, repo) = service(CannedBooks {
            answer: Some(book.clone()),
            ..CannedBooks::default()
        });

        assert_eq!(service.delete_book("0").await.unwrap(), Some(book));
        assert_eq!(*repo.calls.lock().unwrap(), vec!["remove:0"]);
    }

    #[tokio::test]
    async fn missing_documents_pass_through_as_none() {
        let (service, _) = service(CannedBooks::default());
        assert_eq!(service.delete_book("0").await.unwrap(), None);
        assert_eq!(service.update_book("0", dto(&books()[0])).await.unwrap(), None);
    }
}
