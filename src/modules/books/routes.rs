use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shelf_authz::{AuthUser, JwtAuthority};
use shelf_http::{AppError, ValidJson};

use super::{
    models::{BookResponse, CreateBook},
    service::BookService,
};

#[derive(Clone)]
pub struct BooksState {
    pub service: BookService,
    pub auth: Arc<JwtAuthority>,
}

impl FromRef<BooksState> for Arc<JwtAuthority> {
    fn from_ref(state: &BooksState) -> Self {
        state.auth.clone()
    }
}

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(state)
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("book '{id}' not found"))
}

async fn list_books(State(state): State<BooksState>) -> Result<Json<Vec<BookResponse>>, AppError> {
    let books = state.service.find_all().await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let book = state.service.get_book(&id).await?.ok_or_else(|| not_found(&id))?;
    Ok(Json(book.into()))
}

async fn create_book(
    user: AuthUser,
    State(state): State<BooksState>,
    ValidJson(payload): ValidJson<CreateBook>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let book = state.service.create(payload).await?;
    tracing::info!(user_id = %user.id, book_id = ?book.id, "book created");
    Ok((StatusCode::CREATED, Json(book.into())))
}

/// Responds with the book as it was before the update.
async fn update_book(
    user: AuthUser,
    State(state): State<BooksState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<CreateBook>,
) -> Result<Json<BookResponse>, AppError> {
    let previous = state
        .service
        .update_book(&id, payload)
        .await?
        .ok_or_else(|| not_found(&id))?;
    tracing::info!(user_id = %user.id, book_id = %id, "book updated");
    Ok(Json(previous.into()))
}

async fn delete_book(
    user: AuthUser,
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let removed = state
        .service
        .delete_book(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    tracing::info!(user_id = %user.id, book_id = %id, "book deleted");
    Ok(Json(removed.into()))
}
