use shelf_http::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("authorization header must use the Bearer scheme")]
    InvalidScheme,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidScheme | AuthError::InvalidToken(_) => {
                AppError::unauthorized(err.to_string())
            }
            AuthError::Hash(_) | AuthError::Task(_) => AppError::Internal(err.into()),
        }
    }
}
