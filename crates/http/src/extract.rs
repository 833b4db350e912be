//! Request extractors shared by modules.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::AppError;

/// A single field-level validation failure, reported in error `details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: &'static str,
}

/// Field checks run on request bodies after they deserialize.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

/// Record a `blank` error when `value` is empty or whitespace.
pub fn require_non_blank(field: &'static str, value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError {
            field,
            error: "blank",
        });
    }
}

/// JSON body extractor that rejects malformed payloads with 400 and invalid
/// ones with 422.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        value.validate().map_err(|errors| {
            let details = errors
                .into_iter()
                .map(|error| serde_json::json!(error))
                .collect();
            AppError::validation(details, "request body failed validation")
        })?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Greeting {
        name: String,
    }

    impl Validate for Greeting {
        fn validate(&self) -> Result<(), Vec<FieldError>> {
            let mut errors = Vec::new();
            require_non_blank("name", &self.name, &mut errors);
            if errors.is_empty() {
                Ok(())
            } else {
                Err(errors)
            }
        }
    }

    fn app() -> Router {
        Router::new().route(
            "/greet",
            post(|ValidJson(greeting): ValidJson<Greeting>| async move { greeting.name }),
        )
    }

    async fn post_json(body: &'static str) -> StatusCode {
        let request = HttpRequest::post("/greet")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn accepts_valid_bodies() {
        assert_eq!(post_json(r#"{"name":"Ada"}"#).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        assert_eq!(post_json(r#"{"name":"#).await, StatusCode::BAD_REQUEST);
        assert_eq!(post_json(r#"{}"#).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_fields_fail_validation() {
        assert_eq!(
            post_json(r#"{"name":"  "}"#).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
