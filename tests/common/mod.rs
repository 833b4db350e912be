#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shelf_app::Application;
use shelf_kernel::settings::Settings;
use shelf_db::DatabaseSettings;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Application,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Boot the application against a fresh in-memory store.
pub async fn spawn() -> TestApp {
    let mut settings = Settings::default();
    settings.database = DatabaseSettings::memory();
    settings.auth.password_cost = 4;

    let app = Application::bootstrap(settings).await.unwrap();
    let router = app.router();
    TestApp { app, router }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None, None).await
    }

    /// Sign up the default user (once) and sign in, returning the token.
    pub async fn login(&self) -> String {
        let signin = self
            .request(Method::POST, "/api/users/signin", None, Some(credentials()))
            .await;
        if signin.status == StatusCode::OK {
            return signin.body["access_token"].as_str().unwrap().to_string();
        }

        let signup = self
            .request(Method::POST, "/api/users/signup", None, Some(sign_up()))
            .await;
        assert_eq!(signup.status, StatusCode::CREATED, "{}", signup.body);

        let signin = self
            .request(Method::POST, "/api/users/signin", None, Some(credentials()))
            .await;
        assert_eq!(signin.status, StatusCode::OK, "{}", signin.body);
        signin.body["access_token"].as_str().unwrap().to_string()
    }
}

pub fn sign_up() -> Value {
    json!({
        "email": "a@a.ru",
        "password": "111",
        "firstname": "Ivan",
        "lastname": "Ivanov"
    })
}

pub fn credentials() -> Value {
    json!({ "email": "a@a.ru", "password": "111" })
}

pub fn book() -> Value {
    json!({
        "title": "New Book ",
        "description": "New Book Description",
        "authors": "John Black",
        "favorite": "1"
    })
}
