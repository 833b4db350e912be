use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shelf_authz::{AuthUser, JwtAuthority};
use shelf_http::{AppError, ValidJson};

use super::{
    models::{AccessToken, SignIn, SignUp, UserResponse},
    service::UserService,
};

#[derive(Clone)]
pub struct UsersState {
    pub service: UserService,
    pub auth: Arc<JwtAuthority>,
}

impl FromRef<UsersState> for Arc<JwtAuthority> {
    fn from_ref(state: &UsersState) -> Self {
        state.auth.clone()
    }
}

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/me", get(me))
        .with_state(state)
}

async fn signup(
    State(state): State<UsersState>,
    ValidJson(payload): ValidJson<SignUp>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state.service.signup(payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn signin(
    State(state): State<UsersState>,
    ValidJson(payload): ValidJson<SignIn>,
) -> Result<Json<AccessToken>, AppError> {
    Ok(Json(state.service.signin(payload).await?))
}

async fn me(user: AuthUser, State(state): State<UsersState>) -> Result<Json<UserResponse>, AppError> {
    let profile = state
        .service
        .profile(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found("user no longer exists"))?;
    Ok(Json(profile.into()))
}
