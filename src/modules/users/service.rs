use std::sync::Arc;

use shelf_authz::{
    password::{hash_password, verify_password},
    JwtAuthority,
};
use shelf_db::{bson::doc, Repository};
use shelf_http::AppError;

use super::models::{normalize_email, AccessToken, SignIn, SignUp, User};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Registration, sign-in, and profile lookup.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn Repository<User>>,
    auth: Arc<JwtAuthority>,
    password_cost: u32,
}

impl UserService {
    pub fn new(users: Arc<dyn Repository<User>>, auth: Arc<JwtAuthority>, password_cost: u32) -> Self {
        Self {
            users,
            auth,
            password_cost,
        }
    }

    /// Register a user. A taken email surfaces as a conflict from the
    /// unique index.
    pub async fn signup(&self, request: SignUp) -> Result<User, AppError> {
        let password_hash = hash_password(request.password, self.password_cost).await?;
        let user = User {
            id: None,
            email: normalize_email(&request.email),
            password_hash,
            firstname: request.firstname,
            lastname: request.lastname,
        };

        let created = self.users.create(user).await?;
        tracing::info!(user_id = ?created.id, "user registered");
        Ok(created)
    }

    pub async fn signin(&self, request: SignIn) -> Result<AccessToken, AppError> {
        let email = normalize_email(&request.email);
        let user = self
            .users
            .find_one(doc! { "email": email.as_str() })
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(request.password, user.password_hash.clone()).await? {
            tracing::warn!(user_id = ?user.id, "sign-in with wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let subject = user.id.map(|id| id.to_hex()).unwrap_or_default();
        let access_token = self.auth.issue(&subject, &user.email)?;
        Ok(AccessToken { access_token })
    }

    pub async fn profile(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.find_by_id(id).await?)
    }
}
