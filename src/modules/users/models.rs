use serde::{Deserialize, Serialize};
use shelf_db::{bson::oid::ObjectId, Document};
use shelf_http::{extract::require_non_blank, FieldError, Validate};

/// A registered user as stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

/// Emails are compared case-insensitively and without surrounding space.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    let email = email.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed {
        errors.push(FieldError {
            field: "email",
            error: "invalid",
        });
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
}

impl Validate for SignUp {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_email(&self.email, &mut errors);
        require_non_blank("password", &self.password, &mut errors);
        require_non_blank("firstname", &self.firstname, &mut errors);
        require_non_blank("lastname", &self.lastname, &mut errors);
        finish(errors)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

impl Validate for SignIn {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_email(&self.email, &mut errors);
        require_non_blank("password", &self.password, &mut errors);
        finish(errors)
    }
}

/// Public view of a user; never includes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: user.email,
            firstname: user.firstname,
            lastname: user.lastname,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}
