//! Authentication for shelf: JWT issuing, the bearer-token guard, and
//! password hashing.

pub mod error;
pub mod guard;
pub mod jwt;
pub mod password;

pub use error::AuthError;
pub use guard::AuthUser;
pub use jwt::{Claims, JwtAuthority};
