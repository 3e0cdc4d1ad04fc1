// Authentication module
// Resolves the acting user's identity from a bearer token; issuance lives elsewhere

pub mod error;
pub mod middleware;
pub mod models;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::{AdminUser, AuthenticatedUser};
pub use models::{Identity, Role};
pub use token::{Claims, TokenService};
