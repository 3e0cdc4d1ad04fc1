pub mod models;
pub mod error;
pub mod repository;
pub mod rating_calculator;
pub mod service;
pub mod handlers;

pub use models::*;
pub use error::*;
pub use repository::*;
pub use rating_calculator::*;
pub use service::*;
pub use handlers::*;
