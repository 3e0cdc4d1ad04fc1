// Catalog lookup module
// Menu items and the option catalog a selection is checked against

pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use error::CatalogError;
pub use models::{MenuItem, OptionChoice, OptionGroup, SelectionType};
pub use repository::{MenuRepository, PgMenuRepository};
pub use service::CatalogService;
