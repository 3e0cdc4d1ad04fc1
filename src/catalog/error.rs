use crate::error::ApiError;
use crate::store::StoreError;

/// Error types for catalog lookups
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Menu with id {0} not found")]
    MenuNotFound(i32),

    /// Submitted options are not part of the menu's catalog
    #[error("Invalid menu options: {0}")]
    InvalidSelection(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::MenuNotFound(id) => ApiError::not_found("Menu", id),
            CatalogError::InvalidSelection(msg) => ApiError::Malformed(msg),
            CatalogError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}
