use std::sync::Arc;

use crate::catalog::{
    error::CatalogError,
    models::{MenuItem, OptionGroup},
    repository::MenuRepository,
};

/// Catalog lookup and option validation
#[derive(Clone)]
pub struct CatalogService {
    menus: Arc<dyn MenuRepository>,
}

impl CatalogService {
    pub fn new(menus: Arc<dyn MenuRepository>) -> Self {
        Self { menus }
    }

    /// Get a menu item or fail with `MenuNotFound`
    pub async fn get_menu_item(&self, id: i32) -> Result<MenuItem, CatalogError> {
        self.menus
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::MenuNotFound(id))
    }

    /// Check that every submitted group is a subset of the menu's catalog
    ///
    /// Groups match on title, type and max; choices match on name, price
    /// and description. The `checked` flag is ignored.
    pub fn validate_against(menu: &MenuItem, submitted: &[OptionGroup]) -> Result<(), CatalogError> {
        for group in submitted {
            let known = menu.options.iter().any(|catalog| catalog.contains(group));
            if !known {
                tracing::debug!(
                    "Option group '{}' is not in the catalog of menu {}",
                    group.title,
                    menu.id
                );
                return Err(CatalogError::InvalidSelection(format!(
                    "option group '{}' does not match menu {}",
                    group.title, menu.id
                )));
            }
        }
        Ok(())
    }

    /// Load a menu item and validate a typed selection against it
    pub async fn validate_selection(
        &self,
        menu_id: i32,
        submitted: &[OptionGroup],
    ) -> Result<MenuItem, CatalogError> {
        let menu = self.get_menu_item(menu_id).await?;
        Self::validate_against(&menu, submitted)?;
        Ok(menu)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixtures, InMemoryStore};

    fn service(store: &InMemoryStore) -> CatalogService {
        CatalogService::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn test_unknown_menu_is_not_found() {
        let store = InMemoryStore::new();
        let result = service(&store).get_menu_item(99).await;
        assert!(matches!(result, Err(CatalogError::MenuNotFound(99))));
    }

    #[tokio::test]
    async fn test_catalog_subset_is_accepted() {
        let store = InMemoryStore::new();
        let menu = store.insert_menu(fixtures::burger_menu());
        let selection = fixtures::cheese_selection(true);

        let found = service(&store)
            .validate_selection(menu.id, &selection)
            .await
            .unwrap();
        assert_eq!(found.id, menu.id);
    }

    #[tokio::test]
    async fn test_foreign_choice_is_malformed() {
        let store = InMemoryStore::new();
        let menu = store.insert_menu(fixtures::burger_menu());
        let mut selection = fixtures::cheese_selection(true);
        selection[0].choices[0].name = "Truffle".to_string();

        let result = service(&store).validate_selection(menu.id, &selection).await;
        assert!(matches!(result, Err(CatalogError::InvalidSelection(_))));
    }
}
