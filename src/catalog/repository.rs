use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};

use crate::catalog::models::{MenuItem, OptionGroup};
use crate::store::StoreResult;

/// Read access to menu items
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// Find a menu item with its option catalog
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<MenuItem>>;
}

/// Row shape of the `menus` table
#[derive(Debug, FromRow)]
pub(crate) struct MenuRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub menu_options: Json<Vec<OptionGroup>>,
    pub avg_rating: f64,
    pub rating_count: i32,
}

impl From<MenuRow> for MenuItem {
    fn from(row: MenuRow) -> Self {
        MenuItem {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            options: row.menu_options.0,
            avg_rating: row.avg_rating,
            rating_count: row.rating_count,
        }
    }
}

pub(crate) const MENU_COLUMNS: &str =
    "id, name, description, price, menu_options, avg_rating, rating_count";

/// PostgreSQL-backed menu repository
#[derive(Clone)]
pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<MenuItem>> {
        let row = sqlx::query_as::<_, MenuRow>(&format!(
            "SELECT {} FROM menus WHERE id = $1",
            MENU_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MenuItem::from))
    }
}
