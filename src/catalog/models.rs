use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How many choices of a group a customer may tick.
/// Enforced by the client, not by pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    Single,
    Multiple,
}

/// One selectable add-on inside an option group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OptionChoice {
    pub name: String,
    /// Price delta in minor currency units
    pub price: i64,
    pub description: String,
    /// Set by the customer on submission; catalog rows leave it false
    #[serde(default)]
    pub checked: bool,
}

impl OptionChoice {
    /// Catalog identity of a choice, ignoring the customer's tick
    pub fn same_choice(&self, other: &OptionChoice) -> bool {
        self.name == other.name && self.price == other.price && self.description == other.description
    }
}

/// A titled group of choices attached to a menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OptionGroup {
    pub title: String,
    #[serde(rename = "type")]
    pub selection_type: SelectionType,
    pub max: i32,
    #[serde(rename = "menu_option_lists")]
    pub choices: Vec<OptionChoice>,
}

impl OptionGroup {
    /// Whether `submitted` is this group with a subset of its choices
    pub fn contains(&self, submitted: &OptionGroup) -> bool {
        self.title == submitted.title
            && self.selection_type == submitted.selection_type
            && self.max == submitted.max
            && submitted
                .choices
                .iter()
                .all(|choice| self.choices.iter().any(|known| known.same_choice(choice)))
    }

    /// Choices the customer ticked
    pub fn checked_choices(&self) -> impl Iterator<Item = &OptionChoice> {
        self.choices.iter().filter(|choice| choice.checked)
    }
}

/// Menu item with its option catalog and running rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: i32,
    pub name: String,
    pub description: String,
    /// Base price in minor currency units
    pub price: i64,
    pub options: Vec<OptionGroup>,
    pub avg_rating: f64,
    pub rating_count: i32,
}
