use crate::catalog::OptionGroup;

/// Service for calculating order prices
///
/// All amounts are minor currency units. Arithmetic saturates rather than
/// wrapping on absurd quantities.
pub struct PriceCalculator;

impl PriceCalculator {
    /// Calculate subtotal for a line before add-ons
    ///
    /// # Returns
    /// quantity * unit_price
    pub fn calculate_subtotal(quantity: i32, unit_price: i64) -> i64 {
        unit_price.saturating_mul(i64::from(quantity))
    }

    /// Price of the checked add-ons of a line, times its quantity
    pub fn add_on_total(quantity: i32, options: &[OptionGroup]) -> i64 {
        options
            .iter()
            .flat_map(|group| group.checked_choices())
            .fold(0i64, |acc, choice| {
                acc.saturating_add(Self::calculate_subtotal(quantity, choice.price))
            })
    }

    /// Full line total: base price plus checked add-ons, times quantity
    pub fn line_total(quantity: i32, unit_price: i64, options: &[OptionGroup]) -> i64 {
        Self::calculate_subtotal(quantity, unit_price).saturating_add(Self::add_on_total(quantity, options))
    }

    /// Calculate total price for an order
    ///
    /// # Arguments
    /// * `subtotals` - Line totals of every order line
    pub fn calculate_total(subtotals: &[i64]) -> i64 {
        subtotals.iter().fold(0i64, |acc, subtotal| acc.saturating_add(*subtotal))
    }

    /// Subtract an optional flat discount, clamping at zero
    pub fn apply_discount(total: i64, discount: Option<i64>) -> i64 {
        let discounted = match discount {
            Some(amount) => total.saturating_sub(amount),
            None => total,
        };
        discounted.max(0)
    }

    /// Distinct names in order of first appearance, joined with commas
    pub fn ordered_menus_label<'a, I>(names: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen: Vec<&str> = Vec::new();
        for name in names {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen.join(",")
    }
}
