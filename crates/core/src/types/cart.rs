//! Shopping cart with merge-by-item line items.

use serde::{Deserialize, Serialize};

use crate::types::id::ItemId;
use crate::types::menu::MenuItem;
use crate::types::price::Price;

/// A single cart line: one menu item at a quantity.
///
/// The name and unit price are captured when the item is added, so a later
/// menu refresh never reprices lines already in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub item_id: ItemId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
}

impl CartLineItem {
    /// Price of the whole line (`unit_price` × `quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// The shopping cart: at most one line per menu item, in insertion order,
/// plus optional kitchen instructions.
///
/// Fields are private; all mutation goes through methods so the
/// one-line-per-item and quantity >= 1 invariants hold everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Cart {
    items: Vec<CartLineItem>,
    special_instructions: Option<String>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            special_instructions: None,
        }
    }

    /// Add one unit of a menu item, merging into an existing line.
    pub fn add_item(&mut self, item: &MenuItem) {
        self.add_item_with_quantity(item, 1);
    }

    /// Add a menu item at a given quantity, merging into an existing line.
    ///
    /// A quantity of zero is treated as one: adding to the cart always puts
    /// at least one unit in it.
    pub fn add_item_with_quantity(&mut self, item: &MenuItem, quantity: u32) {
        let quantity = quantity.max(1);
        if let Some(line) = self.items.iter_mut().find(|line| line.item_id == item.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartLineItem {
                item_id: item.id,
                name: item.name.clone(),
                unit_price: item.price,
                quantity,
            });
        }
    }

    /// Remove a line entirely. Removing an absent item is a no-op.
    pub fn remove_item(&mut self, item_id: ItemId) {
        self.items.retain(|line| line.item_id != item_id);
    }

    /// Set a line's quantity directly; zero removes the line.
    ///
    /// Updating an absent item is a no-op.
    pub fn set_quantity(&mut self, item_id: ItemId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(item_id);
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|line| line.item_id == item_id) {
            line.quantity = quantity;
        }
    }

    /// Empty the cart and drop any special instructions.
    pub fn clear(&mut self) {
        self.items.clear();
        self.special_instructions = None;
    }

    /// Attach free-text kitchen instructions; `None` or an empty string
    /// clears them.
    pub fn set_special_instructions(&mut self, instructions: Option<String>) {
        self.special_instructions = instructions.filter(|s| !s.is_empty());
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Kitchen instructions, if any.
    #[must_use]
    pub fn special_instructions(&self) -> Option<&str> {
        self.special_instructions.as_deref()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines, for the cart badge.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }
}
