//! Menu catalog slice.

use great_indian_waffle_core::{ItemId, MenuItem};

/// Where the current catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogSource {
    /// No load has completed yet.
    #[default]
    Unloaded,
    /// Served by the menu API.
    Remote,
    /// Built-in catalog, used when the API was unreachable or empty.
    Fallback,
}

/// Menu catalog and featured items.
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    pub items: Vec<MenuItem>,
    pub featured: Vec<MenuItem>,
    pub source: CatalogSource,
    pub loading: bool,
    /// Message from the last failed load. Set even when the fallback
    /// catalog covers for the failure, so the UI can say the menu is stale.
    pub error: Option<String>,
}

impl MenuState {
    /// Distinct categories in catalog order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for item in &self.items {
            if !categories.contains(&item.category.as_str()) {
                categories.push(item.category.as_str());
            }
        }
        categories
    }

    /// Look up an item in the loaded catalog.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }
}
