//! Menu catalog service.
//!
//! Loads the catalog and featured items from the API. When the backend is
//! unreachable or returns an empty catalog, the built-in fallback menu is
//! installed instead; the swap is logged and recorded in the state as
//! [`CatalogSource::Fallback`], never passed off as live data.

use tracing::{instrument, warn};

use great_indian_waffle_core::{ItemId, MenuItem, Price};

use crate::api::{ApiClient, ApiError};
use crate::store::{CatalogSource, Store};

/// Menu catalog service.
pub struct MenuService {
    store: Store,
    api: ApiClient,
}

impl MenuService {
    /// Create a new menu service.
    pub const fn new(store: Store, api: ApiClient) -> Self {
        Self { store, api }
    }

    /// Load the menu into the store.
    ///
    /// Never fails from the caller's point of view: on API failure the
    /// fallback catalog is installed and the failure lands in
    /// [`MenuState::error`](crate::store::MenuState::error).
    #[instrument(skip(self))]
    pub async fn load_menu(&self) {
        self.store.menu_loading();

        match self.api.get_menu().await {
            Ok(items) if items.is_empty() => {
                warn!("menu API returned an empty catalog, using built-in fallback");
                self.store
                    .menu_loaded(fallback_catalog(), CatalogSource::Fallback, None);
            }
            Ok(items) => {
                self.store
                    .menu_loaded(items, CatalogSource::Remote, None);
            }
            Err(e) => {
                warn!(error = %e, "menu API unavailable, using built-in fallback");
                self.store.menu_loaded(
                    fallback_catalog(),
                    CatalogSource::Fallback,
                    Some(e.to_string()),
                );
            }
        }
    }

    /// Load the featured items for the home screen.
    ///
    /// A failure leaves the featured list empty; the home screen renders
    /// without the carousel.
    #[instrument(skip(self))]
    pub async fn load_featured(&self) {
        match self.api.get_featured().await {
            Ok(items) => self.store.featured_loaded(items),
            Err(e) => {
                warn!(error = %e, "failed to load featured items");
                self.store.featured_loaded(Vec::new());
            }
        }
    }

    /// Fetch a single item, preferring the already-loaded catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the item exists in neither the
    /// loaded catalog nor the API, or another error if the request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn menu_item(&self, item_id: ItemId) -> Result<MenuItem, ApiError> {
        let snapshot = self.store.snapshot();
        if let Some(item) = snapshot.menu.item(item_id) {
            return Ok(item.clone());
        }

        self.api.get_menu_item(item_id).await
    }
}

/// The built-in catalog shown when the menu API is unavailable.
#[must_use]
pub fn fallback_catalog() -> Vec<MenuItem> {
    vec![
        MenuItem {
            id: ItemId::new(1),
            name: "Classic Masala Waffle".to_string(),
            description: "Traditional Indian spices infused waffle with a blend of aromatic spices"
                .to_string(),
            price: Price::from_rupees(149),
            category: "Savory Waffles".to_string(),
            image_url: None,
        },
        MenuItem {
            id: ItemId::new(2),
            name: "Chocolate Chai Waffle".to_string(),
            description: "Rich chocolate waffle with chai spice blend and whipped cream".to_string(),
            price: Price::from_rupees(179),
            category: "Sweet Waffles".to_string(),
            image_url: None,
        },
        MenuItem {
            id: ItemId::new(3),
            name: "Paneer Tikka Waffle".to_string(),
            description: "Savory waffle topped with spicy paneer tikka and mint chutney".to_string(),
            price: Price::from_rupees(199),
            category: "Savory Waffles".to_string(),
            image_url: None,
        },
        MenuItem {
            id: ItemId::new(4),
            name: "Mango Delight Waffle".to_string(),
            description: "Sweet waffle with fresh mango slices and mango cream".to_string(),
            price: Price::from_rupees(189),
            category: "Sweet Waffles".to_string(),
            image_url: None,
        },
    ]
}
