//! Menu catalog wire types.

use serde::{Deserialize, Serialize};

use crate::types::id::ItemId;
use crate::types::price::Price;

/// A menu catalog entry as served by the menu API.
///
/// The cart only needs the id, name, and price; the remaining fields pass
/// through to the UI untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_shape() {
        let json = r#"{
            "id": 1,
            "name": "Classic Masala Waffle",
            "description": "Savory waffle with spiced potato filling",
            "price": 149,
            "category": "Savory Waffles"
        }"#;
        let item: MenuItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, ItemId::new(1));
        assert_eq!(item.price, Price::from_rupees(149));
        assert_eq!(item.image_url, None);
    }
}
