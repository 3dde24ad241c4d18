//! Cache types for ordering API responses.

use great_indian_waffle_core::MenuItem;

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Menu(Vec<MenuItem>),
    Featured(Vec<MenuItem>),
    Item(Box<MenuItem>),
}
