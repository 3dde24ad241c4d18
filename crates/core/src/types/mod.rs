//! Core types for the Great Indian Waffle client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod auth;
pub mod cart;
pub mod contact;
pub mod id;
pub mod menu;
pub mod order;
pub mod price;
pub mod status;

pub use auth::{AuthToken, AuthUser, VerificationId};
pub use cart::{Cart, CartLineItem};
pub use contact::{Email, EmailError, PhoneNumber, PhoneNumberError};
pub use id::*;
pub use menu::MenuItem;
pub use order::{DeliveryDetails, OrderRequest, OrderTotals};
pub use price::Price;
pub use status::*;
