//! Great Indian Waffle Core - Shared types library.
//!
//! This crate provides common types used across all Great Indian Waffle
//! client components:
//! - `app` - The ordering-client engine (state store, services, persistence)
//! - `integration-tests` - End-to-end suites against a stub backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and domain types for IDs, prices, carts,
//!   orders, menus, and identity

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
