//! Client engine for the Great Indian Waffle ordering app.
//!
//! Everything the ordering UI needs short of pixels: a central state store
//! with serialized mutations and change notifications, services for auth,
//! menu, orders, and loyalty, a REST client for the ordering backend, and a
//! versioned persistence layer that survives restarts.
//!
//! The UI shell, the real identity provider, and the backend live outside
//! this crate. They plug in through [`identity::IdentityProvider`], the
//! [`persist::Storage`] seam, and [`store::Store::subscribe`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod persist;
pub mod services;
pub mod store;

pub use app::App;
pub use config::AppConfig;
pub use error::{AppError, Result};
