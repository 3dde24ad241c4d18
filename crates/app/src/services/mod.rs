//! Application services.
//!
//! Each service wraps one flow end to end: it reads the store, talks to the
//! API or the identity provider, and writes the outcome back. Services hold
//! the only write access to their slices outside the cart.

pub mod auth;
pub mod loyalty;
pub mod menu;
pub mod orders;

pub use auth::{AuthError, AuthService};
pub use loyalty::{LoyaltyError, LoyaltyService};
pub use menu::MenuService;
pub use orders::{OrderError, OrderService};
