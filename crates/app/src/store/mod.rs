//! Central state store.
//!
//! One [`RootState`] tree behind a [`tokio::sync::watch`] channel. Every
//! mutation runs as a closure inside `send_modify`, so concurrent callers
//! are serialized by the channel lock and each one sees the latest state.
//! Subscribers get a change notification after every mutation and read
//! whole-state snapshots, never partial updates.
//!
//! Mutating methods come in two flavors: cart and checkout edits are public,
//! while session, menu, order outcome, and loyalty writes are crate-private
//! so they only happen through the services that own those flows.

mod auth;
mod loyalty;
mod menu;
mod order;

pub use auth::AuthSession;
pub use loyalty::LoyaltyState;
pub use menu::{CatalogSource, MenuState};
pub use order::{OrderState, SubmissionState};

use std::sync::Arc;

use tokio::sync::watch;

use great_indian_waffle_core::{DeliveryDetails, ItemId, MenuItem, OrderRequest};

use crate::identity::AuthStateEvent;

/// The whole client state tree.
#[derive(Debug, Clone, Default)]
pub struct RootState {
    pub auth: AuthSession,
    pub menu: MenuState,
    pub order: OrderState,
    pub loyalty: LoyaltyState,
}

/// Handle to the state store.
///
/// Cheap to clone; clones share the same state. Dropping every handle ends
/// the subscriptions.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: watch::Sender<RootState>,
}

impl Store {
    /// Create a store with default state.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(RootState::default())
    }

    /// Create a store seeded with `state`, e.g. rehydrated from disk.
    #[must_use]
    pub fn with_state(state: RootState) -> Self {
        let (sender, _) = watch::channel(state);
        Self {
            inner: Arc::new(StoreInner { state: sender }),
        }
    }

    /// Clone the current state.
    ///
    /// The snapshot is detached: later mutations do not show up in it.
    #[must_use]
    pub fn snapshot(&self) -> RootState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes.
    ///
    /// The receiver yields a notification after every mutation; read the
    /// latest state with [`watch::Receiver::borrow`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RootState> {
        self.inner.state.subscribe()
    }

    fn mutate(&self, f: impl FnOnce(&mut RootState)) {
        self.inner.state.send_modify(f);
    }

    // ===== Cart =====

    /// Add one of `item` to the cart, merging with an existing line.
    pub fn add_to_cart(&self, item: &MenuItem) {
        self.mutate(|state| state.order.cart.add_item(item));
    }

    /// Add `quantity` of `item` to the cart, merging with an existing line.
    pub fn add_to_cart_with_quantity(&self, item: &MenuItem, quantity: u32) {
        self.mutate(|state| state.order.cart.add_item_with_quantity(item, quantity));
    }

    /// Remove the whole line for `item_id`.
    pub fn remove_from_cart(&self, item_id: ItemId) {
        self.mutate(|state| state.order.cart.remove_item(item_id));
    }

    /// Set the quantity of an existing line; zero removes it.
    pub fn update_quantity(&self, item_id: ItemId, quantity: u32) {
        self.mutate(|state| state.order.cart.set_quantity(item_id, quantity));
    }

    /// Empty the cart and drop its special instructions.
    pub fn clear_cart(&self) {
        self.mutate(|state| state.order.cart.clear());
    }

    /// Set or clear the kitchen instructions for the next order.
    pub fn set_special_instructions(&self, instructions: Option<String>) {
        self.mutate(|state| state.order.cart.set_special_instructions(instructions));
    }

    /// Set the handover details for the next order.
    pub fn set_delivery_details(&self, details: DeliveryDetails) {
        self.mutate(|state| state.order.delivery_details = details);
    }

    // ===== Auth =====

    pub(crate) fn auth_loading(&self) {
        self.mutate(|state| {
            state.auth.loading = true;
            state.auth.last_error = None;
        });
    }

    pub(crate) fn auth_failed(&self, message: String) {
        self.mutate(|state| {
            state.auth.loading = false;
            state.auth.last_error = Some(message);
        });
    }

    /// Mirror a provider notification into the session slice.
    ///
    /// A sign-out also resets the loyalty slice: points belong to the
    /// account that just left.
    pub(crate) fn apply_auth_event(&self, event: AuthStateEvent) {
        self.mutate(|state| {
            state.auth.loading = false;
            match event.user {
                Some(user) => {
                    state.auth.is_authenticated = true;
                    state.auth.user = Some(user);
                    state.auth.last_error = None;
                }
                None => {
                    state.auth.is_authenticated = false;
                    state.auth.user = None;
                    state.auth.last_error = event.error;
                    state.loyalty = LoyaltyState::default();
                }
            }
        });
    }

    // ===== Menu =====

    pub(crate) fn menu_loading(&self) {
        self.mutate(|state| {
            state.menu.loading = true;
            state.menu.error = None;
        });
    }

    pub(crate) fn menu_loaded(
        &self,
        items: Vec<MenuItem>,
        source: CatalogSource,
        error: Option<String>,
    ) {
        self.mutate(|state| {
            state.menu.items = items;
            state.menu.source = source;
            state.menu.loading = false;
            state.menu.error = error;
        });
    }

    pub(crate) fn featured_loaded(&self, items: Vec<MenuItem>) {
        self.mutate(|state| state.menu.featured = items);
    }

    // ===== Orders =====

    /// Move to `Submitting` and stash the in-flight order, unless a
    /// submission is already in flight.
    ///
    /// Returns false without touching anything when one is. Checking and
    /// claiming happen inside one mutation, so two racing submissions cannot
    /// both pass.
    pub(crate) fn try_begin_submission(&self, order: OrderRequest) -> bool {
        let mut began = false;
        self.inner.state.send_modify(|state| {
            if state.order.submission == SubmissionState::Submitting {
                return;
            }
            state.order.submission = SubmissionState::Submitting;
            state.order.current_order = Some(order);
            state.order.last_error = None;
            began = true;
        });
        began
    }

    /// Record a confirmed submission: clear the cart, append to history.
    pub(crate) fn complete_submission(&self, confirmed: OrderRequest) {
        self.mutate(|state| {
            state.order.submission = SubmissionState::Confirmed;
            state.order.cart.clear();
            state.order.history.push(confirmed.clone());
            state.order.current_order = Some(confirmed);
            state.order.last_error = None;
        });
    }

    /// Record a failed submission. The cart is left alone so the user can
    /// retry.
    pub(crate) fn fail_submission(&self, failed: OrderRequest, error: String) {
        self.mutate(|state| {
            state.order.submission = SubmissionState::Failed;
            state.order.current_order = Some(failed);
            state.order.last_error = Some(error);
        });
    }

    pub(crate) fn replace_history(&self, history: Vec<OrderRequest>) {
        self.mutate(|state| state.order.history = history);
    }

    // ===== Loyalty =====

    pub(crate) fn loyalty_loading(&self) {
        self.mutate(|state| {
            state.loyalty.loading = true;
            state.loyalty.error = None;
        });
    }

    pub(crate) fn loyalty_balance(&self, points: u32) {
        self.mutate(|state| {
            state.loyalty.points = points;
            state.loyalty.loading = false;
            state.loyalty.error = None;
        });
    }

    pub(crate) fn loyalty_redeemed(&self, remaining_points: u32, reward: String) {
        self.mutate(|state| {
            state.loyalty.points = remaining_points;
            state.loyalty.redeemed_rewards.push(reward);
            state.loyalty.loading = false;
            state.loyalty.error = None;
        });
    }

    pub(crate) fn loyalty_failed(&self, message: String) {
        self.mutate(|state| {
            state.loyalty.loading = false;
            state.loyalty.error = Some(message);
        });
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
