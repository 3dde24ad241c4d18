//! Versioned snapshot of the durable state subset.
//!
//! Only the session and the order slice (cart plus history) persist. Menu
//! and loyalty data are backend-owned and always refetched; transient flags
//! like loading, errors, and the submission status restart at their
//! defaults.

use serde::{Deserialize, Serialize};

use great_indian_waffle_core::{AuthUser, Cart, OrderRequest};

use crate::store::{AuthSession, OrderState, RootState};

/// Schema version written with every snapshot. Bump on layout changes; a
/// mismatched snapshot is discarded rather than migrated.
pub const SCHEMA_VERSION: u32 = 1;

/// Storage key the snapshot lives under.
pub const ROOT_KEY: &str = "root";

/// The durable subset of [`RootState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    pub auth: PersistedAuth,
    pub order: PersistedOrder,
}

/// Durable part of the session slice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub is_authenticated: bool,
}

/// Durable part of the order slice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedOrder {
    #[serde(default)]
    pub cart: Cart,
    #[serde(default)]
    pub history: Vec<OrderRequest>,
}

impl PersistedState {
    /// Capture the durable subset of `state`.
    #[must_use]
    pub fn capture(state: &RootState) -> Self {
        Self {
            version: SCHEMA_VERSION,
            auth: PersistedAuth {
                user: state.auth.user.clone(),
                is_authenticated: state.auth.is_authenticated,
            },
            order: PersistedOrder {
                cart: state.order.cart.clone(),
                history: state.order.history.clone(),
            },
        }
    }

    /// Merge this snapshot over default state.
    ///
    /// Everything outside the snapshot starts fresh: the session stays
    /// `loading` until the provider's first notification, the submission
    /// slot is idle, and menu and loyalty are empty until refetched.
    #[must_use]
    pub fn into_state(self) -> RootState {
        RootState {
            auth: AuthSession {
                user: self.auth.user,
                is_authenticated: self.auth.is_authenticated,
                ..AuthSession::default()
            },
            order: OrderState {
                cart: self.order.cart,
                history: self.order.history,
                ..OrderState::default()
            },
            ..RootState::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use great_indian_waffle_core::{
        AuthToken, DeliveryDetails, ItemId, MenuItem, OrderRequest, OrderTotals, PaymentMethod,
        Price, UserId,
    };
    use rust_decimal::Decimal;

    use crate::identity::AuthStateEvent;
    use crate::store::{CatalogSource, Store, SubmissionState};

    fn menu_item(id: i64, price: i64) -> MenuItem {
        MenuItem {
            id: ItemId::new(id),
            name: format!("Waffle {id}"),
            description: String::new(),
            price: Price::from_rupees(price),
            category: "Savory Waffles".to_string(),
            image_url: None,
        }
    }

    fn populated_store() -> Store {
        let store = Store::new();
        store.apply_auth_event(AuthStateEvent::signed_in(
            great_indian_waffle_core::AuthUser {
                uid: UserId::new("fb-uid-001"),
                email: None,
                display_name: Some("Asha".to_string()),
                phone_number: None,
                token: AuthToken::new("token-1"),
            },
        ));
        store.add_to_cart_with_quantity(&menu_item(1, 149), 2);
        store.menu_loaded(vec![menu_item(9, 199)], CatalogSource::Remote, None);
        store.loyalty_balance(120);
        store
    }

    #[test]
    fn test_capture_takes_only_the_durable_subset() {
        let state = populated_store().snapshot();
        let snapshot = PersistedState::capture(&state);

        assert_eq!(snapshot.version, SCHEMA_VERSION);
        assert!(snapshot.auth.is_authenticated);
        assert_eq!(snapshot.order.cart.total_quantity(), 2);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("menu").is_none());
        assert!(json.get("loyalty").is_none());
    }

    #[test]
    fn test_round_trip_restores_cart_and_session() {
        let state = populated_store().snapshot();
        let snapshot = PersistedState::capture(&state);

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: PersistedState = serde_json::from_str(&json).unwrap();
        let restored = restored.into_state();

        assert_eq!(restored.order.cart.total_quantity(), 2);
        assert!(restored.auth.is_authenticated);
        assert_eq!(
            restored.auth.user_id().map(UserId::as_str),
            Some("fb-uid-001")
        );

        // transient fields restart at their defaults
        assert!(restored.auth.loading);
        assert_eq!(restored.order.submission, SubmissionState::Idle);
        assert!(restored.menu.items.is_empty());
        assert_eq!(restored.loyalty.points, 0);
    }

    #[test]
    fn test_history_survives_round_trip() {
        let store = populated_store();
        let cart = store.snapshot().order.cart;
        let totals = OrderTotals::compute(&cart, Price::ZERO, Decimal::new(5, 2));
        let mut order = OrderRequest::from_cart(
            &cart,
            UserId::new("fb-uid-001"),
            DeliveryDetails::pickup(),
            PaymentMethod::Cash,
            totals,
        )
        .unwrap();
        order.mark_confirmed(great_indian_waffle_core::OrderId::new(7));
        store.complete_submission(order.clone());

        let snapshot = PersistedState::capture(&store.snapshot());
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: PersistedState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.order.history, vec![order]);
    }

    #[test]
    fn test_capture_equality_detects_unchanged_subset() {
        let store = populated_store();
        let first = PersistedState::capture(&store.snapshot());

        // loyalty is not persisted, so this change is invisible to capture
        store.loyalty_balance(999);
        let second = PersistedState::capture(&store.snapshot());
        assert_eq!(first, second);

        store.add_to_cart(&menu_item(2, 179));
        let third = PersistedState::capture(&store.snapshot());
        assert_ne!(first, third);
    }
}
