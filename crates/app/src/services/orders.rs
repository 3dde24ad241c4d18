//! Order submission service.
//!
//! Owns the checkout flow: pricing the cart, snapshotting it into an
//! immutable order, claiming the single submission slot, and recording the
//! outcome in the store.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};

use great_indian_waffle_core::{
    DeliveryDetails, DeliveryMethod, OrderRequest, OrderTotals, PaymentMethod, Price,
};

use crate::api::{ApiClient, ApiError};
use crate::store::Store;

/// Errors that can occur when placing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No signed-in user.
    #[error("sign in to place an order")]
    NotAuthenticated,

    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// Another submission is already in flight.
    #[error("an order is already being submitted")]
    SubmissionInProgress,

    /// The backend rejected the order or was unreachable.
    #[error("order API error: {0}")]
    Api(#[from] ApiError),
}

/// Order submission service.
pub struct OrderService {
    store: Store,
    api: ApiClient,
    delivery_fee: Price,
    tax_rate: Decimal,
}

impl OrderService {
    /// Create a new order service.
    pub const fn new(store: Store, api: ApiClient, delivery_fee: Price, tax_rate: Decimal) -> Self {
        Self {
            store,
            api,
            delivery_fee,
            tax_rate,
        }
    }

    /// The delivery fee charged for a handover method. Pickup is free.
    #[must_use]
    pub const fn fee_for(&self, method: DeliveryMethod) -> Price {
        match method {
            DeliveryMethod::Pickup => Price::ZERO,
            DeliveryMethod::Delivery => self.delivery_fee,
        }
    }

    /// Price the current cart for the given handover method.
    ///
    /// This is the preview the checkout screen renders; submitting recomputes
    /// the same breakdown from the same inputs.
    #[must_use]
    pub fn totals(&self, method: DeliveryMethod) -> OrderTotals {
        let cart = self.store.snapshot().order.cart;
        OrderTotals::compute(&cart, self.fee_for(method), self.tax_rate)
    }

    /// Submit the current cart as an order.
    ///
    /// At most one submission is in flight at a time; a second call while
    /// one is running returns [`OrderError::SubmissionInProgress`] without
    /// touching the cart or the backend. On success the cart is cleared and
    /// the confirmed order is appended to the history. On failure the cart
    /// is left untouched so the user can retry.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotAuthenticated`] without a signed-in user,
    /// [`OrderError::EmptyCart`] for an empty cart, and [`OrderError::Api`]
    /// when the backend rejects the order or is unreachable.
    #[instrument(skip(self, delivery_details), fields(method = %delivery_details.method))]
    pub async fn place_order(
        &self,
        delivery_details: DeliveryDetails,
        payment_method: PaymentMethod,
    ) -> Result<OrderRequest, OrderError> {
        let snapshot = self.store.snapshot();

        let Some(user_id) = snapshot.auth.user_id().cloned() else {
            return Err(OrderError::NotAuthenticated);
        };
        if snapshot.order.cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let totals = OrderTotals::compute(
            &snapshot.order.cart,
            self.fee_for(delivery_details.method),
            self.tax_rate,
        );
        let order = OrderRequest::from_cart(
            &snapshot.order.cart,
            user_id,
            delivery_details,
            payment_method,
            totals,
        )
        .ok_or(OrderError::EmptyCart)?;

        if !self.store.try_begin_submission(order.clone()) {
            return Err(OrderError::SubmissionInProgress);
        }

        let token = snapshot.auth.token().cloned();
        match self.api.create_order(&order, token.as_ref()).await {
            Ok(response) => {
                info!(order_id = %response.order_id, "order confirmed");
                let mut confirmed = order;
                confirmed.mark_confirmed(response.order_id);
                self.store.complete_submission(confirmed.clone());
                Ok(confirmed)
            }
            Err(e) => {
                warn!(error = %e, "order submission failed");
                let mut failed = order;
                failed.mark_failed();
                self.store.fail_submission(failed, e.to_string());
                Err(OrderError::Api(e))
            }
        }
    }

    /// Reload the signed-in user's past orders from the backend.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotAuthenticated`] without a signed-in user, or
    /// [`OrderError::Api`] when the request fails.
    #[instrument(skip(self))]
    pub async fn refresh_history(&self) -> Result<usize, OrderError> {
        let snapshot = self.store.snapshot();
        let Some(user_id) = snapshot.auth.user_id().cloned() else {
            return Err(OrderError::NotAuthenticated);
        };
        let token = snapshot.auth.token().cloned();

        let history = self.api.get_order_history(&user_id, token.as_ref()).await?;
        let count = history.len();
        self.store.replace_history(history);
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use great_indian_waffle_core::{AuthToken, AuthUser, ItemId, MenuItem, UserId};

    use crate::config::AppConfig;
    use crate::identity::AuthStateEvent;
    use crate::store::SubmissionState;

    // Points at a port nothing listens on; these tests only exercise the
    // paths that fail before any request is sent.
    fn service() -> (Store, OrderService) {
        let store = Store::new();
        let config = AppConfig::with_base_url("http://127.0.0.1:9".parse().unwrap());
        let api = ApiClient::new(&config);
        let service = OrderService::new(
            store.clone(),
            api,
            Price::from_rupees(30),
            Decimal::new(5, 2),
        );
        (store, service)
    }

    fn sign_in(store: &Store) {
        store.apply_auth_event(AuthStateEvent::signed_in(AuthUser {
            uid: UserId::new("fb-uid-001"),
            email: None,
            display_name: None,
            phone_number: None,
            token: AuthToken::new("token-1"),
        }));
    }

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

    #[test]
    fn test_totals_preview_for_delivery() {
        let (store, service) = service();
        store.add_to_cart(&menu_item(1, 149));
        store.add_to_cart_with_quantity(&menu_item(2, 179), 2);

        let totals = service.totals(DeliveryMethod::Delivery);
        assert_eq!(totals.subtotal, Price::from_rupees(507));
        assert_eq!(totals.delivery_fee, Price::from_rupees(30));
        assert_eq!(totals.tax, Price::from_rupees(25));
        assert_eq!(totals.total, Price::from_rupees(562));
    }

    #[test]
    fn test_pickup_waives_delivery_fee() {
        let (store, service) = service();
        store.add_to_cart(&menu_item(1, 149));

        let totals = service.totals(DeliveryMethod::Pickup);
        assert_eq!(totals.delivery_fee, Price::ZERO);
        assert_eq!(totals.total, Price::from_rupees(156));
    }

    #[tokio::test]
    async fn test_place_order_requires_sign_in() {
        let (store, service) = service();
        store.add_to_cart(&menu_item(1, 149));

        let result = service
            .place_order(DeliveryDetails::pickup(), PaymentMethod::Cash)
            .await;
        assert!(matches!(result, Err(OrderError::NotAuthenticated)));
        assert_eq!(store.snapshot().order.submission, SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_place_order_rejects_empty_cart() {
        let (store, service) = service();
        sign_in(&store);

        let result = service
            .place_order(DeliveryDetails::pickup(), PaymentMethod::Cash)
            .await;
        assert!(matches!(result, Err(OrderError::EmptyCart)));
        assert_eq!(store.snapshot().order.submission, SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_second_submission_is_rejected() {
        let (store, service) = service();
        sign_in(&store);
        store.add_to_cart(&menu_item(1, 149));

        // claim the slot as a concurrent submission would
        let snapshot = store.snapshot();
        let totals = OrderTotals::compute(
            &snapshot.order.cart,
            Price::ZERO,
            Decimal::new(5, 2),
        );
        let in_flight = OrderRequest::from_cart(
            &snapshot.order.cart,
            UserId::new("fb-uid-001"),
            DeliveryDetails::pickup(),
            PaymentMethod::Cash,
            totals,
        )
        .unwrap();
        assert!(store.try_begin_submission(in_flight));

        let result = service
            .place_order(DeliveryDetails::pickup(), PaymentMethod::Cash)
            .await;
        assert!(matches!(result, Err(OrderError::SubmissionInProgress)));

        // the cart and the in-flight submission are untouched
        let state = store.snapshot();
        assert_eq!(state.order.submission, SubmissionState::Submitting);
        assert_eq!(state.order.cart.total_quantity(), 1);
    }
}
