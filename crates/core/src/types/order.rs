//! Order snapshots and checkout totals.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::cart::{Cart, CartLineItem};
use crate::types::id::{OrderId, UserId};
use crate::types::price::Price;
use crate::types::status::{DeliveryMethod, OrderStatus, PaymentMethod};

/// Where and how an order should be handed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeliveryDetails {
    pub method: DeliveryMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}

impl DeliveryDetails {
    /// Pickup at the counter, no address needed.
    #[must_use]
    pub const fn pickup() -> Self {
        Self {
            method: DeliveryMethod::Pickup,
            address: None,
            contact_number: None,
        }
    }

    /// Delivery to an address.
    #[must_use]
    pub const fn delivery(address: String, contact_number: String) -> Self {
        Self {
            method: DeliveryMethod::Delivery,
            address: Some(address),
            contact_number: Some(contact_number),
        }
    }
}

/// The priced breakdown of a cart at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderTotals {
    /// Price a cart: subtotal from the lines, the given delivery fee, tax
    /// at `tax_rate` rounded half-away-from-zero to whole rupees, and the
    /// sum of all three.
    ///
    /// Pure: pricing the same cart twice gives the same breakdown.
    #[must_use]
    pub fn compute(cart: &Cart, delivery_fee: Price, tax_rate: Decimal) -> Self {
        let subtotal = cart.subtotal();
        let tax_rupees = (Decimal::from(subtotal.as_rupees()) * tax_rate)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(0);
        let tax = Price::from_rupees(tax_rupees);

        Self {
            subtotal,
            delivery_fee,
            tax,
            total: subtotal + delivery_fee + tax,
        }
    }
}

/// An immutable order snapshot sent to the backend.
///
/// Built from the cart at the moment of submission; later cart edits never
/// touch it. After construction the only mutation is recording the outcome
/// via [`mark_confirmed`](Self::mark_confirmed) or
/// [`mark_failed`](Self::mark_failed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Backend-assigned ID, sent back as `id` in history responses.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    order_id: Option<OrderId>,
    client_request_id: Uuid,
    user_id: UserId,
    line_items: Vec<CartLineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    special_instructions: Option<String>,
    delivery_details: DeliveryDetails,
    payment_method: PaymentMethod,
    subtotal: Price,
    delivery_fee: Price,
    tax: Price,
    total: Price,
    placed_at: DateTime<Utc>,
    status: OrderStatus,
}

impl OrderRequest {
    /// Snapshot a cart into a pending order.
    ///
    /// Returns `None` for an empty cart: an order with no lines is not
    /// representable.
    #[must_use]
    pub fn from_cart(
        cart: &Cart,
        user_id: UserId,
        delivery_details: DeliveryDetails,
        payment_method: PaymentMethod,
        totals: OrderTotals,
    ) -> Option<Self> {
        if cart.is_empty() {
            return None;
        }

        Some(Self {
            order_id: None,
            client_request_id: Uuid::new_v4(),
            user_id,
            line_items: cart.items().to_vec(),
            special_instructions: cart.special_instructions().map(str::to_owned),
            delivery_details,
            payment_method,
            subtotal: totals.subtotal,
            delivery_fee: totals.delivery_fee,
            tax: totals.tax,
            total: totals.total,
            placed_at: Utc::now(),
            status: OrderStatus::Pending,
        })
    }

    /// Record backend acceptance and the assigned order ID.
    pub fn mark_confirmed(&mut self, order_id: OrderId) {
        self.order_id = Some(order_id);
        self.status = OrderStatus::Confirmed;
    }

    /// Record a rejected or failed submission.
    pub fn mark_failed(&mut self) {
        self.status = OrderStatus::Failed;
    }

    /// Backend-assigned order ID, present once confirmed.
    #[must_use]
    pub const fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    /// Client-generated correlation ID, set at snapshot time.
    #[must_use]
    pub const fn client_request_id(&self) -> Uuid {
        self.client_request_id
    }

    /// The user who placed the order.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The ordered lines.
    #[must_use]
    pub fn line_items(&self) -> &[CartLineItem] {
        &self.line_items
    }

    /// Kitchen instructions captured from the cart, if any.
    #[must_use]
    pub fn special_instructions(&self) -> Option<&str> {
        self.special_instructions.as_deref()
    }

    /// Handover details captured at submission.
    #[must_use]
    pub const fn delivery_details(&self) -> &DeliveryDetails {
        &self.delivery_details
    }

    /// Payment method selected at checkout.
    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// The priced breakdown captured at submission.
    #[must_use]
    pub const fn totals(&self) -> OrderTotals {
        OrderTotals {
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            tax: self.tax,
            total: self.total,
        }
    }

    /// When the snapshot was built.
    #[must_use]
    pub const fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }
}
