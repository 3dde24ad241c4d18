//! Cart, checkout, and order history slice.

use great_indian_waffle_core::{Cart, DeliveryDetails, OrderRequest};

/// Lifecycle of the current order submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// An order is on its way to the backend. At most one at a time.
    Submitting,
    /// The last submission was accepted.
    Confirmed,
    /// The last submission was rejected or never reached the backend.
    Failed,
}

/// Cart contents plus the submission in progress and past orders.
#[derive(Debug, Clone, Default)]
pub struct OrderState {
    pub cart: Cart,
    /// Handover details for the next submission.
    pub delivery_details: DeliveryDetails,
    pub submission: SubmissionState,
    /// The order being submitted, or the outcome of the last submission.
    pub current_order: Option<OrderRequest>,
    /// Confirmed orders, oldest first.
    pub history: Vec<OrderRequest>,
    pub last_error: Option<String>,
}
