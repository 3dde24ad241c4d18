//! Loyalty points service.
//!
//! The backend keeps the balance; this service refreshes it, runs
//! redemptions, and exposes the static rewards catalog. Points are earned
//! server-side when orders are confirmed.

use thiserror::Error;
use tracing::{info, instrument, warn};

use great_indian_waffle_core::{Price, RewardId};

use crate::api::{ApiClient, ApiError, RedeemRewardRequest, Reward};
use crate::store::Store;

/// Points earned per ₹100 of order total.
pub const POINTS_PER_HUNDRED_RUPEES: u32 = 10;

/// Errors that can occur during loyalty operations.
#[derive(Debug, Error)]
pub enum LoyaltyError {
    /// No signed-in user.
    #[error("sign in to use loyalty rewards")]
    NotAuthenticated,

    /// The balance does not cover the reward.
    #[error("not enough points for {reward}: need {needed}, have {balance}")]
    InsufficientPoints {
        reward: String,
        needed: u32,
        balance: u32,
    },

    /// The backend rejected the request or was unreachable.
    #[error("loyalty API error: {0}")]
    Api(#[from] ApiError),
}

/// Loyalty points service.
pub struct LoyaltyService {
    store: Store,
    api: ApiClient,
}

impl LoyaltyService {
    /// Create a new loyalty service.
    pub const fn new(store: Store, api: ApiClient) -> Self {
        Self { store, api }
    }

    /// Reload the signed-in user's point balance from the backend.
    ///
    /// # Errors
    ///
    /// Returns [`LoyaltyError::NotAuthenticated`] without a signed-in user,
    /// or [`LoyaltyError::Api`] when the request fails.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<u32, LoyaltyError> {
        let snapshot = self.store.snapshot();
        let Some(user_id) = snapshot.auth.user_id().cloned() else {
            return Err(LoyaltyError::NotAuthenticated);
        };
        let token = snapshot.auth.token().cloned();

        self.store.loyalty_loading();
        match self.api.get_loyalty_points(&user_id, token.as_ref()).await {
            Ok(balance) => {
                self.store.loyalty_balance(balance.total_points);
                Ok(balance.total_points)
            }
            Err(e) => {
                warn!(error = %e, "failed to load loyalty points");
                self.store.loyalty_failed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Redeem a reward against the signed-in user's balance.
    ///
    /// The balance check runs client-side first so an obviously short
    /// balance never reaches the backend; the backend still has the final
    /// say.
    ///
    /// # Errors
    ///
    /// Returns [`LoyaltyError::NotAuthenticated`] without a signed-in user,
    /// [`LoyaltyError::InsufficientPoints`] when the balance does not cover
    /// the reward, and [`LoyaltyError::Api`] when the backend rejects the
    /// redemption.
    #[instrument(skip(self, reward), fields(reward_id = %reward.id))]
    pub async fn redeem(&self, reward: &Reward) -> Result<u32, LoyaltyError> {
        let snapshot = self.store.snapshot();
        let Some(user_id) = snapshot.auth.user_id().cloned() else {
            return Err(LoyaltyError::NotAuthenticated);
        };
        if snapshot.loyalty.points < reward.points_required {
            return Err(LoyaltyError::InsufficientPoints {
                reward: reward.name.clone(),
                needed: reward.points_required,
                balance: snapshot.loyalty.points,
            });
        }
        let token = snapshot.auth.token().cloned();

        self.store.loyalty_loading();
        let request = RedeemRewardRequest {
            user_id,
            reward_id: reward.id,
            reward: reward.name.clone(),
        };
        match self.api.redeem_reward(&request, token.as_ref()).await {
            Ok(response) => {
                info!(reward = %response.reward, "reward redeemed");
                let remaining = response.remaining_points;
                self.store.loyalty_redeemed(remaining, response.reward);
                Ok(remaining)
            }
            Err(e) => {
                warn!(error = %e, "reward redemption failed");
                self.store.loyalty_failed(e.to_string());
                Err(e.into())
            }
        }
    }
}

/// The static rewards catalog shown on the loyalty screen.
#[must_use]
pub fn available_rewards() -> Vec<Reward> {
    vec![
        Reward {
            id: RewardId::new(1),
            name: "Free Waffle".to_string(),
            points_required: 200,
        },
        Reward {
            id: RewardId::new(2),
            name: "20% Off Your Order".to_string(),
            points_required: 150,
        },
        Reward {
            id: RewardId::new(3),
            name: "Free Beverage".to_string(),
            points_required: 100,
        },
    ]
}

/// Points an order of `total` earns.
#[must_use]
pub fn points_for_total(total: Price) -> u32 {
    let hundreds = total.as_rupees() / 100;
    u32::try_from(hundreds).map_or(0, |h| h.saturating_mul(POINTS_PER_HUNDRED_RUPEES))
}
