//! Wire types for the ordering backend REST API.

use serde::{Deserialize, Serialize};

use great_indian_waffle_core::{OrderId, RewardId, UserId};

/// Response to a successful order submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: OrderId,
    pub message: String,
}

/// A user's current loyalty point balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyBalance {
    pub user_id: UserId,
    pub total_points: u32,
}

/// A reward customers can redeem points for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: RewardId,
    pub name: String,
    pub points_required: u32,
}

/// Request body for redeeming a reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemRewardRequest {
    pub user_id: UserId,
    pub reward_id: RewardId,
    pub reward: String,
}

/// Response to a reward redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemRewardResponse {
    pub remaining_points: u32,
    pub reward: String,
}
