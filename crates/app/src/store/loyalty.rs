//! Loyalty points slice.

/// Loyalty balance for the signed-in user.
///
/// Reset to defaults on sign-out; points belong to the account, not the
/// device.
#[derive(Debug, Clone, Default)]
pub struct LoyaltyState {
    pub points: u32,
    /// Names of rewards redeemed this session, oldest first.
    pub redeemed_rewards: Vec<String>,
    pub loading: bool,
    pub error: Option<String>,
}
