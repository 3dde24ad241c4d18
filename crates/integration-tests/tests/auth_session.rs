//! Session lifecycle against the scripted identity provider.
//!
//! The provider's notification stream is the only writer of session state;
//! these suites check that every flow (initial notification, password,
//! OTP, sign-out) lands in the store the way the UI observes it.

use great_indian_waffle_app::services::AuthError;
use great_indian_waffle_core::UserId;
use great_indian_waffle_integration_tests::{
    TEST_OTP_CODE, TEST_PASSWORD, TestContext, menu_item, wait_until,
};

// =============================================================================
// Startup
// =============================================================================

#[tokio::test]
async fn test_initial_notification_settles_the_session() {
    let ctx = TestContext::new().await;

    wait_until(ctx.store(), |state| !state.auth.loading).await;

    let state = ctx.store().snapshot();
    assert!(!state.auth.is_authenticated);
    assert!(state.auth.user.is_none());
    assert!(state.auth.last_error.is_none());
}

// =============================================================================
// Email and Password
// =============================================================================

#[tokio::test]
async fn test_login_mirrors_the_signed_in_user_into_the_store() {
    let ctx = TestContext::new().await;

    ctx.app
        .auth()
        .login("asha@example.com", TEST_PASSWORD)
        .await
        .expect("credentials accepted");
    wait_until(ctx.store(), |state| state.auth.is_authenticated).await;

    let state = ctx.store().snapshot();
    assert_eq!(state.auth.user_id().map(UserId::as_str), Some("fb-uid-001"));
    assert!(!state.auth.loading);
    assert!(state.auth.last_error.is_none());
}

#[tokio::test]
async fn test_wrong_password_records_the_error() {
    let ctx = TestContext::new().await;
    wait_until(ctx.store(), |state| !state.auth.loading).await;

    let result = ctx.app.auth().login("asha@example.com", "nope").await;
    assert!(matches!(result, Err(AuthError::Provider(_))));

    let state = ctx.store().snapshot();
    assert!(!state.auth.is_authenticated);
    assert!(!state.auth.loading);
    assert_eq!(state.auth.last_error.as_deref(), Some("invalid credentials"));
}

#[tokio::test]
async fn test_malformed_email_never_reaches_the_provider() {
    let ctx = TestContext::new().await;
    wait_until(ctx.store(), |state| !state.auth.loading).await;

    let result = ctx.app.auth().login("not-an-address", TEST_PASSWORD).await;
    assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
    assert!(!ctx.store().snapshot().auth.is_authenticated);
}

#[tokio::test]
async fn test_signup_signs_the_new_account_in() {
    let ctx = TestContext::new().await;

    ctx.app
        .auth()
        .signup("asha@example.com", TEST_PASSWORD)
        .await
        .expect("account created");
    wait_until(ctx.store(), |state| state.auth.is_authenticated).await;
}

// =============================================================================
// Phone OTP
// =============================================================================

#[tokio::test]
async fn test_otp_flow_signs_in() {
    let ctx = TestContext::new().await;

    let verification = ctx
        .app
        .auth()
        .send_otp("+91 98765 43210")
        .await
        .expect("code sent");
    assert_eq!(verification.as_str(), "verification-1");

    ctx.app
        .auth()
        .verify_otp(&verification, TEST_OTP_CODE)
        .await
        .expect("code accepted");
    wait_until(ctx.store(), |state| state.auth.is_authenticated).await;
}

#[tokio::test]
async fn test_wrong_code_is_rejected() {
    let ctx = TestContext::new().await;
    wait_until(ctx.store(), |state| !state.auth.loading).await;

    let verification = ctx
        .app
        .auth()
        .send_otp("+91 98765 43210")
        .await
        .expect("code sent");
    let result = ctx.app.auth().verify_otp(&verification, "000000").await;
    assert!(matches!(result, Err(AuthError::Provider(_))));

    let state = ctx.store().snapshot();
    assert!(!state.auth.is_authenticated);
    assert_eq!(
        state.auth.last_error.as_deref(),
        Some("invalid or expired verification code")
    );
}

// =============================================================================
// Sign-out
// =============================================================================

#[tokio::test]
async fn test_logout_resets_session_and_loyalty_but_keeps_the_cart() {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;

    ctx.app.loyalty().refresh().await.expect("points loaded");
    ctx.store().add_to_cart(&menu_item(1, 149));
    assert_eq!(ctx.store().snapshot().loyalty.points, 250);

    ctx.app.auth().logout().await.expect("signed out");
    wait_until(ctx.store(), |state| !state.auth.is_authenticated).await;

    let state = ctx.store().snapshot();
    assert!(state.auth.user.is_none());
    assert_eq!(state.loyalty.points, 0);
    assert!(state.loyalty.redeemed_rewards.is_empty());
    assert_eq!(state.order.cart.total_quantity(), 1);
}
