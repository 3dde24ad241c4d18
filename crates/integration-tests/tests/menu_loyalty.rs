//! Catalog loading, the offline fallback, and the loyalty flows.

use great_indian_waffle_app::api::ApiError;
use great_indian_waffle_app::services::LoyaltyError;
use great_indian_waffle_app::services::loyalty::available_rewards;
use great_indian_waffle_app::services::menu::fallback_catalog;
use great_indian_waffle_app::store::CatalogSource;
use great_indian_waffle_core::ItemId;
use great_indian_waffle_integration_tests::{TestContext, stub_menu_items, wait_until};

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_menu_loads_from_the_backend() {
    let ctx = TestContext::new().await;

    ctx.app.menu().load_menu().await;

    let state = ctx.store().snapshot();
    assert_eq!(state.menu.items, stub_menu_items());
    assert_eq!(state.menu.source, CatalogSource::Remote);
    assert!(state.menu.error.is_none());
    assert!(!state.menu.loading);
    assert_eq!(
        state.menu.categories(),
        vec!["Savory Waffles", "Sweet Waffles", "Beverages"]
    );
}

#[tokio::test]
async fn test_menu_falls_back_when_the_backend_is_down() {
    let ctx = TestContext::new().await;
    ctx.stub.fail_menu(true);

    ctx.app.menu().load_menu().await;

    let state = ctx.store().snapshot();
    assert_eq!(state.menu.items, fallback_catalog());
    assert_eq!(state.menu.source, CatalogSource::Fallback);
    assert!(state.menu.error.is_some());
}

#[tokio::test]
async fn test_empty_catalog_falls_back() {
    let ctx = TestContext::new().await;
    ctx.stub.serve_empty_menu(true);

    ctx.app.menu().load_menu().await;

    let state = ctx.store().snapshot();
    assert_eq!(state.menu.items, fallback_catalog());
    assert_eq!(state.menu.source, CatalogSource::Fallback);
    // the request itself succeeded, so nothing is recorded as an error
    assert!(state.menu.error.is_none());
}

#[tokio::test]
async fn test_menu_cache_absorbs_repeat_loads() {
    let ctx = TestContext::new().await;

    ctx.app.menu().load_menu().await;
    ctx.app.menu().load_menu().await;

    assert_eq!(ctx.stub.menu_requests(), 1);
    assert_eq!(ctx.store().snapshot().menu.source, CatalogSource::Remote);
}

#[tokio::test]
async fn test_item_lookup_prefers_the_loaded_catalog() {
    let ctx = TestContext::new().await;
    ctx.app.menu().load_menu().await;

    let item = ctx
        .app
        .menu()
        .menu_item(ItemId::new(11))
        .await
        .expect("item in catalog");
    assert_eq!(item.name, "Tandoori Paneer Waffle");
    assert_eq!(ctx.stub.item_requests(), 0);

    let missing = ctx.app.menu().menu_item(ItemId::new(999)).await;
    assert!(matches!(missing, Err(ApiError::NotFound(_))));
    assert_eq!(ctx.stub.item_requests(), 1);
}

#[tokio::test]
async fn test_featured_failure_leaves_the_carousel_empty() {
    let ctx = TestContext::new().await;

    ctx.app.menu().load_featured().await;
    assert_eq!(ctx.store().snapshot().menu.featured.len(), 2);

    // a fresh engine, so the cached carousel cannot mask the failure
    let fresh = TestContext::new().await;
    fresh.stub.fail_menu(true);
    fresh.app.menu().load_featured().await;

    let state = fresh.store().snapshot();
    assert!(state.menu.featured.is_empty());
    assert!(state.menu.error.is_none());
}

// =============================================================================
// Loyalty
// =============================================================================

#[tokio::test]
async fn test_points_refresh_from_the_backend() {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;

    let points = ctx.app.loyalty().refresh().await.expect("points loaded");
    assert_eq!(points, 250);

    let state = ctx.store().snapshot();
    assert_eq!(state.loyalty.points, 250);
    assert!(!state.loyalty.loading);
    assert!(state.loyalty.error.is_none());
    assert_eq!(ctx.stub.loyalty_requests(), 1);
}

#[tokio::test]
async fn test_redeem_updates_balance_and_reward_list() {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;
    ctx.app.loyalty().refresh().await.expect("points loaded");

    let rewards = available_rewards();
    let free_waffle = rewards
        .iter()
        .find(|r| r.name == "Free Waffle")
        .expect("catalog has a free waffle");

    let remaining = ctx
        .app
        .loyalty()
        .redeem(free_waffle)
        .await
        .expect("redeemed");
    assert_eq!(remaining, 50);

    let state = ctx.store().snapshot();
    assert_eq!(state.loyalty.points, 50);
    assert_eq!(state.loyalty.redeemed_rewards, vec!["Free Waffle"]);
    assert_eq!(ctx.stub.redeem_requests(), 1);
}

#[tokio::test]
async fn test_insufficient_points_fail_before_the_backend() {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;
    ctx.stub.set_points(90);
    ctx.app.loyalty().refresh().await.expect("points loaded");

    let rewards = available_rewards();
    let free_waffle = rewards
        .iter()
        .find(|r| r.name == "Free Waffle")
        .expect("catalog has a free waffle");

    let result = ctx.app.loyalty().redeem(free_waffle).await;
    assert!(matches!(
        result,
        Err(LoyaltyError::InsufficientPoints { needed: 200, balance: 90, .. })
    ));
    assert_eq!(ctx.stub.redeem_requests(), 0);
    assert_eq!(ctx.store().snapshot().loyalty.points, 90);
}

#[tokio::test]
async fn test_loyalty_requires_a_signed_in_user() {
    let ctx = TestContext::new().await;
    wait_until(ctx.store(), |state| !state.auth.loading).await;

    let result = ctx.app.loyalty().refresh().await;
    assert!(matches!(result, Err(LoyaltyError::NotAuthenticated)));
    assert_eq!(ctx.stub.loyalty_requests(), 0);
}
