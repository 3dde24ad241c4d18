//! Shared harness for the integration suites.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p great-indian-waffle-integration-tests
//! ```
//!
//! The suites run the real engine end to end: a stub of the ordering
//! backend listening on a loopback port, a scripted identity provider in
//! place of the hosted identity service, and in-memory persistence that can
//! be shared across simulated restarts. Nothing here talks past 127.0.0.1.

// panics in this crate are assertion failures
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use url::Url;

use great_indian_waffle_app::identity::{AuthStateEvent, IdentityProvider, ProviderError};
use great_indian_waffle_app::persist::{MemoryStorage, PersistedState, ROOT_KEY, Storage};
use great_indian_waffle_app::store::{RootState, Store};
use great_indian_waffle_app::{App, AppConfig};
use great_indian_waffle_core::{
    AuthToken, AuthUser, Email, ItemId, MenuItem, PhoneNumber, Price, UserId, VerificationId,
};

/// Password the scripted provider accepts.
pub const TEST_PASSWORD: &str = "waffles-123";

/// Code the scripted provider accepts for phone sign-in.
pub const TEST_OTP_CODE: &str = "123456";

/// The user every suite signs in as.
#[must_use]
pub fn test_user() -> AuthUser {
    AuthUser {
        uid: UserId::new("fb-uid-001"),
        email: Some(Email::parse("asha@example.com").unwrap()),
        display_name: Some("Asha".to_string()),
        phone_number: None,
        token: AuthToken::new("token-1"),
    }
}

/// A minimal catalog entry for cart manipulation in tests.
#[must_use]
pub fn menu_item(id: i64, price: i64) -> MenuItem {
    MenuItem {
        id: ItemId::new(id),
        name: format!("Waffle {id}"),
        description: String::new(),
        price: Price::from_rupees(price),
        category: "Savory Waffles".to_string(),
        image_url: None,
    }
}

/// The catalog the stub backend serves.
#[must_use]
pub fn stub_menu_items() -> Vec<MenuItem> {
    vec![
        MenuItem {
            id: ItemId::new(11),
            name: "Tandoori Paneer Waffle".to_string(),
            description: "Char-grilled paneer and peppers on a savory waffle".to_string(),
            price: Price::from_rupees(199),
            category: "Savory Waffles".to_string(),
            image_url: None,
        },
        MenuItem {
            id: ItemId::new(12),
            name: "Butter Chicken Waffle".to_string(),
            description: "Waffle dipped in a rich makhani gravy".to_string(),
            price: Price::from_rupees(249),
            category: "Savory Waffles".to_string(),
            image_url: None,
        },
        MenuItem {
            id: ItemId::new(13),
            name: "Gulab Jamun Waffle".to_string(),
            description: "Sweet waffle topped with warm gulab jamun and rabri".to_string(),
            price: Price::from_rupees(179),
            category: "Sweet Waffles".to_string(),
            image_url: None,
        },
        MenuItem {
            id: ItemId::new(14),
            name: "Masala Chai".to_string(),
            description: "Spiced tea brewed to order".to_string(),
            price: Price::from_rupees(49),
            category: "Beverages".to_string(),
            image_url: None,
        },
    ]
}

// =============================================================================
// Stub Backend
// =============================================================================

/// In-process stand-in for the ordering backend.
///
/// Serves the same routes and response shapes as the real API, records
/// enough about the traffic for tests to assert on, and can be flipped into
/// failure modes per route group.
pub struct StubApi {
    addr: SocketAddr,
    state: Arc<StubState>,
}

#[derive(Default)]
struct StubState {
    fail_menu: AtomicBool,
    empty_menu: AtomicBool,
    fail_orders: AtomicBool,
    points: AtomicU32,
    next_order_id: AtomicI64,
    orders: tokio::sync::Mutex<Vec<Value>>,
    last_bearer: std::sync::Mutex<Option<String>>,
    menu_requests: AtomicUsize,
    featured_requests: AtomicUsize,
    item_requests: AtomicUsize,
    order_requests: AtomicUsize,
    history_requests: AtomicUsize,
    loyalty_requests: AtomicUsize,
    redeem_requests: AtomicUsize,
}

impl StubApi {
    /// Bind to a free loopback port and start serving.
    pub async fn spawn() -> Self {
        let state = Arc::new(StubState {
            points: AtomicU32::new(250),
            next_order_id: AtomicI64::new(1),
            ..StubState::default()
        });

        let router = Router::new()
            .route("/menu", get(menu))
            .route("/menu/featured", get(featured))
            .route("/menu/{item_id}", get(menu_item_by_id))
            .route("/orders/create", post(create_order))
            .route("/orders/history/{user_id}", get(order_history))
            .route("/loyalty/points/{user_id}", get(loyalty_points))
            .route("/loyalty/redeem", post(redeem_reward))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { addr, state }
    }

    /// Base URL the engine should be pointed at.
    #[must_use]
    pub fn base_url(&self) -> Url {
        format!("http://{}", self.addr).parse().expect("loopback url")
    }

    /// Make the menu routes return 500.
    pub fn fail_menu(&self, fail: bool) {
        self.state.fail_menu.store(fail, Ordering::SeqCst);
    }

    /// Make `/menu` succeed with an empty catalog.
    pub fn serve_empty_menu(&self, empty: bool) {
        self.state.empty_menu.store(empty, Ordering::SeqCst);
    }

    /// Make order creation return 500.
    pub fn fail_orders(&self, fail: bool) {
        self.state.fail_orders.store(fail, Ordering::SeqCst);
    }

    /// Set the loyalty balance the stub reports.
    pub fn set_points(&self, points: u32) {
        self.state.points.store(points, Ordering::SeqCst);
    }

    /// `Authorization` header seen on the most recent order creation.
    #[must_use]
    pub fn last_bearer(&self) -> Option<String> {
        self.state.last_bearer.lock().unwrap().clone()
    }

    /// Orders accepted so far, as stored (with the assigned `id`).
    pub async fn stored_orders(&self) -> Vec<Value> {
        self.state.orders.lock().await.clone()
    }

    #[must_use]
    pub fn menu_requests(&self) -> usize {
        self.state.menu_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn featured_requests(&self) -> usize {
        self.state.featured_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn item_requests(&self) -> usize {
        self.state.item_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn order_requests(&self) -> usize {
        self.state.order_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn history_requests(&self) -> usize {
        self.state.history_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn loyalty_requests(&self) -> usize {
        self.state.loyalty_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn redeem_requests(&self) -> usize {
        self.state.redeem_requests.load(Ordering::SeqCst)
    }
}

async fn menu(State(state): State<Arc<StubState>>) -> Response {
    state.menu_requests.fetch_add(1, Ordering::SeqCst);
    if state.fail_menu.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "menu unavailable"})),
        )
            .into_response();
    }
    if state.empty_menu.load(Ordering::SeqCst) {
        return Json(Vec::<MenuItem>::new()).into_response();
    }
    Json(stub_menu_items()).into_response()
}

async fn featured(State(state): State<Arc<StubState>>) -> Response {
    state.featured_requests.fetch_add(1, Ordering::SeqCst);
    if state.fail_menu.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "menu unavailable"})),
        )
            .into_response();
    }
    let items: Vec<MenuItem> = stub_menu_items().into_iter().take(2).collect();
    Json(items).into_response()
}

async fn menu_item_by_id(
    State(state): State<Arc<StubState>>,
    Path(item_id): Path<i64>,
) -> Response {
    state.item_requests.fetch_add(1, Ordering::SeqCst);
    stub_menu_items()
        .into_iter()
        .find(|item| item.id == ItemId::new(item_id))
        .map_or_else(
            || {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"detail": "Menu item not found"})),
                )
                    .into_response()
            },
            |item| Json(item).into_response(),
        )
}

async fn create_order(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(mut order): Json<Value>,
) -> Response {
    state.order_requests.fetch_add(1, Ordering::SeqCst);
    *state.last_bearer.lock().unwrap() = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);

    if state.fail_orders.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "could not store order"})),
        )
            .into_response();
    }

    let id = state.next_order_id.fetch_add(1, Ordering::SeqCst);
    if let Some(fields) = order.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
    }
    state.orders.lock().await.push(order);

    Json(json!({"order_id": id, "message": "Order placed successfully"})).into_response()
}

async fn order_history(
    State(state): State<Arc<StubState>>,
    Path(user_id): Path<String>,
) -> Response {
    state.history_requests.fetch_add(1, Ordering::SeqCst);
    let orders = state.orders.lock().await;
    let matching: Vec<Value> = orders
        .iter()
        .filter(|order| order.get("user_id").and_then(Value::as_str) == Some(user_id.as_str()))
        .cloned()
        .collect();
    Json(matching).into_response()
}

async fn loyalty_points(
    State(state): State<Arc<StubState>>,
    Path(user_id): Path<String>,
) -> Response {
    state.loyalty_requests.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "user_id": user_id,
        "total_points": state.points.load(Ordering::SeqCst),
    }))
    .into_response()
}

async fn redeem_reward(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    state.redeem_requests.fetch_add(1, Ordering::SeqCst);
    let reward = body
        .get("reward")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let cost = match reward.as_str() {
        "Free Waffle" => 200,
        "20% Off Your Order" => 150,
        "Free Beverage" => 100,
        _ => 0,
    };
    let remaining = state.points.load(Ordering::SeqCst).saturating_sub(cost);
    state.points.store(remaining, Ordering::SeqCst);
    Json(json!({"remaining_points": remaining, "reward": reward})).into_response()
}

// =============================================================================
// Scripted Identity Provider
// =============================================================================

/// Identity provider scripted from the test.
///
/// Emits its initial session notification on subscribe, accepts exactly one
/// password and one OTP code, and emits the matching signed-in notification
/// on success the way the hosted SDK would. Arbitrary notifications can be
/// pushed through the [`SessionHandle`] returned alongside it.
pub struct ScriptedProvider {
    user: AuthUser,
    password: String,
    initial: AuthStateEvent,
    sender: mpsc::UnboundedSender<AuthStateEvent>,
    receiver: std::sync::Mutex<Option<mpsc::UnboundedReceiver<AuthStateEvent>>>,
}

/// Test-side handle for pushing session notifications.
pub struct SessionHandle {
    sender: mpsc::UnboundedSender<AuthStateEvent>,
}

impl SessionHandle {
    /// Emit a session notification as the identity service would.
    pub fn push(&self, event: AuthStateEvent) {
        self.sender.send(event).expect("provider stream open");
    }
}

impl ScriptedProvider {
    /// Provider that reports signed out at startup.
    #[must_use]
    pub fn new(user: AuthUser, password: &str) -> (Self, SessionHandle) {
        Self::with_initial(user, password, AuthStateEvent::signed_out())
    }

    /// Provider that restores `user`'s session at startup, like an SDK
    /// holding a still-valid refresh token.
    #[must_use]
    pub fn with_restored_session(user: AuthUser, password: &str) -> (Self, SessionHandle) {
        let initial = AuthStateEvent::signed_in(user.clone());
        Self::with_initial(user, password, initial)
    }

    fn with_initial(
        user: AuthUser,
        password: &str,
        initial: AuthStateEvent,
    ) -> (Self, SessionHandle) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = SessionHandle {
            sender: sender.clone(),
        };
        let provider = Self {
            user,
            password: password.to_string(),
            initial,
            sender,
            receiver: std::sync::Mutex::new(Some(receiver)),
        };
        (provider, handle)
    }

    fn emit_signed_in(&self) {
        let _ = self
            .sender
            .send(AuthStateEvent::signed_in(self.user.clone()));
    }
}

impl IdentityProvider for ScriptedProvider {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthStateEvent> {
        match self.receiver.lock().unwrap().take() {
            Some(receiver) => {
                let _ = self.sender.send(self.initial.clone());
                receiver
            }
            None => mpsc::unbounded_channel().1,
        }
    }

    async fn sign_in_with_password(
        &self,
        _email: &Email,
        password: &str,
    ) -> Result<(), ProviderError> {
        if password == self.password {
            self.emit_signed_in();
            Ok(())
        } else {
            Err(ProviderError::InvalidCredentials)
        }
    }

    async fn create_user_with_password(
        &self,
        _email: &Email,
        password: &str,
    ) -> Result<(), ProviderError> {
        if password == self.password {
            self.emit_signed_in();
            Ok(())
        } else {
            Err(ProviderError::WeakPassword("too short".to_string()))
        }
    }

    async fn sign_in_with_google(&self) -> Result<(), ProviderError> {
        self.emit_signed_in();
        Ok(())
    }

    async fn send_otp(&self, _phone: &PhoneNumber) -> Result<VerificationId, ProviderError> {
        Ok(VerificationId::new("verification-1"))
    }

    async fn sign_in_with_otp(
        &self,
        _verification: &VerificationId,
        code: &str,
    ) -> Result<(), ProviderError> {
        if code == TEST_OTP_CODE {
            self.emit_signed_in();
            Ok(())
        } else {
            Err(ProviderError::InvalidOtp)
        }
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let _ = self.sender.send(AuthStateEvent::signed_out());
        Ok(())
    }
}

// =============================================================================
// Test Context
// =============================================================================

/// Everything a suite needs: the engine, the stub, the storage, and a
/// handle into the provider stream.
pub struct TestContext {
    pub app: App<ScriptedProvider, Arc<MemoryStorage>>,
    pub stub: StubApi,
    pub storage: Arc<MemoryStorage>,
    pub session: SessionHandle,
}

impl TestContext {
    /// Fresh engine against a fresh stub: signed out, empty storage.
    pub async fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new())).await
    }

    /// Fresh engine over existing storage, signed out at startup.
    pub async fn with_storage(storage: Arc<MemoryStorage>) -> Self {
        let (provider, session) = ScriptedProvider::new(test_user(), TEST_PASSWORD);
        Self::start(storage, provider, session).await
    }

    /// Fresh engine over existing storage with the provider restoring the
    /// test user's session, as after an app restart with a valid token.
    pub async fn with_restored_session(storage: Arc<MemoryStorage>) -> Self {
        let (provider, session) =
            ScriptedProvider::with_restored_session(test_user(), TEST_PASSWORD);
        Self::start(storage, provider, session).await
    }

    async fn start(
        storage: Arc<MemoryStorage>,
        provider: ScriptedProvider,
        session: SessionHandle,
    ) -> Self {
        let stub = StubApi::spawn().await;
        let config = AppConfig::with_base_url(stub.base_url());
        let app = App::init(config, provider, Arc::clone(&storage)).await;
        Self {
            app,
            stub,
            storage,
            session,
        }
    }

    /// The engine's store.
    #[must_use]
    pub fn store(&self) -> &Store {
        self.app.store()
    }

    /// Push a signed-in notification and wait for the session to settle.
    pub async fn sign_in(&self) {
        self.session.push(AuthStateEvent::signed_in(test_user()));
        wait_until(self.store(), |state| state.auth.is_authenticated).await;
    }
}

// =============================================================================
// Waiting Helpers
// =============================================================================

/// Block until `pred` holds on the store state, or panic after two seconds.
pub async fn wait_until(store: &Store, pred: impl Fn(&RootState) -> bool) {
    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let state = rx.borrow().clone();
            if pred(&state) {
                return;
            }
            assert!(rx.changed().await.is_ok(), "store dropped while waiting");
        }
    })
    .await
    .expect("state change within deadline");
}

/// Block until the persisted snapshot satisfies `pred`, polling storage.
pub async fn wait_for_persisted(
    storage: &MemoryStorage,
    pred: impl Fn(&PersistedState) -> bool,
) -> PersistedState {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Ok(Some(raw)) = storage.get(ROOT_KEY).await
                && let Ok(snapshot) = serde_json::from_str::<PersistedState>(&raw)
                && pred(&snapshot)
            {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("persisted snapshot within deadline")
}
