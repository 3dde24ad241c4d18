//! Engine wiring.
//!
//! [`App::init`] assembles the whole client engine: it rehydrates persisted
//! state into a fresh store, starts the write-behind persistor and the
//! session mirror, and hands every service a clone of the store. The shell
//! embedding this crate keeps one `App` for the lifetime of the process and
//! drives it through the service accessors.

use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::identity::IdentityProvider;
use crate::persist::{self, FileStorage, PersistedState, Storage, StorageError};
use crate::services::{AuthService, LoyaltyService, MenuService, OrderService};
use crate::store::Store;

/// The assembled client engine.
pub struct App<P, S> {
    store: Store,
    auth: AuthService<P>,
    menu: MenuService,
    orders: OrderService,
    loyalty: LoyaltyService,
    storage: Arc<S>,
}

impl<P: IdentityProvider, S: Storage> App<P, S> {
    /// Bring the engine up.
    ///
    /// Rehydrates whatever `storage` holds into the initial state, spawns
    /// the persistor and the session mirror, and wires the services. The
    /// background tasks stop on their own when the `App` is dropped.
    pub async fn init(config: AppConfig, provider: P, storage: S) -> Self {
        let storage = Arc::new(storage);
        let initial = persist::rehydrate(storage.as_ref()).await;
        let store = Store::with_state(initial);

        // persistor first, so it observes the mirror's initial event
        persist::spawn_persistor(&store, Arc::clone(&storage));

        let auth = AuthService::new(store.clone(), Arc::new(provider));
        auth.spawn_mirror();

        let api = ApiClient::new(&config);
        let menu = MenuService::new(store.clone(), api.clone());
        let orders = OrderService::new(
            store.clone(),
            api.clone(),
            config.delivery_fee,
            config.tax_rate,
        );
        let loyalty = LoyaltyService::new(store.clone(), api);

        info!("client engine initialized");
        Self {
            store,
            auth,
            menu,
            orders,
            loyalty,
            storage,
        }
    }

    /// The shared state store.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Authentication operations.
    #[must_use]
    pub const fn auth(&self) -> &AuthService<P> {
        &self.auth
    }

    /// Menu catalog operations.
    #[must_use]
    pub const fn menu(&self) -> &MenuService {
        &self.menu
    }

    /// Order submission and history.
    #[must_use]
    pub const fn orders(&self) -> &OrderService {
        &self.orders
    }

    /// Loyalty points and rewards.
    #[must_use]
    pub const fn loyalty(&self) -> &LoyaltyService {
        &self.loyalty
    }

    /// Write the current durable subset out immediately.
    ///
    /// The persistor already writes behind every change; shutdown paths call
    /// this to make sure the final state is on disk before exit.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the storage backend fails.
    pub async fn flush(&self) -> Result<(), StorageError> {
        let snapshot = PersistedState::capture(&self.store.snapshot());
        persist::write_snapshot(self.storage.as_ref(), &snapshot).await
    }
}

impl<P: IdentityProvider> App<P, FileStorage> {
    /// Engine with file-backed persistence under `config.state_dir`.
    pub async fn init_with_file_storage(config: AppConfig, provider: P) -> Self {
        let storage = FileStorage::new(&config.state_dir);
        Self::init(config, provider, storage).await
    }
}
