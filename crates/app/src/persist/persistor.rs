//! Rehydration and the write-behind persistor task.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::store::{RootState, Store};

use super::snapshot::{PersistedState, ROOT_KEY, SCHEMA_VERSION};
use super::storage::{Storage, StorageError};

/// Load the persisted snapshot and build the initial state.
///
/// Falls back to defaults when the snapshot is absent, unreadable,
/// malformed, or from a different schema version. A broken snapshot costs
/// the saved session and cart, never startup.
pub async fn rehydrate<S: Storage>(storage: &S) -> RootState {
    let raw = match storage.get(ROOT_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("no persisted state, starting fresh");
            return RootState::default();
        }
        Err(e) => {
            warn!(error = %e, "failed to read persisted state, starting fresh");
            return RootState::default();
        }
    };

    let snapshot: PersistedState = match serde_json::from_str(&raw) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "persisted state is malformed, starting fresh");
            return RootState::default();
        }
    };

    if snapshot.version != SCHEMA_VERSION {
        warn!(
            found = snapshot.version,
            expected = SCHEMA_VERSION,
            "persisted state has a different schema version, discarding"
        );
        return RootState::default();
    }

    debug!("state rehydrated");
    snapshot.into_state()
}

/// Serialize `snapshot` and write it under [`ROOT_KEY`].
pub(crate) async fn write_snapshot<S: Storage>(
    storage: &S,
    snapshot: &PersistedState,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(snapshot)?;
    storage.set(ROOT_KEY, &json).await
}

/// Spawn the write-behind persistor.
///
/// The task wakes on every store change, captures the durable subset, and
/// writes it out when it differs from the last successful write. Transient
/// churn (menu loads, loading flags, loyalty refreshes) captures equal and
/// is skipped. Write failures are logged and leave the in-memory state
/// alone; the next change retries. The task ends when the store is dropped.
pub fn spawn_persistor<S: Storage>(store: &Store, storage: Arc<S>) -> JoinHandle<()> {
    let mut rx = store.subscribe();
    tokio::spawn(async move {
        let mut last = PersistedState::capture(&rx.borrow());
        while rx.changed().await.is_ok() {
            let snapshot = PersistedState::capture(&rx.borrow());
            if snapshot == last {
                continue;
            }
            match write_snapshot(storage.as_ref(), &snapshot).await {
                Ok(()) => last = snapshot,
                Err(e) => warn!(error = %e, "failed to persist state"),
            }
        }
        debug!("persistor stopped");
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::time::Duration;

    use great_indian_waffle_core::{ItemId, MenuItem, Price};

    use crate::persist::MemoryStorage;
    use crate::store::CatalogSource;

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

    async fn wait_for_snapshot(
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
        .expect("storage write within deadline")
    }

    #[tokio::test]
    async fn test_rehydrate_defaults_when_absent() {
        let storage = MemoryStorage::new();
        let state = rehydrate(&storage).await;

        assert!(state.auth.loading);
        assert!(!state.auth.is_authenticated);
        assert!(state.order.cart.is_empty());
    }

    #[tokio::test]
    async fn test_rehydrate_discards_malformed_snapshot() {
        let storage = MemoryStorage::new();
        storage.set(ROOT_KEY, "definitely not json").await.unwrap();

        let state = rehydrate(&storage).await;
        assert!(state.order.cart.is_empty());
    }

    #[tokio::test]
    async fn test_rehydrate_discards_other_schema_versions() {
        let storage = MemoryStorage::new();
        let mut snapshot = PersistedState::capture(&RootState::default());
        snapshot.version = SCHEMA_VERSION + 1;
        write_snapshot(&storage, &snapshot).await.unwrap();

        let state = rehydrate(&storage).await;
        assert!(state.order.cart.is_empty());
        assert!(!state.auth.is_authenticated);
    }

    #[tokio::test]
    async fn test_persistor_writes_behind_cart_changes() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Store::new();
        spawn_persistor(&store, Arc::clone(&storage));

        store.add_to_cart(&menu_item(1, 149));
        let snapshot =
            wait_for_snapshot(&storage, |s| s.order.cart.total_quantity() == 1).await;
        assert_eq!(snapshot.version, SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_persistor_skips_transient_changes() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Store::new();
        spawn_persistor(&store, Arc::clone(&storage));

        store.add_to_cart(&menu_item(1, 149));
        wait_for_snapshot(&storage, |s| s.order.cart.total_quantity() == 1).await;

        // none of these touch the durable subset
        store.menu_loaded(vec![menu_item(9, 199)], CatalogSource::Remote, None);
        store.loyalty_balance(120);

        store.add_to_cart(&menu_item(2, 179));
        wait_for_snapshot(&storage, |s| s.order.cart.total_quantity() == 2).await;

        // two durable changes, two writes
        assert_eq!(storage.write_count(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_state_and_retries() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Store::new();
        spawn_persistor(&store, Arc::clone(&storage));

        storage.fail_writes(true);
        store.add_to_cart(&menu_item(1, 149));

        // the store itself is unaffected by the storage failure
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.snapshot().order.cart.total_quantity(), 1);
        assert!(storage.get(ROOT_KEY).await.unwrap().is_none());

        // the next change lands once storage recovers
        storage.fail_writes(false);
        store.add_to_cart(&menu_item(2, 179));
        wait_for_snapshot(&storage, |s| s.order.cart.total_quantity() == 2).await;
    }

    #[tokio::test]
    async fn test_full_round_trip_through_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Store::new();
        spawn_persistor(&store, Arc::clone(&storage));

        store.add_to_cart_with_quantity(&menu_item(1, 149), 3);
        wait_for_snapshot(&storage, |s| s.order.cart.total_quantity() == 3).await;

        let restored = rehydrate(storage.as_ref()).await;
        assert_eq!(restored.order.cart.total_quantity(), 3);
        assert_eq!(restored.order.cart.subtotal(), Price::from_rupees(447));
        assert!(restored.auth.loading);
    }
}
