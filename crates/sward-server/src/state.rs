use crate::config::ApiConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use sward_store::{ModelStore, WeatherSource};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;

/// Per-model mutual exclusion for load→compute→persist. Readers bypass
/// this entirely; concurrent mutating triggers for the same model queue up
/// here and time out into a retryable conflict.
#[derive(Default)]
pub struct ModelLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

#[derive(Debug)]
pub struct LockTimeout;

impl ModelLocks {
    pub async fn acquire(
        &self,
        model_id: i64,
        wait: Duration,
    ) -> Result<OwnedMutexGuard<()>, LockTimeout> {
        let slot = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(model_id).or_default())
        };
        timeout(wait, slot.lock_owned()).await.map_err(|_| LockTimeout)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ModelStore>,
    pub weather: Arc<dyn WeatherSource>,
    pub api: ApiConfig,
    pub locks: Arc<ModelLocks>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn ModelStore>, weather: Arc<dyn WeatherSource>) -> Self {
        Self::with_config(store, weather, ApiConfig::default())
    }

    #[must_use]
    pub fn with_config(
        store: Arc<dyn ModelStore>,
        weather: Arc<dyn WeatherSource>,
        api: ApiConfig,
    ) -> Self {
        Self {
            store,
            weather,
            api,
            locks: Arc::new(ModelLocks::default()),
        }
    }
}
