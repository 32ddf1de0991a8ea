use campsite_shared::cache::KeyValueStore;

/// `window.localStorage`. Private browsing modes may deny it; reads then
/// find nothing and writes fail.
pub struct LocalStore {
    storage: Option<web_sys::Storage>,
}

impl LocalStore {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            tracing::warn!("localStorage is not available");
        }
        LocalStore { storage }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| "localStorage is not available".to_string())?;
        storage
            .set_item(key, value)
            .map_err(|e| format!("{:?}", e))
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = &self.storage {
            storage.remove_item(key).ok();
        }
    }
}
