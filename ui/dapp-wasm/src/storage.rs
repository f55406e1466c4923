use anyhow::{Result, anyhow};
use gloo_storage::{LocalStorage, Storage};
use ss_storage::KeyValueStore;

/// `localStorage`, keyed by account address like the rest of the page's history.
pub struct BrowserStorage {
    raw: web_sys::Storage,
}

impl BrowserStorage {
    /// Fails when the browser denies storage access (private mode, disabled cookies).
    pub fn open() -> Result<Self> {
        let window = crate::dom::window().ok_or_else(|| anyhow!("no window"))?;
        match window.local_storage() {
            Ok(Some(_)) => Ok(Self {
                raw: LocalStorage::raw(),
            }),
            Ok(None) => Err(anyhow!("localStorage is not available")),
            Err(err) => Err(anyhow!("localStorage access denied: {err:?}")),
        }
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.raw
            .get_item(key)
            .map_err(|err| anyhow!("localStorage read of {key} failed: {err:?}"))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.raw
            .set_item(key, value)
            .map_err(|err| anyhow!("localStorage write of {key} failed: {err:?}"))
    }
}
