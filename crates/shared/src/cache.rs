//! Per-user draft cache.
//!
//! Inside the chat host the draft is saved on every change under a key
//! derived from the host user id, and restored (within the TTL) the next
//! time the form opens. Outside the host nothing is persisted: any leftover
//! entry under the local key is deleted on load.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::host::HostIdentity;
use crate::models::{is_valid_child_age, BookingDraft};

const KEY_PREFIX: &str = "campsite_draft";
pub const LOCAL_KEY: &str = "local";

/// Stored drafts come from outside the app, so the usual bounds are
/// re-applied on the way in.
fn sanitize(mut draft: BookingDraft) -> BookingDraft {
    draft.guest_count = draft.guest_count.max(1);
    draft.children.retain(|&age| is_valid_child_age(age));
    draft
}

/// Minimal string store, implemented over `localStorage` in the browser.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedDraft {
    pub draft: BookingDraft,
    pub timestamp: DateTime<Utc>,
}

pub fn cache_key(identity: Option<&HostIdentity>) -> String {
    let user = identity
        .and_then(|i| i.user_id.as_deref())
        .filter(|id| !id.is_empty())
        .unwrap_or(LOCAL_KEY);
    format!("{}:{}", KEY_PREFIX, user)
}

pub struct DraftCache<S> {
    store: S,
    key: String,
    ttl: Option<Duration>,
    persist: bool,
}

impl<S: KeyValueStore> DraftCache<S> {
    /// `identity` is `Some` only when running inside the host; that alone
    /// turns persistence on.
    pub fn new(store: S, identity: Option<&HostIdentity>, ttl: Option<Duration>) -> Self {
        DraftCache {
            store,
            key: cache_key(identity),
            ttl,
            persist: identity.is_some(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_persistent(&self) -> bool {
        self.persist
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the cached draft if it is still fresh. Expired or unreadable
    /// entries are deleted; outside the host the entry is always deleted.
    pub fn load(&self, now: DateTime<Utc>) -> Option<BookingDraft> {
        if !self.persist {
            self.store.remove(&self.key);
            return None;
        }

        let raw = self.store.get(&self.key)?;
        let cached: CachedDraft = match serde_json::from_str(&raw) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Dropping unreadable cached draft");
                self.store.remove(&self.key);
                return None;
            }
        };

        if let Some(ttl) = self.ttl {
            if now - cached.timestamp > ttl {
                tracing::debug!(key = %self.key, "Cached draft expired");
                self.store.remove(&self.key);
                return None;
            }
        }
        Some(sanitize(cached.draft))
    }

    pub fn save(&self, draft: &BookingDraft, now: DateTime<Utc>) {
        if !self.persist {
            return;
        }
        let entry = CachedDraft {
            draft: draft.clone(),
            timestamp: now,
        };
        let result = serde_json::to_string(&entry)
            .map_err(|e| e.to_string())
            .and_then(|json| self.store.set(&self.key, &json));
        if let Err(e) = result {
            tracing::warn!(key = %self.key, error = %e, "Could not cache draft");
        }
    }

    /// Forget the draft after it has been submitted.
    pub fn discard(&self) {
        self.store.remove(&self.key);
    }
}
