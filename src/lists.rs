//! Named option lists and their persistent store.
//!
//! The store never reports failures to its caller: a missing cache, a failed
//! seed fetch or malformed data all end up as an empty list set, and write
//! failures are logged and otherwise ignored.

use std::sync::mpsc::{self, Receiver};
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::StoreError;

mod cache;
mod seed;

pub use cache::{FileCache, LegacyStorage, ListCache, MemoryCache};
pub use seed::SeedSource;

pub const STORE_KEY: &str = "wrangle_lists";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub title: String,
    #[serde(default)]
    pub items: Vec<String>,
}

impl List {
    pub fn new<I, S>(title: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Partial update applied by [`ListStore::update_at`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListPatch {
    pub title: Option<String>,
    pub items: Option<Vec<String>>,
}

impl ListPatch {
    pub fn items(items: Vec<String>) -> Self {
        Self {
            title: None,
            items: Some(items),
        }
    }
}

/// Splits comma separated user input into trimmed, non-empty items.
pub fn parse_items(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct ListStore {
    cache: Box<dyn ListCache>,
    lists: Vec<List>,
}

impl ListStore {
    /// A store with no lists, used before the initial load completes.
    pub fn empty(cache: Box<dyn ListCache>) -> Self {
        Self {
            cache,
            lists: Vec::new(),
        }
    }

    /// Migrates the legacy record, then reads the cache, seeding it from
    /// `seed` when nothing is cached yet.
    pub fn load(
        cache: Box<dyn ListCache>,
        legacy: Option<&LegacyStorage>,
        seed: &SeedSource,
    ) -> Self {
        let mut store = Self::empty(cache);
        if let Some(legacy) = legacy {
            store.migrate_legacy(legacy);
        }

        match store.cache.get_item(STORE_KEY) {
            Ok(Some(value)) => match serde_json::from_value::<Vec<List>>(value) {
                Ok(lists) => {
                    info!(count = lists.len(), "lists loaded from cache");
                    store.lists = lists;
                    return store;
                }
                Err(err) => warn!(error = %err, "cached lists are malformed, reseeding"),
            },
            Ok(None) => {}
            Err(StoreError::Json(err)) => {
                warn!(error = %err, "cached lists are unreadable JSON, reseeding")
            }
            Err(err) => {
                warn!(error = %err, "failed to read cached lists");
                return store;
            }
        }

        match seed.fetch() {
            Ok(lists) => {
                info!(count = lists.len(), source = ?seed, "lists seeded");
                store.lists = lists;
                store.persist();
            }
            Err(err) => warn!(error = %err, "failed to load seed lists"),
        }
        store
    }

    fn migrate_legacy(&mut self, legacy: &LegacyStorage) {
        let raw = match legacy.get_item(STORE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                warn!(error = %err, path = %legacy.path().display(), "ignoring unreadable legacy storage");
                return;
            }
        };
        let Ok(lists) = serde_json::from_str::<Vec<List>>(&raw) else {
            warn!("ignoring malformed legacy lists");
            return;
        };
        let value = match serde_json::to_value(&lists) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "failed to encode legacy lists");
                return;
            }
        };
        if let Err(err) = self.cache.set_item(STORE_KEY, &value) {
            warn!(error = %err, "failed to migrate legacy lists");
            return;
        }
        if let Err(err) = legacy.remove_item(STORE_KEY) {
            warn!(error = %err, "failed to clear legacy lists");
        }
        info!(count = lists.len(), "legacy lists migrated");
    }

    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    /// First list with the given title.
    pub fn find(&self, title: &str) -> Option<&List> {
        self.lists.iter().find(|list| list.title == title)
    }

    pub fn append(&mut self, list: List) {
        self.lists.push(list);
        self.persist();
    }

    pub fn update_at(&mut self, index: usize, patch: ListPatch) {
        let Some(list) = self.lists.get_mut(index) else {
            return;
        };
        if let Some(title) = patch.title {
            list.title = title;
        }
        if let Some(items) = patch.items {
            list.items = items;
        }
        self.persist();
    }

    pub fn remove_at(&mut self, index: usize) {
        if index >= self.lists.len() {
            return;
        }
        self.lists.remove(index);
        self.persist();
    }

    fn persist(&mut self) {
        let value = match serde_json::to_value(&self.lists) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "failed to encode lists");
                return;
            }
        };
        if let Err(err) = self.cache.set_item(STORE_KEY, &value) {
            warn!(error = %err, "failed to persist lists");
        }
    }

    #[cfg(test)]
    pub(crate) fn cached_value(&self) -> Option<serde_json::Value> {
        self.cache.get_item(STORE_KEY).ok().flatten()
    }
}

/// Runs [`ListStore::load`] on a background thread. The receiver yields the
/// store once; the caller polls it without blocking.
pub fn spawn_load(
    cache: Box<dyn ListCache>,
    legacy: Option<LegacyStorage>,
    seed: SeedSource,
) -> Receiver<ListStore> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let store = ListStore::load(cache, legacy.as_ref(), &seed);
        // The receiver is gone if the app quit before loading finished.
        let _ = tx.send(store);
    });
    rx
}

#[cfg(test)]
#[path = "lists_tests.rs"]
mod lists_tests;
