//! Observable progress store.
//!
//! Owns the slug → progress mapping persisted under [`STORAGE_KEY`]. Every
//! write is persisted first, then each subscriber is called synchronously in
//! subscription order. Subscribers run after the store's write lock is
//! released, so they may read (or write) the store themselves.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::roster::Requirement;
use super::storage::KeyValueStorage;

/// Storage key. The version suffix changes whenever the stored shape does.
pub const STORAGE_KEY: &str = "gradtrack-checklist-progress-v1";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub requirements: Vec<bool>,
    pub achievements: Vec<String>,
    pub approved: bool,
}

pub type ProgressMap = BTreeMap<String, ProgressEntry>;

/// Delivered to subscribers after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressChange {
    pub slug: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&ProgressChange) + Send + Sync>;

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse the raw stored value, tolerating older and damaged shapes.
///
/// * unreadable JSON or a non-object root reads as empty;
/// * a bare array entry is the pre-achievements format: completion flags only;
/// * achievements are trimmed and blanks dropped;
/// * entries that are neither arrays nor objects are skipped.
pub fn parse_progress(raw: Option<&str>) -> ProgressMap {
    let Some(raw) = raw else {
        return ProgressMap::new();
    };
    let Ok(Value::Object(root)) = serde_json::from_str::<Value>(raw) else {
        return ProgressMap::new();
    };

    let mut map = ProgressMap::new();
    for (slug, value) in root {
        let entry = match value {
            Value::Array(flags) => ProgressEntry {
                requirements: flags.iter().map(truthy).collect(),
                achievements: Vec::new(),
                approved: false,
            },
            Value::Object(fields) => {
                let requirements = match fields.get("requirements") {
                    Some(Value::Array(flags)) => flags.iter().map(truthy).collect(),
                    _ => Vec::new(),
                };
                let achievements = match fields.get("achievements") {
                    Some(Value::Array(items)) => items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::trim))
                        .filter(|item| !item.is_empty())
                        .map(str::to_string)
                        .collect(),
                    _ => Vec::new(),
                };
                ProgressEntry {
                    requirements,
                    achievements,
                    approved: fields.get("approved").is_some_and(truthy),
                }
            }
            _ => continue,
        };
        map.insert(slug, entry);
    }
    map
}

pub struct ProgressStore {
    storage: Arc<dyn KeyValueStorage>,
    write_lock: Mutex<()>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

impl ProgressStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // ── Raw access ────────────────────────────────────────────

    pub fn snapshot(&self) -> ProgressMap {
        parse_progress(self.storage.get_item(STORAGE_KEY).as_deref())
    }

    pub fn get(&self, slug: &str) -> Option<ProgressEntry> {
        self.snapshot().remove(slug)
    }

    /// Replace one slug's entry.
    pub fn set(&self, slug: &str, entry: ProgressEntry) -> anyhow::Result<()> {
        self.update(slug, |_| entry)
    }

    fn update<F>(&self, slug: &str, f: F) -> anyhow::Result<()>
    where
        F: FnOnce(Option<ProgressEntry>) -> ProgressEntry,
    {
        {
            let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
            let mut map = self.snapshot();
            let next = f(map.remove(slug));
            map.insert(slug.to_string(), next);
            let raw = serde_json::to_string(&map).context("serializing checklist progress")?;
            self.storage.set_item(STORAGE_KEY, &raw)?;
        }
        tracing::debug!(slug, "checklist progress saved");
        self.notify(&ProgressChange {
            slug: slug.to_string(),
        });
        Ok(())
    }

    // ── Subscriptions ─────────────────────────────────────────

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ProgressChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn notify(&self, change: &ProgressChange) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(change);
        }
    }

    // ── Typed views over one entry ────────────────────────────

    /// Merge saved completion flags onto `base` by position. Labels always
    /// come from `base`; a short saved list leaves trailing items untouched.
    pub fn requirements_for(&self, slug: &str, base: &[Requirement]) -> Vec<Requirement> {
        let saved = self.get(slug).map(|e| e.requirements).unwrap_or_default();
        if saved.is_empty() {
            return base.to_vec();
        }
        base.iter()
            .enumerate()
            .map(|(i, item)| Requirement {
                label: item.label.clone(),
                complete: saved.get(i).copied().unwrap_or(item.complete),
            })
            .collect()
    }

    pub fn save_requirements(&self, slug: &str, requirements: &[Requirement]) -> anyhow::Result<()> {
        let flags: Vec<bool> = requirements.iter().map(|r| r.complete).collect();
        self.update(slug, |prev| {
            let prev = prev.unwrap_or_default();
            ProgressEntry {
                requirements: flags,
                ..prev
            }
        })
    }

    pub fn achievements_for(&self, slug: &str, base: &[String]) -> Vec<String> {
        match self.get(slug) {
            Some(entry) if !entry.achievements.is_empty() => entry.achievements,
            _ => base.to_vec(),
        }
    }

    pub fn save_achievements(&self, slug: &str, achievements: &[String]) -> anyhow::Result<()> {
        let achievements = achievements.to_vec();
        self.update(slug, |prev| ProgressEntry {
            achievements,
            ..prev.unwrap_or_default()
        })
    }

    pub fn approval_for(&self, slug: &str, base: bool) -> bool {
        self.get(slug).map_or(base, |entry| entry.approved)
    }

    pub fn save_approval(&self, slug: &str, approved: bool) -> anyhow::Result<()> {
        self.update(slug, |prev| ProgressEntry {
            approved,
            ..prev.unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::storage::MemoryStorage;
    use std::sync::atomic::AtomicUsize;

    fn store() -> (Arc<MemoryStorage>, ProgressStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = ProgressStore::new(storage.clone());
        (storage, store)
    }

    fn base() -> Vec<Requirement> {
        vec![
            Requirement::new("A", false),
            Requirement::new("B", true),
            Requirement::new("C", false),
        ]
    }

    #[test]
    fn parse_tolerates_garbage() {
        assert!(parse_progress(None).is_empty());
        assert!(parse_progress(Some("not json")).is_empty());
        assert!(parse_progress(Some("[1,2]")).is_empty());
        assert!(parse_progress(Some("null")).is_empty());
    }

    #[test]
    fn parse_normalizes_legacy_and_current_shapes() {
        let map = parse_progress(Some(
            r#"{
                "legacy": [1, 0, true, null],
                "current": {"requirements": [true], "achievements": ["  Dean's Lister ", "", 7], "approved": 1},
                "partial": {"approved": true},
                "junk": 42
            }"#,
        ));
        assert_eq!(
            map["legacy"],
            ProgressEntry {
                requirements: vec![true, false, true, false],
                achievements: vec![],
                approved: false,
            }
        );
        assert_eq!(map["current"].achievements, vec!["Dean's Lister"]);
        assert!(map["current"].approved);
        assert!(map["partial"].requirements.is_empty());
        assert!(map["partial"].approved);
        assert!(!map.contains_key("junk"));
    }

    #[test]
    fn requirements_merge_positionally() {
        let (_, store) = store();
        assert_eq!(store.requirements_for("s", &base()), base());

        store
            .set(
                "s",
                ProgressEntry {
                    requirements: vec![true, false],
                    ..Default::default()
                },
            )
            .unwrap();
        let merged = store.requirements_for("s", &base());
        let flags: Vec<_> = merged.iter().map(|r| r.complete).collect();
        assert_eq!(flags, vec![true, false, false]);
        assert_eq!(merged[2].label, "C");
    }

    #[test]
    fn longer_saved_list_is_truncated_to_base() {
        let (_, store) = store();
        store
            .save_requirements("s", &vec![Requirement::new("x", true); 5])
            .unwrap();
        assert_eq!(store.requirements_for("s", &base()).len(), 3);
    }

    #[test]
    fn saves_preserve_other_fields() {
        let (_, store) = store();
        store.save_approval("s", true).unwrap();
        store
            .save_achievements("s", &["Cum Laude".to_string()])
            .unwrap();
        store.save_requirements("s", &base()).unwrap();
        let entry = store.get("s").unwrap();
        assert!(entry.approved);
        assert_eq!(entry.achievements, vec!["Cum Laude"]);
        assert_eq!(entry.requirements, vec![false, true, false]);
    }

    #[test]
    fn achievements_and_approval_fall_back_to_base() {
        let (_, store) = store();
        let base_awards = vec!["Dean's Lister".to_string()];
        assert_eq!(store.achievements_for("s", &base_awards), base_awards);
        assert!(store.approval_for("s", true));

        store.save_requirements("s", &base()).unwrap();
        // Entry exists now, so its approval flag wins over the baseline.
        assert!(!store.approval_for("s", true));
        assert_eq!(store.achievements_for("s", &base_awards), base_awards);
    }

    #[test]
    fn writes_land_in_storage_under_versioned_key() {
        let (storage, store) = store();
        store.save_approval("s", true).unwrap();
        let raw = storage.get_item(STORAGE_KEY).unwrap();
        let json: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["s"]["approved"], Value::Bool(true));
    }

    #[test]
    fn subscribers_called_in_order_after_write() {
        let (_, store) = store();
        let store = Arc::new(store);
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            let reader = Arc::clone(&store);
            store.subscribe(move |change| {
                // Re-entrant read sees the write already persisted.
                let approved = reader.approval_for(&change.slug, false);
                log.lock().unwrap().push((tag, change.slug.clone(), approved));
            });
        }
        store.save_approval("s", true).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![("first", "s".to_string(), true), ("second", "s".to_string(), true)]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let (_, store) = store();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let id = store.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        store.save_approval("s", true).unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.save_approval("s", false).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn stores_sharing_storage_see_each_others_writes() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let a = ProgressStore::new(Arc::clone(&storage));
        let b = ProgressStore::new(storage);
        a.save_approval("s", true).unwrap();
        assert!(b.approval_for("s", false));
    }
}
