//! InMemoryStore - JSON-tree-backed store gateway for testing and development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};

use super::{StoreError, StoreGateway, Versioned};

/// In-memory store gateway backed by a JSON tree.
///
/// Children of a node iterate in key order, matching the ordered-children
/// semantics of the remote document store. An explicit JSON null reads back
/// as absent. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryStore {
    tree: Arc<RwLock<Map<String, Value>>>,
    versions: Arc<RwLock<HashMap<String, u64>>>,
    push_seq: Arc<AtomicU64>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            tree: Arc::new(RwLock::new(Map::new())),
            versions: Arc::new(RwLock::new(HashMap::new())),
            push_seq: Arc::new(AtomicU64::new(1)),
        }
    }

    fn bump(&self, key: &str) -> Result<u64, StoreError> {
        let mut versions = self
            .versions
            .write()
            .map_err(|_| StoreError::LockPoisoned("versions write"))?;
        let version = versions.entry(key.to_string()).or_insert(0);
        *version += 1;
        Ok(*version)
    }
}

fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn lookup<'a>(root: &'a Map<String, Value>, segments: &[&str]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = root.get(*first)?;
    for segment in rest {
        current = current.as_object()?.get(*segment)?;
    }
    Some(current)
}

/// Walk to the object at `segments`, creating intermediate objects and
/// replacing any non-object value on the way.
fn object_at<'a>(
    root: &'a mut Map<String, Value>,
    segments: &[&str],
) -> &'a mut Map<String, Value> {
    let mut current = root;
    for segment in segments {
        let entry = current
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
    }
    current
}

/// Walk to the object at `segments` without creating anything.
fn existing_object_at<'a>(
    root: &'a mut Map<String, Value>,
    segments: &[&str],
) -> Option<&'a mut Map<String, Value>> {
    let mut current = root;
    for segment in segments {
        current = match current.get_mut(*segment) {
            Some(Value::Object(map)) => map,
            _ => return None,
        };
    }
    Some(current)
}

fn place(
    tree: &mut Map<String, Value>,
    segments: &[&str],
    value: Value,
) -> Result<(), StoreError> {
    match segments.split_last() {
        Some((last, parents)) => {
            let parent = object_at(tree, parents);
            parent.insert((*last).to_string(), value);
            Ok(())
        }
        None => match value {
            Value::Object(map) => {
                *tree = map;
                Ok(())
            }
            _ => Err(StoreError::Serde("root value must be an object".to_string())),
        },
    }
}

impl StoreGateway for InMemoryStore {
    fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let segments = split(path);
        let tree = self
            .tree
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;

        if segments.is_empty() {
            if tree.is_empty() {
                return Ok(None);
            }
            return Ok(Some(Value::Object(tree.clone())));
        }

        Ok(lookup(&tree, &segments)
            .filter(|value| !value.is_null())
            .cloned())
    }

    fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let segments = split(path);
        let mut tree = self
            .tree
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        place(&mut tree, &segments, value)?;
        self.bump(&segments.join("/"))?;
        Ok(())
    }

    fn update(&self, path: &str, partial: Map<String, Value>) -> Result<(), StoreError> {
        let segments = split(path);
        let mut tree = self
            .tree
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        let target = object_at(&mut tree, &segments);
        for (key, value) in partial {
            target.insert(key, value);
        }
        self.bump(&segments.join("/"))?;
        Ok(())
    }

    fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let segments = split(path);
        let key = format!("{:020}", self.push_seq.fetch_add(1, Ordering::Relaxed));

        let mut tree = self
            .tree
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        let parent = object_at(&mut tree, &segments);
        parent.insert(key.clone(), value);

        let mut child = segments.join("/");
        if !child.is_empty() {
            child.push('/');
        }
        child.push_str(&key);
        self.bump(&child)?;

        Ok(key)
    }

    fn remove(&self, path: &str) -> Result<(), StoreError> {
        let segments = split(path);
        let mut tree = self
            .tree
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;

        match segments.split_last() {
            Some((last, parents)) => {
                if let Some(parent) = existing_object_at(&mut tree, parents) {
                    if parent.remove(*last).is_some() {
                        self.bump(&segments.join("/"))?;
                    }
                }
            }
            None => tree.clear(),
        }

        Ok(())
    }

    fn query_equal(
        &self,
        path: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        let segments = split(path);
        let tree = self
            .tree
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;

        let children = if segments.is_empty() {
            Some(&*tree)
        } else {
            lookup(&tree, &segments).and_then(|node| node.as_object())
        };

        let mut results = Vec::new();
        if let Some(children) = children {
            for (key, child) in children {
                if child.get(field) == Some(value) {
                    results.push((key.clone(), child.clone()));
                }
            }
        }
        Ok(results)
    }

    fn get_versioned(&self, path: &str) -> Result<Versioned<Option<Value>>, StoreError> {
        let segments = split(path);
        let key = segments.join("/");
        let tree = self
            .tree
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        let versions = self
            .versions
            .read()
            .map_err(|_| StoreError::LockPoisoned("versions read"))?;

        let data = if segments.is_empty() {
            if tree.is_empty() {
                None
            } else {
                Some(Value::Object(tree.clone()))
            }
        } else {
            lookup(&tree, &segments)
                .filter(|value| !value.is_null())
                .cloned()
        };

        Ok(Versioned {
            data,
            version: versions.get(&key).copied().unwrap_or(0),
        })
    }

    fn set_versioned(
        &self,
        path: &str,
        value: Value,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let segments = split(path);
        let key = segments.join("/");
        let mut tree = self
            .tree
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        let mut versions = self
            .versions
            .write()
            .map_err(|_| StoreError::LockPoisoned("versions write"))?;

        let actual = versions.get(&key).copied().unwrap_or(0);
        if actual != expected_version {
            return Err(StoreError::Conflict {
                path: key,
                expected: expected_version,
                actual,
            });
        }

        place(&mut tree, &segments, value)?;
        let new_version = actual + 1;
        versions.insert(key, new_version);
        Ok(new_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_and_get() {
        let store = InMemoryStore::new();
        store.set("deck/d1", json!({ "title": "Spanish" })).unwrap();

        let value = store.get("deck/d1").unwrap().unwrap();
        assert_eq!(value, json!({ "title": "Spanish" }));
    }

    #[test]
    fn get_missing_returns_none() {
        let store = InMemoryStore::new();
        assert!(store.get("deck/missing").unwrap().is_none());
    }

    #[test]
    fn get_interior_returns_subtree() {
        let store = InMemoryStore::new();
        store.set("leaderboard/d1/u1", json!({ "correct": 1 })).unwrap();
        store.set("leaderboard/d1/u2", json!({ "correct": 2 })).unwrap();

        let subtree = store.get("leaderboard/d1").unwrap().unwrap();
        assert_eq!(
            subtree,
            json!({ "u1": { "correct": 1 }, "u2": { "correct": 2 } })
        );
    }

    #[test]
    fn children_iterate_in_key_order() {
        let store = InMemoryStore::new();
        store.set("node/b", json!(2)).unwrap();
        store.set("node/a", json!(1)).unwrap();
        store.set("node/c", json!(3)).unwrap();

        let node = store.get("node").unwrap().unwrap();
        let keys: Vec<&String> = node.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn set_replaces_existing_value() {
        let store = InMemoryStore::new();
        store.set("deck/d1", json!({ "title": "Old", "extra": 1 })).unwrap();
        store.set("deck/d1", json!({ "title": "New" })).unwrap();

        assert_eq!(store.get("deck/d1").unwrap().unwrap(), json!({ "title": "New" }));
    }

    #[test]
    fn update_merges_shallow() {
        let store = InMemoryStore::new();
        store
            .set("streaks/u1", json!({ "currentStreak": 2, "lastPracticeDate": "2024-01-01" }))
            .unwrap();

        let mut partial = Map::new();
        partial.insert("currentStreak".to_string(), json!(3));
        store.update("streaks/u1", partial).unwrap();

        assert_eq!(
            store.get("streaks/u1").unwrap().unwrap(),
            json!({ "currentStreak": 3, "lastPracticeDate": "2024-01-01" })
        );
    }

    #[test]
    fn update_creates_missing_path() {
        let store = InMemoryStore::new();
        let mut partial = Map::new();
        partial.insert("correct".to_string(), json!(5));
        store.update("leaderboard/d1/u1", partial).unwrap();

        assert_eq!(
            store.get("leaderboard/d1/u1").unwrap().unwrap(),
            json!({ "correct": 5 })
        );
    }

    #[test]
    fn push_keys_sort_in_generation_order() {
        let store = InMemoryStore::new();
        let first = store.push("deck", json!({ "title": "A" })).unwrap();
        let second = store.push("deck", json!({ "title": "B" })).unwrap();
        assert!(first < second);

        let decks = store.get("deck").unwrap().unwrap();
        let keys: Vec<&String> = decks.as_object().unwrap().keys().collect();
        assert_eq!(keys, [&first, &second]);
    }

    #[test]
    fn remove_deletes_value() {
        let store = InMemoryStore::new();
        store.set("sharing/u1", json!(["d1"])).unwrap();
        store.remove("sharing/u1").unwrap();
        assert!(store.get("sharing/u1").unwrap().is_none());
    }

    #[test]
    fn remove_missing_is_noop() {
        let store = InMemoryStore::new();
        store.remove("sharing/missing").unwrap();
        assert!(store.get("sharing/missing").unwrap().is_none());
    }

    #[test]
    fn null_reads_as_absent() {
        let store = InMemoryStore::new();
        store.set("deck/d1", Value::Null).unwrap();
        assert!(store.get("deck/d1").unwrap().is_none());
    }

    #[test]
    fn query_equal_matches_field() {
        let store = InMemoryStore::new();
        store.set("deck/d1", json!({ "userId": "u1", "title": "A" })).unwrap();
        store.set("deck/d2", json!({ "userId": "u2", "title": "B" })).unwrap();
        store.set("deck/d3", json!({ "userId": "u1", "title": "C" })).unwrap();

        let results = store.query_equal("deck", "userId", &json!("u1")).unwrap();
        let keys: Vec<&str> = results.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["d1", "d3"]);
    }

    #[test]
    fn versioned_roundtrip() {
        let store = InMemoryStore::new();

        let before = store.get_versioned("streaks/u1").unwrap();
        assert!(before.data.is_none());
        assert_eq!(before.version, 0);

        let version = store
            .set_versioned("streaks/u1", json!({ "currentStreak": 1 }), 0)
            .unwrap();
        assert_eq!(version, 1);

        let after = store.get_versioned("streaks/u1").unwrap();
        assert_eq!(after.data.unwrap(), json!({ "currentStreak": 1 }));
        assert_eq!(after.version, 1);
    }

    #[test]
    fn stale_version_write_fails() {
        let store = InMemoryStore::new();
        store.set_versioned("sharing/u1", json!(["d1"]), 0).unwrap();

        let err = store
            .set_versioned("sharing/u1", json!(["d2"]), 0)
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict {
                path: "sharing/u1".to_string(),
                expected: 0,
                actual: 1,
            }
        );
        // the losing write must not have mutated anything
        assert_eq!(store.get("sharing/u1").unwrap().unwrap(), json!(["d1"]));
    }

    #[test]
    fn plain_writes_advance_the_version() {
        let store = InMemoryStore::new();
        store.set("streaks/u1", json!({ "currentStreak": 1 })).unwrap();

        let err = store
            .set_versioned("streaks/u1", json!({ "currentStreak": 2 }), 0)
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { actual: 1, .. }));
    }

    #[test]
    fn clone_shares_storage() {
        let store = InMemoryStore::new();
        let clone = store.clone();

        store.set("deck/d1", json!({ "title": "Shared" })).unwrap();
        assert_eq!(
            clone.get("deck/d1").unwrap().unwrap(),
            json!({ "title": "Shared" })
        );
    }
}
