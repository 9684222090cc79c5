//! Cheap structural fingerprints used by the poller to decide whether a fresh
//! result differs from the one already on screen.

use serde::Serialize;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

/// Whether identifier order matters for change detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdOrder {
    /// Display order matters; a reorder counts as a change.
    Sensitive,
    /// Only the set (multiset) of identifiers matters.
    Insensitive,
}

fn hash_one<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut h = DefaultHasher::new();
    value.hash(&mut h);
    h.finish()
}

impl Fingerprint {
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Fingerprint of an identifier sequence where order matters.
    pub fn ordered<I>(ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Hash,
    {
        let mut h = DefaultHasher::new();
        let mut count = 0usize;
        for id in ids {
            id.hash(&mut h);
            count += 1;
        }
        count.hash(&mut h);
        Fingerprint(h.finish())
    }

    /// Fingerprint of an identifier multiset; reordering does not change it.
    pub fn unordered<I>(ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Hash,
    {
        let mut hashes: Vec<u64> = ids.into_iter().map(|id| hash_one(&id)).collect();
        hashes.sort_unstable();
        Fingerprint::ordered(hashes)
    }

    pub fn of_ids<I>(ids: I, order: IdOrder) -> Self
    where
        I: IntoIterator,
        I::Item: Hash,
    {
        match order {
            IdOrder::Sensitive => Fingerprint::ordered(ids),
            IdOrder::Insensitive => Fingerprint::unordered(ids),
        }
    }

    /// Fingerprint of the whole value through its JSON serialization.
    ///
    /// Map keys serialize in sorted order, so equal values always produce
    /// equal fingerprints.
    pub fn of_json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(s) => Fingerprint(hash_one(&s)),
            Err(e) => {
                log::warn!("[nui][poll] value not serializable for fingerprint: {e}");
                Fingerprint(hash_one(&e.to_string()))
            }
        }
    }

    /// Fingerprint of the `key` field of every record in a JSON collection.
    ///
    /// Accepts a bare array or an object carrying the array under `data`.
    /// Anything else falls back to [`of_json`](Self::of_json).
    pub fn of_json_ids(value: &Value, key: &str, order: IdOrder) -> Self {
        let records = match value {
            Value::Array(items) => Some(items),
            Value::Object(map) => map.get("data").and_then(Value::as_array),
            _ => None,
        };
        match records {
            Some(items) => {
                let ids = items
                    .iter()
                    .map(|item| item.get(key).map(Value::to_string).unwrap_or_default());
                Fingerprint::of_ids(ids, order)
            }
            None => Fingerprint::of_json(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ordered_detects_reorder() {
        assert_eq!(Fingerprint::ordered([1, 2, 3]), Fingerprint::ordered([1, 2, 3]));
        assert_ne!(Fingerprint::ordered([1, 2, 3]), Fingerprint::ordered([3, 2, 1]));
    }

    #[test]
    fn unordered_ignores_reorder() {
        assert_eq!(
            Fingerprint::unordered(["a", "b", "c"]),
            Fingerprint::unordered(["c", "a", "b"])
        );
        assert_ne!(
            Fingerprint::unordered(["a", "b"]),
            Fingerprint::unordered(["a", "b", "b"])
        );
    }

    #[test]
    fn empty_collections_match() {
        let none: [u32; 0] = [];
        assert_eq!(Fingerprint::ordered(none), Fingerprint::ordered(none));
        assert_ne!(Fingerprint::ordered(none), Fingerprint::ordered([0u32]));
    }

    #[test]
    fn json_ids_read_data_wrapper() {
        let bare = json!([{"id": 1, "ping": 20}, {"id": 2, "ping": 31}]);
        let wrapped = json!({"success": true, "data": [{"id": 2, "ping": 99}, {"id": 1}]});

        assert_eq!(
            Fingerprint::of_json_ids(&bare, "id", IdOrder::Insensitive),
            Fingerprint::of_json_ids(&wrapped, "id", IdOrder::Insensitive)
        );
        assert_ne!(
            Fingerprint::of_json_ids(&bare, "id", IdOrder::Sensitive),
            Fingerprint::of_json_ids(&wrapped, "id", IdOrder::Sensitive)
        );
    }

    #[test]
    fn json_fingerprint_tracks_content() {
        let a = json!({"playerCount": 3, "tickRate": 30});
        let b = json!({"tickRate": 30, "playerCount": 3});
        let c = json!({"playerCount": 4, "tickRate": 30});
        assert_eq!(Fingerprint::of_json(&a), Fingerprint::of_json(&b));
        assert_ne!(Fingerprint::of_json(&a), Fingerprint::of_json(&c));
    }
}
