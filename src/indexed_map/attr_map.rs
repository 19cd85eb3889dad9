//! A persistent `Id -> (Key -> Value)` attribute store with, for every key,
//! a reverse index `Value -> Set<Id>`.

use super::surjection::Surjection;
use im::{OrdMap, OrdSet};
use std::fmt;

/// Stores an attribute map per id, plus one `Surjection<Id, Value>` per
/// attribute key so that `keys_with` is O(1) plus result size.
///
/// An id with no attributes has no entry in the forward map: removing an
/// id's last attribute drops the id from the domain entirely, it is not
/// kept around as an empty record.
#[derive(Clone)]
pub struct AttrMap<Id, Key, Value>
where
    Id: Ord + Clone,
    Key: Ord + Clone,
    Value: Ord + Clone,
{
    forward: OrdMap<Id, OrdMap<Key, Value>>,
    reverse: OrdMap<Key, Surjection<Id, Value>>,
}

impl<Id, Key, Value> Default for AttrMap<Id, Key, Value>
where
    Id: Ord + Clone,
    Key: Ord + Clone,
    Value: Ord + Clone,
{
    fn default() -> Self {
        AttrMap {
            forward: OrdMap::new(),
            reverse: OrdMap::new(),
        }
    }
}

impl<Id, Key, Value> AttrMap<Id, Key, Value>
where
    Id: Ord + Clone,
    Key: Ord + Clone,
    Value: Ord + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr_get(&self, id: &Id, k: &Key) -> Option<&Value> {
        self.forward.get(id).and_then(|attrs| attrs.get(k))
    }

    /// All attributes stored for `id`, or an empty map if it has none.
    pub fn attrs_for(&self, id: &Id) -> OrdMap<Key, Value> {
        self.forward.get(id).cloned().unwrap_or_default()
    }

    pub fn attr_assoc(&self, id: &Id, k: Key, v: Value) -> Self {
        let mut forward = self.forward.clone();
        let mut attrs = forward.get(id).cloned().unwrap_or_default();
        attrs.insert(k.clone(), v.clone());
        forward.insert(id.clone(), attrs);

        let mut reverse = self.reverse.clone();
        let surj = reverse.entry(k).or_insert_with(Surjection::new);
        *surj = surj.assoc(id.clone(), v);

        AttrMap { forward, reverse }
    }

    pub fn attr_dissoc(&self, id: &Id, k: &Key) -> Self {
        let Some(attrs) = self.forward.get(id) else {
            return self.clone();
        };
        if !attrs.contains_key(k) {
            return self.clone();
        }

        let mut forward = self.forward.clone();
        let mut attrs = attrs.clone();
        attrs.remove(k);
        if attrs.is_empty() {
            forward.remove(id);
        } else {
            forward.insert(id.clone(), attrs);
        }

        let mut reverse = self.reverse.clone();
        if let Some(surj) = reverse.get(k) {
            let updated = surj.dissoc_key(id);
            if updated.is_empty() {
                reverse.remove(k);
            } else {
                reverse.insert(k.clone(), updated);
            }
        }

        AttrMap { forward, reverse }
    }

    /// Removes every attribute of `id` (used when an id is deleted outright).
    pub fn remove_id(&self, id: &Id) -> Self {
        let mut result = self.clone();
        for k in self.attrs_for(id).keys().cloned().collect::<Vec<_>>() {
            result = result.attr_dissoc(id, &k);
        }
        result
    }

    /// The set of ids whose attribute `k` equals `v`.
    pub fn keys_with(&self, k: &Key, v: &Value) -> OrdSet<Id> {
        self.reverse
            .get(k)
            .map(|surj| surj.inverse_get(v))
            .unwrap_or_default()
    }

    /// All ids that have any value stored for `k`.
    pub fn keys_with_attr(&self, k: &Key) -> OrdSet<Id> {
        self.reverse
            .get(k)
            .map(|surj| surj.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains_id(&self, id: &Id) -> bool {
        self.forward.contains_key(id)
    }
}

impl<Id, Key, Value> PartialEq for AttrMap<Id, Key, Value>
where
    Id: Ord + Clone,
    Key: Ord + Clone,
    Value: Ord + Clone + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.forward == other.forward
    }
}

impl<Id, Key, Value> Eq for AttrMap<Id, Key, Value>
where
    Id: Ord + Clone,
    Key: Ord + Clone,
    Value: Ord + Clone + Eq,
{
}

impl<Id, Key, Value> fmt::Debug for AttrMap<Id, Key, Value>
where
    Id: Ord + Clone + fmt::Debug,
    Key: Ord + Clone + fmt::Debug,
    Value: Ord + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.forward.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn assoc_then_get() {
        let m: AttrMap<i32, &str, &str> = AttrMap::new();
        let m = m.attr_assoc(&1, "name", "a");
        assert_eq!(m.attr_get(&1, &"name"), Some(&"a"));
    }

    #[test]
    fn keys_with_finds_all_matching_ids() {
        let m: AttrMap<i32, &str, &str> = AttrMap::new();
        let m = m
            .attr_assoc(&1, "colour", "red")
            .attr_assoc(&2, "colour", "red")
            .attr_assoc(&3, "colour", "blue");
        let reds = m.keys_with(&"colour", &"red");
        assert_eq!(reds.len(), 2);
        assert!(reds.contains(&1));
        assert!(reds.contains(&2));
    }

    #[test]
    fn dissoc_last_attribute_drops_id_from_domain() {
        let m: AttrMap<i32, &str, &str> = AttrMap::new().attr_assoc(&1, "name", "a");
        let m = m.attr_dissoc(&1, &"name");
        assert!(!m.contains_id(&1));
        assert_eq!(m.attr_get(&1, &"name"), None);
        assert!(m.keys_with(&"name", &"a").is_empty());
    }

    #[test]
    fn dissoc_of_absent_key_is_noop() {
        let m: AttrMap<i32, &str, &str> = AttrMap::new().attr_assoc(&1, "name", "a");
        let same = m.attr_dissoc(&1, &"other");
        assert_eq!(m, same);
    }

    #[test]
    fn reassoc_moves_reverse_index_bucket() {
        let m: AttrMap<i32, &str, &str> = AttrMap::new().attr_assoc(&1, "colour", "red");
        let m = m.attr_assoc(&1, "colour", "blue");
        assert!(m.keys_with(&"colour", &"red").is_empty());
        assert_eq!(m.keys_with(&"colour", &"blue").len(), 1);
    }

    #[test]
    fn keys_with_attr_reports_presence_regardless_of_value() {
        let m: AttrMap<i32, &str, &str> = AttrMap::new()
            .attr_assoc(&1, "parent", "x")
            .attr_assoc(&2, "parent", "y");
        let ids = m.keys_with_attr(&"parent");
        assert_eq!(ids.len(), 2);
        assert!(m.keys_with_attr(&"child").is_empty());
    }

    #[test]
    fn remove_id_clears_every_attribute() {
        let m: AttrMap<i32, &str, &str> = AttrMap::new()
            .attr_assoc(&1, "a", "1")
            .attr_assoc(&1, "b", "2");
        let m = m.remove_id(&1);
        assert!(!m.contains_id(&1));
        assert!(m.keys_with_attr(&"a").is_empty());
        assert!(m.keys_with_attr(&"b").is_empty());
    }

    #[test]
    fn predecessor_unaffected_by_successor_mutation() {
        let m0: AttrMap<i32, &str, &str> = AttrMap::new();
        let m1 = m0.attr_assoc(&1, "name", "a");
        let _m2 = m1.attr_assoc(&1, "name", "b");
        assert_eq!(m1.attr_get(&1, &"name"), Some(&"a"));
    }

    const KEYS: [&str; 3] = ["a", "b", "c"];

    fn assert_attr_map_invariants(m: &AttrMap<i32, &'static str, i32>) {
        for id in 0..6 {
            for k in KEYS.iter() {
                match m.attr_get(&id, k) {
                    Some(v) => {
                        assert!(m.keys_with(k, v).contains(&id));
                        assert!(m.keys_with_attr(k).contains(&id));
                        assert!(m.contains_id(&id));
                    }
                    None => assert!(!m.keys_with_attr(k).contains(&id)),
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_reverse_indices_match_forward_after_mixed_ops(
            ops in prop::collection::vec((0i32..6, 0usize..3, 0i32..4, any::<bool>()), 1..80),
        ) {
            let mut m: AttrMap<i32, &'static str, i32> = AttrMap::new();
            for (id, key_idx, v, is_assoc) in ops {
                let k = KEYS[key_idx];
                m = if is_assoc { m.attr_assoc(&id, k, v) } else { m.attr_dissoc(&id, &k) };
                assert_attr_map_invariants(&m);
            }
            // An id with no attributes must not linger in the forward domain.
            for id in 0..6 {
                if KEYS.iter().all(|k| m.attr_get(&id, k).is_none()) {
                    prop_assert!(!m.contains_id(&id));
                }
            }
        }
    }
}
