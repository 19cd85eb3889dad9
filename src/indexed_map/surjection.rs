//! A persistent many-to-one `K -> V` mapping with an inverse `V -> Set<K>` index.

use im::{OrdMap, OrdSet};
use std::fmt;

/// A mapping `K -> V` where many keys may share one value, augmented with a
/// reverse index from value to the set of keys that currently map to it.
#[derive(Clone)]
pub struct Surjection<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    forward: OrdMap<K, V>,
    backward: OrdMap<V, OrdSet<K>>,
}

impl<K, V> Default for Surjection<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    fn default() -> Self {
        Surjection {
            forward: OrdMap::new(),
            backward: OrdMap::new(),
        }
    }
}

impl<K, V> Surjection<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `k` with `v`, moving `k` out of its old value's bucket (if
    /// any) and into `v`'s bucket.
    pub fn assoc(&self, k: K, v: V) -> Self {
        let mut forward = self.forward.clone();
        let mut backward = self.backward.clone();

        if let Some(old_v) = forward.get(&k) {
            if old_v == &v {
                return self.clone();
            }
            Self::remove_from_bucket(&mut backward, old_v, &k);
        }

        forward.insert(k.clone(), v.clone());
        backward
            .entry(v)
            .or_insert_with(OrdSet::new)
            .insert(k);

        Surjection { forward, backward }
    }

    /// Removes `k` from the mapping entirely.
    pub fn dissoc_key(&self, k: &K) -> Self {
        match self.forward.get(k) {
            None => self.clone(),
            Some(v) => {
                let mut forward = self.forward.clone();
                let mut backward = self.backward.clone();
                Self::remove_from_bucket(&mut backward, v, k);
                forward.remove(k);
                Surjection { forward, backward }
            }
        }
    }

    fn remove_from_bucket(backward: &mut OrdMap<V, OrdSet<K>>, v: &V, k: &K) {
        let empty_after = if let Some(set) = backward.get_mut(v) {
            set.remove(k);
            set.is_empty()
        } else {
            false
        };
        if empty_after {
            backward.remove(v);
        }
    }

    pub fn get(&self, k: &K) -> Option<&V> {
        self.forward.get(k)
    }

    /// All keys currently mapped to `v`. Empty (not absent) when `v` is
    /// unused.
    pub fn inverse_get(&self, v: &V) -> OrdSet<K> {
        self.backward.get(v).cloned().unwrap_or_default()
    }

    pub fn contains_key(&self, k: &K) -> bool {
        self.forward.contains_key(k)
    }

    /// All keys that have ever been associated with any value (the map's
    /// domain).
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.forward.keys()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.forward.iter()
    }
}

impl<K, V> PartialEq for Surjection<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.forward == other.forward
    }
}

impl<K, V> Eq for Surjection<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone + Eq,
{
}

impl<K, V> fmt::Debug for Surjection<K, V>
where
    K: Ord + Clone + fmt::Debug,
    V: Ord + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.forward.iter()).finish()
    }
}
