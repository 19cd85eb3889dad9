//! A persistent 1-1 `K <-> V` mapping with O(1) inverse lookup.

use im::OrdMap;
use std::fmt;

/// A 1-1 mapping between `K` and `V`. Associating a pair removes any existing
/// pair that collides with it on either side, so the two directions always
/// agree.
#[derive(Clone)]
pub struct Bijection<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    forward: OrdMap<K, V>,
    backward: OrdMap<V, K>,
}

impl<K, V> Default for Bijection<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    fn default() -> Self {
        Bijection {
            forward: OrdMap::new(),
            backward: OrdMap::new(),
        }
    }
}

impl<K, V> Bijection<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `k` with `v`, removing any pre-existing pair that shares
    /// either side with the new one.
    pub fn assoc(&self, k: K, v: V) -> Self {
        let mut forward = self.forward.clone();
        let mut backward = self.backward.clone();

        if let Some(old_v) = forward.get(&k) {
            backward.remove(old_v);
        }
        if let Some(old_k) = backward.get(&v) {
            forward.remove(old_k);
        }

        forward.insert(k.clone(), v.clone());
        backward.insert(v, k);

        Bijection { forward, backward }
    }

    /// Removes the pair keyed by `k`, if any.
    pub fn dissoc_key(&self, k: &K) -> Self {
        match self.forward.get(k) {
            None => self.clone(),
            Some(v) => {
                let mut forward = self.forward.clone();
                let mut backward = self.backward.clone();
                backward.remove(v);
                forward.remove(k);
                Bijection { forward, backward }
            }
        }
    }

    /// Removes the pair keyed by `v` on the inverse side, if any.
    pub fn dissoc_val(&self, v: &V) -> Self {
        match self.backward.get(v) {
            None => self.clone(),
            Some(k) => {
                let mut forward = self.forward.clone();
                let mut backward = self.backward.clone();
                forward.remove(k);
                backward.remove(v);
                Bijection { forward, backward }
            }
        }
    }

    pub fn get(&self, k: &K) -> Option<&V> {
        self.forward.get(k)
    }

    pub fn inverse_get(&self, v: &V) -> Option<&K> {
        self.backward.get(v)
    }

    /// The `V -> K` view of this bijection.
    pub fn inverse(&self) -> Bijection<V, K> {
        Bijection {
            forward: self.backward.clone(),
            backward: self.forward.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn contains_key(&self, k: &K) -> bool {
        self.forward.contains_key(k)
    }

    pub fn contains_val(&self, v: &V) -> bool {
        self.backward.contains_key(v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.forward.iter()
    }
}

impl<K, V> PartialEq for Bijection<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.forward == other.forward
    }
}

impl<K, V> Eq for Bijection<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone + Eq,
{
}

impl<K, V> fmt::Debug for Bijection<K, V>
where
    K: Ord + Clone + fmt::Debug,
    V: Ord + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.forward.iter()).finish()
    }
}
