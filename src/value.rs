//! The attribute-value wrapper shared by node and edge attr-maps, and the
//! query-term types used to build relation/attribute predicates.

use crate::ids::{EdgeId, NodeId};
use std::fmt;

/// A stored attribute value: either a user-supplied value, or (for the two
/// relation-labeled keys of an edge's attr-map entry) the endpoint `NodeId`.
///
/// Sharing one value type between `nodes_map` and `edges_map` lets both use
/// the same `AttrMap` implementation and reverse-index type; node attributes
/// only ever populate the `User` case.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrValue<V> {
    User(V),
    Node(NodeId),
}

impl<V> AttrValue<V> {
    pub fn as_user(&self) -> Option<&V> {
        match self {
            AttrValue::User(v) => Some(v),
            AttrValue::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            AttrValue::Node(id) => Some(*id),
            AttrValue::User(_) => None,
        }
    }

    pub fn into_user(self) -> Option<V> {
        match self {
            AttrValue::User(v) => Some(v),
            AttrValue::Node(_) => None,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for AttrValue<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::User(v) => fmt::Debug::fmt(v, f),
            AttrValue::Node(id) => fmt::Debug::fmt(id, f),
        }
    }
}

/// One term of a query value sequence: a plain attribute value, or a view
/// identity (node or edge) used when the queried key is a relation label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryTerm<V> {
    Value(V),
    Node(NodeId),
    Edge(EdgeId),
    /// Matches nothing; contributes the empty set to a union.
    Nil,
}

impl<V> From<V> for QueryTerm<V> {
    fn from(v: V) -> Self {
        QueryTerm::Value(v)
    }
}

impl<V> From<NodeId> for QueryTerm<V> {
    fn from(id: NodeId) -> Self {
        QueryTerm::Node(id)
    }
}

impl<V> From<EdgeId> for QueryTerm<V> {
    fn from(id: EdgeId) -> Self {
        QueryTerm::Edge(id)
    }
}

impl<V> From<Option<V>> for QueryTerm<V> {
    fn from(v: Option<V>) -> Self {
        match v {
            Some(v) => QueryTerm::Value(v),
            None => QueryTerm::Nil,
        }
    }
}

/// An ordered association from key to a small sequence of query terms: for
/// each key, a node/edge matches if any of its terms matches.
#[derive(Clone, Debug, Default)]
pub struct Query<K, V> {
    pub(crate) pairs: Vec<(K, Vec<QueryTerm<V>>)>,
}

impl<K, V> Query<K, V> {
    pub fn new() -> Self {
        Query { pairs: Vec::new() }
    }

    /// Adds a key with a single query term.
    pub fn with<T: Into<QueryTerm<V>>>(mut self, key: K, value: T) -> Self {
        self.pairs.push((key, vec![value.into()]));
        self
    }

    /// Adds a key with several query terms (their matches are unioned).
    pub fn with_many<T: Into<QueryTerm<V>>, I: IntoIterator<Item = T>>(
        mut self,
        key: K,
        values: I,
    ) -> Self {
        self.pairs
            .push((key, values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[QueryTerm<V>])> {
        self.pairs.iter().map(|(k, vs)| (k, vs.as_slice()))
    }

    /// Builds a query from a flattened `[(key, value), ...]` sequence, an
    /// alternative to building one term-sequence-at-a-time via `with`.
    pub fn from_pairs<T, I>(pairs: I) -> Self
    where
        T: Into<QueryTerm<V>>,
        I: IntoIterator<Item = (K, T)>,
    {
        let mut q = Query::new();
        for (k, v) in pairs {
            q = q.with(k, v);
        }
        q
    }
}

/// An ergonomic builder for the flexible `(K, AttrValue<V>)` iterator that
/// [`crate::graph::Graph::add_edge`] and [`crate::graph::Graph::assoc_edge`]
/// accept, so callers don't have to wrap endpoints in [`AttrValue::Node`] by
/// hand.
#[derive(Clone, Debug, Default)]
pub struct EdgeAttrs<K, V> {
    pairs: Vec<(K, AttrValue<V>)>,
}

impl<K, V> EdgeAttrs<K, V> {
    pub fn new() -> Self {
        EdgeAttrs { pairs: Vec::new() }
    }

    /// Adds a relation-labeled endpoint.
    pub fn endpoint(mut self, key: K, node: NodeId) -> Self {
        self.pairs.push((key, AttrValue::Node(node)));
        self
    }

    /// Adds a plain user attribute.
    pub fn attr(mut self, key: K, value: V) -> Self {
        self.pairs.push((key, AttrValue::User(value)));
        self
    }
}

impl<K, V> IntoIterator for EdgeAttrs<K, V> {
    type Item = (K, AttrValue<V>);
    type IntoIter = std::vec::IntoIter<(K, AttrValue<V>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_value_user_and_node_accessors() {
        let v: AttrValue<&str> = AttrValue::User("x");
        assert_eq!(v.as_user(), Some(&"x"));
        assert_eq!(v.as_node(), None);

        let n: AttrValue<&str> = AttrValue::Node(NodeId(4));
        assert_eq!(n.as_node(), Some(NodeId(4)));
        assert_eq!(n.as_user(), None);
    }

    #[test]
    fn query_builds_ordered_pairs() {
        let q: Query<&str, &str> = Query::new().with("colour", "red").with_many(
            "size",
            vec!["big", "small"],
        );
        let collected: Vec<_> = q.iter().map(|(k, v)| (*k, v.len())).collect();
        assert_eq!(collected, vec![("colour", 1), ("size", 2)]);
    }

    #[test]
    fn edge_attrs_builds_endpoint_and_plain_pairs() {
        let attrs: EdgeAttrs<&str, &str> = EdgeAttrs::new()
            .endpoint("parent", NodeId(0))
            .endpoint("child", NodeId(2))
            .attr("since", "1990");
        let pairs: Vec<_> = attrs.into_iter().collect();
        assert_eq!(pairs[0], ("parent", AttrValue::Node(NodeId(0))));
        assert_eq!(pairs[1], ("child", AttrValue::Node(NodeId(2))));
        assert_eq!(pairs[2], ("since", AttrValue::User("1990")));
    }
}
