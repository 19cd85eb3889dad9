//! L3: ephemeral node/edge view handles returned from queries.

use crate::graph::Graph;
use crate::ids::{EdgeId, NodeId};
use crate::value::AttrValue;
use std::fmt;

/// A short-lived handle `{graph, NodeId}`. Behaves as a lazy mapping from
/// attribute key to value by looking up the graph's `nodes_map` on demand;
/// equality is structural over the graph's lineage tag and the id, not over
/// graph content, so a view from one mutation's result is never confused
/// with an equal-looking view from a different lineage point.
pub struct NodeView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    pub(crate) graph: &'g Graph<K, V, M>,
    pub(crate) id: NodeId,
    pub(crate) meta: Option<M>,
}

impl<'g, K, V, M> NodeView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn graph(&self) -> &'g Graph<K, V, M> {
        self.graph
    }

    pub fn meta(&self) -> Option<&M> {
        self.meta.as_ref()
    }

    pub fn with_meta(mut self, meta: M) -> Self {
        self.meta = Some(meta);
        self
    }

    /// True if this node still exists in its graph (it always does for a
    /// freshly-constructed view; the accessor exists for symmetry with
    /// [`EdgeView::exists`] and for views held across further mutation).
    pub fn exists(&self) -> bool
    where
        K: std::hash::Hash + fmt::Debug,
        V: std::hash::Hash + fmt::Debug,
    {
        self.graph.contains_node(self.id)
    }

    pub fn get(&self, k: &K) -> Option<&V>
    where
        K: std::hash::Hash,
        V: std::hash::Hash,
    {
        self.graph
            .nodes_map
            .attr_get(&self.id, k)
            .and_then(AttrValue::as_user)
    }
}

impl<'g, K, V, M> Clone for NodeView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
    M: Clone,
{
    fn clone(&self) -> Self {
        NodeView {
            graph: self.graph,
            id: self.id,
            meta: self.meta.clone(),
        }
    }
}

impl<'g, K, V, M> PartialEq for NodeView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        self.graph.lineage() == other.graph.lineage() && self.id == other.id
    }
}

impl<'g, K, V, M> Eq for NodeView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
}

impl<'g, K, V, M> fmt::Debug for NodeView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeView({:?})", self.id)
    }
}

/// A short-lived handle `{graph, EdgeId}`. For a relation-labeled key,
/// [`EdgeView::endpoint`] returns the endpoint's [`NodeView`] rather than a
/// raw [`NodeId`].
pub struct EdgeView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    pub(crate) graph: &'g Graph<K, V, M>,
    pub(crate) id: EdgeId,
    pub(crate) meta: Option<M>,
}

impl<'g, K, V, M> EdgeView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn graph(&self) -> &'g Graph<K, V, M> {
        self.graph
    }

    pub fn meta(&self) -> Option<&M> {
        self.meta.as_ref()
    }

    pub fn with_meta(mut self, meta: M) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn exists(&self) -> bool
    where
        K: std::hash::Hash + fmt::Debug,
        V: std::hash::Hash + fmt::Debug,
    {
        self.graph.contains_edge(self.id)
    }

    /// The edge's relation pair, in whatever order `edges_relations` stored
    /// them.
    pub fn relations(&self) -> Option<(K, K)>
    where
        K: std::hash::Hash + fmt::Debug,
        V: std::hash::Hash + fmt::Debug,
    {
        self.graph.edge_relation_pair(self.id)
    }

    /// A plain user attribute (not a relation-labeled endpoint) of this edge.
    pub fn get(&self, k: &K) -> Option<&V>
    where
        K: std::hash::Hash,
        V: std::hash::Hash,
    {
        self.graph
            .edges_map
            .attr_get(&self.id, k)
            .and_then(AttrValue::as_user)
    }

    /// The endpoint reached from this edge along relation label `k`, as a
    /// [`NodeView`] rather than a raw id.
    pub fn endpoint(&self, k: &K) -> Option<NodeView<'g, K, V, M>>
    where
        K: std::hash::Hash,
        V: std::hash::Hash,
    {
        let id = self.graph.edges_map.attr_get(&self.id, k)?.as_node()?;
        Some(NodeView {
            graph: self.graph,
            id,
            meta: None,
        })
    }
}

impl<'g, K, V, M> Clone for EdgeView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
    M: Clone,
{
    fn clone(&self) -> Self {
        EdgeView {
            graph: self.graph,
            id: self.id,
            meta: self.meta.clone(),
        }
    }
}

impl<'g, K, V, M> PartialEq for EdgeView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        self.graph.lineage() == other.graph.lineage() && self.id == other.id
    }
}

impl<'g, K, V, M> Eq for EdgeView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
}

impl<'g, K, V, M> fmt::Debug for EdgeView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeView({:?})", self.id)
    }
}
