//! L2: the persistent graph value and its mutation/query operations.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use im::{OrdMap, OrdSet};

use crate::constraints::{Action, ConstraintChain, ElementKind, Event, EventView};
use crate::error::{GraphError, GraphResult};
use crate::ids::{CountingIdSeq, EdgeId, IdGenerator, NodeId};
use crate::indexed_map::AttrMap;
use crate::relations::Relations;
use crate::value::{AttrValue, Query, QueryTerm};
use crate::views::{EdgeView, NodeView};

static LINEAGE_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_lineage() -> u64 {
    LINEAGE_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A three-entry rendering of a graph: `{relations, nodes, edges}`. `nodes`
/// and `edges` enumerate views (not raw ids), so a caller holding a record
/// can still do lazy attribute lookups against them. No wire format is
/// promised.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GraphRecord<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    pub relations: Vec<(K, K)>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub nodes: Vec<NodeView<'g, K, V, M>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub edges: Vec<EdgeView<'g, K, V, M>>,
}

/// An immutable, attributed, relation-typed directed graph.
///
/// `K` is the type of attribute keys and relation labels; they share one
/// namespace. `V` is the type of user attribute values. `M` is an opaque
/// metadata type attached to the graph and to views. Every mutating method
/// returns a new `Graph`; `self` remains valid and unchanged.
#[derive(Clone)]
pub struct Graph<K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    pub(crate) nodes_set: OrdSet<NodeId>,
    pub(crate) nodes_map: AttrMap<NodeId, K, AttrValue<V>>,
    pub(crate) edges_map: AttrMap<EdgeId, K, AttrValue<V>>,
    pub(crate) edges_relations: OrdMap<EdgeId, (K, K)>,
    pub(crate) relations: Relations<K>,
    pub(crate) node_ids: Box<dyn IdGenerator>,
    pub(crate) edge_ids: Box<dyn IdGenerator>,
    pub(crate) constraint: ConstraintChain<K, V, M>,
    pub(crate) meta: Option<M>,
    pub(crate) lineage: u64,
}

impl<K, V, M> Default for Graph<K, V, M>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
{
    fn default() -> Self {
        Graph {
            nodes_set: OrdSet::new(),
            nodes_map: AttrMap::new(),
            edges_map: AttrMap::new(),
            edges_relations: OrdMap::new(),
            relations: Relations::new(),
            node_ids: Box::new(CountingIdSeq::nodes()),
            edge_ids: Box::new(CountingIdSeq::edges()),
            constraint: ConstraintChain::new(),
            meta: None,
            lineage: next_lineage(),
        }
    }
}

/// Constructs a `Graph` with non-default id generators, initial metadata, or
/// relations/constraints applied through the builder rather than the flat
/// [`crate::digraph`] factory.
pub struct GraphBuilder<K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    relations: Vec<(K, K)>,
    constraints: Vec<Box<dyn Fn(&Graph<K, V, M>) -> ConstraintChain<K, V, M>>>,
    node_ids: Option<Box<dyn IdGenerator>>,
    edge_ids: Option<Box<dyn IdGenerator>>,
    meta: Option<M>,
}

impl<K, V, M> GraphBuilder<K, V, M>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
{
    pub fn new() -> Self {
        GraphBuilder {
            relations: Vec::new(),
            constraints: Vec::new(),
            node_ids: None,
            edge_ids: None,
            meta: None,
        }
    }

    pub fn with_relation(mut self, r1: K, r2: K) -> Self {
        self.relations.push((r1, r2));
        self
    }

    pub fn with_relations<I: IntoIterator<Item = (K, K)>>(mut self, pairs: I) -> Self {
        self.relations.extend(pairs);
        self
    }

    pub fn with_constraint<C>(mut self, c: C) -> Self
    where
        C: crate::constraints::Constraint<K, V, M> + Clone + Send + Sync + 'static,
    {
        self.constraints
            .push(Box::new(move |g: &Graph<K, V, M>| g.constraint.push(c.clone())));
        self
    }

    pub fn with_node_id_generator(mut self, gen: Box<dyn IdGenerator>) -> Self {
        self.node_ids = Some(gen);
        self
    }

    pub fn with_edge_id_generator(mut self, gen: Box<dyn IdGenerator>) -> Self {
        self.edge_ids = Some(gen);
        self
    }

    pub fn with_meta(mut self, meta: M) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn build(self) -> Graph<K, V, M> {
        let mut g = Graph::default();
        if let Some(gen) = self.node_ids {
            g.node_ids = gen;
        }
        if let Some(gen) = self.edge_ids {
            g.edge_ids = gen;
        }
        for (r1, r2) in self.relations {
            g = g.add_relation(r1, r2);
        }
        for make_chain in self.constraints {
            g.constraint = make_chain(&g);
        }
        g.meta = self.meta;
        g
    }
}

impl<K, V, M> Default for GraphBuilder<K, V, M>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, M> Graph<K, V, M>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> GraphBuilder<K, V, M> {
        GraphBuilder::new()
    }

    /// Opaque per-value identity tag, regenerated on every mutation.
    /// Distinct from `Eq`, which compares content only (see `PartialEq`
    /// impl below).
    pub fn lineage(&self) -> u64 {
        self.lineage
    }

    pub fn meta(&self) -> Option<&M> {
        self.meta.as_ref()
    }

    pub fn with_meta(&self, meta: M) -> Self {
        let mut g = self.clone();
        g.meta = Some(meta);
        g.lineage = next_lineage();
        g
    }

    pub fn node_count(&self) -> usize {
        self.nodes_set.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges_relations.len()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes_set.contains(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges_relations.contains_key(&id)
    }

    pub fn opposite(&self, r: &K) -> Option<K> {
        self.relations.opposite(r).cloned()
    }

    pub fn related_in(&self, r1: &K, r2: &K) -> bool {
        self.relations.related_in(r1, r2)
    }

    /// All known relation opposite-pairs, each appearing once in an
    /// unspecified-but-stable member order.
    pub fn relations(&self) -> Vec<(K, K)> {
        self.relations.pairs()
    }

    pub fn edge_relation_pair(&self, id: EdgeId) -> Option<(K, K)> {
        self.edges_relations.get(&id).cloned()
    }

    fn require_node(&self, v: &NodeView<'_, K, V, M>) -> GraphResult<NodeId, K> {
        if self.nodes_set.contains(&v.id) {
            Ok(v.id)
        } else {
            Err(GraphError::ForeignView)
        }
    }

    fn require_edge(&self, e: &EdgeView<'_, K, V, M>) -> GraphResult<EdgeId, K> {
        if self.edges_relations.contains_key(&e.id) {
            Ok(e.id)
        } else {
            Err(GraphError::ForeignView)
        }
    }

    fn next_node_id(&self) -> GraphResult<(NodeId, Box<dyn IdGenerator>), K> {
        let raw = self.node_ids.peek().ok_or(GraphError::IdSeqExhausted)?;
        if self.nodes_set.contains(&NodeId(raw)) {
            return Err(GraphError::IdSeqCollision);
        }
        Ok((NodeId(raw), self.node_ids.advance()))
    }

    fn next_edge_id(&self) -> GraphResult<(EdgeId, Box<dyn IdGenerator>), K> {
        let raw = self.edge_ids.peek().ok_or(GraphError::IdSeqExhausted)?;
        if self.edges_relations.contains_key(&EdgeId(raw)) {
            return Err(GraphError::IdSeqCollision);
        }
        Ok((EdgeId(raw), self.edge_ids.advance()))
    }

    fn node_view(&self, id: NodeId) -> NodeView<'_, K, V, M> {
        NodeView {
            graph: self,
            id,
            meta: None,
        }
    }

    fn edge_view(&self, id: EdgeId) -> EdgeView<'_, K, V, M> {
        EdgeView {
            graph: self,
            id,
            meta: None,
        }
    }

    fn run_node_constraint(
        &self,
        action: Action,
        old_id: NodeId,
        new_graph: Graph<K, V, M>,
    ) -> Graph<K, V, M> {
        let event = Event {
            kind: ElementKind::Node,
            action,
            old_view: EventView::Node(self.node_view(old_id)),
            new_view: EventView::Node(new_graph.node_view(old_id)),
        };
        self.constraint.run(&event, self, &new_graph)
    }

    fn run_edge_constraint(
        &self,
        action: Action,
        old_id: EdgeId,
        new_graph: Graph<K, V, M>,
    ) -> Graph<K, V, M> {
        let event = Event {
            kind: ElementKind::Edge,
            action,
            old_view: EventView::Edge(self.edge_view(old_id)),
            new_view: EventView::Edge(new_graph.edge_view(old_id)),
        };
        self.constraint.run(&event, self, &new_graph)
    }

    // ---- node mutations -------------------------------------------------

    pub fn add_node(
        &self,
        attrs: impl IntoIterator<Item = (K, V)>,
    ) -> GraphResult<(Graph<K, V, M>, NodeId), K> {
        let attrs: Vec<(K, V)> = attrs.into_iter().collect();
        for (k, _) in &attrs {
            if self.relations.contains(k) {
                return Err(GraphError::AttrIsRelation { key: k.clone() });
            }
        }
        let (id, node_ids) = self.next_node_id()?;

        let mut nodes_map = self.nodes_map.clone();
        for (k, v) in attrs {
            nodes_map = nodes_map.attr_assoc(&id, k, AttrValue::User(v));
        }

        let mut next = self.clone();
        next.nodes_set = self.nodes_set.update(id);
        next.nodes_map = nodes_map;
        next.node_ids = node_ids;
        next.lineage = next_lineage();

        log::debug!("add_node {:?}", id);
        log::trace!("add_node {:?} attrs: {:?}", id, next.nodes_map.attrs_for(&id));
        let result = self.run_node_constraint(Action::Add, id, next);
        Ok((result, id))
    }

    pub fn assoc_node(
        &self,
        v: &NodeView<'_, K, V, M>,
        attrs: impl IntoIterator<Item = (K, V)>,
    ) -> GraphResult<Graph<K, V, M>, K> {
        let id = self.require_node(v)?;
        let attrs: Vec<(K, V)> = attrs.into_iter().collect();
        for (k, _) in &attrs {
            if self.relations.contains(k) {
                return Err(GraphError::AttrIsRelation { key: k.clone() });
            }
        }

        let mut nodes_map = self.nodes_map.clone();
        for (k, val) in attrs {
            nodes_map = nodes_map.attr_assoc(&id, k, AttrValue::User(val));
        }

        let mut next = self.clone();
        next.nodes_map = nodes_map;
        next.lineage = next_lineage();

        log::debug!("assoc_node {:?}", id);
        log::trace!(
            "assoc_node {:?} before: {:?} after: {:?}",
            id,
            self.nodes_map.attrs_for(&id),
            next.nodes_map.attrs_for(&id)
        );
        Ok(self.run_node_constraint(Action::Assoc, id, next))
    }

    pub fn dissoc_node(
        &self,
        v: &NodeView<'_, K, V, M>,
        keys: impl IntoIterator<Item = K>,
    ) -> GraphResult<Graph<K, V, M>, K> {
        let id = self.require_node(v)?;

        let mut nodes_map = self.nodes_map.clone();
        for k in keys {
            nodes_map = nodes_map.attr_dissoc(&id, &k);
        }

        let mut next = self.clone();
        next.nodes_map = nodes_map;
        next.lineage = next_lineage();

        log::debug!("dissoc_node {:?}", id);
        log::trace!(
            "dissoc_node {:?} before: {:?} after: {:?}",
            id,
            self.nodes_map.attrs_for(&id),
            next.nodes_map.attrs_for(&id)
        );
        Ok(self.run_node_constraint(Action::Dissoc, id, next))
    }

    pub fn remove_node(&self, v: &NodeView<'_, K, V, M>) -> GraphResult<Graph<K, V, M>, K> {
        let id = self.require_node(v)?;

        // Remove every incident edge first so no dangling edge is ever
        // observable, then the node itself.
        let mut current = self.clone();
        for e in self.edges_touching_ids(id) {
            let view = current.edge_view(e);
            current = current.remove_edge(&view)?;
        }

        let mut next = current.clone();
        next.nodes_set = current.nodes_set.without(&id);
        next.nodes_map = current.nodes_map.remove_id(&id);
        next.node_ids = current.node_ids.push_back(id.0);
        next.lineage = next_lineage();

        log::debug!("remove_node {:?}", id);
        log::trace!("remove_node {:?} before: {:?}", id, current.nodes_map.attrs_for(&id));
        Ok(self.run_node_constraint(Action::Remove, id, next))
    }

    // ---- edge mutations ---------------------------------------------------

    pub fn add_edge(
        &self,
        attrs: impl IntoIterator<Item = (K, AttrValue<V>)>,
    ) -> GraphResult<(Graph<K, V, M>, EdgeId), K> {
        let attrs: Vec<(K, AttrValue<V>)> = attrs.into_iter().collect();
        let rel_entries: Vec<&(K, AttrValue<V>)> = attrs
            .iter()
            .filter(|(k, _)| self.relations.contains(k))
            .collect();

        if rel_entries.len() != 2 {
            return Err(GraphError::EdgeRelationCount {
                found: rel_entries.len(),
            });
        }
        let (r1, v1) = rel_entries[0];
        let (r2, v2) = rel_entries[1];
        if !self.relations.related_in(r1, r2) {
            return Err(GraphError::EdgeRelationsNotOpposite {
                r1: r1.clone(),
                r2: r2.clone(),
            });
        }
        let n1 = v1.as_node().ok_or(GraphError::EdgeEndpointMissing)?;
        let n2 = v2.as_node().ok_or(GraphError::EdgeEndpointMissing)?;
        if !self.nodes_set.contains(&n1) || !self.nodes_set.contains(&n2) {
            return Err(GraphError::EdgeEndpointMissing);
        }

        let (id, edge_ids) = self.next_edge_id()?;

        let mut edges_map = self.edges_map.clone();
        for (k, v) in attrs {
            edges_map = edges_map.attr_assoc(&id, k, v);
        }
        let edges_relations = self
            .edges_relations
            .update(id, (r1.clone(), r2.clone()));

        let mut next = self.clone();
        next.edges_map = edges_map;
        next.edges_relations = edges_relations;
        next.edge_ids = edge_ids;
        next.lineage = next_lineage();

        log::debug!("add_edge {:?} ({:?}/{:?})", id, r1, r2);
        log::trace!("add_edge {:?} attrs: {:?}", id, next.edges_map.attrs_for(&id));
        let result = self.run_edge_constraint(Action::Add, id, next);
        Ok((result, id))
    }

    pub fn assoc_edge(
        &self,
        e: &EdgeView<'_, K, V, M>,
        attrs: impl IntoIterator<Item = (K, AttrValue<V>)>,
    ) -> GraphResult<Graph<K, V, M>, K> {
        let id = self.require_edge(e)?;
        let (cur_r1, cur_r2) = self
            .edges_relations
            .get(&id)
            .cloned()
            .expect("edge present implies it has a relation pair");

        let attrs: Vec<(K, AttrValue<V>)> = attrs.into_iter().collect();
        let rel_entries: Vec<&(K, AttrValue<V>)> = attrs
            .iter()
            .filter(|(k, _)| self.relations.contains(k))
            .collect();

        match rel_entries.len() {
            0 => {}
            1 => {
                let (k, v) = rel_entries[0];
                if *k != cur_r1 && *k != cur_r2 {
                    return Err(GraphError::EdgeRelationAltered);
                }
                let node = v.as_node().ok_or(GraphError::EdgeEndpointMissing)?;
                if !self.nodes_set.contains(&node) {
                    return Err(GraphError::EdgeEndpointMissing);
                }
            }
            2 => {
                let (k1, v1) = rel_entries[0];
                let (k2, v2) = rel_entries[1];
                let same_pair = (k1 == &cur_r1 && k2 == &cur_r2) || (k1 == &cur_r2 && k2 == &cur_r1);
                if !same_pair {
                    return Err(GraphError::EdgeRelationAltered);
                }
                let n1 = v1.as_node().ok_or(GraphError::EdgeEndpointMissing)?;
                let n2 = v2.as_node().ok_or(GraphError::EdgeEndpointMissing)?;
                if !self.nodes_set.contains(&n1) || !self.nodes_set.contains(&n2) {
                    return Err(GraphError::EdgeEndpointMissing);
                }
            }
            found => return Err(GraphError::EdgeRelationCount { found }),
        }

        let mut edges_map = self.edges_map.clone();
        for (k, v) in attrs {
            edges_map = edges_map.attr_assoc(&id, k, v);
        }

        let mut next = self.clone();
        next.edges_map = edges_map;
        next.lineage = next_lineage();

        log::debug!("assoc_edge {:?}", id);
        log::trace!(
            "assoc_edge {:?} before: {:?} after: {:?}",
            id,
            self.edges_map.attrs_for(&id),
            next.edges_map.attrs_for(&id)
        );
        Ok(self.run_edge_constraint(Action::Assoc, id, next))
    }

    pub fn dissoc_edge(
        &self,
        e: &EdgeView<'_, K, V, M>,
        keys: impl IntoIterator<Item = K>,
    ) -> GraphResult<Graph<K, V, M>, K> {
        let id = self.require_edge(e)?;
        let keys: Vec<K> = keys.into_iter().collect();
        for k in &keys {
            if self.relations.contains(k) {
                return Err(GraphError::EdgeRelationDissociation { key: k.clone() });
            }
        }

        let mut edges_map = self.edges_map.clone();
        for k in keys {
            edges_map = edges_map.attr_dissoc(&id, &k);
        }

        let mut next = self.clone();
        next.edges_map = edges_map;
        next.lineage = next_lineage();

        log::debug!("dissoc_edge {:?}", id);
        log::trace!(
            "dissoc_edge {:?} before: {:?} after: {:?}",
            id,
            self.edges_map.attrs_for(&id),
            next.edges_map.attrs_for(&id)
        );
        Ok(self.run_edge_constraint(Action::Dissoc, id, next))
    }

    pub fn remove_edge(&self, e: &EdgeView<'_, K, V, M>) -> GraphResult<Graph<K, V, M>, K> {
        let id = self.require_edge(e)?;

        let mut next = self.clone();
        next.edges_map = self.edges_map.remove_id(&id);
        next.edges_relations = self.edges_relations.without(&id);
        next.edge_ids = self.edge_ids.push_back(id.0);
        next.lineage = next_lineage();

        log::debug!("remove_edge {:?}", id);
        log::trace!("remove_edge {:?} before: {:?}", id, self.edges_map.attrs_for(&id));
        Ok(self.run_edge_constraint(Action::Remove, id, next))
    }

    // ---- relation management ----------------------------------------------

    pub fn add_relation(&self, r1: K, r2: K) -> Graph<K, V, M> {
        let mut next = self.clone();
        next.relations = self.relations.add_pair(r1.clone(), r2.clone());
        next.lineage = next_lineage();
        log::debug!("add_relation {:?}/{:?}", r1, r2);
        next
    }

    pub fn remove_relation(&self, r1: &K, r2: &K) -> GraphResult<Graph<K, V, M>, K> {
        if !self.relations.related_in(r1, r2) {
            return Err(GraphError::RelationInUse {
                r1: r1.clone(),
                r2: r2.clone(),
            });
        }
        if !self.edges_map.keys_with_attr(r1).is_empty() || !self.edges_map.keys_with_attr(r2).is_empty() {
            return Err(GraphError::RelationInUse {
                r1: r1.clone(),
                r2: r2.clone(),
            });
        }
        let mut next = self.clone();
        next.relations = self.relations.remove_pair(r1, r2);
        next.lineage = next_lineage();
        log::debug!("remove_relation {:?}/{:?}", r1, r2);
        Ok(next)
    }

    // ---- constraints --------------------------------------------------------

    pub fn add_constraint<C>(&self, c: C) -> Graph<K, V, M>
    where
        C: crate::constraints::Constraint<K, V, M> + Send + Sync + 'static,
    {
        let mut next = self.clone();
        next.constraint = self.constraint.push(c);
        next.lineage = next_lineage();
        next
    }

    pub fn reset_constraints(&self) -> Graph<K, V, M> {
        let mut next = self.clone();
        next.constraint = ConstraintChain::reset();
        next.lineage = next_lineage();
        next
    }

    // ---- queries --------------------------------------------------------

    pub fn nodes(&self) -> impl Iterator<Item = NodeView<'_, K, V, M>> + '_ {
        self.nodes_set.iter().map(move |id| self.node_view(*id))
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_, K, V, M>> + '_ {
        self.edges_relations
            .keys()
            .map(move |id| self.edge_view(*id))
    }

    fn resolve_node_term(&self, key: &K, term: &QueryTerm<V>) -> GraphResult<OrdSet<NodeId>, K> {
        if matches!(term, QueryTerm::Nil) {
            return Ok(OrdSet::new());
        }
        if self.relations.contains(key) {
            let opp = self
                .relations
                .opposite(key)
                .cloned()
                .expect("relation key has an opposite");
            return match term {
                // `nodes(g, r=v)` reads "the r-endpoint of every edge whose
                // *opposite* endpoint is v" — e.g. `nodes(g, :parent B)`
                // finds the parent of B, not a node whose own :parent
                // attribute is B.
                QueryTerm::Node(n) => {
                    let edges = self.edges_map.keys_with(&opp, &AttrValue::Node(*n));
                    let mut out = OrdSet::new();
                    for e in edges.iter() {
                        if let Some(node) =
                            self.edges_map.attr_get(e, key).and_then(AttrValue::as_node)
                        {
                            out.insert(node);
                        }
                    }
                    Ok(out)
                }
                QueryTerm::Edge(e) => {
                    let mut out = OrdSet::new();
                    if let Some(node) = self.edges_map.attr_get(e, key).and_then(AttrValue::as_node)
                    {
                        out.insert(node);
                    }
                    Ok(out)
                }
                _ => Err(GraphError::InvalidQueryValue),
            };
        }
        match term {
            QueryTerm::Value(v) => Ok(self.nodes_map.keys_with(key, &AttrValue::User(v.clone()))),
            _ => Ok(OrdSet::new()),
        }
    }

    fn resolve_edge_term(&self, key: &K, term: &QueryTerm<V>) -> GraphResult<OrdSet<EdgeId>, K> {
        if matches!(term, QueryTerm::Nil) {
            return Ok(OrdSet::new());
        }
        if self.relations.contains(key) {
            let opp = self
                .relations
                .opposite(key)
                .cloned()
                .expect("relation key has an opposite");
            return match term {
                QueryTerm::Node(n) => Ok(self.edges_map.keys_with(key, &AttrValue::Node(*n))),
                QueryTerm::Edge(e) => match self.edges_map.attr_get(e, &opp).cloned() {
                    Some(target) => Ok(self.edges_map.keys_with(&opp, &target)),
                    None => Ok(OrdSet::new()),
                },
                _ => Err(GraphError::InvalidQueryValue),
            };
        }
        match term {
            QueryTerm::Value(v) => Ok(self.edges_map.keys_with(key, &AttrValue::User(v.clone()))),
            _ => Ok(OrdSet::new()),
        }
    }

    /// `nodes(graph, query)`: the intersection over the query's keys of the
    /// union over each key's values of matching node ids. An empty query
    /// returns every node.
    pub fn nodes_matching(
        &self,
        query: &Query<K, V>,
    ) -> GraphResult<Vec<NodeView<'_, K, V, M>>, K> {
        if query.is_empty() {
            return Ok(self.nodes().collect());
        }
        let mut acc: Option<OrdSet<NodeId>> = None;
        for (key, terms) in query.iter() {
            let mut union: OrdSet<NodeId> = OrdSet::new();
            for term in terms {
                union = union.union(self.resolve_node_term(key, term)?);
            }
            acc = Some(match acc {
                None => union,
                Some(prev) => prev.intersection(union),
            });
        }
        Ok(acc
            .unwrap_or_default()
            .into_iter()
            .map(|id| self.node_view(id))
            .collect())
    }

    /// `edges(graph, query)`: analogous to [`Graph::nodes_matching`].
    pub fn edges_matching(
        &self,
        query: &Query<K, V>,
    ) -> GraphResult<Vec<EdgeView<'_, K, V, M>>, K> {
        if query.is_empty() {
            return Ok(self.edges().collect());
        }
        let mut acc: Option<OrdSet<EdgeId>> = None;
        for (key, terms) in query.iter() {
            let mut union: OrdSet<EdgeId> = OrdSet::new();
            for term in terms {
                union = union.union(self.resolve_edge_term(key, term)?);
            }
            acc = Some(match acc {
                None => union,
                Some(prev) => prev.intersection(union),
            });
        }
        Ok(acc
            .unwrap_or_default()
            .into_iter()
            .map(|id| self.edge_view(id))
            .collect())
    }

    /// Ids of edges incident to `id` under any known relation label, used by
    /// `remove_node` and by [`crate::ops::edges_touching`].
    pub(crate) fn edges_touching_ids(&self, id: NodeId) -> Vec<EdgeId> {
        let mut out = OrdSet::new();
        for (r1, r2) in self.relations.pairs() {
            out = out.union(self.edges_map.keys_with(&r1, &AttrValue::Node(id)));
            out = out.union(self.edges_map.keys_with(&r2, &AttrValue::Node(id)));
        }
        out.into_iter().collect()
    }

    /// Renders this graph as a three-entry record of relation pairs, node
    /// views, and edge views.
    pub fn to_record(&self) -> GraphRecord<'_, K, V, M> {
        GraphRecord {
            relations: self.relations.pairs(),
            nodes: self.nodes().collect(),
            edges: self.edges().collect(),
        }
    }
}

impl<K, V, M> PartialEq for Graph<K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone + PartialEq,
{
    /// Two graphs are equal iff their node sets, node attr-maps, edge
    /// attr-maps, edge-relations maps, and relation bijections are equal.
    /// The constraint function, id sequences, and metadata do not
    /// participate.
    fn eq(&self, other: &Self) -> bool {
        self.nodes_set == other.nodes_set
            && self.nodes_map == other.nodes_map
            && self.edges_map == other.edges_map
            && self.edges_relations == other.edges_relations
            && self.relations == other.relations
    }
}

impl<K, V, M> Eq for Graph<K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone + Eq,
{
}

impl<K, V, M> fmt::Debug for Graph<K, V, M>
where
    K: Ord + Clone + fmt::Debug,
    V: Ord + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes_set.len())
            .field("edges", &self.edges_relations.len())
            .field("relations", &self.relations)
            .finish()
    }
}
