//! L4 composite operations: derived helpers built strictly on top of the L2
//! [`Graph`] API and L3 views, never reaching into L1 internals directly.

use std::fmt;
use std::hash::Hash;

use itertools::Itertools;

use crate::error::GraphResult;
use crate::graph::Graph;
use crate::ids::NodeId;
use crate::value::{AttrValue, Query, QueryTerm};
use crate::views::{EdgeView, NodeView};

/// Edges incident to `v` under any known relation label.
pub fn edges_touching<'g, K, V, M>(
    graph: &'g Graph<K, V, M>,
    v: &NodeView<'_, K, V, M>,
) -> Vec<EdgeView<'g, K, V, M>>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
{
    graph
        .edges_touching_ids(v.id())
        .into_iter()
        .filter_map(|id| graph.edges().find(|e| e.id() == id))
        .collect()
}

/// Adds `k-1` edges chaining `nodes[0] -> nodes[1] -> ... -> nodes[k-1]`;
/// edge `i` carries `{r1: nodes[i], r2: nodes[i+1]}` plus `attrs`. Requires
/// `nodes.len() >= 2`; a shorter slice adds nothing and returns `graph`
/// unchanged.
pub fn add_path<K, V, M>(
    graph: &Graph<K, V, M>,
    relation: (K, K),
    nodes: &[NodeId],
    attrs: &[(K, V)],
) -> GraphResult<Graph<K, V, M>, K>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
{
    let (r1, r2) = relation;
    let mut current = graph.clone();
    for pair in nodes.windows(2) {
        let (n1, n2) = (pair[0], pair[1]);
        let mut edge_attrs: Vec<(K, AttrValue<V>)> =
            vec![(r1.clone(), AttrValue::Node(n1)), (r2.clone(), AttrValue::Node(n2))];
        edge_attrs.extend(attrs.iter().cloned().map(|(k, v)| (k, AttrValue::User(v))));
        let (next, _) = current.add_edge(edge_attrs)?;
        current = next;
    }
    Ok(current)
}

/// Same as [`add_path`] plus a closing edge from the last node back to the
/// first.
pub fn add_cycle<K, V, M>(
    graph: &Graph<K, V, M>,
    relation: (K, K),
    nodes: &[NodeId],
    attrs: &[(K, V)],
) -> GraphResult<Graph<K, V, M>, K>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
{
    let mut current = add_path(graph, relation.clone(), nodes, attrs)?;
    if let (Some(&first), Some(&last)) = (nodes.first(), nodes.last()) {
        if nodes.len() >= 2 {
            let (r1, r2) = relation;
            let mut edge_attrs: Vec<(K, AttrValue<V>)> = vec![
                (r1, AttrValue::Node(last)),
                (r2, AttrValue::Node(first)),
            ];
            edge_attrs.extend(attrs.iter().cloned().map(|(k, v)| (k, AttrValue::User(v))));
            let (next, _) = current.add_edge(edge_attrs)?;
            current = next;
        }
    }
    Ok(current)
}

/// Nodes reached by exactly `d` hops along `r` from the starting set `from`.
/// A negative `d` reverses the relation to its opposite and flips the sign;
/// `d == 0` returns `from` verbatim.
pub fn nodes_away<K, V, M>(
    graph: &Graph<K, V, M>,
    d: i64,
    r: &K,
    from: &[NodeId],
) -> GraphResult<Vec<NodeId>, K>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
{
    if d == 0 {
        return Ok(from.to_vec());
    }
    let (hop_relation, hops) = if d < 0 {
        (graph.opposite(r).unwrap_or_else(|| r.clone()), -d)
    } else {
        (r.clone(), d)
    };
    // `nodes(g, key=k, value=x)` resolves to "the k-endpoint of edges whose
    // *opposite* endpoint is x" (see `Graph::resolve_node_term`), so moving
    // one hop along `hop_relation` from `x` means querying on its opposite.
    let opp = graph
        .opposite(&hop_relation)
        .unwrap_or_else(|| hop_relation.clone());

    let mut frontier: std::collections::BTreeSet<NodeId> = from.iter().cloned().collect();
    for _ in 0..hops {
        let mut next = std::collections::BTreeSet::new();
        for id in &frontier {
            let query: Query<K, V> = Query::new().with(opp.clone(), QueryTerm::Node(*id));
            for view in graph.nodes_matching(&query)? {
                next.insert(view.id());
            }
        }
        frontier = next;
    }
    Ok(frontier.into_iter().collect())
}

/// Adds one node per combination of the cartesian product of `attrs`' value
/// sequences, e.g. `add_nodes(g, [(:colour, [:red,:blue]), (:size,
/// [:big,:small])])` adds four nodes. Returns the final graph and the ids in
/// product order.
pub fn add_nodes<K, V, M>(
    graph: &Graph<K, V, M>,
    attrs: Vec<(K, Vec<V>)>,
) -> GraphResult<(Graph<K, V, M>, Vec<NodeId>), K>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
{
    let keys: Vec<K> = attrs.iter().map(|(k, _)| k.clone()).collect();
    let combos = attrs
        .into_iter()
        .map(|(_, vs)| vs.into_iter())
        .multi_cartesian_product();

    let mut current = graph.clone();
    let mut ids = Vec::new();
    for combo in combos {
        let pairs: Vec<(K, V)> = keys.iter().cloned().zip(combo).collect();
        let (next, id) = current.add_node(pairs)?;
        current = next;
        ids.push(id);
    }
    Ok((current, ids))
}

/// Adds one edge per combination of the cartesian product of `attrs`' value
/// sequences, analogous to [`add_nodes`]. Relation-labeled keys carry a
/// single endpoint value (not a sequence) and are repeated on every
/// combination; only plain attribute keys may supply a value sequence.
pub fn add_edges<K, V, M>(
    graph: &Graph<K, V, M>,
    endpoints: Vec<(K, NodeId)>,
    attrs: Vec<(K, Vec<V>)>,
) -> GraphResult<(Graph<K, V, M>, Vec<crate::ids::EdgeId>), K>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
{
    let keys: Vec<K> = attrs.iter().map(|(k, _)| k.clone()).collect();
    let combos = attrs
        .into_iter()
        .map(|(_, vs)| vs.into_iter())
        .multi_cartesian_product();

    let mut current = graph.clone();
    let mut ids = Vec::new();
    for combo in combos {
        let mut pairs: Vec<(K, AttrValue<V>)> = endpoints
            .iter()
            .cloned()
            .map(|(k, n)| (k, AttrValue::Node(n)))
            .collect();
        pairs.extend(keys.iter().cloned().zip(combo).map(|(k, v)| (k, AttrValue::User(v))));
        let (next, id) = current.add_edge(pairs)?;
        current = next;
        ids.push(id);
    }
    Ok((current, ids))
}

/// Left-folds [`Graph::assoc_node`] over `(view, attrs)` pairs, short-
/// circuiting and returning the first error encountered.
pub fn assoc_nodes<'g, K, V, M, I>(graph: &Graph<K, V, M>, updates: I) -> GraphResult<Graph<K, V, M>, K>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
    I: IntoIterator<Item = (NodeView<'g, K, V, M>, Vec<(K, V)>)>,
{
    let mut current = graph.clone();
    for (view, attrs) in updates {
        current = current.assoc_node(&view, attrs)?;
    }
    Ok(current)
}

pub fn dissoc_nodes<'g, K, V, M, I>(graph: &Graph<K, V, M>, updates: I) -> GraphResult<Graph<K, V, M>, K>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
    I: IntoIterator<Item = (NodeView<'g, K, V, M>, Vec<K>)>,
{
    let mut current = graph.clone();
    for (view, keys) in updates {
        current = current.dissoc_node(&view, keys)?;
    }
    Ok(current)
}

pub fn assoc_edges<'g, K, V, M, I>(graph: &Graph<K, V, M>, updates: I) -> GraphResult<Graph<K, V, M>, K>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
    I: IntoIterator<Item = (EdgeView<'g, K, V, M>, Vec<(K, AttrValue<V>)>)>,
{
    let mut current = graph.clone();
    for (view, attrs) in updates {
        current = current.assoc_edge(&view, attrs)?;
    }
    Ok(current)
}

pub fn dissoc_edges<'g, K, V, M, I>(graph: &Graph<K, V, M>, updates: I) -> GraphResult<Graph<K, V, M>, K>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
    I: IntoIterator<Item = (EdgeView<'g, K, V, M>, Vec<K>)>,
{
    let mut current = graph.clone();
    for (view, keys) in updates {
        current = current.dissoc_edge(&view, keys)?;
    }
    Ok(current)
}

/// One element of an [`assoc_all`] batch: either a node assoc or an edge
/// assoc.
pub enum AllUpdate<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    Node(NodeView<'g, K, V, M>, Vec<(K, V)>),
    Edge(EdgeView<'g, K, V, M>, Vec<(K, AttrValue<V>)>),
}

/// Applies a heterogeneous batch of node and edge assoc operations in
/// sequence, short-circuiting on the first error.
pub fn assoc_all<'g, K, V, M, I>(graph: &Graph<K, V, M>, updates: I) -> GraphResult<Graph<K, V, M>, K>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
    I: IntoIterator<Item = AllUpdate<'g, K, V, M>>,
{
    let mut current = graph.clone();
    for update in updates {
        current = match update {
            AllUpdate::Node(view, attrs) => current.assoc_node(&view, attrs)?,
            AllUpdate::Edge(view, attrs) => current.assoc_edge(&view, attrs)?,
        };
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    fn fixture() -> (Graph<&'static str, &'static str, ()>, NodeId, NodeId, NodeId) {
        let g: Graph<&str, &str, ()> = Graph::builder().with_relation("parent", "child").build();
        let (g, a) = g.add_node([("name", "a")]).unwrap();
        let (g, b) = g.add_node([("name", "b")]).unwrap();
        let (g, c) = g.add_node([("name", "c")]).unwrap();
        (g, a, b, c)
    }

    #[test]
    fn add_path_chains_nodes() {
        let (g, a, b, c) = fixture();
        let g = add_path(&g, ("parent", "child"), &[a, b, c], &[]).unwrap();
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn add_cycle_closes_the_loop() {
        let (g, a, b, c) = fixture();
        let g = add_cycle(&g, ("parent", "child"), &[a, b, c], &[]).unwrap();
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn nodes_away_zero_hops_is_identity() {
        let (g, a, _b, _c) = fixture();
        let away = nodes_away(&g, 0, &"parent", &[a]).unwrap();
        assert_eq!(away, vec![a]);
    }

    #[test]
    fn nodes_away_one_hop_follows_relation() {
        let (g, a, b, _c) = fixture();
        let g = add_path(&g, ("parent", "child"), &[a, b], &[]).unwrap();
        let away = nodes_away(&g, 1, &"parent", &[a]).unwrap();
        assert_eq!(away, vec![b]);
    }

    #[test]
    fn add_nodes_is_cartesian_product() {
        let g: Graph<&str, &str, ()> = Graph::new();
        let (g, ids) = add_nodes(
            &g,
            vec![
                ("colour", vec!["red", "blue"]),
                ("size", vec!["big", "small"]),
            ],
        )
        .unwrap();
        assert_eq!(ids.len(), 4);
        assert_eq!(g.node_count(), 4);
    }

    #[test]
    fn edges_touching_finds_incident_edge() {
        let (g, a, b, _c) = fixture();
        let g = add_path(&g, ("parent", "child"), &[a, b], &[]).unwrap();
        let view = g.nodes().find(|n| n.id() == a).unwrap();
        assert_eq!(edges_touching(&g, &view).len(), 1);
    }
}
