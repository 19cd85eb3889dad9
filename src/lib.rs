//! An immutable, attributed, relation-typed directed graph.
//!
//! Every mutating operation on a [`Graph`] returns a new graph value that
//! shares structure with its predecessor; the original value is never
//! altered and remains valid to use. Node and edge attributes are indexed
//! both forward (by id) and in reverse (by attribute value), so
//! [`Graph::nodes_matching`]/[`Graph::edges_matching`] resolve in time
//! proportional to the result size rather than the graph size.
//!
//! A **relation** is a pair of opposite attribute keys (e.g. `parent` and
//! `child`) reserved for edge endpoints: every edge carries exactly one such
//! pair, letting a caller query "nodes whose `parent` is X" and "nodes whose
//! `child` is Y" with the same mechanism used for ordinary attributes.
//!
//! A composable chain of [`constraints::Constraint`]s observes every atomic
//! change as a before/after [`constraints::Event`] and may veto or
//! transform the result, which is how invariants beyond the built-in
//! validation errors get enforced.
//!
//! ```
//! use digraph::{digraph, EdgeAttrs};
//!
//! let g: digraph::Graph<&str, &str, ()> = digraph(vec![("parent", "child")], vec![]);
//! let (g, alice) = g.add_node([("name", "alice")]).unwrap();
//! let (g, bob) = g.add_node([("name", "bob")]).unwrap();
//! let (g, _edge) = g
//!     .add_edge(EdgeAttrs::new().endpoint("parent", alice).endpoint("child", bob))
//!     .unwrap();
//!
//! let parents_of_bob = g.nodes_matching(&digraph::Query::new().with("parent", bob)).unwrap();
//! assert_eq!(parents_of_bob.len(), 1);
//! assert_eq!(parents_of_bob[0].id(), alice);
//! ```

mod constraints;
mod error;
mod graph;
mod ids;
mod indexed_map;
mod ops;
mod relations;
mod value;
mod views;

pub use constraints::{Action, Constraint, ElementKind, Event, EventView};
pub use error::{GraphError, GraphResult};
pub use graph::{Graph, GraphBuilder, GraphRecord};
pub use ids::{CountingIdSeq, EdgeId, IdGenerator, NodeId};
pub use ops::{
    add_cycle, add_edges, add_nodes, add_path, assoc_all, assoc_edges, assoc_nodes, dissoc_edges,
    dissoc_nodes, edges_touching, nodes_away, AllUpdate,
};
pub use value::{AttrValue, EdgeAttrs, Query, QueryTerm};
pub use views::{EdgeView, NodeView};

use std::fmt;
use std::hash::Hash;

/// Builds a graph with `relations` applied in order (each via
/// [`Graph::add_relation`]), then `constraints` composed in order onto the
/// identity constraint. Equivalent to `Graph::builder()` with only the
/// arguments this flat factory covers; reach for [`GraphBuilder`] directly
/// when a non-default id generator or initial metadata is needed too.
pub fn digraph<K, V, M>(
    relations: Vec<(K, K)>,
    constraints: Vec<Box<dyn Constraint<K, V, M> + Send + Sync>>,
) -> Graph<K, V, M>
where
    K: Ord + Clone + Hash + fmt::Debug + 'static,
    V: Ord + Clone + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
{
    let mut builder = Graph::builder();
    for (r1, r2) in relations {
        builder = builder.with_relation(r1, r2);
    }
    let mut g = builder.build();
    for c in constraints {
        g = g.add_constraint(c);
    }
    g
}
