//! The constraint pipeline: every atomic change is observed as a
//! before/after pair and may be vetoed or transformed.

use crate::graph::Graph;
use crate::views::{EdgeView, NodeView};
use std::fmt;
use std::sync::Arc;

/// Which side of the node/edge distinction a mutation affected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Node,
    Edge,
}

/// Which kind of atomic change happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Add,
    Remove,
    Assoc,
    Dissoc,
}

/// Either side of an affected entity: a node view or an edge view, depending
/// on `Event::kind`. Bundled instead of four loose arguments.
pub enum EventView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    Node(NodeView<'g, K, V, M>),
    Edge(EdgeView<'g, K, V, M>),
}

impl<'g, K, V, M> Clone for EventView<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
    M: Clone,
{
    fn clone(&self) -> Self {
        match self {
            EventView::Node(v) => EventView::Node(v.clone()),
            EventView::Edge(e) => EventView::Edge(e.clone()),
        }
    }
}

/// The bundle of arguments a constraint observes for one atomic change:
/// what kind of entity, what action, and its view before and after. Either
/// view may denote a nonexistent entity (reflecting `Add` or `Remove`).
pub struct Event<'g, K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    pub kind: ElementKind,
    pub action: Action,
    pub old_view: EventView<'g, K, V, M>,
    pub new_view: EventView<'g, K, V, M>,
}

/// A constraint observes an [`Event`] plus the pre- and post-mutation graphs
/// and returns the graph value the mutation should actually produce. The
/// identity constraint returns `new_graph` unchanged (cloned).
pub trait Constraint<K, V, M>
where
    K: Ord + Clone + std::hash::Hash + fmt::Debug,
    V: Ord + Clone + std::hash::Hash + fmt::Debug,
    M: Clone,
{
    fn apply(
        &self,
        event: &Event<'_, K, V, M>,
        old_graph: &Graph<K, V, M>,
        new_graph: &Graph<K, V, M>,
    ) -> Graph<K, V, M>;
}

impl<F, K, V, M> Constraint<K, V, M> for F
where
    F: Fn(&Event<'_, K, V, M>, &Graph<K, V, M>, &Graph<K, V, M>) -> Graph<K, V, M>,
    K: Ord + Clone + std::hash::Hash + fmt::Debug,
    V: Ord + Clone + std::hash::Hash + fmt::Debug,
    M: Clone,
{
    fn apply(
        &self,
        event: &Event<'_, K, V, M>,
        old_graph: &Graph<K, V, M>,
        new_graph: &Graph<K, V, M>,
    ) -> Graph<K, V, M> {
        (self)(event, old_graph, new_graph)
    }
}

impl<K, V, M> Constraint<K, V, M> for Box<dyn Constraint<K, V, M> + Send + Sync>
where
    K: Ord + Clone + std::hash::Hash + fmt::Debug,
    V: Ord + Clone + std::hash::Hash + fmt::Debug,
    M: Clone,
{
    fn apply(
        &self,
        event: &Event<'_, K, V, M>,
        old_graph: &Graph<K, V, M>,
        new_graph: &Graph<K, V, M>,
    ) -> Graph<K, V, M> {
        (**self).apply(event, old_graph, new_graph)
    }
}

type BoxedConstraintFn<K, V, M> =
    dyn Fn(&Event<'_, K, V, M>, &Graph<K, V, M>, &Graph<K, V, M>) -> Graph<K, V, M> + Send + Sync;

/// The composed constraint: an ordered chain of constraint objects, folded
/// left to right so that a later-added constraint observes the output of
/// every constraint added before it. An empty chain is the identity
/// constraint. Shared via `Arc` rather than `Rc` so that a `Graph` stays
/// `Send + Sync` whenever its type parameters are.
#[derive(Clone)]
pub struct ConstraintChain<K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    chain: Arc<Vec<Arc<BoxedConstraintFn<K, V, M>>>>,
}

impl<K, V, M> Default for ConstraintChain<K, V, M>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    fn default() -> Self {
        ConstraintChain {
            chain: Arc::new(Vec::new()),
        }
    }
}

impl<K, V, M> ConstraintChain<K, V, M>
where
    K: Ord + Clone + std::hash::Hash + fmt::Debug + 'static,
    V: Ord + Clone + std::hash::Hash + fmt::Debug + 'static,
    M: Clone + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `c` to the chain: it will observe the output of every
    /// constraint currently in the chain.
    pub fn push<C>(&self, c: C) -> Self
    where
        C: Constraint<K, V, M> + Send + Sync + 'static,
    {
        let mut chain = (*self.chain).clone();
        chain.push(Arc::new(move |event, old_graph, new_graph| {
            c.apply(event, old_graph, new_graph)
        }));
        ConstraintChain {
            chain: Arc::new(chain),
        }
    }

    /// Replaces the chain with the identity constraint (an empty chain).
    pub fn reset() -> Self {
        Self::default()
    }

    /// Folds the chain over `(event, old_graph, new_graph)`, returning the
    /// final graph value.
    pub fn run(
        &self,
        event: &Event<'_, K, V, M>,
        old_graph: &Graph<K, V, M>,
        new_graph: &Graph<K, V, M>,
    ) -> Graph<K, V, M> {
        let mut current = new_graph.clone();
        for c in self.chain.iter() {
            let before = current.clone();
            current = c(event, old_graph, &current);
            if current != before {
                log::trace!("constraint changed its input graph");
            } else {
                log::trace!("constraint passed its input graph through unchanged");
            }
        }
        current
    }
}
