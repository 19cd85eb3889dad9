//! The public error type: one variant per failure kind a mutation or query
//! can raise, each carrying enough data to explain the failure.

use thiserror::Error;

/// Every way a public operation on this crate's graph can fail.
///
/// No variant wraps a foreign error type: every failure is constructed
/// directly at its validation site, there is no I/O and nothing is ever
/// propagated here via `?` from another crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError<K: std::fmt::Debug> {
    /// A node attribute key coincides with a known relation label.
    #[error("attribute key {key:?} is a known relation label")]
    AttrIsRelation { key: K },

    /// An edge's attributes named a number of relation-labeled keys other
    /// than two.
    #[error("expected exactly two relation-labeled keys, found {found}")]
    EdgeRelationCount { found: usize },

    /// The two relation labels supplied for a new edge are not each
    /// other's opposite.
    #[error("relation labels {r1:?} and {r2:?} are not opposites")]
    EdgeRelationsNotOpposite { r1: K, r2: K },

    /// An `assoc_edge` would change the edge's relation pair.
    #[error("assoc_edge may not alter an edge's relation pair")]
    EdgeRelationAltered,

    /// An edge endpoint does not name a node of this graph.
    #[error("edge endpoint is not a node of this graph")]
    EdgeEndpointMissing,

    /// A `dissoc_edge` tried to remove a relation-labeled key.
    #[error("dissoc_edge may not remove relation key {key:?}")]
    EdgeRelationDissociation { key: K },

    /// A view's graph lineage does not match the graph the operation was
    /// called on.
    #[error("view belongs to a different graph lineage")]
    ForeignView,

    /// `remove_relation` was called on a pair still in use by some edge.
    #[error("relation {r1:?}/{r2:?} is still used by at least one edge")]
    RelationInUse { r1: K, r2: K },

    /// A relation-keyed query value was neither a node view nor an edge
    /// view.
    #[error("relation-keyed query value must be a node or edge view")]
    InvalidQueryValue,

    /// The id generator produced no head.
    #[error("id sequence is exhausted")]
    IdSeqExhausted,

    /// The id generator produced an id already live in this graph.
    #[error("id generator produced a colliding id")]
    IdSeqCollision,
}

pub type GraphResult<T, K> = Result<T, GraphError<K>>;
