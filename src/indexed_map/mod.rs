//! L1: the indexed-map primitives the rest of the crate is built from.

pub mod attr_map;
pub mod bijection;
pub mod surjection;

pub use attr_map::AttrMap;
pub use bijection::Bijection;
pub use surjection::Surjection;
