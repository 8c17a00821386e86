//! Self-adjusting binary search tree with the additional property that recently accessed elements
//! are quick to access again.
//!
//! The tree keeps no balance information, so a single operation can take linear time on a
//! degenerate shape. The cost of any sequence of operations is still `O(log n)` amortized per
//! operation, and keys that are accessed repeatedly stay close to the root.

mod map;
mod node;
mod tree;

pub use self::map::{SplayMap, SplayMapIntoIter, SplayMapIter};
