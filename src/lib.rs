//! Ordered maps backed by self-balancing binary search trees.
//!
//! Two interchangeable engines implement the `OrderedMap` trait:
//!
//! - `avl_tree::AvlMap`: a height-balanced tree. Every insertion and removal restores the
//!   invariant that sibling subtrees differ in height by at most one, so every operation is
//!   `O(log n)` in the worst case and lookups never modify the tree.
//! - `splay_tree::SplayMap`: a self-adjusting tree. Every successful access moves the touched
//!   entry to the root, which makes repeated accesses to the same keys cheap. Operations are
//!   `O(log n)` amortized.
//!
//! # Examples
//!
//! ```
//! use bst_maps::{OrderedMap, Strategy};
//!
//! let mut map: Box<dyn OrderedMap<i32, String>> = Strategy::Splay.build();
//! map.insert(2, "Two".to_string());
//! map.insert(1, "One".to_string());
//! assert_eq!(map.to_string(), "{1=One, 2=Two}");
//! ```

#[macro_use]
extern crate serde_derive;

mod entry;
mod error;
mod ordered_map;
pub mod arena;
pub mod avl_tree;
pub mod splay_tree;

pub use self::error::{Error, Result};
pub use self::ordered_map::{OrderedMap, Strategy};
