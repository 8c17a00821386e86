use crate::arena::Handle;
use crate::entry::Entry;

/// A struct representing an internal node of a splay tree.
///
/// Nodes are owned by the tree's arena. `left`, `right` and `parent` are handles into that arena;
/// a node without a parent is the root.
pub struct Node<K, V> {
    pub entry: Entry<K, V>,
    pub parent: Option<Handle>,
    pub left: Option<Handle>,
    pub right: Option<Handle>,
}

impl<K, V> Node<K, V> {
    pub fn new(key: K, value: V, parent: Option<Handle>) -> Self {
        Node {
            entry: Entry::new(key, value),
            parent,
            left: None,
            right: None,
        }
    }

    pub fn is_left_child(&self, child: Handle) -> bool {
        self.left == Some(child)
    }
}
