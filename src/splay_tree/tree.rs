use crate::arena::{Arena, Handle};
use crate::entry::Entry;
use crate::splay_tree::node::Node;
use log::trace;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

/// The node storage and root of a splay tree.
pub struct Tree<K, V> {
    pub arena: Arena<Node<K, V>>,
    pub root: Option<Handle>,
}

impl<K, V> Tree<K, V> {
    pub fn new(chunk_size: usize) -> Self {
        Tree {
            arena: Arena::new(chunk_size),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    pub fn entry(&self, handle: Handle) -> &Entry<K, V> {
        &self.arena[handle].entry
    }

    pub fn entry_mut(&mut self, handle: Handle) -> &mut Entry<K, V> {
        &mut self.arena[handle].entry
    }

    // Points the link that referenced `old` at `new` instead.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let parent = &mut self.arena[parent];
                if parent.is_left_child(old) {
                    parent.left = new;
                } else {
                    parent.right = new;
                }
            },
        }
    }

    fn rotate_left(&mut self, handle: Handle) {
        let child = match self.arena[handle].right {
            Some(child) => child,
            None => unreachable!(),
        };
        let inner = self.arena[child].left;
        let parent = self.arena[handle].parent;

        self.arena[handle].right = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(handle);
        }
        self.arena[child].parent = parent;
        self.replace_child(parent, handle, Some(child));
        self.arena[child].left = Some(handle);
        self.arena[handle].parent = Some(child);
    }

    fn rotate_right(&mut self, handle: Handle) {
        let child = match self.arena[handle].left {
            Some(child) => child,
            None => unreachable!(),
        };
        let inner = self.arena[child].right;
        let parent = self.arena[handle].parent;

        self.arena[handle].left = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(handle);
        }
        self.arena[child].parent = parent;
        self.replace_child(parent, handle, Some(child));
        self.arena[child].right = Some(handle);
        self.arena[handle].parent = Some(child);
    }

    /// Rotates `handle` up until it has no parent. If `handle` started inside a detached subtree,
    /// it becomes the root of that subtree and `self.root` is overwritten with it.
    pub fn splay(&mut self, handle: Handle) {
        let mut steps = 0;
        while let Some(parent) = self.arena[handle].parent {
            let is_left = self.arena[parent].is_left_child(handle);
            match self.arena[parent].parent {
                // zig
                None => {
                    if is_left {
                        self.rotate_right(parent);
                    } else {
                        self.rotate_left(parent);
                    }
                },
                Some(grandparent) => {
                    let parent_is_left = self.arena[grandparent].is_left_child(parent);
                    match (is_left, parent_is_left) {
                        // zig-zig
                        (true, true) => {
                            self.rotate_right(grandparent);
                            self.rotate_right(parent);
                        },
                        (false, false) => {
                            self.rotate_left(grandparent);
                            self.rotate_left(parent);
                        },
                        // zig-zag
                        (true, false) => {
                            self.rotate_right(parent);
                            self.rotate_left(grandparent);
                        },
                        (false, true) => {
                            self.rotate_left(parent);
                            self.rotate_right(grandparent);
                        },
                    }
                },
            }
            steps += 1;
        }
        self.root = Some(handle);
        trace!("splayed node to the root in {} steps", steps);
    }

    pub fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => curr = node.left,
                Ordering::Greater => curr = node.right,
                Ordering::Equal => return Some(handle),
            }
        }
        None
    }

    /// Inserts `key` with `value` and splays the touched node to the root. Returns the previous
    /// value if the key was already present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        let mut parent = None;
        let mut is_left = false;
        let mut curr = self.root;
        while let Some(handle) = curr {
            parent = Some(handle);
            let node = &mut self.arena[handle];
            match key.cmp(&node.entry.key) {
                Ordering::Less => {
                    is_left = true;
                    curr = node.left;
                },
                Ordering::Greater => {
                    is_left = false;
                    curr = node.right;
                },
                Ordering::Equal => {
                    let ret = mem::replace(&mut node.entry.value, value);
                    self.splay(handle);
                    return Some(ret);
                },
            }
        }

        let handle = self.arena.allocate(Node::new(key, value, parent));
        match parent {
            None => self.root = Some(handle),
            Some(parent) if is_left => self.arena[parent].left = Some(handle),
            Some(parent) => self.arena[parent].right = Some(handle),
        }
        self.splay(handle);
        None
    }

    /// Removes `key` from the tree and returns its value.
    ///
    /// The target is splayed to the root and unlinked. If it had a left subtree, the maximum of
    /// that subtree is splayed to its top and adopts the old right subtree as the new root.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let handle = self.find(key)?;
        self.splay(handle);

        let Node {
            entry, left, right, ..
        } = self.arena.free(handle)?;

        match left {
            None => {
                self.root = right;
                if let Some(right) = right {
                    self.arena[right].parent = None;
                }
            },
            Some(left) => {
                self.arena[left].parent = None;
                self.root = Some(left);
                let predecessor = self.max_from(left);
                self.splay(predecessor);
                trace!("joining subtrees under the predecessor of the removed key");
                self.arena[predecessor].right = right;
                if let Some(right) = right {
                    self.arena[right].parent = Some(predecessor);
                }
            },
        }
        Some(entry.value)
    }

    fn min_from(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.arena[handle].left {
            handle = left;
        }
        handle
    }

    fn max_from(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.arena[handle].right {
            handle = right;
        }
        handle
    }

    pub fn min(&self) -> Option<Handle> {
        self.root.map(|root| self.min_from(root))
    }

    pub fn max(&self) -> Option<Handle> {
        self.root.map(|root| self.max_from(root))
    }

    // Descends from the root and returns the last node at which `keep` held. `keep` decides
    // whether a node's key is a candidate, and candidates send the search right.
    fn bound<F>(&self, mut keep: F, descend_right_on_keep: bool) -> Option<&Entry<K, V>>
    where
        F: FnMut(&K) -> bool,
    {
        let mut curr = self.root;
        let mut ret = None;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            let candidate = keep(&node.entry.key);
            if candidate {
                ret = Some(&node.entry);
            }
            curr = if candidate == descend_right_on_keep {
                node.right
            } else {
                node.left
            };
        }
        ret
    }

    /// Returns the entry with the greatest key strictly less than `key`.
    pub fn lower<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.bound(|node_key| key.cmp(node_key.borrow()) == Ordering::Greater, true)
    }

    /// Returns the entry with the greatest key less than or equal to `key`.
    pub fn floor<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.bound(|node_key| key.cmp(node_key.borrow()) != Ordering::Less, true)
    }

    /// Returns the entry with the least key greater than or equal to `key`.
    pub fn ceil<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.bound(|node_key| key.cmp(node_key.borrow()) != Ordering::Greater, false)
    }

    /// Returns the entry with the least key strictly greater than `key`.
    pub fn higher<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.bound(|node_key| key.cmp(node_key.borrow()) == Ordering::Less, false)
    }

    /// Appends the entries with keys in `[from, to)` to `out` in ascending order, skipping
    /// subtrees that lie entirely outside the bounds. A missing bound is unbounded.
    pub fn collect_range<'a>(
        &'a self,
        from: Option<&K>,
        to: Option<&K>,
        out: &mut Vec<&'a Entry<K, V>>,
    ) where
        K: Ord,
    {
        let mut stack = Vec::new();
        let mut curr = self.root;
        loop {
            while let Some(handle) = curr {
                let node = &self.arena[handle];
                if from.map_or(false, |from| node.entry.key < *from) {
                    curr = node.right;
                } else {
                    stack.push(handle);
                    curr = node.left;
                }
            }

            let node = match stack.pop() {
                Some(handle) => &self.arena[handle],
                None => return,
            };
            if to.map_or(false, |to| node.entry.key >= *to) {
                return;
            }
            out.push(&node.entry);
            curr = node.right;
        }
    }
}
