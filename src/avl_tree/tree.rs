use crate::avl_tree::node::Node;
use crate::entry::Entry;
use log::trace;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

pub type Tree<K, V> = Option<Box<Node<K, V>>>;

pub fn height<K, V>(tree: &Tree<K, V>) -> usize {
    match tree {
        None => 0,
        Some(ref node) => node.height,
    }
}

fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let mut child = match node.right.take() {
        Some(child) => child,
        None => unreachable!(),
    };
    node.right = child.left.take();
    node.update();
    child.left = Some(node);
    child.update();
    child
}

fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let mut child = match node.left.take() {
        Some(child) => child,
        None => unreachable!(),
    };
    node.left = child.right.take();
    node.update();
    child.right = Some(node);
    child.update();
    child
}

// Restores the height invariant at the root of `tree`, assuming both subtrees already satisfy it
// and differ in height by at most two.
fn balance<K, V>(tree: &mut Tree<K, V>) {
    let mut node = match tree.take() {
        Some(node) => node,
        None => return,
    };

    node.update();

    if node.balance() > 1 {
        if let Some(child) = node.left.take() {
            if child.balance() < 0 {
                trace!("avl rebalance: left-right case at height {}", node.height);
                node.left = Some(rotate_left(child));
            } else {
                node.left = Some(child);
            }
        }
        trace!("avl rebalance: rotating right at height {}", node.height);
        node = rotate_right(node);
    } else if node.balance() < -1 {
        if let Some(child) = node.right.take() {
            if child.balance() > 0 {
                trace!("avl rebalance: right-left case at height {}", node.height);
                node.right = Some(rotate_right(child));
            } else {
                node.right = Some(child);
            }
        }
        trace!("avl rebalance: rotating left at height {}", node.height);
        node = rotate_left(node);
    }

    *tree = Some(node);
}

// precondition: `tree` is non-empty
fn take_min<K, V>(tree: &mut Tree<K, V>) -> Entry<K, V> {
    let descend = match tree {
        Some(ref node) => node.left.is_some(),
        None => unreachable!(),
    };

    if descend {
        let entry = match tree {
            Some(ref mut node) => take_min(&mut node.left),
            None => unreachable!(),
        };
        balance(tree);
        return entry;
    }

    match tree.take() {
        Some(node) => {
            let Node { entry, right, .. } = *node;
            *tree = right;
            entry
        },
        None => unreachable!(),
    }
}

/// Inserts `key` with `value`. Returns the previous value if the key was already present, in
/// which case the shape of the tree is untouched.
pub fn insert<K, V>(tree: &mut Tree<K, V>, key: K, value: V) -> Option<V>
where
    K: Ord,
{
    let ret = match tree {
        Some(ref mut node) => match key.cmp(&node.entry.key) {
            Ordering::Less => insert(&mut node.left, key, value),
            Ordering::Greater => insert(&mut node.right, key, value),
            Ordering::Equal => return Some(mem::replace(&mut node.entry.value, value)),
        },
        None => {
            *tree = Some(Box::new(Node::new(key, value)));
            return None;
        },
    };

    if ret.is_none() {
        balance(tree);
    }
    ret
}

/// Removes `key` from the tree and returns its value.
///
/// A node with two children is not unlinked: its entry is overwritten by the entry of its
/// in-order successor, and the successor's node is removed from the right subtree instead.
pub fn remove<K, V, Q>(tree: &mut Tree<K, V>, key: &Q) -> Option<V>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let ret = match tree {
        Some(ref mut node) => match key.cmp(node.entry.key.borrow()) {
            Ordering::Less => remove(&mut node.left, key),
            Ordering::Greater => remove(&mut node.right, key),
            Ordering::Equal => {
                if node.left.is_some() && node.right.is_some() {
                    let successor = take_min(&mut node.right);
                    Some(mem::replace(&mut node.entry, successor).value)
                } else {
                    None
                }
            },
        },
        None => return None,
    };

    let ret = match ret {
        Some(value) => Some(value),
        None => {
            // The key lives at this node and it has at most one child.
            let is_target = match tree {
                Some(ref node) => key.cmp(node.entry.key.borrow()) == Ordering::Equal,
                None => false,
            };
            if !is_target {
                return None;
            }
            match tree.take() {
                Some(node) => {
                    let Node {
                        entry, left, right, ..
                    } = *node;
                    *tree = left.or(right);
                    Some(entry.value)
                },
                None => unreachable!(),
            }
        },
    };

    balance(tree);
    ret
}

pub fn get<'a, K, V, Q>(tree: &'a Tree<K, V>, key: &Q) -> Option<&'a Entry<K, V>>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut curr = tree;
    while let Some(ref node) = curr {
        match key.cmp(node.entry.key.borrow()) {
            Ordering::Less => curr = &node.left,
            Ordering::Greater => curr = &node.right,
            Ordering::Equal => return Some(&node.entry),
        }
    }
    None
}

pub fn get_mut<'a, K, V, Q>(tree: &'a mut Tree<K, V>, key: &Q) -> Option<&'a mut Entry<K, V>>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut curr = tree.as_mut();
    while let Some(node) = curr {
        match key.cmp(node.entry.key.borrow()) {
            Ordering::Less => curr = node.left.as_mut(),
            Ordering::Greater => curr = node.right.as_mut(),
            Ordering::Equal => return Some(&mut node.entry),
        }
    }
    None
}

/// Returns the entry with the greatest key strictly less than `key`.
pub fn lower<'a, K, V, Q>(tree: &'a Tree<K, V>, key: &Q) -> Option<&'a Entry<K, V>>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut curr = tree;
    let mut ret = None;
    while let Some(ref node) = curr {
        if key.cmp(node.entry.key.borrow()) == Ordering::Greater {
            ret = Some(&node.entry);
            curr = &node.right;
        } else {
            curr = &node.left;
        }
    }
    ret
}

/// Returns the entry with the greatest key less than or equal to `key`.
pub fn floor<'a, K, V, Q>(tree: &'a Tree<K, V>, key: &Q) -> Option<&'a Entry<K, V>>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut curr = tree;
    let mut ret = None;
    while let Some(ref node) = curr {
        match key.cmp(node.entry.key.borrow()) {
            Ordering::Less => curr = &node.left,
            Ordering::Greater => {
                ret = Some(&node.entry);
                curr = &node.right;
            },
            Ordering::Equal => return Some(&node.entry),
        }
    }
    ret
}

/// Returns the entry with the least key greater than or equal to `key`.
pub fn ceil<'a, K, V, Q>(tree: &'a Tree<K, V>, key: &Q) -> Option<&'a Entry<K, V>>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut curr = tree;
    let mut ret = None;
    while let Some(ref node) = curr {
        match key.cmp(node.entry.key.borrow()) {
            Ordering::Greater => curr = &node.right,
            Ordering::Less => {
                ret = Some(&node.entry);
                curr = &node.left;
            },
            Ordering::Equal => return Some(&node.entry),
        }
    }
    ret
}

/// Returns the entry with the least key strictly greater than `key`.
pub fn higher<'a, K, V, Q>(tree: &'a Tree<K, V>, key: &Q) -> Option<&'a Entry<K, V>>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut curr = tree;
    let mut ret = None;
    while let Some(ref node) = curr {
        if key.cmp(node.entry.key.borrow()) == Ordering::Less {
            ret = Some(&node.entry);
            curr = &node.left;
        } else {
            curr = &node.right;
        }
    }
    ret
}

pub fn min<K, V>(tree: &Tree<K, V>) -> Option<&Entry<K, V>> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref left_node) = curr.left {
            curr = left_node;
        }
        &curr.entry
    })
}

pub fn max<K, V>(tree: &Tree<K, V>) -> Option<&Entry<K, V>> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref right_node) = curr.right {
            curr = right_node;
        }
        &curr.entry
    })
}

pub fn contains_value<K, V>(tree: &Tree<K, V>, value: &V) -> bool
where
    V: PartialEq,
{
    match tree {
        Some(ref node) => {
            node.entry.value == *value
                || contains_value(&node.left, value)
                || contains_value(&node.right, value)
        },
        None => false,
    }
}

/// Appends the entries with keys in `[from, to)` to `out` in ascending order, skipping subtrees
/// that lie entirely outside the bounds. A missing bound is unbounded.
pub fn collect_range<'a, K, V>(
    tree: &'a Tree<K, V>,
    from: Option<&K>,
    to: Option<&K>,
    out: &mut Vec<&'a Entry<K, V>>,
) where
    K: Ord,
{
    let node = match tree {
        Some(ref node) => node,
        None => return,
    };

    if from.map_or(false, |from| node.entry.key < *from) {
        collect_range(&node.right, from, to, out);
    } else if to.map_or(false, |to| node.entry.key >= *to) {
        collect_range(&node.left, from, to, out);
    } else {
        collect_range(&node.left, from, to, out);
        out.push(&node.entry);
        collect_range(&node.right, from, to, out);
    }
}

#[cfg(test)]
mod tests {
    use super::{height, insert, remove, Tree};

    // Returns the height of the subtree after asserting that every stored height is accurate and
    // every balance factor is within one.
    fn check_balanced<K, V>(tree: &Tree<K, V>) -> usize {
        match tree {
            None => 0,
            Some(ref node) => {
                let left = check_balanced(&node.left);
                let right = check_balanced(&node.right);
                assert!((left as isize - right as isize).abs() <= 1);
                assert_eq!(node.height, left.max(right) + 1);
                node.height
            },
        }
    }

    fn in_order<K: Copy, V>(tree: &Tree<K, V>, out: &mut Vec<K>) {
        if let Some(ref node) = tree {
            in_order(&node.left, out);
            out.push(node.entry.key);
            in_order(&node.right, out);
        }
    }

    fn keys(tree: &Tree<i32, &'static str>) -> Vec<i32> {
        let mut ret = Vec::new();
        in_order(tree, &mut ret);
        ret
    }

    #[test]
    fn test_insert_keeps_balance() {
        let mut tree = None;
        for (key, value) in [(5, "Five"), (3, "Three"), (7, "Seven"), (2, "Two"), (4, "Four"), (6, "Six"), (8, "Eight")].iter() {
            insert(&mut tree, *key, *value);
            check_balanced(&tree);
        }
        assert_eq!(keys(&tree), vec![2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(height(&tree), 3);
    }

    #[test]
    fn test_ascending_insert_rotates() {
        let mut tree = None;
        for key in 0..1024 {
            insert(&mut tree, key, "");
            check_balanced(&tree);
        }
        assert_eq!(height(&tree), 11);
    }

    #[test]
    fn test_insert_left_right_case() {
        let mut tree = None;
        insert(&mut tree, 3, "");
        insert(&mut tree, 1, "");
        insert(&mut tree, 2, "");
        check_balanced(&tree);
        assert_eq!(tree.as_ref().map(|node| node.entry.key), Some(2));
    }

    #[test]
    fn test_insert_right_left_case() {
        let mut tree = None;
        insert(&mut tree, 1, "");
        insert(&mut tree, 3, "");
        insert(&mut tree, 2, "");
        check_balanced(&tree);
        assert_eq!(tree.as_ref().map(|node| node.entry.key), Some(2));
    }

    #[test]
    fn test_remove_two_children_uses_successor() {
        let mut tree = None;
        for key in [5, 3, 7, 2, 4, 6, 8].iter() {
            insert(&mut tree, *key, "");
        }
        let root_addr = tree.as_ref().map(|node| &**node as *const _);

        assert_eq!(remove(&mut tree, &5), Some(""));
        check_balanced(&tree);

        // the root node object survives and now carries the successor's entry
        assert_eq!(tree.as_ref().map(|node| &**node as *const _), root_addr);
        assert_eq!(tree.as_ref().map(|node| node.entry.key), Some(6));
        assert_eq!(keys(&tree), vec![2, 3, 4, 6, 7, 8]);
    }

    #[test]
    fn test_remove_rebalances_successor_path() {
        let mut tree = None;
        for key in [8, 4, 12, 2, 6, 10, 14, 1, 3, 5, 7, 9, 11, 13, 15, 16].iter() {
            insert(&mut tree, *key, "");
        }
        for key in [8, 9, 10, 4, 1].iter() {
            assert_eq!(remove(&mut tree, key), Some(""));
            check_balanced(&tree);
        }
        assert_eq!(keys(&tree), vec![2, 3, 5, 6, 7, 11, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn test_remove_missing() {
        let mut tree = None;
        assert_eq!(remove(&mut tree, &1), None);
        insert(&mut tree, 2, "");
        assert_eq!(remove(&mut tree, &1), None);
        assert_eq!(remove(&mut tree, &3), None);
        assert_eq!(keys(&tree), vec![2]);
    }

    #[test]
    fn test_remove_all_keeps_balance() {
        let mut tree = None;
        for key in 0..256 {
            insert(&mut tree, (key * 37) % 256, "");
        }
        for key in 0..256 {
            assert_eq!(remove(&mut tree, &((key * 101) % 256)), Some(""));
            check_balanced(&tree);
        }
        assert!(tree.is_none());
    }
}
