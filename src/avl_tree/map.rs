use crate::avl_tree::node::Node;
use crate::avl_tree::tree;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::ordered_map::{self, MapVisitor, OrderedMap};
use log::debug;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;
use std::ops::Index;

/// An ordered map implemented using an avl tree.
///
/// An avl tree is a self-balancing binary search tree that maintains the invariant that the
/// heights of the two child subtrees of any node differ by at most one. Every insertion and
/// removal rebalances the path back to the root before returning, so lookups never restructure
/// the tree and run in `O(log n)`.
///
/// # Examples
///
/// ```
/// use bst_maps::avl_tree::AvlMap;
///
/// let mut map = AvlMap::new();
/// map.insert(0, "zero");
/// map.insert(3, "three");
///
/// assert_eq!(map[&0], "zero");
/// assert_eq!(map.get(&1), None);
/// assert_eq!(map.len(), 2);
///
/// assert_eq!(map.first_key(), Ok(&0));
/// assert_eq!(map.ceiling_key(&2), Some(&3));
///
/// assert_eq!(map.remove(&0), Some("zero"));
/// assert_eq!(map.remove(&1), None);
/// assert_eq!(map.to_string(), "{3=three}");
/// ```
#[derive(Clone)]
pub struct AvlMap<K, V> {
    tree: tree::Tree<K, V>,
    len: usize,
}

impl<K, V> AvlMap<K, V> {
    /// Constructs a new, empty `AvlMap<K, V>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let map: AvlMap<i32, String> = AvlMap::new();
    /// ```
    pub fn new() -> Self {
        AvlMap { tree: None, len: 0 }
    }

    /// Inserts a key-value pair into the map. If the key already exists in the map, its value is
    /// replaced and the previous value is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// assert_eq!(map.insert(1, 1), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// assert_eq!(map.insert(1, 2), Some(1));
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        let ret = tree::insert(&mut self.tree, key, value);
        if ret.is_none() {
            self.len += 1;
        }
        ret
    }

    /// Removes a key-value pair from the map. If the key exists in the map, it will return the
    /// associated value. Otherwise it will return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.remove(&1), Some(1));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ret = tree::remove(&mut self.tree, key);
        if ret.is_some() {
            self.len -= 1;
        }
        ret
    }

    /// Checks if a key exists in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert!(!map.contains_key(&0));
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Checks if any key in the map is associated with `value`. This visits every entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, "one");
    /// assert!(map.contains_value(&"one"));
    /// assert!(!map.contains_value(&"two"));
    /// ```
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        tree::contains_value(&self.tree, value)
    }

    /// Returns an immutable reference to the value associated with a particular key. It will
    /// return `None` if the key does not exist in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.get(&0), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        tree::get(&self.tree, key).map(|entry| &entry.value)
    }

    /// Returns a mutable reference to the value associated with a particular key. Returns `None`
    /// if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// *map.get_mut(&1).unwrap() = 2;
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        tree::get_mut(&mut self.tree, key).map(|entry| &mut entry.value)
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the height of the underlying tree. An empty map has height zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let map: AvlMap<u32, u32> = (0..7).map(|key| (key, key)).collect();
    /// assert_eq!(map.height(), 3);
    /// ```
    pub fn height(&self) -> usize {
        tree::height(&self.tree)
    }

    /// Clears the map, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    /// map.clear();
    /// assert_eq!(map.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        debug!("clearing avl map with {} entries", self.len);
        self.tree = None;
        self.len = 0;
    }

    /// Returns the minimum key of the map, or `Error::EmptyCollection` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    /// use bst_maps::Error;
    ///
    /// let mut map = AvlMap::new();
    /// assert_eq!(map.first_key(), Err(Error::EmptyCollection));
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.first_key(), Ok(&1));
    /// ```
    pub fn first_key(&self) -> Result<&K> {
        tree::min(&self.tree)
            .map(|entry| &entry.key)
            .ok_or(Error::EmptyCollection)
    }

    /// Returns the maximum key of the map, or `Error::EmptyCollection` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.last_key(), Ok(&3));
    /// ```
    pub fn last_key(&self) -> Result<&K> {
        tree::max(&self.tree)
            .map(|entry| &entry.key)
            .ok_or(Error::EmptyCollection)
    }

    /// Returns the greatest key in the map that is strictly less than `key`.
    pub fn lower_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        tree::lower(&self.tree, key).map(|entry| &entry.key)
    }

    /// Returns the greatest key in the map that is less than or equal to `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.floor_key(&0), None);
    /// assert_eq!(map.floor_key(&2), Some(&1));
    /// ```
    pub fn floor_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        tree::floor(&self.tree, key).map(|entry| &entry.key)
    }

    /// Returns the least key in the map that is greater than or equal to `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.ceiling_key(&0), Some(&1));
    /// assert_eq!(map.ceiling_key(&2), None);
    /// ```
    pub fn ceiling_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        tree::ceil(&self.tree, key).map(|entry| &entry.key)
    }

    /// Returns the least key in the map that is strictly greater than `key`.
    pub fn higher_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        tree::higher(&self.tree, key).map(|entry| &entry.key)
    }

    /// Returns a new map holding copies of the entries whose keys are strictly less than `to`.
    /// The returned map is independent of `self`: later mutations of either map are not visible
    /// in the other.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let map: AvlMap<u32, u32> = (0..5).map(|key| (key, key * 10)).collect();
    /// let head = map.head_map(&2);
    /// assert_eq!(head.iter().collect::<Vec<_>>(), vec![(&0, &0), (&1, &10)]);
    /// ```
    pub fn head_map(&self, to: &K) -> Self
    where
        K: Ord + Clone,
        V: Clone,
    {
        self.copy_range(None, Some(to))
    }

    /// Returns a new map holding copies of the entries whose keys are greater than or equal to
    /// `from`. The returned map is independent of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let map: AvlMap<u32, u32> = (0..5).map(|key| (key, key * 10)).collect();
    /// let tail = map.tail_map(&3);
    /// assert_eq!(tail.iter().collect::<Vec<_>>(), vec![(&3, &30), (&4, &40)]);
    /// ```
    pub fn tail_map(&self, from: &K) -> Self
    where
        K: Ord + Clone,
        V: Clone,
    {
        self.copy_range(Some(from), None)
    }

    fn copy_range(&self, from: Option<&K>, to: Option<&K>) -> Self
    where
        K: Ord + Clone,
        V: Clone,
    {
        let mut entries = Vec::new();
        tree::collect_range(&self.tree, from, to, &mut entries);
        debug!("copying {} of {} avl map entries into a new map", entries.len(), self.len);
        entries
            .into_iter()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    /// Returns an iterator over the map. The iterator will yield key-value pairs using in-order
    /// traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(2, 2);
    /// map.insert(1, 1);
    ///
    /// let mut iterator = map.iter();
    /// assert_eq!(iterator.next(), Some((&1, &1)));
    /// assert_eq!(iterator.next(), Some((&2, &2)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> AvlMapIter<'_, K, V> {
        AvlMapIter {
            current: &self.tree,
            stack: Vec::new(),
        }
    }

    /// Returns a mutable iterator over the map. The iterator will yield key-value pairs using
    /// in-order traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    ///
    /// for (_, value) in &mut map {
    ///     *value += 1;
    /// }
    ///
    /// assert_eq!(map.get(&1), Some(&2));
    /// assert_eq!(map.get(&2), Some(&3));
    /// ```
    pub fn iter_mut(&mut self) -> AvlMapIterMut<'_, K, V> {
        AvlMapIterMut {
            current: self.tree.as_mut().map(|node| &mut **node),
            stack: Vec::new(),
        }
    }
}

impl<K, V> OrderedMap<K, V> for AvlMap<K, V>
where
    K: Ord,
    V: PartialEq,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        AvlMap::insert(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        AvlMap::get(self, key)
    }

    fn contains_key(&self, key: &K) -> bool {
        AvlMap::contains_key(self, key)
    }

    fn contains_value(&self, value: &V) -> bool {
        AvlMap::contains_value(self, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        AvlMap::remove(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        AvlMap::clear(self)
    }

    fn first_key(&mut self) -> Result<&K> {
        AvlMap::first_key(self)
    }

    fn last_key(&mut self) -> Result<&K> {
        AvlMap::last_key(self)
    }

    fn lower_key(&self, key: &K) -> Option<&K> {
        AvlMap::lower_key(self, key)
    }

    fn floor_key(&self, key: &K) -> Option<&K> {
        AvlMap::floor_key(self, key)
    }

    fn ceiling_key(&self, key: &K) -> Option<&K> {
        AvlMap::ceiling_key(self, key)
    }

    fn higher_key(&self, key: &K) -> Option<&K> {
        AvlMap::higher_key(self, key)
    }

    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a> {
        Box::new(AvlMap::iter(self))
    }
}

impl<K, V> IntoIterator for AvlMap<K, V> {
    type IntoIter = AvlMapIntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            current: self.tree,
            stack: Vec::new(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlMap<K, V>
where
    K: 'a,
    V: 'a,
{
    type IntoIter = AvlMapIter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut AvlMap<K, V>
where
    K: 'a,
    V: 'a,
{
    type IntoIter = AvlMapIterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// An owning iterator for `AvlMap<K, V>`.
///
/// This iterator traverses the elements of the map in-order and yields owned entries.
pub struct AvlMapIntoIter<K, V> {
    current: tree::Tree<K, V>,
    stack: Vec<Node<K, V>>,
}

impl<K, V> Iterator for AvlMapIntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(mut node) = self.current.take() {
            self.current = node.left.take();
            self.stack.push(*node);
        }
        self.stack.pop().map(|node| {
            let Node { entry, right, .. } = node;
            self.current = right;
            entry.into_pair()
        })
    }
}

/// An iterator for `AvlMap<K, V>`.
///
/// This iterator traverses the elements of the map in-order and yields immutable references.
pub struct AvlMapIter<'a, K, V> {
    current: &'a tree::Tree<K, V>,
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iterator for AvlMapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ref node) = self.current {
            self.current = &node.left;
            self.stack.push(node);
        }
        self.stack.pop().map(|node| {
            let Node {
                entry: Entry { ref key, ref value },
                ref right,
                ..
            } = node;
            self.current = right;
            (key, value)
        })
    }
}

/// A mutable iterator for `AvlMap<K, V>`.
///
/// This iterator traverses the elements of the map in-order and yields mutable references.
pub struct AvlMapIterMut<'a, K, V> {
    current: Option<&'a mut Node<K, V>>,
    stack: Vec<(&'a mut Entry<K, V>, Option<&'a mut Node<K, V>>)>,
}

impl<'a, K, V> Iterator for AvlMapIterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.current.take() {
            let Node {
                entry, left, right, ..
            } = node;
            self.current = left.as_mut().map(|node| &mut **node);
            self.stack.push((entry, right.as_mut().map(|node| &mut **node)));
        }
        self.stack.pop().map(|(entry, right)| {
            self.current = right;
            let Entry {
                ref key,
                ref mut value,
            } = entry;
            (key, value)
        })
    }
}

impl<K, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Extend<(K, V)> for AvlMap<K, V>
where
    K: Ord,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for AvlMap<K, V>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AvlMap::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, Q> Index<&'a Q> for AvlMap<K, V>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    fn index(&self, key: &Q) -> &Self::Output {
        self.get(key).expect("Error: key does not exist.")
    }
}

impl<K, V> PartialEq for AvlMap<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V> Eq for AvlMap<K, V>
where
    K: Eq,
    V: Eq,
{
}

impl<K, V> fmt::Debug for AvlMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> fmt::Display for AvlMap<K, V>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        ordered_map::fmt_entries(f, self.iter())
    }
}

impl<K, V> Serialize for AvlMap<K, V>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, K, V> Deserialize<'de> for AvlMap<K, V>
where
    K: Ord + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor::<Self, K, V>::new("an avl map"))
    }
}
