use crate::arena::{Arena, Handle, DEFAULT_CHUNK_SIZE};
use crate::error::{Error, Result};
use crate::ordered_map::{self, MapVisitor, OrderedMap};
use crate::splay_tree::node::Node;
use crate::splay_tree::tree;
use log::debug;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;

/// An ordered map implemented using a splay tree.
///
/// A splay tree is a self-adjusting binary tree with the additional property that recently
/// accessed items are quick to access again. After each successful lookup, insertion or removal
/// the touched node (or, for a removal, the predecessor that replaces it) is "splayed" to the root
/// of the tree. Operations are `O(log n)` amortized, but a single operation on a degenerate shape
/// may take linear time.
///
/// Queries that do not promote an entry (`contains_key` and the relative bounds such as
/// `floor_key`) take `&self` and leave the shape untouched.
///
/// # Examples
///
/// ```
/// use bst_maps::splay_tree::SplayMap;
///
/// let mut map = SplayMap::new();
/// map.insert(0, 1);
/// map.insert(3, 4);
///
/// assert_eq!(map.get(&0), Some(&1));
/// assert_eq!(map.root_key(), Some(&0));
/// assert_eq!(map.get(&1), None);
/// assert_eq!(map.len(), 2);
///
/// assert_eq!(map.first_key(), Ok(&0));
/// assert_eq!(map.ceiling_key(&2), Some(&3));
///
/// assert_eq!(map.remove(&0), Some(1));
/// assert_eq!(map.remove(&1), None);
/// ```
pub struct SplayMap<K, V> {
    tree: tree::Tree<K, V>,
}

impl<K, V> SplayMap<K, V> {
    /// Constructs a new, empty `SplayMap<K, V>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let map: SplayMap<i32, String> = SplayMap::new();
    /// ```
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `SplayMap<K, V>` whose node storage grows `chunk_size` nodes at a
    /// time.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let map: SplayMap<i32, String> = SplayMap::with_chunk_size(64);
    /// ```
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        SplayMap {
            tree: tree::Tree::new(chunk_size),
        }
    }

    /// Inserts a key-value pair into the map and splays it to the root. If the key already exists
    /// in the map, its value is replaced and the previous value is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// assert_eq!(map.insert(1, 1), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// assert_eq!(map.insert(1, 2), Some(1));
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        self.tree.insert(key, value)
    }

    /// Removes a key-value pair from the map. If the key exists in the map, it will return the
    /// associated value. Otherwise it will return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.remove(&1), Some(1));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(key)
    }

    /// Checks if a key exists in the map. Note that `contains_key` does not splay the tree in
    /// order to use a non-mutable reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// assert!(!map.contains_key(&0));
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key).is_some()
    }

    /// Checks if any key in the map is associated with `value`. This visits every entry and does
    /// not splay the tree.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, other)| other == value)
    }

    /// Returns an immutable reference to the value associated with a particular key and splays
    /// its node to the root. It will return `None` if the key does not exist in the map, in which
    /// case the tree is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    /// assert_eq!(map.get(&0), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// assert_eq!(map.root_key(), Some(&1));
    /// ```
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let handle = self.splay_to(key)?;
        Some(&self.tree.entry(handle).value)
    }

    /// Returns a mutable reference to the value associated with a particular key and splays its
    /// node to the root. Returns `None` if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// *map.get_mut(&1).unwrap() = 2;
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let handle = self.splay_to(key)?;
        Some(&mut self.tree.entry_mut(handle).value)
    }

    fn splay_to<Q>(&mut self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let handle = self.tree.find(key)?;
        self.tree.splay(handle);
        Some(handle)
    }

    /// Returns the key stored at the root of the tree, which is the most recently accessed entry.
    /// Returns `None` if the map is empty.
    pub fn root_key(&self) -> Option<&K> {
        self.tree.root.map(|root| &self.tree.entry(root).key)
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the map, removing all values and releasing the node storage.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    /// map.clear();
    /// assert_eq!(map.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        debug!("clearing splay map with {} entries", self.len());
        self.tree.clear();
    }

    /// Returns the minimum key of the map and splays it to the root. Returns
    /// `Error::EmptyCollection` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.first_key(), Ok(&1));
    /// assert_eq!(map.root_key(), Some(&1));
    /// ```
    pub fn first_key(&mut self) -> Result<&K> {
        let handle = self.tree.min().ok_or(Error::EmptyCollection)?;
        self.tree.splay(handle);
        Ok(&self.tree.entry(handle).key)
    }

    /// Returns the maximum key of the map and splays it to the root. Returns
    /// `Error::EmptyCollection` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    /// use bst_maps::Error;
    ///
    /// let mut map = SplayMap::new();
    /// assert_eq!(map.last_key(), Err(Error::EmptyCollection));
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.last_key(), Ok(&3));
    /// ```
    pub fn last_key(&mut self) -> Result<&K> {
        let handle = self.tree.max().ok_or(Error::EmptyCollection)?;
        self.tree.splay(handle);
        Ok(&self.tree.entry(handle).key)
    }

    /// Returns the greatest key in the map that is strictly less than `key`. Does not splay.
    pub fn lower_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.lower(key).map(|entry| &entry.key)
    }

    /// Returns the greatest key in the map that is less than or equal to `key`. Does not splay.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.floor_key(&0), None);
    /// assert_eq!(map.floor_key(&2), Some(&1));
    /// ```
    pub fn floor_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.floor(key).map(|entry| &entry.key)
    }

    /// Returns the least key in the map that is greater than or equal to `key`. Does not splay.
    pub fn ceiling_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.ceil(key).map(|entry| &entry.key)
    }

    /// Returns the least key in the map that is strictly greater than `key`. Does not splay.
    pub fn higher_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.higher(key).map(|entry| &entry.key)
    }

    /// Returns a new map holding copies of the entries whose keys are strictly less than `to`.
    /// The returned map owns its own nodes: later mutations of either map are not visible in the
    /// other.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let map: SplayMap<u32, u32> = (0..5).map(|key| (key, key * 10)).collect();
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
    /// `from`. The returned map owns its own nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let map: SplayMap<u32, u32> = (0..5).map(|key| (key, key * 10)).collect();
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
        self.tree.collect_range(from, to, &mut entries);
        debug!(
            "copying {} of {} splay map entries into a new map",
            entries.len(),
            self.len()
        );
        entries
            .into_iter()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    /// Returns an iterator over the map. The iterator will yield key-value pairs using in-order
    /// traversal. Iterating does not splay the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(2, 2);
    /// map.insert(1, 1);
    ///
    /// let mut iterator = map.iter();
    /// assert_eq!(iterator.next(), Some((&1, &1)));
    /// assert_eq!(iterator.next(), Some((&2, &2)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> SplayMapIter<'_, K, V> {
        SplayMapIter {
            tree: &self.tree,
            current: self.tree.root,
            stack: Vec::new(),
        }
    }
}

impl<K, V> OrderedMap<K, V> for SplayMap<K, V>
where
    K: Ord,
    V: PartialEq,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        SplayMap::insert(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        SplayMap::get(self, key)
    }

    fn contains_key(&self, key: &K) -> bool {
        SplayMap::contains_key(self, key)
    }

    fn contains_value(&self, value: &V) -> bool {
        SplayMap::contains_value(self, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        SplayMap::remove(self, key)
    }

    fn len(&self) -> usize {
        self.tree.len()
    }

    fn clear(&mut self) {
        SplayMap::clear(self)
    }

    fn first_key(&mut self) -> Result<&K> {
        SplayMap::first_key(self)
    }

    fn last_key(&mut self) -> Result<&K> {
        SplayMap::last_key(self)
    }

    fn lower_key(&self, key: &K) -> Option<&K> {
        SplayMap::lower_key(self, key)
    }

    fn floor_key(&self, key: &K) -> Option<&K> {
        SplayMap::floor_key(self, key)
    }

    fn ceiling_key(&self, key: &K) -> Option<&K> {
        SplayMap::ceiling_key(self, key)
    }

    fn higher_key(&self, key: &K) -> Option<&K> {
        SplayMap::higher_key(self, key)
    }

    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a> {
        Box::new(SplayMap::iter(self))
    }
}

impl<K, V> IntoIterator for SplayMap<K, V> {
    type IntoIter = SplayMapIntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        let tree::Tree { arena, root } = self.tree;
        SplayMapIntoIter {
            arena,
            current: root,
            stack: Vec::new(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a SplayMap<K, V>
where
    K: 'a,
    V: 'a,
{
    type IntoIter = SplayMapIter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `SplayMap<K, V>`.
///
/// This iterator traverses the elements of the map in-order and yields owned entries. Each node
/// is released from storage as it is yielded.
pub struct SplayMapIntoIter<K, V> {
    arena: Arena<Node<K, V>>,
    current: Option<Handle>,
    stack: Vec<Handle>,
}

impl<K, V> Iterator for SplayMapIntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.current {
            self.stack.push(handle);
            self.current = self.arena[handle].left;
        }
        let handle = self.stack.pop()?;
        let Node { entry, right, .. } = self.arena.free(handle)?;
        self.current = right;
        Some(entry.into_pair())
    }
}

/// An iterator for `SplayMap<K, V>`.
///
/// This iterator traverses the elements of the map in-order and yields immutable references.
pub struct SplayMapIter<'a, K, V> {
    tree: &'a tree::Tree<K, V>,
    current: Option<Handle>,
    stack: Vec<Handle>,
}

impl<'a, K, V> Iterator for SplayMapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.current {
            self.stack.push(handle);
            self.current = self.tree.arena[handle].left;
        }
        self.stack.pop().map(|handle| {
            let tree = self.tree;
            let node = &tree.arena[handle];
            self.current = node.right;
            (&node.entry.key, &node.entry.value)
        })
    }
}

impl<K, V> Default for SplayMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Extend<(K, V)> for SplayMap<K, V>
where
    K: Ord,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for SplayMap<K, V>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = SplayMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V> PartialEq for SplayMap<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V> fmt::Debug for SplayMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> fmt::Display for SplayMap<K, V>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        ordered_map::fmt_entries(f, self.iter())
    }
}

impl<K, V> Serialize for SplayMap<K, V>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, K, V> Deserialize<'de> for SplayMap<K, V>
where
    K: Ord + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor::<Self, K, V>::new("a splay map"))
    }
}
