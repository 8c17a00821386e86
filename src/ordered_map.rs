//! The interface shared by every tree-backed map in this crate.

use crate::avl_tree::AvlMap;
use crate::error::{Error, Result};
use crate::splay_tree::SplayMap;
use serde::de::{Deserialize, MapAccess, Visitor};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

/// An ordered map over a totally ordered key type.
///
/// The trait is object safe so that the balancing strategy can be chosen at runtime through
/// `Strategy::build`. Every method that may restructure the tree takes `&mut self`: a splay tree
/// moves every entry it touches to the root, while an avl tree only restructures on insertion and
/// removal.
///
/// # Examples
///
/// ```
/// use bst_maps::{OrderedMap, Strategy};
///
/// for strategy in &[Strategy::Avl, Strategy::Splay] {
///     let mut map: Box<dyn OrderedMap<i32, String>> = strategy.build();
///     map.insert(3, "three".to_string());
///     map.insert(1, "one".to_string());
///
///     assert_eq!(map.get(&3), Some(&"three".to_string()));
///     assert_eq!(map.floor_key(&2), Some(&1));
///     assert_eq!(map.to_string(), "{1=one, 3=three}");
/// }
/// ```
pub trait OrderedMap<K, V> {
    /// Inserts a key-value pair, returning the previous value if the key was already present.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Returns the value associated with `key`.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks if `key` exists in the map without restructuring it.
    fn contains_key(&self, key: &K) -> bool;

    /// Checks if any entry holds `value`.
    fn contains_value(&self, value: &V) -> bool;

    /// Removes `key`, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the map holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    fn clear(&mut self);

    /// Returns the least key, or `Error::EmptyCollection` if the map is empty.
    fn first_key(&mut self) -> Result<&K>;

    /// Returns the greatest key, or `Error::EmptyCollection` if the map is empty.
    fn last_key(&mut self) -> Result<&K>;

    /// Returns the greatest key strictly less than `key`.
    fn lower_key(&self, key: &K) -> Option<&K>;

    /// Returns the greatest key less than or equal to `key`.
    fn floor_key(&self, key: &K) -> Option<&K>;

    /// Returns the least key greater than or equal to `key`.
    fn ceiling_key(&self, key: &K) -> Option<&K>;

    /// Returns the least key strictly greater than `key`.
    fn higher_key(&self, key: &K) -> Option<&K>;

    /// Returns an iterator over the entries in ascending key order.
    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a>;

    /// Inserts a pair whose key may be missing. A missing key fails with `Error::MissingKey` and
    /// leaves the map untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::{Error, OrderedMap, Strategy};
    ///
    /// let mut map: Box<dyn OrderedMap<i32, &str>> = Strategy::Avl.build();
    /// assert_eq!(map.try_insert(Some(1), "one"), Ok(None));
    /// assert_eq!(map.try_insert(None, "two"), Err(Error::MissingKey));
    /// assert_eq!(map.len(), 1);
    /// ```
    fn try_insert(&mut self, key: Option<K>, value: V) -> Result<Option<V>> {
        match key {
            Some(key) => Ok(self.insert(key, value)),
            None => Err(Error::MissingKey),
        }
    }

    /// Looks up a dynamically typed key. A key of any type other than `K` is reported as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::{OrderedMap, Strategy};
    ///
    /// let mut map: Box<dyn OrderedMap<i32, &str>> = Strategy::Splay.build();
    /// map.insert(1, "one");
    /// assert_eq!(map.get_any(&1i32), Some(&"one"));
    /// assert_eq!(map.get_any(&"1"), None);
    /// ```
    fn get_any(&mut self, key: &dyn Any) -> Option<&V>
    where
        K: 'static,
    {
        match key.downcast_ref::<K>() {
            Some(key) => self.get(key),
            None => None,
        }
    }

    /// Checks for a dynamically typed key. A key of any type other than `K` is reported as
    /// absent.
    fn contains_any(&self, key: &dyn Any) -> bool
    where
        K: 'static,
    {
        key.downcast_ref::<K>()
            .map_or(false, |key| self.contains_key(key))
    }

    /// Removes a dynamically typed key. A key of any type other than `K` removes nothing.
    fn remove_any(&mut self, key: &dyn Any) -> Option<V>
    where
        K: 'static,
    {
        match key.downcast_ref::<K>() {
            Some(key) => self.remove(key),
            None => None,
        }
    }
}

impl<'a, K, V> fmt::Display for dyn OrderedMap<K, V> + 'a
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_entries(f, self.iter())
    }
}

/// The balancing strategy backing a map built through `Strategy::build`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Height-balanced tree with worst-case `O(log n)` operations and read-only lookups.
    Avl,
    /// Self-adjusting tree with amortized `O(log n)` operations that favours recently accessed
    /// keys.
    Splay,
}

impl Strategy {
    /// Constructs a new, empty map backed by this strategy.
    pub fn build<K, V>(self) -> Box<dyn OrderedMap<K, V>>
    where
        K: Ord + 'static,
        V: PartialEq + 'static,
    {
        match self {
            Strategy::Avl => Box::new(AvlMap::new()),
            Strategy::Splay => Box::new(SplayMap::new()),
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Avl
    }
}

/// Writes entries as `{k1=v1, k2=v2}`.
pub(crate) fn fmt_entries<'a, K, V, I>(f: &mut fmt::Formatter, entries: I) -> fmt::Result
where
    K: fmt::Display + 'a,
    V: fmt::Display + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    write!(f, "{{")?;
    for (index, (key, value)) in entries.enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}={}", key, value)?;
    }
    write!(f, "}}")
}

/// Serde visitor that rebuilds a map by inserting every deserialized pair.
pub(crate) struct MapVisitor<M, K, V> {
    expecting: &'static str,
    marker: PhantomData<fn() -> (M, K, V)>,
}

impl<M, K, V> MapVisitor<M, K, V> {
    pub(crate) fn new(expecting: &'static str) -> Self {
        MapVisitor {
            expecting,
            marker: PhantomData,
        }
    }
}

impl<'de, M, K, V> Visitor<'de> for MapVisitor<M, K, V>
where
    M: Default + Extend<(K, V)>,
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    type Value = M;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.expecting)
    }

    fn visit_map<A>(self, mut access: A) -> ::std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = M::default();
        while let Some((key, value)) = access.next_entry()? {
            map.extend(Some((key, value)));
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::{OrderedMap, Strategy};
    use crate::error::Error;
    use serde_test::{assert_tokens, Token};

    fn strategies() -> Vec<Strategy> {
        vec![Strategy::Avl, Strategy::Splay]
    }

    #[test]
    fn test_contract() {
        for strategy in strategies() {
            let mut map: Box<dyn OrderedMap<i32, String>> = strategy.build();
            assert!(map.is_empty());
            assert_eq!(map.first_key(), Err(Error::EmptyCollection));
            assert_eq!(map.last_key(), Err(Error::EmptyCollection));

            for key in &[5, 3, 7, 2, 4, 6, 8] {
                assert_eq!(map.insert(*key, key.to_string()), None);
            }
            assert_eq!(map.insert(4, "Four".to_string()), Some("4".to_string()));
            assert_eq!(map.len(), 7);
            assert_eq!(map.get(&4), Some(&"Four".to_string()));
            assert!(map.contains_value(&"8".to_string()));

            assert_eq!(map.first_key(), Ok(&2));
            assert_eq!(map.last_key(), Ok(&8));
            assert_eq!(map.lower_key(&5), Some(&4));
            assert_eq!(map.floor_key(&5), Some(&5));
            assert_eq!(map.ceiling_key(&5), Some(&5));
            assert_eq!(map.higher_key(&5), Some(&6));

            assert_eq!(map.remove(&3), Some("3".to_string()));
            assert_eq!(map.remove(&3), None);
            assert_eq!(
                map.to_string(),
                "{2=2, 4=Four, 5=5, 6=6, 7=7, 8=8}",
            );

            map.clear();
            assert_eq!(map.len(), 0);
            assert_eq!(map.to_string(), "{}");
        }
    }

    #[test]
    fn test_mismatched_key_type_is_absent() {
        for strategy in strategies() {
            let mut map: Box<dyn OrderedMap<i32, String>> = strategy.build();
            map.insert(1, "one".to_string());

            assert_eq!(map.get_any(&1i64), None);
            assert!(!map.contains_any(&"1"));
            assert!(map.contains_any(&1i32));
            assert_eq!(map.remove_any(&1u8), None);
            assert_eq!(map.len(), 1);
            assert_eq!(map.remove_any(&1i32), Some("one".to_string()));
        }
    }

    #[test]
    fn test_missing_key() {
        for strategy in strategies() {
            let mut map: Box<dyn OrderedMap<i32, String>> = strategy.build();
            assert_eq!(
                map.try_insert(None, "none".to_string()),
                Err(Error::MissingKey),
            );
            assert!(map.is_empty());
        }
    }

    #[test]
    fn test_strategy_tokens() {
        assert_tokens(
            &Strategy::Splay,
            &[Token::UnitVariant {
                name: "Strategy",
                variant: "splay",
            }],
        );
        assert_eq!(Strategy::default(), Strategy::Avl);
    }
}
