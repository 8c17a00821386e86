//! Chunked slot storage addressed by copyable handles.
//!
//! The splay tree keeps its nodes here so that child links and parent back-references are plain
//! `Handle` values instead of competing owning pointers.

use std::mem;
use std::ops::{Index, IndexMut};

/// Default number of slots allocated per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// A copyable reference to a value stored in an `Arena<T>`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle {
    chunk_index: usize,
    block_index: usize,
}

enum Block<T> {
    Occupied(T),
    Vacant(Option<Handle>),
}

/// An allocator for a single type of object.
///
/// Freed slots are threaded onto a free list and reused by later allocations. When every slot is
/// occupied, another chunk of `chunk_size` slots is reserved, so existing values are never moved
/// and handles stay valid until their value is freed.
///
/// # Examples
///
/// ```
/// use bst_maps::arena::Arena;
///
/// let mut arena = Arena::new(16);
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena.free(x), Some(2));
/// assert!(arena.is_empty());
/// ```
pub struct Arena<T> {
    head: Option<Handle>,
    chunks: Vec<Vec<Block<T>>>,
    chunk_size: usize,
    len: usize,
    capacity: usize,
}

impl<T> Arena<T> {
    /// Constructs a new, empty `Arena<T>` that reserves `chunk_size` slots at a time. A chunk size
    /// of zero is treated as one.
    pub fn new(chunk_size: usize) -> Self {
        Arena {
            head: None,
            chunks: Vec::new(),
            chunk_size: chunk_size.max(1),
            len: 0,
            capacity: 0,
        }
    }

    fn block(&self, handle: Handle) -> Option<&Block<T>> {
        self.chunks
            .get(handle.chunk_index)
            .and_then(|chunk| chunk.get(handle.block_index))
    }

    fn block_mut(&mut self, handle: Handle) -> Option<&mut Block<T>> {
        self.chunks
            .get_mut(handle.chunk_index)
            .and_then(|chunk| chunk.get_mut(handle.block_index))
    }

    /// Stores `value` in the arena and returns its handle.
    pub fn allocate(&mut self, value: T) -> Handle {
        self.len += 1;

        if let Some(handle) = self.head.take() {
            let block = &mut self.chunks[handle.chunk_index][handle.block_index];
            match mem::replace(block, Block::Occupied(value)) {
                Block::Vacant(next) => self.head = next,
                Block::Occupied(_) => unreachable!("free list points at an occupied block"),
            }
            return handle;
        }

        if self.len > self.capacity {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
            self.capacity += self.chunk_size;
        }

        let chunk_index = self.chunks.len() - 1;
        let chunk = &mut self.chunks[chunk_index];
        chunk.push(Block::Occupied(value));
        Handle {
            chunk_index,
            block_index: chunk.len() - 1,
        }
    }

    /// Releases the value referenced by `handle` and returns it. Returns `None` if the handle
    /// does not reference an occupied slot.
    pub fn free(&mut self, handle: Handle) -> Option<T> {
        let head = self.head;
        let block = self.block_mut(handle)?;
        if let Block::Vacant(_) = block {
            return None;
        }

        match mem::replace(block, Block::Vacant(head)) {
            Block::Occupied(value) => {
                self.head = Some(handle);
                self.len -= 1;
                Some(value)
            },
            Block::Vacant(_) => unreachable!(),
        }
    }

    /// Returns an immutable reference to the value referenced by `handle`, or `None` if the slot
    /// is vacant or out of bounds.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        match self.block(handle) {
            Some(Block::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value referenced by `handle`, or `None` if the slot is
    /// vacant or out of bounds.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        match self.block_mut(handle) {
            Some(Block::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every stored value and releases all chunks. Outstanding handles become invalid.
    pub fn clear(&mut self) {
        self.head = None;
        self.chunks.clear();
        self.len = 0;
        self.capacity = 0;
    }
}

impl<T> Index<Handle> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        self.get(handle).expect("Error: handle does not reference a live value.")
    }
}

impl<T> IndexMut<Handle> for Arena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        self.get_mut(handle).expect("Error: handle does not reference a live value.")
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, Handle};

    fn handle(chunk_index: usize, block_index: usize) -> Handle {
        Handle {
            chunk_index,
            block_index,
        }
    }

    #[test]
    fn test_allocate() {
        let mut arena = Arena::new(1024);
        assert_eq!(arena.allocate(0), handle(0, 0));
        assert_eq!(arena.allocate(0), handle(0, 1));
        assert_eq!(arena.allocate(0), handle(0, 2));
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_allocate_multiple_chunks() {
        let mut arena = Arena::new(2);
        assert_eq!(arena.allocate(0), handle(0, 0));
        assert_eq!(arena.allocate(0), handle(0, 1));
        assert_eq!(arena.allocate(0), handle(1, 0));
    }

    #[test]
    fn test_free_reuses_slot() {
        let mut arena = Arena::new(1024);
        let first = arena.allocate(0);
        arena.allocate(1);
        assert_eq!(arena.free(first), Some(0));
        assert_eq!(arena.allocate(2), first);
        assert_eq!(arena[first], 2);
    }

    #[test]
    fn test_free_invalid_or_vacant() {
        let mut arena: Arena<u32> = Arena::new(1024);
        assert_eq!(arena.free(handle(0, 0)), None);

        let x = arena.allocate(7);
        assert_eq!(arena.free(x), Some(7));
        assert_eq!(arena.free(x), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_get_mut() {
        let mut arena = Arena::new(1024);
        let x = arena.allocate(0);
        *arena.get_mut(x).unwrap() = 1;
        assert_eq!(arena.get(x), Some(&1));
        assert_eq!(arena.get(handle(0, 1)), None);
        assert_eq!(arena.get_mut(handle(3, 0)), None);
    }

    #[test]
    fn test_clear() {
        let mut arena = Arena::new(2);
        for i in 0..5 {
            arena.allocate(i);
        }
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.allocate(9), handle(0, 0));
    }
}
