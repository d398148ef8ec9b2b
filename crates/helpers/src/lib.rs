use std::hash::BuildHasherDefault;
use std::marker::PhantomData;

mod status;
pub use status::Status;

/// Insertion-ordered map over an `ahash` hasher. Every side table this
/// pipeline keeps (name registries, catalog id tables, scope bindings,
/// completion's merged name index) needs its iteration order to match
/// insertion order for reproducible snapshots, which `std::HashMap`
/// doesn't guarantee; `ahash` is used purely for its speed over short
/// identifier keys, never for its own ordering or security properties.
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<ahash::AHasher>>;
/// The `IndexSet` counterpart, used wherever a side table only needs
/// membership (catalog dedup scans, cross-script name interning) and not
/// a value per key.
pub type IndexSet<V> = indexmap::IndexSet<V, BuildHasherDefault<ahash::AHasher>>;

/// Builder-style configuration, applied in place then returned.
///
/// Blanket-implemented for every type so `EngineConfig::default().config(|c|
/// c.completion_limit = 10)`-style chaining works without each pipeline
/// stage (`Script`, `Catalog`, `EngineConfig`) writing its own setter
/// methods; never re-implement this for a concrete type, the blanket impl
/// already covers it.
pub trait Config: Sized {
    fn config(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }
}

impl<T> Config for T {}

/// A phantom-typed index into an arena-like store.
///
/// Plain `usize` indices are easy to mix up once a crate has more than
/// one kind of arena (AST nodes, scopes, table declarations, ...). `Id<T>`
/// keeps them distinct at the type level while remaining a zero-cost
/// `Copy` value.
pub struct Id<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn new(index: u32) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    pub const fn index(self) -> usize {
        self.index as usize
    }

    pub const fn as_u32(self) -> u32 {
        self.index
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Id<T> {}
impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}
impl<T> Eq for Id<T> {}
impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}
impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}
impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.index)
    }
}

#[cfg(feature = "serde")]
impl<T> serde::Serialize for Id<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.index.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for Id<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Id::new(u32::deserialize(deserializer)?))
    }
}

/// A vector split into exponentially growing chunks.
///
/// Grounded in the scanner's requirement (see `sqlsight_scanner`) that a
/// byte offset be resolved to its owning symbol in roughly logarithmic
/// time without the whole stream ever being copied: appends only ever
/// touch the last chunk, and `chunk_containing` first picks the chunk via
/// a linear scan over the (few) chunk boundaries, then lets the caller
/// binary-search within it.
#[derive(Debug, Clone)]
pub struct ChunkedVec<T> {
    chunks: Vec<Vec<T>>,
    next_chunk_capacity: usize,
    len: usize,
}

impl<T> Default for ChunkedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ChunkedVec<T> {
    const INITIAL_CAPACITY: usize = 64;

    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            next_chunk_capacity: Self::INITIAL_CAPACITY,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, value: T) -> usize {
        if self
            .chunks
            .last()
            .is_none_or(|chunk| chunk.len() == chunk.capacity())
        {
            self.chunks.push(Vec::with_capacity(self.next_chunk_capacity));
            self.next_chunk_capacity *= 2;
        }
        let chunk = self.chunks.last_mut().unwrap();
        chunk.push(value);
        let index = self.len;
        self.len += 1;
        index
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        let (chunk_idx, offset) = self.locate(index)?;
        self.chunks[chunk_idx].get(offset)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let (chunk_idx, offset) = self.locate(index)?;
        self.chunks[chunk_idx].get_mut(offset)
    }

    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.len {
            return None;
        }
        let mut remaining = index;
        for (chunk_idx, chunk) in self.chunks.iter().enumerate() {
            if remaining < chunk.len() {
                return Some((chunk_idx, remaining));
            }
            remaining -= chunk.len();
        }
        None
    }

    /// Binary-searches across the whole buffer for the first element that
    /// does *not* satisfy `before_needle` (i.e. `partition_point`
    /// semantics). Chunk boundaries are scanned linearly first (there are
    /// few chunks), then the winning chunk is bisected. Callers that want
    /// "the last element satisfying the predicate" subtract one, handling
    /// the all-true case themselves.
    pub fn partition_point_by_chunk(&self, mut before_needle: impl FnMut(&T) -> bool) -> usize {
        let mut base = 0usize;
        for chunk in &self.chunks {
            let local = chunk.partition_point(|item| before_needle(item));
            if local < chunk.len() {
                return base + local;
            }
            base += chunk.len();
        }
        base
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.chunks.iter().flatten()
    }
}

impl<T> std::ops::Index<usize> for ChunkedVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index).expect("ChunkedVec index out of bounds")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunked_vec_push_and_get() {
        let mut buf = ChunkedVec::new();
        for i in 0..200 {
            buf.push(i);
        }
        assert_eq!(buf.len(), 200);
        for i in 0..200 {
            assert_eq!(*buf.get(i).unwrap(), i);
        }
        assert!(buf.get(200).is_none());
    }

    #[test]
    fn chunked_vec_partition_point() {
        let mut buf = ChunkedVec::new();
        for i in (0..500).map(|i| i * 2) {
            buf.push(i);
        }
        // first index whose value is NOT < 101 i.e. first value >= 101 -> 102 at idx 51
        let idx = buf.partition_point_by_chunk(|v| *v < 101);
        assert_eq!(*buf.get(idx).unwrap(), 102);
    }

    #[test]
    fn id_is_copy_and_ordered() {
        struct Marker;
        let a: Id<Marker> = Id::new(1);
        let b: Id<Marker> = Id::new(2);
        assert!(a < b);
        assert_eq!(a, Id::new(1));
    }
}
