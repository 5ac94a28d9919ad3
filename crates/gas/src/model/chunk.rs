//! The chunk tree node.

use std::collections::BTreeMap;

use crate::codec::primitives::{decode_varint, encode_varint, encoded_len};
use crate::error::{ChunkError, DecodeError};
use crate::model::cursor::ChunkRef;
use crate::model::field::IntoBytes;

/// Key routed to [`Chunk::id`] by [`Chunk::from_map`].
pub const ID_KEY: &[u8] = b"id";

/// Key routed to [`Chunk::payload`] by [`Chunk::from_map`].
pub const PAYLOAD_KEY: &[u8] = b"payload";

/// A node in a GAS tree.
///
/// A chunk owns its children outright; the tree has no shared nodes. The
/// parent of a chunk is the chunk whose `children` contain it, and is
/// reachable through a [`ChunkRef`] cursor obtained from [`Chunk::cursor`].
///
/// Attributes are kept sorted by key, which is the order they are
/// enumerated and serialized in.
///
/// The cached [`size`](Chunk::size) is only meaningful after
/// [`update`](Chunk::update); any mutation leaves it stale. It is not part
/// of equality.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    id: Vec<u8>,
    attributes: BTreeMap<Vec<u8>, Vec<u8>>,
    payload: Vec<u8>,
    children: Vec<Chunk>,
    size: usize,
}

impl Chunk {
    /// Creates an empty chunk: empty id, no attributes, empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an otherwise empty chunk with the given id.
    pub fn with_id(id: impl IntoBytes) -> Self {
        Self {
            id: id.into_bytes(),
            ..Self::default()
        }
    }

    /// Creates a chunk from a literal key/value map.
    ///
    /// The reserved keys `id` and `payload` set those fields; every other
    /// key becomes an attribute. A literal that names the same key twice is
    /// rejected with [`ChunkError::InvalidConstructorArgument`].
    ///
    /// ```rust
    /// use gas::Chunk;
    ///
    /// let chunk = Chunk::from_map([("id", "root"), ("payload", "hello"), ("a", "1")]).unwrap();
    /// assert_eq!(chunk.id(), b"root");
    /// assert_eq!(chunk.payload(), b"hello");
    /// assert_eq!(chunk.attribute("a"), Some(&b"1"[..]));
    /// assert_eq!(chunk.attribute("id"), None);
    /// ```
    pub fn from_map<I, K, V>(entries: I) -> Result<Self, ChunkError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: IntoBytes,
        V: IntoBytes,
    {
        let mut chunk = Self::new();
        let mut id_seen = false;
        let mut payload_seen = false;

        for (key, value) in entries {
            let key = key.into_bytes();
            let value = value.into_bytes();
            let duplicate = if key == ID_KEY {
                chunk.id = value;
                std::mem::replace(&mut id_seen, true)
            } else if key == PAYLOAD_KEY {
                chunk.payload = value;
                std::mem::replace(&mut payload_seen, true)
            } else {
                let repeated = chunk.attributes.contains_key(&key);
                chunk.attributes.insert(key.clone(), value);
                repeated
            };
            if duplicate {
                return Err(ChunkError::InvalidConstructorArgument {
                    reason: format!("key {:?} given more than once", key.escape_ascii().to_string()),
                });
            }
        }

        Ok(chunk)
    }

    // =========================================================================
    // Id and payload
    // =========================================================================

    /// Returns the chunk id.
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// Replaces the chunk id.
    pub fn set_id(&mut self, id: impl IntoBytes) {
        self.id = id.into_bytes();
    }

    /// Returns the payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Replaces the payload.
    pub fn set_payload(&mut self, payload: impl IntoBytes) {
        self.payload = payload.into_bytes();
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Looks up an attribute value. Returns `None` when the key is absent.
    pub fn attribute(&self, key: impl IntoBytes) -> Option<&[u8]> {
        self.attributes.get(&key.into_bytes()).map(Vec::as_slice)
    }

    /// Sets an attribute, returning the previous value for the key.
    pub fn set_attribute(&mut self, key: impl IntoBytes, value: impl IntoBytes) -> Option<Vec<u8>> {
        self.attributes.insert(key.into_bytes(), value.into_bytes())
    }

    /// Removes an attribute, returning its value.
    pub fn remove_attribute(&mut self, key: impl IntoBytes) -> Option<Vec<u8>> {
        self.attributes.remove(&key.into_bytes())
    }

    /// Returns true if the attribute is present.
    pub fn has_attribute(&self, key: impl IntoBytes) -> bool {
        self.attributes.contains_key(&key.into_bytes())
    }

    /// Stores `value` as a GAS varint under `key`.
    pub fn set_encoded_attribute(&mut self, key: impl IntoBytes, value: u128) -> Option<Vec<u8>> {
        self.attributes.insert(key.into_bytes(), encode_varint(value))
    }

    /// Reads an attribute written by [`set_encoded_attribute`](Chunk::set_encoded_attribute).
    ///
    /// The value must hold exactly one varint; leftover bytes give
    /// [`DecodeError::TrailingBytes`].
    pub fn encoded_attribute(&self, key: impl IntoBytes) -> Result<Option<u128>, DecodeError> {
        let Some(bytes) = self.attribute(key) else {
            return Ok(None);
        };
        let (value, consumed) = decode_varint(bytes)?;
        if consumed != bytes.len() {
            return Err(DecodeError::TrailingBytes {
                count: bytes.len() - consumed,
            });
        }
        Ok(Some(value))
    }

    /// Iterates attributes in ascending byte order of their keys.
    pub fn attributes(&self) -> impl ExactSizeIterator<Item = (&[u8], &[u8])> + '_ {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Returns the number of attributes.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Appends a child, making this chunk its parent.
    ///
    /// Returns the attached child for further modification.
    pub fn append_child(&mut self, child: Chunk) -> &mut Chunk {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Appends several children in order.
    pub fn extend_children(&mut self, children: impl IntoIterator<Item = Chunk>) {
        self.children.extend(children);
    }

    /// Detaches and returns the child at `index`. The child becomes a root.
    pub fn remove_child(&mut self, index: usize) -> Option<Chunk> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Returns the children in order.
    pub fn children(&self) -> &[Chunk] {
        &self.children
    }

    /// Returns the children for in-place modification.
    pub fn children_mut(&mut self) -> &mut [Chunk] {
        &mut self.children
    }

    /// Returns the child at `index`.
    pub fn child(&self, index: usize) -> Option<&Chunk> {
        self.children.get(index)
    }

    /// Returns the child at `index` mutably.
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Chunk> {
        self.children.get_mut(index)
    }

    /// Returns the number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns the first child with the given id.
    pub fn find_child(&self, id: impl IntoBytes) -> Option<&Chunk> {
        let id = id.into_bytes();
        self.children.iter().find(|c| c.id == id)
    }

    /// Follows a `/`-separated path of child ids, taking the first match at
    /// each level.
    ///
    /// ```rust
    /// use gas::ChunkBuilder;
    ///
    /// let tree = ChunkBuilder::new("root")
    ///     .child_with("config", |c| c.child_with("net", |c| c.payload("up")))
    ///     .build();
    /// assert_eq!(tree.at("config/net").unwrap().payload(), b"up");
    /// assert!(tree.at("config/disk").is_none());
    /// ```
    pub fn at(&self, path: impl AsRef<[u8]>) -> Option<&Chunk> {
        path.as_ref()
            .split(|&b| b == b'/')
            .try_fold(self, |node, segment| {
                node.children.iter().find(|c| c.id == segment)
            })
    }

    /// Mutable form of [`at`](Chunk::at).
    pub fn at_mut(&mut self, path: impl AsRef<[u8]>) -> Option<&mut Chunk> {
        let mut node = self;
        for segment in path.as_ref().split(|&b| b == b'/') {
            node = node.children.iter_mut().find(|c| c.id == segment)?;
        }
        Some(node)
    }

    /// Returns a read cursor rooted at this chunk.
    pub fn cursor(&self) -> ChunkRef<'_> {
        ChunkRef::root(self)
    }

    // =========================================================================
    // Sizes
    // =========================================================================

    /// Returns the cached body size as of the last [`update`](Chunk::update)
    /// or parse.
    pub fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    /// Recomputes cached sizes for this chunk and all descendants.
    ///
    /// Children are updated first; each contributes its total size (its own
    /// size prefix plus body). Returns the new body size.
    pub fn update(&mut self) -> usize {
        let mut sum = prefixed_len(self.id.len());

        sum += encoded_len(self.attributes.len() as u128);
        for (key, value) in &self.attributes {
            sum += prefixed_len(key.len());
            sum += prefixed_len(value.len());
        }

        sum += prefixed_len(self.payload.len());

        sum += encoded_len(self.children.len() as u128);
        for child in &mut self.children {
            child.update();
            sum += child.total_size();
        }

        self.size = sum;
        sum
    }

    /// Returns the encoded size including the leading size varint.
    ///
    /// Only valid after [`update`](Chunk::update).
    pub fn total_size(&self) -> usize {
        encoded_len(self.size as u128) + self.size
    }
}

impl PartialEq for Chunk {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.attributes == other.attributes
            && self.payload == other.payload
            && self.children == other.children
    }
}

impl Eq for Chunk {}

fn prefixed_len(len: usize) -> usize {
    encoded_len(len as u128) + len
}
