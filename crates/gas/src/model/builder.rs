//! Builder API for ergonomic chunk tree construction.
//!
//! ```rust
//! use gas::model::ChunkBuilder;
//!
//! let tree = ChunkBuilder::new("root")
//!     .attribute("a", "1")
//!     .attribute("b", "2")
//!     .payload("hello")
//!     .child_with("left", |c| c.payload("l"))
//!     .child_with("right", |c| c
//!         .attribute("side", "r")
//!         .child_with("leaf", |c| c)
//!     )
//!     .build();
//!
//! assert_eq!(tree.child_count(), 2);
//! assert_eq!(tree.child(1).unwrap().child(0).unwrap().id(), b"leaf");
//! ```

use crate::model::chunk::Chunk;
use crate::model::field::IntoBytes;

/// Builder for constructing a [`Chunk`] and its subtree.
#[derive(Debug, Clone, Default)]
pub struct ChunkBuilder {
    chunk: Chunk,
}

impl ChunkBuilder {
    /// Creates a builder for a chunk with the given id.
    pub fn new(id: impl IntoBytes) -> Self {
        Self {
            chunk: Chunk::with_id(id),
        }
    }

    /// Sets an attribute. A repeated key keeps the last value.
    pub fn attribute(mut self, key: impl IntoBytes, value: impl IntoBytes) -> Self {
        self.chunk.set_attribute(key, value);
        self
    }

    /// Sets several attributes at once.
    pub fn attributes<K, V>(mut self, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: IntoBytes,
        V: IntoBytes,
    {
        for (key, value) in attributes {
            self.chunk.set_attribute(key, value);
        }
        self
    }

    /// Sets the payload.
    pub fn payload(mut self, payload: impl IntoBytes) -> Self {
        self.chunk.set_payload(payload);
        self
    }

    /// Appends an already built child.
    pub fn child(mut self, child: Chunk) -> Self {
        self.chunk.append_child(child);
        self
    }

    /// Appends a child built by `f`.
    pub fn child_with<F>(mut self, id: impl IntoBytes, f: F) -> Self
    where
        F: FnOnce(ChunkBuilder) -> ChunkBuilder,
    {
        let builder = f(ChunkBuilder::new(id));
        self.chunk.append_child(builder.build());
        self
    }

    /// Finishes the tree. Sizes are computed so the result is ready to encode.
    pub fn build(mut self) -> Chunk {
        self.chunk.update();
        self.chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_matches_manual_construction() {
        let built = ChunkBuilder::new("root")
            .attribute("b", "2")
            .attribute("a", "1")
            .payload("hello")
            .child(Chunk::with_id("left"))
            .child_with("right", |c| c)
            .build();

        let mut manual = Chunk::with_id("root");
        manual.set_attribute("a", "1");
        manual.set_attribute("b", "2");
        manual.set_payload("hello");
        manual.append_child(Chunk::with_id("left"));
        manual.append_child(Chunk::with_id("right"));

        assert_eq!(built, manual);
        assert_eq!(built.size(), manual.update());
    }

    #[test]
    fn test_builder_attributes_iter() {
        let built = ChunkBuilder::new("x")
            .attributes([("k1", 1u32), ("k2", 2000u32)])
            .build();
        assert_eq!(built.attribute("k1"), Some(&[1u8][..]));
        assert_eq!(built.attribute("k2"), Some(&b"2000"[..]));
    }
}
