//! GAS: the Generic Attribute Structure binary format.
//!
//! This crate provides a tree model, a streaming parser and a canonical
//! serializer for GAS, a compact format for trees of chunks. Each chunk
//! carries an opaque id, a set of byte-string attributes, a payload and an
//! ordered list of children.
//!
//! # Quick Start
//!
//! ```rust
//! use gas::{decode_chunk, encode_chunk, ChunkBuilder};
//!
//! let mut tree = ChunkBuilder::new("root")
//!     .attribute("version", 2000u32)
//!     .payload("hello")
//!     .child_with("child", |c| c.attribute("k", "v"))
//!     .build();
//!
//! let bytes = encode_chunk(&mut tree);
//! let decoded = decode_chunk(&bytes).unwrap();
//!
//! assert_eq!(decoded, tree);
//! assert_eq!(decoded.attribute("version"), Some(&b"2000"[..]));
//! assert_eq!(decoded.cursor().child(0).unwrap().parent().unwrap().id(), b"root");
//! ```
//!
//! # Modules
//!
//! - [`model`]: Chunks, parent-aware cursors and the builder
//! - [`codec`]: Varints, the tree parser/serializer and the event scanner
//! - [`util`]: Text dumps of trees and raw bytes
//! - [`error`]: Error types
//! - [`limits`]: Default limits for decoding
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted input:
//! - Every length field is checked against a configurable ceiling before
//!   anything is read or allocated
//! - Allocation failures are reported instead of aborting
//! - Varints are limited to 128 bits and two leading zero bytes
//! - Nesting depth is bounded
//!
//! # Wire Format
//!
//! Integers use a prefix varint: the number of leading zero bits of the
//! first byte gives the count of bytes that follow, so the length is known
//! after one byte. A chunk is its body size followed by the id, attribute
//! pairs in ascending key order, the payload and the children, each
//! length-prefixed. See [`codec::chunk`] for the exact layout.

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod util;

// Re-export commonly used types at crate root
pub use codec::{
    content_digest, decode_chunk, decode_chunk_with_options, decode_chunks, digest_encoded, encode_chunk,
    encode_chunk_with_options, read_chunk, scan, write_chunk, ChunkStream, ContentDigest,
    DecodeOptions, EncodeOptions, Visit, Visitor,
};
pub use error::{ChunkError, DecodeError, EncodeError};
pub use model::{Chunk, ChunkBuilder, ChunkRef, IntoBytes};
pub use util::{dump_string, hexdump};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
