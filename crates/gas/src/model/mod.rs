//! In-memory data model for GAS.
//!
//! - Chunks (tree nodes with id, attributes, payload, children)
//! - Cursors (parent-aware borrowed views)
//! - Byte conversion at the API boundary
//! - Builders (ergonomic construction)

pub mod builder;
pub mod chunk;
pub mod cursor;
pub mod field;

pub use builder::ChunkBuilder;
pub use chunk::{Chunk, ID_KEY, PAYLOAD_KEY};
pub use cursor::ChunkRef;
pub use field::IntoBytes;
