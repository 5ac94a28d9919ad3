//! Event-driven scanning of GAS streams without building a tree.
//!
//! A [`Visitor`] sees each chunk as it is read. After the id is known the
//! visitor may prune the chunk, in which case the rest of its body
//! (attributes, payload and the whole subtree) is skipped using the size
//! field, without allocating anything for it.
//!
//! ```rust
//! use gas::codec::scan::{scan, Visit, Visitor};
//! use gas::codec::{encode_chunk, DecodeOptions};
//! use gas::model::ChunkBuilder;
//!
//! struct Ids(Vec<Vec<u8>>);
//!
//! impl Visitor for Ids {
//!     fn enter(&mut self, id: &[u8], _depth: usize) -> Visit {
//!         self.0.push(id.to_vec());
//!         if id == b"skip" { Visit::Skip } else { Visit::Descend }
//!     }
//! }
//!
//! let mut tree = ChunkBuilder::new("root")
//!     .child_with("skip", |c| c.child_with("hidden", |c| c))
//!     .child_with("keep", |c| c)
//!     .build();
//! let bytes = encode_chunk(&mut tree);
//!
//! let mut ids = Ids(Vec::new());
//! scan(&bytes[..], &mut ids, &DecodeOptions::default()).unwrap();
//! assert_eq!(ids.0, vec![b"root".to_vec(), b"skip".to_vec(), b"keep".to_vec()]);
//! ```

use std::io::Read;

use rustc_hash::FxHashSet;

use crate::codec::chunk::DecodeOptions;
use crate::codec::primitives::{encoded_len, Reader};
use crate::error::DecodeError;

/// What to do with a chunk after its id has been seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Report attributes, payload and children.
    Descend,
    /// Skip the rest of the chunk and its subtree.
    Skip,
}

/// Callbacks invoked while scanning. All methods have no-op defaults.
pub trait Visitor {
    /// Called once the id of a chunk is read.
    fn enter(&mut self, _id: &[u8], _depth: usize) -> Visit {
        Visit::Descend
    }

    /// Called for each attribute, in stream order.
    fn attribute(&mut self, _key: &[u8], _value: &[u8]) {}

    /// Whether payload bytes should be read and passed to [`Visitor::payload`].
    ///
    /// When false the payload is skipped without being buffered.
    fn wants_payload(&self) -> bool {
        true
    }

    /// Called with the payload, before any child is entered.
    fn payload(&mut self, _payload: &[u8]) {}

    /// Called after the last child of a descended chunk.
    fn leave(&mut self, _id: &[u8], _depth: usize) {}
}

/// Counts of what a scan saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Chunks whose id was read, pruned ones included.
    pub chunks: usize,
    /// Chunks skipped by [`Visit::Skip`] (their descendants are not counted).
    pub skipped: usize,
    /// Total bytes consumed.
    pub bytes: u64,
}

/// Scans one chunk from `source`, driving `visitor`.
///
/// Applies the same limits as tree decoding.
pub fn scan<R: Read, V: Visitor + ?Sized>(
    source: R,
    visitor: &mut V,
    options: &DecodeOptions,
) -> Result<ScanSummary, DecodeError> {
    let mut reader = Reader::new(source);
    let mut summary = ScanSummary::default();
    scan_tree(&mut reader, visitor, options, 0, &mut summary)?;
    summary.bytes = reader.position();
    Ok(summary)
}

fn scan_tree<R: Read, V: Visitor + ?Sized>(
    reader: &mut Reader<R>,
    visitor: &mut V,
    options: &DecodeOptions,
    depth: usize,
    summary: &mut ScanSummary,
) -> Result<(), DecodeError> {
    if depth > options.max_depth {
        return Err(DecodeError::DepthLimitExceeded {
            depth,
            max: options.max_depth,
        });
    }
    let max = options.max_length;

    let size = reader.read_length(max, "size")?;
    let id = reader.read_bytes_prefixed(max, "id")?;
    summary.chunks += 1;

    if visitor.enter(&id, depth) == Visit::Skip {
        let consumed = encoded_len(id.len() as u128) + id.len();
        let remaining = size
            .checked_sub(consumed)
            .ok_or(DecodeError::InconsistentSize { size, consumed })?;
        tracing::debug!(id = %id.escape_ascii(), depth, remaining, "skipping chunk");
        reader.skip(remaining as u64, "skipped chunk")?;
        summary.skipped += 1;
        return Ok(());
    }

    let attribute_count = reader.read_length(max, "attribute_count")?;
    let mut seen = FxHashSet::default();
    for _ in 0..attribute_count {
        let key = reader.read_bytes_prefixed(max, "attribute_key")?;
        let value = reader.read_bytes_prefixed(max, "attribute_value")?;
        if options.reject_duplicate_attributes && !seen.insert(key.clone()) {
            return Err(DecodeError::DuplicateAttribute { key });
        }
        visitor.attribute(&key, &value);
    }

    if visitor.wants_payload() {
        let payload = reader.read_bytes_prefixed(max, "payload")?;
        visitor.payload(&payload);
    } else {
        let len = reader.read_length(max, "payload")?;
        reader.skip(len as u64, "payload")?;
    }

    let child_count = reader.read_length(max, "child_count")?;
    for _ in 0..child_count {
        scan_tree(reader, visitor, options, depth + 1, summary)?;
    }

    visitor.leave(&id, depth);
    Ok(())
}
