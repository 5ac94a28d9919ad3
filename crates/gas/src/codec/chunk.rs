//! Chunk tree encoding/decoding for the GAS binary format.
//!
//! Wire layout of one chunk (every integer is a GAS varint):
//!
//! ```text
//! size
//! idLength id
//! attrCount (keyLength key valueLength value)*   -- ascending key order
//! payloadLength payload
//! childCount chunk*
//! ```
//!
//! `size` is the body length: everything after the size varint itself.

use std::io::{BufRead, Read, Write};

use sha2::{Digest, Sha256};

use crate::codec::primitives::{Reader, Writer};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};
use crate::model::Chunk;

/// SHA-256 over a chunk's canonical encoding.
pub type ContentDigest = [u8; 32];

// =============================================================================
// DECODING
// =============================================================================

/// Options for decoding chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Ceiling for every decoded length field: sizes, counts and byte
    /// string lengths. Checked before anything is allocated or read.
    pub max_length: usize,

    /// Ceiling for nesting depth below the root chunk.
    pub max_depth: usize,

    /// Reject a chunk that carries the same attribute key twice.
    ///
    /// When disabled, the last occurrence wins.
    pub reject_duplicate_attributes: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            reject_duplicate_attributes: false,
        }
    }
}

impl DecodeOptions {
    /// Creates default decoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that also reject duplicate attribute keys.
    pub fn strict() -> Self {
        Self {
            reject_duplicate_attributes: true,
            ..Self::default()
        }
    }

    /// Sets the length ceiling.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Sets the depth ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Decodes exactly one chunk from a buffer with default options.
pub fn decode_chunk(input: &[u8]) -> Result<Chunk, DecodeError> {
    decode_chunk_with_options(input, &DecodeOptions::default())
}

/// Decodes exactly one chunk from a buffer.
///
/// Bytes left over after the chunk are an error; use [`decode_chunks`] for
/// buffers holding several chunks back to back.
pub fn decode_chunk_with_options(input: &[u8], options: &DecodeOptions) -> Result<Chunk, DecodeError> {
    let mut reader = Reader::new(input);
    let chunk = read_tree(&mut reader, options, 0)?;

    let count = input.len() - reader.position() as usize;
    if count != 0 {
        return Err(DecodeError::TrailingBytes { count });
    }
    Ok(chunk)
}

/// Decodes every chunk in a buffer of concatenated chunks.
pub fn decode_chunks(input: &[u8], options: &DecodeOptions) -> Result<Vec<Chunk>, DecodeError> {
    ChunkStream::with_options(input, *options).collect()
}

/// Reads one chunk from a byte stream.
///
/// Consumes exactly the bytes of that chunk, so the source can be read
/// again for a following chunk.
pub fn read_chunk<R: Read>(source: R, options: &DecodeOptions) -> Result<Chunk, DecodeError> {
    let mut reader = Reader::new(source);
    read_tree(&mut reader, options, 0)
}

/// Recursive descent over one chunk and its subtree.
pub(crate) fn read_tree<R: Read>(
    reader: &mut Reader<R>,
    options: &DecodeOptions,
    depth: usize,
) -> Result<Chunk, DecodeError> {
    if depth > options.max_depth {
        tracing::debug!(depth, max = options.max_depth, "chunk nesting too deep");
        return Err(DecodeError::DepthLimitExceeded {
            depth,
            max: options.max_depth,
        });
    }
    let max = options.max_length;

    let size = reader.read_length(max, "size")?;
    let id = reader.read_bytes_prefixed(max, "id")?;
    let mut chunk = Chunk::with_id(id);
    chunk.set_size(size);

    let attribute_count = reader.read_length(max, "attribute_count")?;
    for _ in 0..attribute_count {
        let key = reader.read_bytes_prefixed(max, "attribute_key")?;
        let value = reader.read_bytes_prefixed(max, "attribute_value")?;
        if options.reject_duplicate_attributes && chunk.has_attribute(&key) {
            return Err(DecodeError::DuplicateAttribute { key });
        }
        chunk.set_attribute(key, value);
    }

    let payload = reader.read_bytes_prefixed(max, "payload")?;
    chunk.set_payload(payload);

    // Grown one decoded child at a time: the count alone is never trusted
    // for an allocation.
    let child_count = reader.read_length(max, "child_count")?;
    let mut children = Vec::new();
    for _ in 0..child_count {
        children.push(read_tree(reader, options, depth + 1)?);
    }
    chunk.extend_children(children);

    tracing::trace!(
        depth,
        id = %chunk.id().escape_ascii(),
        size,
        attributes = attribute_count,
        payload = chunk.payload().len(),
        children = child_count,
        "decoded chunk"
    );
    Ok(chunk)
}

/// Iterator over chunks stored back to back in a stream.
///
/// Ends cleanly when the source is exhausted at a chunk boundary. After the
/// first error the iterator is fused and yields nothing further.
#[derive(Debug)]
pub struct ChunkStream<R> {
    reader: Reader<R>,
    options: DecodeOptions,
    failed: bool,
}

impl<R: BufRead> ChunkStream<R> {
    /// Creates a stream with default options.
    pub fn new(source: R) -> Self {
        Self::with_options(source, DecodeOptions::default())
    }

    /// Creates a stream with the given options.
    pub fn with_options(source: R, options: DecodeOptions) -> Self {
        Self {
            reader: Reader::new(source),
            options,
            failed: false,
        }
    }

    /// Returns the number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.reader.position()
    }
}

impl<R: BufRead> Iterator for ChunkStream<R> {
    type Item = Result<Chunk, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = match self.reader.at_end() {
            Ok(true) => return None,
            Ok(false) => read_tree(&mut self.reader, &self.options, 0),
            Err(e) => Err(e),
        };
        self.failed = result.is_err();
        Some(result)
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Options for encoding chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Skip the size update pass.
    ///
    /// Only sound when the tree has not been mutated since its last
    /// [`Chunk::update`] (or since it was decoded unchanged). Useful when the
    /// same tree is encoded repeatedly. Stale sizes produce a stream whose
    /// size fields disagree with its contents.
    pub assume_sizes_current: bool,
}

impl EncodeOptions {
    /// Creates default encoding options: sizes are recomputed first.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that reuse the cached sizes.
    pub fn assume_sizes_current() -> Self {
        Self {
            assume_sizes_current: true,
        }
    }
}

/// Encodes a chunk tree to canonical bytes, recomputing sizes first.
///
/// Attributes are emitted in ascending key order, so the same logical tree
/// always produces the same bytes.
pub fn encode_chunk(chunk: &mut Chunk) -> Vec<u8> {
    encode_chunk_with_options(chunk, EncodeOptions::default())
}

/// Encodes a chunk tree with the given options.
pub fn encode_chunk_with_options(chunk: &mut Chunk, options: EncodeOptions) -> Vec<u8> {
    if !options.assume_sizes_current {
        chunk.update();
    }
    let mut writer = Writer::with_capacity(chunk.total_size());
    write_tree(&mut writer, chunk);
    writer.into_bytes()
}

/// Encodes a chunk tree into a byte sink.
pub fn write_chunk<W: Write>(
    chunk: &mut Chunk,
    out: &mut W,
    options: EncodeOptions,
) -> Result<(), EncodeError> {
    let bytes = encode_chunk_with_options(chunk, options);
    out.write_all(&bytes)?;
    Ok(())
}

/// Computes the SHA-256 digest of the canonical encoding.
///
/// Identical logical trees have identical digests regardless of attribute
/// insertion order.
pub fn content_digest(chunk: &mut Chunk) -> ContentDigest {
    digest_encoded(&encode_chunk(chunk))
}

/// SHA-256 over bytes already produced by [`encode_chunk`].
///
/// Equals [`content_digest`] of the tree they encode, without encoding it
/// again.
pub fn digest_encoded(encoded: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(encoded);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hash);
    digest
}

impl Chunk {
    /// SHA-256 of this tree's canonical encoding. See [`content_digest`].
    pub fn content_digest(&mut self) -> ContentDigest {
        content_digest(self)
    }
}

fn write_tree(writer: &mut Writer, chunk: &Chunk) {
    tracing::trace!(
        id = %chunk.id().escape_ascii(),
        size = chunk.size(),
        children = chunk.child_count(),
        "encoding chunk"
    );
    writer.write_length(chunk.size());
    writer.write_bytes_prefixed(chunk.id());

    writer.write_length(chunk.attribute_count());
    for (key, value) in chunk.attributes() {
        writer.write_bytes_prefixed(key);
        writer.write_bytes_prefixed(value);
    }

    writer.write_bytes_prefixed(chunk.payload());

    writer.write_length(chunk.child_count());
    for child in chunk.children() {
        write_tree(writer, child);
    }
}
