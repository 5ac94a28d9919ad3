//! Binary encoding/decoding for GAS.
//!
//! - [`primitives`]: the varint codec and length-prefixed byte strings
//! - [`chunk`]: tree parser and canonical serializer
//! - [`scan`]: event-driven scanning with subtree pruning

pub mod chunk;
pub mod primitives;
pub mod scan;

pub use chunk::{
    content_digest, decode_chunk, decode_chunk_with_options, decode_chunks, digest_encoded, encode_chunk,
    encode_chunk_with_options, read_chunk, write_chunk, ChunkStream, ContentDigest, DecodeOptions,
    EncodeOptions,
};
pub use primitives::{decode_varint, encode_varint, encoded_len, Reader, Writer};
pub use scan::{scan, ScanSummary, Visit, Visitor};
