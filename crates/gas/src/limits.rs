//! Security limits and defaults for decoding.
//!
//! Every length field read from a stream is checked against these ceilings
//! before any allocation happens, so a hostile stream cannot request
//! unbounded memory.

/// Default ceiling for any decoded length field (sizes, counts, byte lengths).
pub const DEFAULT_MAX_LENGTH: usize = 32767;

/// Default ceiling for chunk nesting depth. Parsing recurses once per level.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Leading zero bytes a varint may carry. Two are enough for any `u128`.
pub const MAX_VARINT_ZERO_BYTES: usize = 2;

/// Longest encoding of a `u128` varint (`u128::MAX` needs 19 bytes).
pub const MAX_VARINT_BYTES: usize = 19;
