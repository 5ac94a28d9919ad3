//! Primitive encoding/decoding for the GAS binary format.
//!
//! Implements the GAS varint and length-prefixed byte strings.
//!
//! # Varint layout
//!
//! A value that fits in `7 * L` bits (strictly below `2^(7L) - 1`) occupies
//! exactly `L` bytes. The number of leading zero bits across the encoding,
//! counted up to the first set bit (the marker), is `L - 1`. Whole zero
//! bytes are emitted first, then the marker byte whose remaining low bits
//! carry the most significant value bits, then the rest of the value
//! big-endian:
//!
//! ```text
//! 0            -> 80
//! 126          -> fe
//! 127          -> 40 7f
//! 16383        -> 20 3f ff
//! 2^56 - 1     -> 00 80 ff ff ff ff ff ff ff
//! ```

use std::io::{self, BufRead, Read};

use crate::error::DecodeError;
use crate::limits::{MAX_VARINT_BYTES, MAX_VARINT_ZERO_BYTES};

/// Returns the number of bytes the varint encoding of `value` occupies.
#[inline]
pub fn encoded_len(value: u128) -> usize {
    // value < 2^(7L) - 1  <=>  value + 1 fits in 7L bits
    let bits = match value.checked_add(1) {
        Some(v) => 128 - v.leading_zeros() as usize,
        None => 129,
    };
    bits.div_ceil(7)
}

/// Encodes `value` as a standalone varint.
pub fn encode_varint(value: u128) -> Vec<u8> {
    let mut writer = Writer::with_capacity(encoded_len(value));
    writer.write_varint(value);
    writer.into_bytes()
}

/// Decodes a varint from the front of `input`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_varint(input: &[u8]) -> Result<(u128, usize), DecodeError> {
    let mut reader = Reader::new(input);
    let value = reader.read_varint("varint")?;
    Ok((value, reader.position() as usize))
}

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps any [`Read`] source (a byte slice is the in-memory case) and
/// provides methods for reading primitives with bounds checking. Tracks how
/// many bytes have been consumed.
#[derive(Debug)]
pub struct Reader<R> {
    inner: R,
    pos: u64,
}

impl<R: Read> Reader<R> {
    /// Creates a new reader over a byte source.
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }

    /// Returns the number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let mut byte = [0u8; 1];
        self.inner
            .read_exact(&mut byte)
            .map_err(|e| DecodeError::from_io(e, context))?;
        self.pos += 1;
        Ok(byte[0])
    }

    /// Reads exactly n bytes into a freshly allocated buffer.
    ///
    /// The buffer is reserved fallibly; an allocation failure is reported as
    /// [`DecodeError::OutOfMemory`] instead of aborting the process.
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<Vec<u8>, DecodeError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(n)
            .map_err(|_| DecodeError::OutOfMemory { field: context, len: n })?;
        let read = self
            .inner
            .by_ref()
            .take(n as u64)
            .read_to_end(&mut buf)
            .map_err(|e| DecodeError::from_io(e, context))?;
        self.pos += read as u64;
        if read < n {
            return Err(DecodeError::Truncated { context });
        }
        Ok(buf)
    }

    /// Discards exactly n bytes without buffering them.
    pub fn skip(&mut self, n: u64, context: &'static str) -> Result<(), DecodeError> {
        let skipped = io::copy(&mut self.inner.by_ref().take(n), &mut io::sink())
            .map_err(|e| DecodeError::from_io(e, context))?;
        self.pos += skipped;
        if skipped < n {
            return Err(DecodeError::Truncated { context });
        }
        Ok(())
    }

    /// Reads a GAS varint.
    pub fn read_varint(&mut self, context: &'static str) -> Result<u128, DecodeError> {
        let mut zero_bytes = 0usize;
        let marker = loop {
            let byte = self.read_byte(context)?;
            if byte != 0x00 {
                break byte;
            }
            zero_bytes += 1;
            if zero_bytes > MAX_VARINT_ZERO_BYTES {
                return Err(DecodeError::VarintTooLong);
            }
        };

        let first_bit_set = 7 - marker.leading_zeros() as usize;
        let mask = ((1u16 << first_bit_set) - 1) as u8;
        let mut value = (marker & mask) as u128;

        let additional = (7 - first_bit_set) + 7 * zero_bytes;
        for _ in 0..additional {
            if value >> 120 != 0 {
                return Err(DecodeError::VarintOverflow);
            }
            let byte = self.read_byte(context)?;
            value = (value << 8) | byte as u128;
        }
        Ok(value)
    }

    /// Reads a varint length field and checks it against `max`.
    ///
    /// Nothing past the varint is consumed when the check fails.
    pub fn read_length(&mut self, max: usize, field: &'static str) -> Result<usize, DecodeError> {
        let len = self.read_varint(field)?;
        if len > max as u128 {
            tracing::debug!(field, len = %len, max, "length field exceeds limit");
            return Err(DecodeError::SizeLimitExceeded { field, len, max });
        }
        Ok(len as usize)
    }

    /// Reads a length-prefixed byte string.
    pub fn read_bytes_prefixed(
        &mut self,
        max_len: usize,
        field: &'static str,
    ) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_length(max_len, field)?;
        self.read_bytes(len, field)
    }
}

impl<R: BufRead> Reader<R> {
    /// Returns true if the source has no more bytes.
    pub fn at_end(&mut self) -> Result<bool, DecodeError> {
        let buf = self
            .inner
            .fill_buf()
            .map_err(|e| DecodeError::from_io(e, "end of input"))?;
        Ok(buf.is_empty())
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a GAS varint.
    pub fn write_varint(&mut self, value: u128) {
        let len = encoded_len(value);
        let zero_count = len - 1;
        let zero_bytes = zero_count / 8;
        let zero_bits = zero_count % 8;
        // bytes following the marker
        let tail = len - zero_bytes - 1;

        let mut buf = [0u8; MAX_VARINT_BYTES];
        let high = value.checked_shr((tail * 8) as u32).unwrap_or(0) as u8;
        buf[zero_bytes] = (0x80u8 >> zero_bits) | high;
        for i in 0..tail {
            buf[zero_bytes + 1 + i] = (value >> ((tail - 1 - i) * 8)) as u8;
        }
        self.buf.extend_from_slice(&buf[..len]);
    }

    /// Writes a length or count as a varint.
    #[inline]
    pub fn write_length(&mut self, len: usize) {
        self.write_varint(len as u128);
    }

    /// Writes a length-prefixed byte string.
    pub fn write_bytes_prefixed(&mut self, bytes: &[u8]) {
        self.write_length(bytes.len());
        self.buf.extend_from_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roundtrip(v: u128) -> u128 {
        let bytes = encode_varint(v);
        assert_eq!(bytes.len(), encoded_len(v), "length mismatch for {}", v);
        let (decoded, consumed) = decode_varint(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        decoded
    }

    #[test]
    fn test_varint_roundtrip() {
        let test_values = [
            0u128,
            1,
            126,
            127,
            128,
            16382,
            16383,
            16384,
            1 << 21,
            1 << 28,
            1 << 35,
            (1 << 56) - 2,
            (1 << 56) - 1,
            u64::MAX as u128,
            (1 << 112) - 2,
            (1 << 112) - 1,
            1 << 120,
            u128::MAX,
        ];

        for v in test_values {
            assert_eq!(roundtrip(v), v, "failed for {}", v);
        }
    }

    #[test]
    fn test_varint_known_encodings() {
        assert_eq!(encode_varint(0), vec![0x80]);
        assert_eq!(encode_varint(1), vec![0x81]);
        assert_eq!(encode_varint(126), vec![0xfe]);
        assert_eq!(encode_varint(127), vec![0x40, 0x7f]);
        assert_eq!(encode_varint(128), vec![0x40, 0x80]);
        assert_eq!(encode_varint(16382), vec![0x7f, 0xfe]);
        assert_eq!(encode_varint(16383), vec![0x20, 0x3f, 0xff]);

        let mut expected = vec![0x00, 0x80];
        expected.extend_from_slice(&[0xff; 7]);
        assert_eq!(encode_varint((1 << 56) - 1), expected);
    }

    #[test]
    fn test_varint_multiple_zero_bytes() {
        let v = (1u128 << 112) - 1;
        let bytes = encode_varint(v);
        assert_eq!(bytes.len(), 17);
        assert_eq!(&bytes[..3], &[0x00, 0x00, 0x80]);

        let bytes = encode_varint(u128::MAX);
        assert_eq!(bytes.len(), MAX_VARINT_BYTES);
        assert_eq!(&bytes[..3], &[0x00, 0x00, 0x20]);
        assert!(bytes[3..].iter().all(|&b| b == 0xff));
    }

    #[test]
    fn test_varint_length_is_minimal() {
        let mut v: u128 = 0;
        while v < (1 << 100) {
            let len = encoded_len(v);
            if len > 1 {
                // a value that fits in one byte fewer would have used it
                let shorter_limit = (1u128 << (7 * (len - 1))) - 1;
                assert!(v >= shorter_limit, "{} encoded in {} bytes", v, len);
            }
            v = v * 3 + 1;
        }
    }

    #[test]
    fn test_varint_length_boundaries() {
        for len in 1..=18usize {
            let boundary = (1u128 << (7 * len)) - 1;
            assert_eq!(encoded_len(boundary - 1), len);
            assert_eq!(encoded_len(boundary), len + 1);
        }
    }

    #[test]
    fn test_varint_truncated() {
        let result = decode_varint(&[]);
        assert!(matches!(result, Err(DecodeError::Truncated { .. })));

        let result = decode_varint(&[0x40]);
        assert!(matches!(result, Err(DecodeError::Truncated { .. })));

        let result = decode_varint(&[0x00, 0x00]);
        assert!(matches!(result, Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_varint_too_long() {
        let result = decode_varint(&[0x00, 0x00, 0x00, 0x80]);
        assert!(matches!(result, Err(DecodeError::VarintTooLong)));
    }

    #[test]
    fn test_varint_overflow() {
        // two zero bytes and a bare marker promise 21 more bytes: 168 bits
        let mut data = vec![0x00, 0x00, 0x01];
        data.extend_from_slice(&[0xff; 21]);
        let result = decode_varint(&data);
        assert!(matches!(result, Err(DecodeError::VarintOverflow)));
    }

    #[test]
    fn test_non_minimal_encoding_still_decodes() {
        // 5 written in two bytes
        assert_eq!(decode_varint(&[0x40, 0x05]).unwrap(), (5, 2));
    }

    #[test]
    fn test_read_length_limit() {
        let mut writer = Writer::new();
        writer.write_length(1000);
        writer.write_bytes(&[0u8; 1000]);

        let mut reader = Reader::new(writer.as_bytes());
        let result = reader.read_bytes_prefixed(100, "test");
        assert!(matches!(
            result,
            Err(DecodeError::SizeLimitExceeded { len: 1000, max: 100, .. })
        ));
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_bytes_prefixed_roundtrip() {
        let samples: [&[u8]; 4] = [b"", b"hello", b"with\0nul", &[0xff; 300]];

        for s in samples {
            let mut writer = Writer::new();
            writer.write_bytes_prefixed(s);

            let mut reader = Reader::new(writer.as_bytes());
            let decoded = reader.read_bytes_prefixed(1000, "test").unwrap();
            assert_eq!(s, decoded.as_slice());
        }
    }

    #[test]
    fn test_read_bytes_truncated() {
        let data = [0u8; 5];
        let mut reader = Reader::new(&data[..]);
        let result = reader.read_bytes(10, "test");
        assert!(matches!(result, Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_skip() {
        let data = [1u8, 2, 3, 4];
        let mut reader = Reader::new(&data[..]);
        reader.skip(3, "test").unwrap();
        assert_eq!(reader.read_byte("test").unwrap(), 4);
        assert!(matches!(
            reader.skip(1, "test"),
            Err(DecodeError::Truncated { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_varint_roundtrip(v in any::<u128>()) {
            let bytes = encode_varint(v);
            prop_assert_eq!(bytes.len(), encoded_len(v));
            prop_assert_eq!(decode_varint(&bytes).unwrap(), (v, bytes.len()));
        }

        #[test]
        fn prop_varint_roundtrip_small(v in any::<u32>()) {
            let v = v as u128;
            prop_assert_eq!(decode_varint(&encode_varint(v)).unwrap().0, v);
        }
    }
}
