//! Conversion of caller values into the opaque byte strings GAS stores.
//!
//! Ids, attribute keys and values, and payloads are raw bytes. Anything
//! byte-like passes through untouched. Integers are converted at this
//! boundary and never reinterpreted afterwards:
//!
//! - a value in `0..=255` becomes that single byte, whatever its type
//! - any other value becomes its decimal ASCII representation
//!
//! ```rust
//! use gas::model::IntoBytes;
//!
//! assert_eq!(7u8.into_bytes(), vec![7]);
//! assert_eq!(7u32.into_bytes(), vec![7]);
//! assert_eq!(1000u32.into_bytes(), b"1000".to_vec());
//! assert_eq!((-12i64).into_bytes(), b"-12".to_vec());
//! ```

/// Values that can be stored as an id, attribute key/value or payload.
pub trait IntoBytes {
    /// Converts the value into its stored byte representation.
    fn into_bytes(self) -> Vec<u8>;
}

impl IntoBytes for Vec<u8> {
    fn into_bytes(self) -> Vec<u8> {
        self
    }
}

impl IntoBytes for &Vec<u8> {
    fn into_bytes(self) -> Vec<u8> {
        self.clone()
    }
}

impl IntoBytes for &[u8] {
    fn into_bytes(self) -> Vec<u8> {
        self.to_vec()
    }
}

impl<const N: usize> IntoBytes for [u8; N] {
    fn into_bytes(self) -> Vec<u8> {
        self.to_vec()
    }
}

impl<const N: usize> IntoBytes for &[u8; N] {
    fn into_bytes(self) -> Vec<u8> {
        self.to_vec()
    }
}

impl IntoBytes for &str {
    fn into_bytes(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl IntoBytes for String {
    fn into_bytes(self) -> Vec<u8> {
        String::into_bytes(self)
    }
}

impl IntoBytes for &String {
    fn into_bytes(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl IntoBytes for u8 {
    fn into_bytes(self) -> Vec<u8> {
        vec![self]
    }
}

macro_rules! integer_into_bytes {
    ($($ty:ty),*) => {
        $(
            impl IntoBytes for $ty {
                fn into_bytes(self) -> Vec<u8> {
                    match u8::try_from(self) {
                        Ok(byte) => vec![byte],
                        Err(_) => self.to_string().into_bytes(),
                    }
                }
            }
        )*
    };
}

integer_into_bytes!(u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
