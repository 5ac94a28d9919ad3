//! Utility modules for GAS.

pub mod dump;

pub use dump::{dump, dump_string, hexdump};
