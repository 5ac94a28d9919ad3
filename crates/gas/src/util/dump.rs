//! Human-readable listings of chunk trees and raw bytes.
//!
//! The tree listing prints one block per chunk, children indented two
//! spaces per level:
//!
//! ```text
//! ---
//! root[26]
//! a: "1"
//! payload[5]: "hello"
//!   ---
//!   left[8]
//! ```
//!
//! Sizes are the cached values, so run [`Chunk::update`] first on a tree
//! that was modified after it was decoded or built.

use std::fmt::{self, Write};

use crate::model::Chunk;

/// Writes the indented listing of `chunk` and its subtree.
pub fn dump<W: Write>(chunk: &Chunk, out: &mut W) -> fmt::Result {
    dump_prefixed(chunk, "", out)
}

/// Returns the indented listing of `chunk` and its subtree.
pub fn dump_string(chunk: &Chunk) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = dump(chunk, &mut out);
    out
}

fn dump_prefixed<W: Write>(chunk: &Chunk, prefix: &str, out: &mut W) -> fmt::Result {
    writeln!(out, "{prefix}---")?;
    if chunk.id().is_empty() {
        writeln!(out, "{prefix}\"\"[{}]", chunk.size())?;
    } else {
        writeln!(out, "{prefix}{}[{}]", chunk.id().escape_ascii(), chunk.size())?;
    }
    for (key, value) in chunk.attributes() {
        writeln!(out, "{prefix}{}: \"{}\"", key.escape_ascii(), value.escape_ascii())?;
    }
    if !chunk.payload().is_empty() {
        writeln!(
            out,
            "{prefix}payload[{}]: \"{}\"",
            chunk.payload().len(),
            chunk.payload().escape_ascii()
        )?;
    }

    let child_prefix = format!("{prefix}  ");
    for child in chunk.children() {
        dump_prefixed(child, &child_prefix, out)?;
    }
    Ok(())
}

/// Writes a classic hex dump: offset, 16 hex bytes, ASCII gutter.
pub fn hexdump<W: Write>(bytes: &[u8], out: &mut W) -> fmt::Result {
    for (line, row) in bytes.chunks(16).enumerate() {
        write!(out, "{:08x} ", line * 16)?;
        for i in 0..16 {
            match row.get(i) {
                Some(b) => write!(out, " {:02x}", b)?,
                None => out.write_str("   ")?,
            }
            if i == 7 {
                out.write_char(' ')?;
            }
        }
        out.write_str("  |")?;
        for &b in row {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            };
            out.write_char(c)?;
        }
        out.write_str("|\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChunkBuilder;

    #[test]
    fn test_dump_tree() {
        let tree = ChunkBuilder::new("root")
            .attribute("b", "2")
            .attribute("a", "1")
            .payload("hello")
            .child_with("left", |c| c)
            .child_with("right", |c| c.child_with("", |c| c.payload(&[0u8, b'q'][..])))
            .build();

        let right = tree.child(1).unwrap();
        let expected = format!(
            "---\n\
             root[{}]\n\
             a: \"1\"\n\
             b: \"2\"\n\
             payload[5]: \"hello\"\n  \
             ---\n  \
             left[8]\n  \
             ---\n  \
             right[{}]\n    \
             ---\n    \
             \"\"[{}]\n    \
             payload[2]: \"\\x00q\"\n",
            tree.size(),
            right.size(),
            right.child(0).unwrap().size(),
        );
        assert_eq!(dump_string(&tree), expected);
    }

    #[test]
    fn test_dump_escapes_binary_id() {
        let tree = ChunkBuilder::new(&[b'a', 0xff][..]).build();
        assert!(dump_string(&tree).starts_with("---\na\\xff[6]\n"));
    }

    #[test]
    fn test_hexdump() {
        let mut out = String::new();
        hexdump(b"0123456789abcdefXY\n", &mut out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "00000000  30 31 32 33 34 35 36 37  38 39 61 62 63 64 65 66  |0123456789abcdef|"
        );
        assert!(lines[1].starts_with("00000010  58 59 0a "));
        assert!(lines[1].ends_with("  |XY.|"));
    }

    #[test]
    fn test_hexdump_empty() {
        let mut out = String::new();
        hexdump(&[], &mut out).unwrap();
        assert!(out.is_empty());
    }
}
