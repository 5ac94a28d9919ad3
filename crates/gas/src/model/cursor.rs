//! Parent-aware read cursor over a chunk tree.
//!
//! Chunks own their children, so a chunk cannot hold a pointer back to its
//! parent without sharing. A [`ChunkRef`] instead borrows the chain of
//! ancestors it was reached through, which gives every non-root node a
//! parent that lives exactly as long as the borrow of the tree.

use std::ops::Deref;

use crate::model::chunk::Chunk;

/// A borrowed chunk together with the ancestors it was reached through.
#[derive(Debug, Clone)]
pub struct ChunkRef<'a> {
    chunk: &'a Chunk,
    ancestors: Vec<&'a Chunk>,
    index: Option<usize>,
}

impl<'a> ChunkRef<'a> {
    /// Creates a cursor treating `chunk` as the root.
    pub fn root(chunk: &'a Chunk) -> Self {
        Self {
            chunk,
            ancestors: Vec::new(),
            index: None,
        }
    }

    /// Returns the chunk this cursor points at.
    pub fn chunk(&self) -> &'a Chunk {
        self.chunk
    }

    /// Returns the parent chunk, or `None` at the root.
    pub fn parent(&self) -> Option<&'a Chunk> {
        self.ancestors.last().copied()
    }

    /// Returns a cursor positioned at the parent, or `None` at the root.
    pub fn up(&self) -> Option<ChunkRef<'a>> {
        let (&parent, rest) = self.ancestors.split_last()?;
        let index = match rest.last() {
            Some(grandparent) => grandparent
                .children()
                .iter()
                .position(|c| std::ptr::eq(c, parent)),
            None => None,
        };
        Some(ChunkRef {
            chunk: parent,
            ancestors: rest.to_vec(),
            index,
        })
    }

    /// Returns a cursor positioned at the child at `index`.
    pub fn child(&self, index: usize) -> Option<ChunkRef<'a>> {
        let child = self.chunk.children().get(index)?;
        Some(self.descend(child, index))
    }

    /// Iterates cursors over the children in order.
    pub fn children(&self) -> impl Iterator<Item = ChunkRef<'a>> + '_ {
        self.chunk
            .children()
            .iter()
            .enumerate()
            .map(move |(i, child)| self.descend(child, i))
    }

    /// Position of this chunk among its parent's children.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Number of ancestors; zero at the root.
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Returns true if this cursor has no parent.
    pub fn is_root(&self) -> bool {
        self.ancestors.is_empty()
    }

    /// Iterates ancestors from the parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &'a Chunk> + '_ {
        self.ancestors.iter().rev().copied()
    }

    /// Visits this chunk and every descendant in pre-order.
    pub fn walk<F>(&self, f: &mut F)
    where
        F: FnMut(&ChunkRef<'a>),
    {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    fn descend(&self, child: &'a Chunk, index: usize) -> ChunkRef<'a> {
        let mut ancestors = Vec::with_capacity(self.ancestors.len() + 1);
        ancestors.extend_from_slice(&self.ancestors);
        ancestors.push(self.chunk);
        ChunkRef {
            chunk: child,
            ancestors,
            index: Some(index),
        }
    }
}

impl Deref for ChunkRef<'_> {
    type Target = Chunk;

    fn deref(&self) -> &Chunk {
        self.chunk
    }
}
