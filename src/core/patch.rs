//! Text patches over the original source buffer.
//!
//! Every edit is recorded in original-buffer coordinates and applied in a
//! single forward splice, so no offset ever has to be shifted by hand.

use crate::core::error::{Result, TransformError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PatchKind {
    /// Delete `[start, end)`.
    Remove,
    /// Replace `[start, end)` with `text`.
    Overwrite,
    /// Insert `text` at `start` (`start == end`).
    Insert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub kind: PatchKind,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Patch {
    pub fn remove(start: usize, end: usize) -> Self {
        Self {
            kind: PatchKind::Remove,
            start,
            end,
            text: String::new(),
        }
    }

    pub fn overwrite(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            kind: PatchKind::Overwrite,
            start,
            end,
            text: text.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            kind: PatchKind::Insert,
            start: at,
            end: at,
            text: text.into(),
        }
    }

    fn is_insert(&self) -> bool {
        self.start == self.end
    }
}

/// Ordered collection of patches for one compilation unit.
#[derive(Debug, Clone, Default)]
pub struct PatchSet {
    patches: Vec<Patch>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, patch: Patch) {
        self.patches.push(patch);
    }

    pub fn extend(&mut self, patches: impl IntoIterator<Item = Patch>) {
        self.patches.extend(patches);
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patch> {
        self.patches.iter()
    }

    /// Apply every patch to `original`.
    ///
    /// Inserts at the same offset keep the order they were pushed in and
    /// land before a range starting there. Overlapping ranges, inserts
    /// strictly inside a replaced range, and offsets that are out of bounds
    /// or not on a char boundary are rejected.
    pub fn apply(&self, original: &str, file: &str) -> Result<String> {
        let mut ordered: Vec<(usize, &Patch)> = self.patches.iter().enumerate().collect();
        ordered.sort_by_key(|(seq, p)| (p.start, !p.is_insert(), *seq));

        let mut out = String::with_capacity(original.len());
        let mut cursor = 0;
        for (_, patch) in ordered {
            if patch.start > patch.end || patch.end > original.len() {
                return Err(TransformError::serialization(
                    file,
                    format!("edit {}..{} is out of bounds", patch.start, patch.end),
                ));
            }
            if !original.is_char_boundary(patch.start) || !original.is_char_boundary(patch.end) {
                return Err(TransformError::serialization(
                    file,
                    format!("edit {}..{} splits a character", patch.start, patch.end),
                ));
            }
            if patch.start < cursor {
                return Err(TransformError::serialization(
                    file,
                    format!("overlapping edits at offset {}", patch.start),
                ));
            }
            out.push_str(&original[cursor..patch.start]);
            out.push_str(&patch.text);
            cursor = patch.end;
        }
        out.push_str(&original[cursor..]);
        Ok(out)
    }
}
