//! Text edits produced by transformations and their two encodings.
//!
//! An [`EditSet`] holds byte-offset replacements for a single file. The
//! request handler either renders it as a unified diff ([`Patch`]) or applies
//! it to produce the rewritten file content.

mod patch;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filesystem::{FileSystem, FileSystemError};

pub use self::patch::Patch;

/// Errors raised while applying an [`EditSet`].
#[derive(Debug, Clone, Error)]
pub enum EditError {
    /// Two edits touch the same bytes.
    #[error("overlapping edits: edit at offset {offset} starts before previous edit ends at {previous_end}")]
    Overlap {
        /// Byte offset of the offending edit.
        offset: usize,
        /// End offset of the edit preceding it.
        previous_end: usize,
    },

    /// An edit extends past the end of the file.
    #[error("edit at offset {offset} with length {length} exceeds file length {file_length}")]
    OutOfBounds {
        /// Byte offset of the edit.
        offset: usize,
        /// Number of bytes replaced.
        length: usize,
        /// Length of the original text.
        file_length: usize,
    },

    /// An edit boundary splits a UTF-8 character.
    #[error("edit range [{start}, {end}) is not aligned to UTF-8 character boundaries")]
    NotCharBoundary {
        /// Start of the replaced range.
        start: usize,
        /// End of the replaced range.
        end: usize,
    },

    /// The original file could not be read.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),
}

/// A single replacement of `length` bytes at `offset`.
///
/// Insertions have zero length; deletions have an empty replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    offset: usize,
    length: usize,
    replacement: String,
}

impl TextEdit {
    /// Builds a replacement edit.
    #[must_use]
    pub fn new(offset: usize, length: usize, replacement: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            replacement: replacement.into(),
        }
    }

    /// Creates an insertion at `offset`.
    #[must_use]
    pub fn insert_at(offset: usize, text: impl Into<String>) -> Self {
        Self::new(offset, 0, text)
    }

    /// Creates a deletion of `length` bytes at `offset`.
    #[must_use]
    pub fn delete(offset: usize, length: usize) -> Self {
        Self::new(offset, length, String::new())
    }

    /// Start offset in bytes.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes replaced.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Replacement text.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

/// The edits a transformation makes to one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditSet {
    edits: Vec<TextEdit>,
}

impl EditSet {
    /// Creates an empty edit set.
    #[must_use]
    pub const fn new() -> Self {
        Self { edits: Vec::new() }
    }

    /// Builds an edit set from existing edits.
    #[must_use]
    pub const fn from_edits(edits: Vec<TextEdit>) -> Self {
        Self { edits }
    }

    /// Adds an edit.
    pub fn add(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    /// Edits in insertion order.
    #[must_use]
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Returns `true` when the set holds no edits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Applies the edits to `original` and returns the rewritten text.
    ///
    /// Edits are applied in offset order; insertions sharing an offset keep
    /// their insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`EditError`] when edits overlap, run past the end of the text,
    /// or split a UTF-8 character.
    pub fn apply(&self, original: &str) -> Result<String, EditError> {
        let mut ordered: Vec<&TextEdit> = self.edits.iter().collect();
        ordered.sort_by_key(|edit| edit.offset);

        let mut output = String::with_capacity(original.len());
        let mut cursor = 0_usize;
        for edit in ordered {
            if edit.offset < cursor {
                return Err(EditError::Overlap {
                    offset: edit.offset,
                    previous_end: cursor,
                });
            }
            let end = edit
                .offset
                .checked_add(edit.length)
                .filter(|end| *end <= original.len())
                .ok_or(EditError::OutOfBounds {
                    offset: edit.offset,
                    length: edit.length,
                    file_length: original.len(),
                })?;
            output.push_str(slice(original, cursor, edit.offset)?);
            slice(original, edit.offset, end)?;
            output.push_str(&edit.replacement);
            cursor = end;
        }
        output.push_str(slice(original, cursor, original.len())?);
        Ok(output)
    }

    /// Reads `path` through `fs` and returns its content with the edits
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::FileSystem`] when the file cannot be read, or any
    /// error from [`EditSet::apply`].
    pub fn apply_to(&self, fs: &dyn FileSystem, path: &Path) -> Result<String, EditError> {
        let original = fs.read_to_string(path)?;
        self.apply(&original)
    }

    /// Builds a patch comparing the current content of `path` with the edited
    /// content.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`EditSet::apply_to`].
    pub fn create_patch(&self, fs: &dyn FileSystem, path: &Path) -> Result<Patch, EditError> {
        let original = fs.read_to_string(path)?;
        let edited = self.apply(&original)?;
        Ok(Patch::new(original, edited))
    }
}

impl FromIterator<TextEdit> for EditSet {
    fn from_iter<I: IntoIterator<Item = TextEdit>>(iter: I) -> Self {
        Self::from_edits(iter.into_iter().collect())
    }
}

fn slice(text: &str, start: usize, end: usize) -> Result<&str, EditError> {
    text.get(start..end)
        .ok_or(EditError::NotCharBoundary { start, end })
}
