use std::io::{self, Write};

use similar::TextDiff;

/// Lines of unchanged context around each hunk.
const CONTEXT_RADIUS: usize = 3;

/// The before and after text of one file, renderable as a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    original: String,
    edited: String,
}

impl Patch {
    /// Creates a patch from the original and edited text.
    #[must_use]
    pub fn new(original: impl Into<String>, edited: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            edited: edited.into(),
        }
    }

    /// Text before the edits.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Text after the edits.
    #[must_use]
    pub fn edited(&self) -> &str {
        &self.edited
    }

    /// Returns `true` when the edits leave the text unchanged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.original == self.edited
    }

    /// Writes the patch as a unified diff with the given file labels.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `sink`.
    pub fn write<W: Write>(&self, src_label: &str, dst_label: &str, sink: &mut W) -> io::Result<()> {
        TextDiff::from_lines(self.original.as_str(), self.edited.as_str())
            .unified_diff()
            .context_radius(CONTEXT_RADIUS)
            .header(src_label, dst_label)
            .to_writer(sink)
    }

    /// Renders the patch as a unified diff string.
    #[must_use]
    pub fn to_unified(&self, src_label: &str, dst_label: &str) -> String {
        TextDiff::from_lines(self.original.as_str(), self.edited.as_str())
            .unified_diff()
            .context_radius(CONTEXT_RADIUS)
            .header(src_label, dst_label)
            .to_string()
    }
}
