//! Text selections passed to transformations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A region of a file, expressed in one-based lines and columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSelection {
    /// File containing the selection.
    pub filename: PathBuf,
    /// First selected line.
    #[serde(rename = "startline")]
    pub start_line: u32,
    /// First selected column.
    #[serde(rename = "startcol")]
    pub start_col: u32,
    /// Last selected line.
    #[serde(rename = "endline")]
    pub end_line: u32,
    /// Column just past the selection on the last line.
    #[serde(rename = "endcol")]
    pub end_col: u32,
}

impl TextSelection {
    /// Returns the same selection with `filename` joined onto `directory`.
    ///
    /// An absolute `filename` replaces `directory`, following [`Path::join`].
    #[must_use]
    pub fn resolved_against(&self, directory: &Path) -> Self {
        Self {
            filename: directory.join(&self.filename),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_filename() {
        let selection = TextSelection {
            filename: PathBuf::from("pkg/foo.go"),
            start_line: 3,
            start_col: 1,
            end_line: 3,
            end_col: 9,
        };
        let resolved = selection.resolved_against(Path::new("/work"));
        assert_eq!(resolved.filename, PathBuf::from("/work/pkg/foo.go"));
        assert_eq!(resolved.start_line, 3);
        assert_eq!(resolved.end_col, 9);
    }

    #[test]
    fn uses_protocol_field_names() {
        let selection: TextSelection = serde_json::from_str(
            r#"{"filename":"a.go","startline":1,"startcol":2,"endline":3,"endcol":4}"#,
        )
        .expect("parse");
        assert_eq!(selection.start_col, 2);
        assert_eq!(selection.end_line, 3);
    }
}
