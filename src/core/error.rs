//! Errors raised while transforming one compilation unit.
//!
//! Both variants are fatal for the unit they describe. Comments without a
//! resolvable target are not errors; they are counted in
//! [`AnnotateReport`](crate::core::AnnotateReport) and left in place.

use thiserror::Error;

pub type Result<T, E = TransformError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Host source is malformed.
    #[error("{file}:{line}:{column}: parse error: {message}")]
    Parse {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },
    /// The patched source could not be produced.
    #[error("{file}: cannot apply edits: {message}")]
    Serialization { file: String, message: String },
}

impl TransformError {
    /// Build a parse error, computing line and column from a byte offset.
    pub fn parse_at(file: &str, source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_col(source, offset);
        TransformError::Parse {
            file: file.to_string(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn serialization(file: &str, message: impl Into<String>) -> Self {
        TransformError::Serialization {
            file: file.to_string(),
            message: message.into(),
        }
    }

    /// The file identifier carried by the error.
    pub fn file(&self) -> &str {
        match self {
            TransformError::Parse { file, .. } | TransformError::Serialization { file, .. } => file,
        }
    }
}

/// 1-based line and column (in chars) of `offset`.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let prefix = source.get(..offset).unwrap_or(source);
    let line = prefix.matches('\n').count() + 1;
    let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = prefix[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let src = "ab\ncd\nef";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 1), (1, 2));
        assert_eq!(line_col(src, 3), (2, 1));
        assert_eq!(line_col(src, 7), (3, 2));
        assert_eq!(line_col(src, 100), (3, 3));
    }

    #[test]
    fn test_parse_error_display() {
        let err = TransformError::parse_at("a.html", "<p>\n<!-- x", 4, "unterminated comment");
        assert_eq!(err.to_string(), "a.html:2:1: parse error: unterminated comment");
        assert_eq!(err.file(), "a.html");
    }

    #[test]
    fn test_serialization_error_display() {
        let err = TransformError::serialization("a.vue", "overlapping edits");
        assert_eq!(err.to_string(), "a.vue: cannot apply edits: overlapping edits");
    }
}
