//! Field path normalization.
//!
//! Rule definitions address event fields with dot notation (`source.ip`).
//! Events are addressed internally with JSON pointers (`/source/ip`). The
//! conversion happens once, when a rule is built, and the resulting
//! [`FieldPath`] is reused for every event.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, SyntaxError};

/// A dot-notation path that designates the whole document.
pub const ROOT_PATH: &str = ".";

/// A normalized field path.
///
/// Keeps both the user-facing dotted form (for messages) and the JSON
/// pointer form used to address the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldPath {
    dotted: String,
    pointer: String,
}

impl FieldPath {
    /// Normalize a dotted path.
    ///
    /// | Input       | Pointer         |
    /// |-------------|-----------------|
    /// | `.`         | `` (root)       |
    /// | `a`         | `/a`            |
    /// | `a.b.c`     | `/a/b/c`        |
    /// | `a/b`       | `/a~1b`         |
    /// | `a~b`       | `/a~0b`         |
    pub fn parse(dotted: &str) -> Result<Self> {
        if dotted.is_empty() {
            return Err(SyntaxError::EmptyPath);
        }

        if dotted == ROOT_PATH {
            return Ok(FieldPath {
                dotted: dotted.to_string(),
                pointer: String::new(),
            });
        }

        let mut pointer = String::with_capacity(dotted.len() + 1);
        for segment in dotted.split('.') {
            pointer.push('/');
            for c in segment.chars() {
                match c {
                    '~' => pointer.push_str("~0"),
                    '/' => pointer.push_str("~1"),
                    _ => pointer.push(c),
                }
            }
        }

        Ok(FieldPath {
            dotted: dotted.to_string(),
            pointer,
        })
    }

    /// The JSON pointer form (`/a/b`), empty for the root.
    pub fn as_pointer(&self) -> &str {
        &self.pointer
    }

    /// The dotted form the path was written in.
    pub fn as_dotted(&self) -> &str {
        &self.dotted
    }

    /// Returns `true` if the path designates the whole document.
    pub fn is_root(&self) -> bool {
        self.pointer.is_empty()
    }

    /// Unescaped pointer segments, in order.
    pub fn segments(&self) -> Vec<String> {
        if self.is_root() {
            return Vec::new();
        }
        self.pointer[1..]
            .split('/')
            .map(|s| s.replace("~1", "/").replace("~0", "~"))
            .collect()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segment() {
        let p = FieldPath::parse("user").unwrap();
        assert_eq!(p.as_pointer(), "/user");
        assert_eq!(p.segments(), vec!["user"]);
    }

    #[test]
    fn test_nested_segments() {
        let p = FieldPath::parse("process.parent.name").unwrap();
        assert_eq!(p.as_pointer(), "/process/parent/name");
        assert_eq!(p.to_string(), "process.parent.name");
    }

    #[test]
    fn test_root() {
        let p = FieldPath::parse(".").unwrap();
        assert!(p.is_root());
        assert_eq!(p.as_pointer(), "");
        assert!(p.segments().is_empty());
    }

    #[test]
    fn test_pointer_escapes() {
        let p = FieldPath::parse("a/b.c~d").unwrap();
        assert_eq!(p.as_pointer(), "/a~1b/c~0d");
        assert_eq!(p.segments(), vec!["a/b", "c~d"]);
    }

    #[test]
    fn test_empty_path_is_rejected() {
        assert_eq!(FieldPath::parse(""), Err(SyntaxError::EmptyPath));
    }

    #[test]
    fn test_empty_inner_segment_is_kept() {
        // "a..b" addresses the member "" inside "a"
        let p = FieldPath::parse("a..b").unwrap();
        assert_eq!(p.as_pointer(), "/a//b");
        assert_eq!(p.segments(), vec!["a", "", "b"]);
    }
}
