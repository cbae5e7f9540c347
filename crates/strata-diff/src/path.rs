//! Slash-addressed property paths.
//!
//! A [`PropertyPath`] names a location inside a property tree: `/title`,
//! `/meta/owner`, `/tags/2`. Paths are the addressable unit of conflict
//! detection — two edits conflict when their paths are equal or one is a
//! prefix of the other.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// The address of a property leaf or subtree.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// The root path (the whole property tree).
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build a path from segments.
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Parse a slash-separated path string like `/meta/owner`.
    ///
    /// The empty string and `/` both parse to the root path. Segments must
    /// be non-empty (no `//`).
    pub fn parse(s: &str) -> DiffResult<Self> {
        if s.is_empty() || s == "/" {
            return Ok(Self::root());
        }
        let stripped = s.strip_prefix('/').ok_or_else(|| DiffError::InvalidPath {
            path: s.to_string(),
            reason: "must start with '/'".into(),
        })?;
        let mut segments = Vec::new();
        for segment in stripped.split('/') {
            if segment.is_empty() {
                return Err(DiffError::InvalidPath {
                    path: s.to_string(),
                    reason: "segments must be non-empty".into(),
                });
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Extend this path with one more segment.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    /// The path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments (0 for the root).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns `true` if `self` is a strict prefix of `other`.
    ///
    /// The root path is a prefix of every non-root path.
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.segments.len() < other.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Returns `true` if the two paths address overlapping subtrees:
    /// equal, or one a prefix of the other. This is the conflict trigger
    /// used by merge classification.
    pub fn overlaps(&self, other: &Self) -> bool {
        self == other || self.is_prefix_of(other) || other.is_prefix_of(self)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyPath({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> PropertyPath {
        PropertyPath::parse(s).unwrap()
    }

    #[test]
    fn parse_and_display_roundtrip() {
        for s in ["/title", "/meta/owner", "/tags/2"] {
            assert_eq!(path(s).to_string(), s);
        }
    }

    #[test]
    fn root_parses_from_empty_and_slash() {
        assert!(path("").is_root());
        assert!(path("/").is_root());
        assert_eq!(PropertyPath::root().to_string(), "/");
    }

    #[test]
    fn parse_rejects_missing_leading_slash() {
        assert!(PropertyPath::parse("title").is_err());
    }

    #[test]
    fn parse_rejects_empty_segment() {
        assert!(PropertyPath::parse("/a//b").is_err());
    }

    #[test]
    fn prefix_detection() {
        assert!(path("/meta").is_prefix_of(&path("/meta/owner")));
        assert!(!path("/meta/owner").is_prefix_of(&path("/meta")));
        assert!(!path("/meta").is_prefix_of(&path("/meta")));
        assert!(!path("/met").is_prefix_of(&path("/meta/owner")));
    }

    #[test]
    fn root_is_prefix_of_everything() {
        assert!(PropertyPath::root().is_prefix_of(&path("/a")));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = path("/meta");
        let b = path("/meta/owner");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(a.overlaps(&a));
    }

    #[test]
    fn disjoint_paths_do_not_overlap() {
        assert!(!path("/title").overlaps(&path("/body")));
        assert!(!path("/meta/owner").overlaps(&path("/meta2")));
    }

    #[test]
    fn child_extends() {
        let p = PropertyPath::root().child("meta").child("owner");
        assert_eq!(p, path("/meta/owner"));
        assert_eq!(p.depth(), 2);
    }
}
