//! Heading paths
//!
//! Provides [`HeadingPath`], the chain of heading titles from the outline
//! root down to one entry (`Projects/Website/Deploy`).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path of a heading within an outline
///
/// Segments are heading titles without to-do keywords, priority cookies or
/// tags. Displayed with `/` as the separator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct HeadingPath(Vec<String>);

impl HeadingPath {
    /// Empty path (outline root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments (equals the heading's nesting depth)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is the root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }
}

impl Display for HeadingPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl FromStr for HeadingPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments = s
            .split('/')
            .map(|seg| {
                let seg = seg.trim();
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

/// Errors related to heading paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("heading path contains empty segment")]
    EmptySegment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let path: HeadingPath = "Projects/Website/Deploy".parse().unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.segments()[2], "Deploy");
        assert_eq!(path.to_string(), "Projects/Website/Deploy");
    }

    #[test]
    fn empty_segment_rejected() {
        let result: Result<HeadingPath, _> = "a//b".parse();
        assert!(matches!(result, Err(PathError::EmptySegment)));
    }

    #[test]
    fn child_appends_segment() {
        let parent: HeadingPath = "a/b".parse().unwrap();
        let child = parent.child("c");
        assert_eq!(child.to_string(), "a/b/c");
        assert_eq!(parent.len(), 2);
        assert!(HeadingPath::root().is_empty());
        assert_eq!("".parse::<HeadingPath>().unwrap(), HeadingPath::root());
    }
}
