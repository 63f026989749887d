//! Content revisions for shared document storage
//!
//! [`ContentHash`] is a Blake3 digest of a document's text. Every edit
//! commits a new revision; callers holding text from elsewhere (a file on
//! disk) compare against it to skip reloads that would change nothing.

use std::fmt::{self, Display, Formatter};

/// Blake3 digest of a document's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash `text`
    #[inline]
    #[must_use]
    pub fn of_text(text: &str) -> Self {
        Self(*blake3::hash(text.as_bytes()).as_bytes())
    }

    /// First 8 bytes as hex, for logs
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_revision() {
        assert_eq!(ContentHash::of_text("* TODO a"), ContentHash::of_text("* TODO a"));
        assert_ne!(ContentHash::of_text("* TODO a"), ContentHash::of_text("* TODO b"));
    }

    #[test]
    fn short_prefixes_display() {
        let hash = ContentHash::of_text("outline");
        assert_eq!(hash.short().len(), 16);
        assert!(hash.to_string().starts_with(&hash.short()));
    }
}
