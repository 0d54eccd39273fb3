//! Reaction identifier - the API-ready form of an emoji

use std::fmt;

/// An emoji in the form the reaction endpoints accept.
///
/// Either a literal unicode sequence (`😀`) or a custom emoji reference
/// (`name:id`). The value is not percent-encoded; the HTTP layer encodes it
/// when it becomes a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReactionId(String);

impl ReactionId {
    /// Wrap an already-resolved emoji string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build a custom emoji reference
    pub fn custom(name: &str, id: impl fmt::Display) -> Self {
        Self(format!("{name}:{id}"))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this references a custom guild emoji rather than unicode
    pub fn is_custom(&self) -> bool {
        self.0
            .rsplit_once(':')
            .is_some_and(|(name, id)| {
                !name.is_empty() && !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
            })
    }
}

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
