//! Bookmark - a named anchor sitting between body blocks
//!
//! In the source documents bookmarks appear as standalone markers among the
//! body's paragraphs and tables. They carry no text of their own but belong
//! to whatever section surrounds them.

use crate::{Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// Errors that can occur during bookmark validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkValidationError {
    /// Name is empty
    EmptyName,
    /// Name contains invalid characters
    InvalidCharacters,
    /// Name is too long (max 40 characters)
    NameTooLong,
}

impl std::fmt::Display for BookmarkValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookmarkValidationError::EmptyName => write!(f, "Bookmark name cannot be empty"),
            BookmarkValidationError::InvalidCharacters => {
                write!(f, "Bookmark name can only contain letters, numbers, and underscores")
            }
            BookmarkValidationError::NameTooLong => {
                write!(f, "Bookmark name cannot exceed 40 characters")
            }
        }
    }
}

impl std::error::Error for BookmarkValidationError {}

/// Maximum bookmark name length
pub const MAX_BOOKMARK_NAME_LENGTH: usize = 40;

/// Validate a bookmark name
pub fn validate_bookmark_name(name: &str) -> Result<(), BookmarkValidationError> {
    if name.is_empty() {
        return Err(BookmarkValidationError::EmptyName);
    }
    if name.len() > MAX_BOOKMARK_NAME_LENGTH {
        return Err(BookmarkValidationError::NameTooLong);
    }
    // Word's hidden bookmarks start with an underscore (e.g. "_Toc123")
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(BookmarkValidationError::InvalidCharacters);
    }
    Ok(())
}

/// A bookmark marker in a block container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkMarker {
    id: NodeId,
    parent: Option<NodeId>,
    /// Bookmark name
    name: String,
}

impl BookmarkMarker {
    /// Create a bookmark marker, validating its name
    pub fn new(name: impl Into<String>) -> Result<Self, BookmarkValidationError> {
        let name = name.into();
        validate_bookmark_name(&name)?;
        Ok(Self {
            id: NodeId::new(),
            parent: None,
            name,
        })
    }

    /// Get the bookmark name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Node for BookmarkMarker {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Bookmark
    }

    fn children(&self) -> &[NodeId] {
        &[]
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn can_have_children(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bookmark_name() {
        assert!(validate_bookmark_name("_Toc117").is_ok());
        assert!(validate_bookmark_name("Section5_2").is_ok());
        assert_eq!(validate_bookmark_name(""), Err(BookmarkValidationError::EmptyName));
        assert_eq!(
            validate_bookmark_name("has space"),
            Err(BookmarkValidationError::InvalidCharacters)
        );
        assert_eq!(
            validate_bookmark_name(&"a".repeat(41)),
            Err(BookmarkValidationError::NameTooLong)
        );
    }

    #[test]
    fn test_marker_construction() {
        let marker = BookmarkMarker::new("_Ref42").unwrap();
        assert_eq!(marker.name(), "_Ref42");
        assert_eq!(marker.node_type(), NodeType::Bookmark);
        assert!(BookmarkMarker::new("bad name").is_err());
    }
}
