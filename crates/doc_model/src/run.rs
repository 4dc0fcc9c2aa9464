//! Text run node - a contiguous span of text with consistent formatting

use crate::{Node, NodeId, NodeType, StyleId};
use serde::{Deserialize, Serialize};

/// A text run - contiguous text with consistent formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    id: NodeId,
    parent: Option<NodeId>,
    /// The text content of this run
    pub text: String,
    /// Character style ID reference
    #[serde(default)]
    pub character_style_id: Option<StyleId>,
}

impl Run {
    /// Create a new run with text content
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            text: text.into(),
            character_style_id: None,
        }
    }

    /// Create a new run with text and character style ID
    pub fn with_character_style(text: impl Into<String>, style_id: impl Into<StyleId>) -> Self {
        Self {
            character_style_id: Some(style_id.into()),
            ..Self::new(text)
        }
    }

    /// Set the character style ID
    pub fn set_character_style(&mut self, style_id: Option<StyleId>) {
        self.character_style_id = style_id;
    }

    /// Check whether the run carries the given character style
    pub fn has_character_style(&self, style: &str) -> bool {
        self.character_style_id
            .as_ref()
            .is_some_and(|id| id.as_str() == style)
    }
}

impl Node for Run {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Run
    }

    fn children(&self) -> &[NodeId] {
        // Runs have no children
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

    fn text_content(&self) -> Option<&str> {
        Some(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_style_check() {
        let mut run = Run::with_character_style("[DELETE]", "Toggle");
        assert!(run.has_character_style("Toggle"));
        assert!(!run.has_character_style("Strong"));

        run.set_character_style(None);
        assert!(!run.has_character_style("Toggle"));
        assert_eq!(run.text_content(), Some("[DELETE]"));
    }
}
