//! Paragraph node - a block of content containing runs

use crate::{Node, NodeId, NodeType, StyleId, BODY_OUTLINE_LEVEL};
use serde::{Deserialize, Serialize};

/// A paragraph containing text runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    id: NodeId,
    parent: Option<NodeId>,
    /// IDs of child runs
    children: Vec<NodeId>,
    /// Paragraph style ID reference
    #[serde(default)]
    pub paragraph_style_id: Option<StyleId>,
    /// Outline level resolved from the style when the paragraph entered the tree
    #[serde(default)]
    outline_level: Option<u8>,
}

impl Paragraph {
    /// Create a new empty paragraph in the Normal style
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
            paragraph_style_id: Some(StyleId::new("Normal")),
            outline_level: None,
        }
    }

    /// Create a paragraph with a paragraph style ID
    pub fn with_paragraph_style(style_id: impl Into<StyleId>) -> Self {
        Self {
            paragraph_style_id: Some(style_id.into()),
            ..Self::new()
        }
    }

    /// Set the paragraph style ID.
    ///
    /// The outline level is not touched; the tree re-resolves it.
    pub fn set_paragraph_style(&mut self, style_id: Option<StyleId>) {
        self.paragraph_style_id = style_id;
    }

    /// Outline level, if the style carries one
    pub fn outline_level(&self) -> Option<u8> {
        self.outline_level
    }

    /// Outline level with body text mapped to [`BODY_OUTLINE_LEVEL`]
    pub fn effective_outline_level(&self) -> u8 {
        self.outline_level.unwrap_or(BODY_OUTLINE_LEVEL)
    }

    pub(crate) fn set_outline_level(&mut self, level: Option<u8>) {
        self.outline_level = level;
    }

    /// Add a child run ID
    pub fn add_child(&mut self, child_id: NodeId) {
        self.children.push(child_id);
    }

    /// Insert a child at a specific index
    pub fn insert_child(&mut self, index: usize, child_id: NodeId) {
        let index = index.min(self.children.len());
        self.children.insert(index, child_id);
    }

    /// Remove a child by ID
    pub fn remove_child(&mut self, child_id: NodeId) -> bool {
        if let Some(pos) = self.children.iter().position(|&id| id == child_id) {
            self.children.remove(pos);
            true
        } else {
            false
        }
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for Paragraph {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Paragraph
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn can_have_children(&self) -> bool {
        true
    }
}
