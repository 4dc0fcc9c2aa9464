//! Core node trait and types

use crate::NodeId;
use serde::{Deserialize, Serialize};

/// Enumeration of all node types in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Document,
    Paragraph,
    Run,
    Table,
    TableRow,
    TableCell,
    Bookmark,
    SectionBreak,
    /// A body-level element the model carries but does not interpret
    Opaque,
}

impl NodeType {
    /// Markup-style tag used when reporting a node in logs
    pub fn tag(&self) -> &'static str {
        match self {
            NodeType::Document => "body",
            NodeType::Paragraph => "p",
            NodeType::Run => "r",
            NodeType::Table => "tbl",
            NodeType::TableRow => "tr",
            NodeType::TableCell => "tc",
            NodeType::Bookmark => "bookmarkStart",
            NodeType::SectionBreak => "sectPr",
            NodeType::Opaque => "opaque",
        }
    }
}

/// Common interface for all document nodes
pub trait Node: std::fmt::Debug {
    /// Get the unique ID of this node
    fn id(&self) -> NodeId;

    /// Get the type of this node
    fn node_type(&self) -> NodeType;

    /// Get the IDs of child nodes
    fn children(&self) -> &[NodeId];

    /// Get the ID of the parent node (None for root or detached nodes)
    fn parent(&self) -> Option<NodeId>;

    /// Set the parent node ID
    fn set_parent(&mut self, parent: Option<NodeId>);

    /// Check if this node can have children
    fn can_have_children(&self) -> bool;

    /// Get the text content of this node (if any)
    fn text_content(&self) -> Option<&str> {
        None
    }
}
