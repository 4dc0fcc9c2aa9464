//! Section breaks and opaque body blocks

use crate::{Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// How a new section starts (section break type)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionBreakType {
    /// Start on a new page (default)
    #[default]
    NextPage,
    /// Continue on the same page (continuous)
    Continuous,
    /// Start on the next even page
    EvenPage,
    /// Start on the next odd page
    OddPage,
}

/// A section break sitting between body blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionBreak {
    id: NodeId,
    parent: Option<NodeId>,
    /// How the following section starts
    #[serde(default)]
    pub break_type: SectionBreakType,
}

impl SectionBreak {
    pub fn new(break_type: SectionBreakType) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            break_type,
        }
    }
}

impl Default for SectionBreak {
    fn default() -> Self {
        Self::new(SectionBreakType::default())
    }
}

impl Node for SectionBreak {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::SectionBreak
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

/// A body-level element carried through untouched (structured tags,
/// custom XML, and the like). Only its original tag name is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpaqueBlock {
    id: NodeId,
    parent: Option<NodeId>,
    /// Original element tag
    pub tag: String,
}

impl OpaqueBlock {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            tag: tag.into(),
        }
    }
}

impl Node for OpaqueBlock {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Opaque
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
