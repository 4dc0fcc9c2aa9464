//! Table model - tables, rows and cells
//!
//! Tables own rows, rows own cells, and cells own paragraphs. Column
//! membership is positional: the column of a cell is its index within the
//! owning row.

use crate::{Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

// =============================================================================
// Table Cell
// =============================================================================

/// A cell in a table row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCell {
    id: NodeId,
    parent: Option<NodeId>,
    /// IDs of child paragraphs
    children: Vec<NodeId>,
}

impl TableCell {
    /// Create a new empty cell
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Add a child paragraph ID
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

impl Default for TableCell {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for TableCell {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::TableCell
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

// =============================================================================
// Table Row
// =============================================================================

/// A row in a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    id: NodeId,
    parent: Option<NodeId>,
    /// IDs of child cells
    cells: Vec<NodeId>,
}

impl TableRow {
    /// Create a new empty row
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            cells: Vec::new(),
        }
    }

    /// Add a cell ID
    pub fn add_cell(&mut self, cell_id: NodeId) {
        self.cells.push(cell_id);
    }

    /// Insert a cell at a specific index
    pub fn insert_cell(&mut self, index: usize, cell_id: NodeId) {
        let index = index.min(self.cells.len());
        self.cells.insert(index, cell_id);
    }

    /// Remove a cell by ID
    pub fn remove_cell(&mut self, cell_id: NodeId) -> bool {
        if let Some(pos) = self.cells.iter().position(|&id| id == cell_id) {
            self.cells.remove(pos);
            true
        } else {
            false
        }
    }

    /// Get the number of cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

impl Default for TableRow {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for TableRow {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::TableRow
    }

    fn children(&self) -> &[NodeId] {
        &self.cells
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

// =============================================================================
// Table
// =============================================================================

/// A table containing rows and cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    id: NodeId,
    parent: Option<NodeId>,
    /// IDs of rows
    rows: Vec<NodeId>,
    /// Optional caption or alt text
    #[serde(default)]
    pub caption: Option<String>,
}

impl Table {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            rows: Vec::new(),
            caption: None,
        }
    }

    /// Add a row ID
    pub fn add_row(&mut self, row_id: NodeId) {
        self.rows.push(row_id);
    }

    /// Insert a row at a specific index
    pub fn insert_row(&mut self, index: usize, row_id: NodeId) {
        let index = index.min(self.rows.len());
        self.rows.insert(index, row_id);
    }

    /// Remove a row by ID
    pub fn remove_row(&mut self, row_id: NodeId) -> bool {
        if let Some(pos) = self.rows.iter().position(|&id| id == row_id) {
            self.rows.remove(pos);
            true
        } else {
            false
        }
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for Table {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Table
    }

    fn children(&self) -> &[NodeId] {
        &self.rows
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
