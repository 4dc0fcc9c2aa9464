//! Document tree operations and storage

use crate::{
    BookmarkMarker, Document, DocModelError, Node, NodeId, NodeType, OpaqueBlock, Paragraph,
    Result, Run, SectionBreak, StyleId, StyleRegistry, Table, TableCell, TableRow,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage for different node types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeStorage {
    pub paragraphs: HashMap<NodeId, Paragraph>,
    pub runs: HashMap<NodeId, Run>,
    pub tables: HashMap<NodeId, Table>,
    pub table_rows: HashMap<NodeId, TableRow>,
    pub table_cells: HashMap<NodeId, TableCell>,
    #[serde(default)]
    pub bookmarks: HashMap<NodeId, BookmarkMarker>,
    #[serde(default)]
    pub section_breaks: HashMap<NodeId, SectionBreak>,
    #[serde(default)]
    pub opaque: HashMap<NodeId, OpaqueBlock>,
}

/// The complete document tree structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    /// The root document
    pub document: Document,
    /// Storage for all nodes
    pub nodes: NodeStorage,
    /// Style registry for this document
    #[serde(default)]
    pub styles: StyleRegistry,
}

impl DocumentTree {
    /// Create a new empty document tree
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            nodes: NodeStorage::default(),
            styles: StyleRegistry::default(),
        }
    }

    /// Load a tree from its JSON form, re-resolving outline levels
    pub fn from_json(json: &str) -> Result<Self> {
        let mut tree: DocumentTree = serde_json::from_str(json)?;
        tree.reindex_outline_levels();
        Ok(tree)
    }

    /// Serialize the tree to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Get the document root ID
    pub fn root_id(&self) -> NodeId {
        self.document.id()
    }

    /// Get the style registry
    pub fn style_registry(&self) -> &StyleRegistry {
        &self.styles
    }

    /// Get a mutable reference to the style registry.
    ///
    /// Call [`DocumentTree::reindex_outline_levels`] after changing heading
    /// styles so paragraphs pick up the new levels.
    pub fn style_registry_mut(&mut self) -> &mut StyleRegistry {
        &mut self.styles
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Get a paragraph by ID
    pub fn get_paragraph(&self, id: NodeId) -> Option<&Paragraph> {
        self.nodes.paragraphs.get(&id)
    }

    /// Get a run by ID
    pub fn get_run(&self, id: NodeId) -> Option<&Run> {
        self.nodes.runs.get(&id)
    }

    /// Get a mutable run by ID
    pub fn get_run_mut(&mut self, id: NodeId) -> Option<&mut Run> {
        self.nodes.runs.get_mut(&id)
    }

    /// Get a table by ID
    pub fn get_table(&self, id: NodeId) -> Option<&Table> {
        self.nodes.tables.get(&id)
    }

    /// Get a table row by ID
    pub fn get_table_row(&self, id: NodeId) -> Option<&TableRow> {
        self.nodes.table_rows.get(&id)
    }

    /// Get a table cell by ID
    pub fn get_table_cell(&self, id: NodeId) -> Option<&TableCell> {
        self.nodes.table_cells.get(&id)
    }

    /// Get the node type for a given ID
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        if id == self.document.id() {
            return Some(NodeType::Document);
        }
        if self.nodes.paragraphs.contains_key(&id) {
            return Some(NodeType::Paragraph);
        }
        if self.nodes.runs.contains_key(&id) {
            return Some(NodeType::Run);
        }
        if self.nodes.tables.contains_key(&id) {
            return Some(NodeType::Table);
        }
        if self.nodes.table_rows.contains_key(&id) {
            return Some(NodeType::TableRow);
        }
        if self.nodes.table_cells.contains_key(&id) {
            return Some(NodeType::TableCell);
        }
        if self.nodes.bookmarks.contains_key(&id) {
            return Some(NodeType::Bookmark);
        }
        if self.nodes.section_breaks.contains_key(&id) {
            return Some(NodeType::SectionBreak);
        }
        if self.nodes.opaque.contains_key(&id) {
            return Some(NodeType::Opaque);
        }
        None
    }

    /// Check whether a node is still present in the tree
    pub fn contains(&self, id: NodeId) -> bool {
        self.node_type(id).is_some()
    }

    /// Get the parent of a node
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        match self.node_type(id)? {
            NodeType::Document => None,
            NodeType::Paragraph => self.nodes.paragraphs.get(&id)?.parent(),
            NodeType::Run => self.nodes.runs.get(&id)?.parent(),
            NodeType::Table => self.nodes.tables.get(&id)?.parent(),
            NodeType::TableRow => self.nodes.table_rows.get(&id)?.parent(),
            NodeType::TableCell => self.nodes.table_cells.get(&id)?.parent(),
            NodeType::Bookmark => self.nodes.bookmarks.get(&id)?.parent(),
            NodeType::SectionBreak => self.nodes.section_breaks.get(&id)?.parent(),
            NodeType::Opaque => self.nodes.opaque.get(&id)?.parent(),
        }
    }

    /// Get the ordered children of a container node
    pub fn children_of(&self, id: NodeId) -> Option<&[NodeId]> {
        match self.node_type(id)? {
            NodeType::Document => Some(self.document.children()),
            NodeType::Paragraph => Some(self.nodes.paragraphs.get(&id)?.children()),
            NodeType::Table => Some(self.nodes.tables.get(&id)?.children()),
            NodeType::TableRow => Some(self.nodes.table_rows.get(&id)?.children()),
            NodeType::TableCell => Some(self.nodes.table_cells.get(&id)?.children()),
            _ => None,
        }
    }

    /// Siblings after a node in its parent's child order
    pub fn following_siblings(&self, id: NodeId) -> Result<&[NodeId]> {
        let parent_id = self
            .parent_of(id)
            .ok_or(DocModelError::Detached(id.as_uuid()))?;
        let siblings = self
            .children_of(parent_id)
            .ok_or(DocModelError::NodeNotFound(parent_id.as_uuid()))?;
        let pos = siblings.iter().position(|&sid| sid == id).ok_or_else(|| {
            DocModelError::TreeStructureError(format!(
                "node {} missing from its parent's children",
                id
            ))
        })?;
        Ok(&siblings[pos + 1..])
    }

    /// Display name of a paragraph's style
    pub fn paragraph_style_name(&self, para_id: NodeId) -> Option<&str> {
        let para = self.nodes.paragraphs.get(&para_id)?;
        para.paragraph_style_id
            .as_ref()
            .map(|id| self.styles.display_name(id))
    }

    /// Whether a paragraph's style matches by style ID or display name
    pub fn paragraph_has_style(&self, para_id: NodeId, style: &str) -> bool {
        self.nodes
            .paragraphs
            .get(&para_id)
            .and_then(|para| para.paragraph_style_id.as_ref())
            .is_some_and(|id| id.as_str() == style || self.styles.display_name(id) == style)
    }

    /// Iterate over all body paragraphs in document order
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.document
            .children()
            .iter()
            .filter_map(move |id| self.nodes.paragraphs.get(id))
    }

    /// Get all body tables in document order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.document
            .children()
            .iter()
            .filter_map(move |id| self.nodes.tables.get(id))
    }

    /// Runs of a paragraph in order
    pub fn paragraph_runs(&self, para_id: NodeId) -> impl Iterator<Item = &Run> {
        self.nodes
            .paragraphs
            .get(&para_id)
            .map(|p| p.children())
            .unwrap_or_default()
            .iter()
            .filter_map(move |id| self.nodes.runs.get(id))
    }

    /// Concatenated text of a paragraph
    pub fn paragraph_text(&self, para_id: NodeId) -> String {
        self.paragraph_runs(para_id)
            .map(|run| run.text.as_str())
            .collect()
    }

    // =========================================================================
    // Outline levels
    // =========================================================================

    fn resolve_outline_level(&self, para: &Paragraph) -> Option<u8> {
        para.paragraph_style_id
            .as_ref()
            .and_then(|id| self.styles.outline_level(id))
    }

    /// Change a paragraph's style and re-resolve its outline level
    pub fn set_paragraph_style(&mut self, para_id: NodeId, style_id: Option<StyleId>) -> Result<()> {
        let level = style_id.as_ref().and_then(|id| self.styles.outline_level(id));
        let para = self
            .nodes
            .paragraphs
            .get_mut(&para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?;
        para.set_paragraph_style(style_id);
        para.set_outline_level(level);
        Ok(())
    }

    /// Re-resolve the outline level of every paragraph from its style
    pub fn reindex_outline_levels(&mut self) {
        let levels: Vec<(NodeId, Option<u8>)> = self
            .nodes
            .paragraphs
            .values()
            .map(|p| (p.id(), self.resolve_outline_level(p)))
            .collect();
        for (id, level) in levels {
            if let Some(para) = self.nodes.paragraphs.get_mut(&id) {
                para.set_outline_level(level);
            }
        }
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Insert a paragraph into the document body or a table cell
    pub fn insert_paragraph(&mut self, mut para: Paragraph, parent_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        if parent_id != self.document.id() {
            if self.nodes.table_cells.contains_key(&parent_id) {
                return self.insert_paragraph_into_cell(para, parent_id, index);
            }
            return Err(DocModelError::InvalidOperation(
                "Paragraphs can only be children of the document or a table cell".into(),
            ));
        }

        let para_id = para.id();
        para.set_parent(Some(parent_id));
        let level = self.resolve_outline_level(&para);
        para.set_outline_level(level);

        match index {
            Some(idx) => self.document.insert_body_child(idx, para_id),
            None => self.document.add_body_child(para_id),
        }

        self.nodes.paragraphs.insert(para_id, para);
        Ok(para_id)
    }

    /// Insert a paragraph into a table cell
    pub fn insert_paragraph_into_cell(&mut self, mut para: Paragraph, cell_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let para_id = para.id();
        para.set_parent(Some(cell_id));
        let level = self.resolve_outline_level(&para);
        para.set_outline_level(level);

        let cell = self.nodes.table_cells.get_mut(&cell_id)
            .ok_or(DocModelError::NodeNotFound(cell_id.as_uuid()))?;

        match index {
            Some(idx) => cell.insert_child(idx, para_id),
            None => cell.add_child(para_id),
        }

        self.nodes.paragraphs.insert(para_id, para);
        Ok(para_id)
    }

    /// Insert a run into a paragraph
    pub fn insert_run(&mut self, mut run: Run, para_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let run_id = run.id();
        run.set_parent(Some(para_id));

        let para = self.nodes.paragraphs.get_mut(&para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?;

        match index {
            Some(idx) => para.insert_child(idx, run_id),
            None => para.add_child(run_id),
        }

        self.nodes.runs.insert(run_id, run);
        Ok(run_id)
    }

    /// Insert a table into the document body
    pub fn insert_table(&mut self, mut table: Table, index: Option<usize>) -> Result<NodeId> {
        let table_id = table.id();
        table.set_parent(Some(self.document.id()));

        match index {
            Some(idx) => self.document.insert_body_child(idx, table_id),
            None => self.document.add_body_child(table_id),
        }

        self.nodes.tables.insert(table_id, table);
        Ok(table_id)
    }

    /// Insert a row into a table
    pub fn insert_table_row(&mut self, mut row: TableRow, table_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let row_id = row.id();
        row.set_parent(Some(table_id));

        let table = self.nodes.tables.get_mut(&table_id)
            .ok_or(DocModelError::NodeNotFound(table_id.as_uuid()))?;

        match index {
            Some(idx) => table.insert_row(idx, row_id),
            None => table.add_row(row_id),
        }

        self.nodes.table_rows.insert(row_id, row);
        Ok(row_id)
    }

    /// Insert a cell into a row
    pub fn insert_table_cell(&mut self, mut cell: TableCell, row_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let cell_id = cell.id();
        cell.set_parent(Some(row_id));

        let row = self.nodes.table_rows.get_mut(&row_id)
            .ok_or(DocModelError::NodeNotFound(row_id.as_uuid()))?;

        match index {
            Some(idx) => row.insert_cell(idx, cell_id),
            None => row.add_cell(cell_id),
        }

        self.nodes.table_cells.insert(cell_id, cell);
        Ok(cell_id)
    }

    /// Insert a bookmark marker into the document body
    pub fn insert_bookmark(&mut self, mut marker: BookmarkMarker, index: Option<usize>) -> Result<NodeId> {
        let id = marker.id();
        marker.set_parent(Some(self.document.id()));
        match index {
            Some(idx) => self.document.insert_body_child(idx, id),
            None => self.document.add_body_child(id),
        }
        self.nodes.bookmarks.insert(id, marker);
        Ok(id)
    }

    /// Insert a section break into the document body
    pub fn insert_section_break(&mut self, mut brk: SectionBreak, index: Option<usize>) -> Result<NodeId> {
        let id = brk.id();
        brk.set_parent(Some(self.document.id()));
        match index {
            Some(idx) => self.document.insert_body_child(idx, id),
            None => self.document.add_body_child(id),
        }
        self.nodes.section_breaks.insert(id, brk);
        Ok(id)
    }

    /// Insert an opaque block into the document body
    pub fn insert_opaque(&mut self, mut block: OpaqueBlock, index: Option<usize>) -> Result<NodeId> {
        let id = block.id();
        block.set_parent(Some(self.document.id()));
        match index {
            Some(idx) => self.document.insert_body_child(idx, id),
            None => self.document.add_body_child(id),
        }
        self.nodes.opaque.insert(id, block);
        Ok(id)
    }

    // =========================================================================
    // Table Methods
    // =========================================================================

    /// Every cell at a column index, one per row that is wide enough
    pub fn column_cells(&self, table_id: NodeId, col_index: usize) -> Vec<NodeId> {
        let Some(table) = self.nodes.tables.get(&table_id) else {
            return Vec::new();
        };
        table
            .children()
            .iter()
            .filter_map(|row_id| self.nodes.table_rows.get(row_id))
            .filter_map(|row| row.children().get(col_index).copied())
            .collect()
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Remove a run from the tree
    pub fn remove_run(&mut self, run_id: NodeId) -> Result<Run> {
        let run = self.nodes.runs.remove(&run_id)
            .ok_or(DocModelError::NodeNotFound(run_id.as_uuid()))?;

        if let Some(parent_id) = run.parent() {
            if let Some(para) = self.nodes.paragraphs.get_mut(&parent_id) {
                para.remove_child(run_id);
            }
        }

        Ok(run)
    }

    /// Remove a paragraph (and its runs) from the body or its cell
    pub fn remove_paragraph(&mut self, para_id: NodeId) -> Result<Paragraph> {
        let para = self.nodes.paragraphs.remove(&para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?;

        for &child_id in para.children() {
            self.nodes.runs.remove(&child_id);
        }

        match para.parent() {
            Some(parent_id) if parent_id == self.document.id() => {
                self.document.remove_body_child(para_id);
            }
            Some(parent_id) => {
                if let Some(cell) = self.nodes.table_cells.get_mut(&parent_id) {
                    cell.remove_child(para_id);
                }
            }
            None => {}
        }

        Ok(para)
    }

    /// Remove a table from the document
    pub fn remove_table(&mut self, table_id: NodeId) -> Result<Table> {
        let table = self.nodes.tables.remove(&table_id)
            .ok_or(DocModelError::NodeNotFound(table_id.as_uuid()))?;

        for &row_id in table.children() {
            self.remove_table_row_contents(row_id);
        }

        self.document.remove_body_child(table_id);

        Ok(table)
    }

    /// Remove a row from a table
    pub fn remove_table_row(&mut self, row_id: NodeId) -> Result<TableRow> {
        let row = self.nodes.table_rows.remove(&row_id)
            .ok_or(DocModelError::NodeNotFound(row_id.as_uuid()))?;

        for &cell_id in row.children() {
            self.remove_table_cell_contents(cell_id);
        }

        if let Some(parent_id) = row.parent() {
            if let Some(table) = self.nodes.tables.get_mut(&parent_id) {
                table.remove_row(row_id);
            }
        }

        Ok(row)
    }

    /// Remove a cell from a row
    pub fn remove_table_cell(&mut self, cell_id: NodeId) -> Result<TableCell> {
        let cell = self.nodes.table_cells.get(&cell_id).cloned()
            .ok_or(DocModelError::NodeNotFound(cell_id.as_uuid()))?;
        self.remove_table_cell_contents(cell_id);

        if let Some(parent_id) = cell.parent() {
            if let Some(row) = self.nodes.table_rows.get_mut(&parent_id) {
                row.remove_cell(cell_id);
            }
        }

        Ok(cell)
    }

    fn remove_table_row_contents(&mut self, row_id: NodeId) {
        if let Some(row) = self.nodes.table_rows.remove(&row_id) {
            for &cell_id in row.children() {
                self.remove_table_cell_contents(cell_id);
            }
        }
    }

    fn remove_table_cell_contents(&mut self, cell_id: NodeId) {
        if let Some(cell) = self.nodes.table_cells.remove(&cell_id) {
            for &child_id in cell.children() {
                if let Some(para) = self.nodes.paragraphs.remove(&child_id) {
                    for &run_id in para.children() {
                        self.nodes.runs.remove(&run_id);
                    }
                }
            }
        }
    }

    fn remove_body_marker(&mut self, id: NodeId, node_type: NodeType) -> Result<()> {
        let removed = match node_type {
            NodeType::Bookmark => self.nodes.bookmarks.remove(&id).map(|n| n.parent()),
            NodeType::SectionBreak => self.nodes.section_breaks.remove(&id).map(|n| n.parent()),
            NodeType::Opaque => self.nodes.opaque.remove(&id).map(|n| n.parent()),
            other => {
                return Err(DocModelError::InvalidOperation(format!(
                    "{:?} is not a body marker",
                    other
                )))
            }
        };
        match removed {
            Some(Some(parent_id)) if parent_id == self.document.id() => {
                self.document.remove_body_child(id);
                Ok(())
            }
            Some(Some(parent_id)) => {
                if let Some(cell) = self.nodes.table_cells.get_mut(&parent_id) {
                    cell.remove_child(id);
                }
                Ok(())
            }
            Some(None) => Ok(()),
            None => Err(DocModelError::NodeNotFound(id.as_uuid())),
        }
    }

    /// Detach any node (with its descendants) from the tree.
    ///
    /// Returns the type of the node that was removed, or `NodeNotFound` when
    /// the node is no longer in the tree.
    pub fn detach(&mut self, id: NodeId) -> Result<NodeType> {
        let node_type = self
            .node_type(id)
            .ok_or(DocModelError::NodeNotFound(id.as_uuid()))?;
        match node_type {
            NodeType::Document => {
                return Err(DocModelError::InvalidOperation(
                    "cannot detach the document root".into(),
                ))
            }
            NodeType::Paragraph => {
                self.remove_paragraph(id)?;
            }
            NodeType::Run => {
                self.remove_run(id)?;
            }
            NodeType::Table => {
                self.remove_table(id)?;
            }
            NodeType::TableRow => {
                self.remove_table_row(id)?;
            }
            NodeType::TableCell => {
                self.remove_table_cell(id)?;
            }
            NodeType::Bookmark | NodeType::SectionBreak | NodeType::Opaque => {
                self.remove_body_marker(id, node_type)?;
            }
        }
        Ok(node_type)
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SectionBreakType, Style};

    fn heading(tree: &mut DocumentTree, style: &str, text: &str) -> NodeId {
        let root = tree.root_id();
        let para_id = tree
            .insert_paragraph(Paragraph::with_paragraph_style(style), root, None)
            .unwrap();
        tree.insert_run(Run::new(text), para_id, None).unwrap();
        para_id
    }

    fn table_2x2(tree: &mut DocumentTree) -> (NodeId, Vec<Vec<NodeId>>) {
        let table_id = tree.insert_table(Table::new(), None).unwrap();
        let mut cells = Vec::new();
        for r in 0..2 {
            let row_id = tree.insert_table_row(TableRow::new(), table_id, None).unwrap();
            let mut row_cells = Vec::new();
            for c in 0..2 {
                let cell_id = tree.insert_table_cell(TableCell::new(), row_id, None).unwrap();
                let p = tree.insert_paragraph_into_cell(Paragraph::new(), cell_id, None).unwrap();
                tree.insert_run(Run::new(format!("r{r}c{c}")), p, None).unwrap();
                row_cells.push(cell_id);
            }
            cells.push(row_cells);
        }
        (table_id, cells)
    }

    #[test]
    fn test_outline_level_resolved_on_insert() {
        let mut tree = DocumentTree::new();
        let h2 = heading(&mut tree, "Heading2", "Two");
        let h3 = heading(&mut tree, "Heading 3", "Three");
        let body = heading(&mut tree, "Normal", "Body");

        assert_eq!(tree.get_paragraph(h2).unwrap().outline_level(), Some(2));
        assert_eq!(tree.get_paragraph(h3).unwrap().outline_level(), Some(3));
        assert_eq!(tree.get_paragraph(body).unwrap().outline_level(), None);
        assert_eq!(tree.get_paragraph(body).unwrap().effective_outline_level(), 100);
    }

    #[test]
    fn test_reindex_after_registering_style() {
        let mut tree = DocumentTree::new();
        let p = heading(&mut tree, "BoxTitle", "Box");
        assert_eq!(tree.get_paragraph(p).unwrap().outline_level(), None);

        tree.style_registry_mut()
            .register(Style::paragraph("BoxTitle", "Box Title").with_outline_level(0));
        tree.reindex_outline_levels();
        assert_eq!(tree.get_paragraph(p).unwrap().outline_level(), Some(0));
    }

    #[test]
    fn test_set_paragraph_style_updates_level() {
        let mut tree = DocumentTree::new();
        let p = heading(&mut tree, "Normal", "x");
        tree.set_paragraph_style(p, Some(StyleId::new("Heading1"))).unwrap();
        assert_eq!(tree.get_paragraph(p).unwrap().outline_level(), Some(1));
        assert_eq!(tree.paragraph_style_name(p), Some("Heading 1"));
        assert!(tree.paragraph_has_style(p, "Heading1"));
        assert!(tree.paragraph_has_style(p, "Heading 1"));
        assert!(!tree.paragraph_has_style(p, "Heading 2"));
    }

    #[test]
    fn test_following_siblings() {
        let mut tree = DocumentTree::new();
        let a = heading(&mut tree, "Heading1", "a");
        let bm = tree.insert_bookmark(BookmarkMarker::new("_Toc1").unwrap(), None).unwrap();
        let b = heading(&mut tree, "Normal", "b");

        assert_eq!(tree.following_siblings(a).unwrap(), &[bm, b]);
        assert!(tree.following_siblings(b).unwrap().is_empty());
        assert!(tree.following_siblings(tree.root_id()).is_err());
    }

    #[test]
    fn test_following_siblings_inside_cell() {
        let mut tree = DocumentTree::new();
        let (_, cells) = table_2x2(&mut tree);
        let cell = cells[0][0];
        let first = tree.get_table_cell(cell).unwrap().children()[0];
        let second = tree.insert_paragraph(Paragraph::new(), cell, None).unwrap();
        assert_eq!(tree.following_siblings(first).unwrap(), &[second]);
    }

    #[test]
    fn test_column_cells() {
        let mut tree = DocumentTree::new();
        let (table_id, cells) = table_2x2(&mut tree);
        assert_eq!(tree.column_cells(table_id, 1), vec![cells[0][1], cells[1][1]]);
    }

    #[test]
    fn test_detach_paragraph_removes_runs() {
        let mut tree = DocumentTree::new();
        let p = heading(&mut tree, "Normal", "gone");
        let run_id = tree.get_paragraph(p).unwrap().children()[0];

        assert_eq!(tree.detach(p).unwrap(), NodeType::Paragraph);
        assert!(!tree.contains(p));
        assert!(!tree.contains(run_id));
        assert!(tree.document.children().is_empty());
        assert!(matches!(tree.detach(run_id), Err(DocModelError::NodeNotFound(_))));
    }

    #[test]
    fn test_detach_table_descendants() {
        let mut tree = DocumentTree::new();
        let (table_id, cells) = table_2x2(&mut tree);
        tree.detach(table_id).unwrap();
        assert!(tree.nodes.table_rows.is_empty());
        assert!(tree.nodes.table_cells.is_empty());
        assert!(tree.nodes.paragraphs.is_empty());
        assert!(tree.nodes.runs.is_empty());
        assert!(tree.detach(cells[0][0]).is_err());
    }

    #[test]
    fn test_detach_cell_and_markers() {
        let mut tree = DocumentTree::new();
        let (_, cells) = table_2x2(&mut tree);
        let brk = tree.insert_section_break(SectionBreak::new(SectionBreakType::Continuous), None).unwrap();
        let opaque = tree.insert_opaque(OpaqueBlock::new("sdt"), None).unwrap();

        tree.detach(cells[0][1]).unwrap();
        let row_id = tree.parent_of(cells[0][0]).unwrap();
        assert_eq!(tree.get_table_row(row_id).unwrap().cell_count(), 1);

        assert_eq!(tree.detach(brk).unwrap(), NodeType::SectionBreak);
        assert_eq!(tree.detach(opaque).unwrap(), NodeType::Opaque);
        assert_eq!(tree.document.children().len(), 1);
    }

    #[test]
    fn test_json_round_trip_keeps_levels() {
        let mut tree = DocumentTree::new();
        let p = heading(&mut tree, "Heading 4", "deep");
        let json = tree.to_json().unwrap();
        let restored = DocumentTree::from_json(&json).unwrap();
        assert_eq!(restored.get_paragraph(p).unwrap().outline_level(), Some(4));
        assert_eq!(restored.paragraph_text(p), "deep");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn detach_in_any_order_empties_storage(
                levels in proptest::collection::vec(0u8..5, 1..20),
                order in proptest::collection::vec(any::<prop::sample::Index>(), 1..20),
            ) {
                let mut tree = DocumentTree::new();
                let root = tree.root_id();
                let mut ids = Vec::new();
                for level in levels {
                    let style = if level == 0 { "Normal".to_string() } else { format!("Heading{level}") };
                    let p = tree.insert_paragraph(Paragraph::with_paragraph_style(style), root, None).unwrap();
                    tree.insert_run(Run::new("x"), p, None).unwrap();
                    ids.push(p);
                }
                for idx in order {
                    let id = ids[idx.index(ids.len())];
                    let _ = tree.detach(id);
                }
                let remaining = tree.document.children().len();
                prop_assert_eq!(remaining, tree.nodes.paragraphs.len());
                prop_assert_eq!(remaining, tree.nodes.runs.len());
            }
        }
    }
}
