//! Annotation scanner: groups annotation-styled runs into control structures

use std::collections::HashMap;

use doc_model::{DocumentTree, Node, NodeId, Run};
use serde::Serialize;
use tracing::debug;

/// Location of an annotation that lives inside a table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableContext {
    pub table: NodeId,
    pub row: NodeId,
    /// Positional column index of the cell within its row
    pub column: usize,
    pub cell: NodeId,
}

/// One annotation marker recovered from the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlStructure {
    /// Paragraph holding the annotation runs
    pub anchor: NodeId,
    /// Concatenated, trimmed text of the runs
    pub raw_text: String,
    /// First word of the text, or empty
    pub operator: String,
    /// Annotation runs in document order
    pub runs: Vec<NodeId>,
    /// Set when the anchor is a cell paragraph
    pub table: Option<TableContext>,
}

/// Every control structure in document order, plus the run index
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub structures: Vec<ControlStructure>,
    run_index: HashMap<NodeId, usize>,
}

impl ScanResult {
    /// The structure a run belongs to
    pub fn structure_for_run(&self, run: NodeId) -> Option<&ControlStructure> {
        self.run_index.get(&run).map(|&i| &self.structures[i])
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}

/// A run visited during the document walk
#[derive(Debug, Clone, Copy)]
pub struct RunVisit {
    pub paragraph: NodeId,
    pub run: NodeId,
    pub table: Option<TableContext>,
}

/// Every run of the document: body paragraphs first, then body tables by
/// row, cell, and paragraph.
pub fn document_runs(tree: &DocumentTree) -> Vec<RunVisit> {
    let mut visits = Vec::new();
    for para in tree.paragraphs() {
        for &run in para.children() {
            visits.push(RunVisit { paragraph: para.id(), run, table: None });
        }
    }
    for table in tree.tables() {
        for &row_id in table.children() {
            let Some(row) = tree.get_table_row(row_id) else { continue };
            for (column, &cell_id) in row.children().iter().enumerate() {
                let Some(cell) = tree.get_table_cell(cell_id) else { continue };
                let ctx = TableContext { table: table.id(), row: row_id, column, cell: cell_id };
                for &para_id in cell.children() {
                    let Some(para) = tree.get_paragraph(para_id) else { continue };
                    for &run in para.children() {
                        visits.push(RunVisit { paragraph: para_id, run, table: Some(ctx) });
                    }
                }
            }
        }
    }
    visits
}

/// Derive the operator tag: first non-empty word, splitting on non-word characters
pub fn operator_tag(text: &str) -> &str {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .find(|t| !t.is_empty())
        .unwrap_or("")
}

/// Whether a run carries the annotation character style, by ID or display name
pub fn is_annotation_run(tree: &DocumentTree, run: &Run, annotation_style: &str) -> bool {
    run.has_character_style(annotation_style)
        || run
            .character_style_id
            .as_ref()
            .is_some_and(|id| tree.style_registry().display_name(id) == annotation_style)
}

struct Accumulator {
    anchor: NodeId,
    table: Option<TableContext>,
    text: String,
    runs: Vec<NodeId>,
}

impl Accumulator {
    fn open(visit: &RunVisit) -> Self {
        Self { anchor: visit.paragraph, table: visit.table, text: String::new(), runs: Vec::new() }
    }

    fn close(self, result: &mut ScanResult) {
        let raw_text = self.text.trim().to_string();
        if raw_text.is_empty() {
            return;
        }
        let index = result.structures.len();
        for &run in &self.runs {
            result.run_index.insert(run, index);
        }
        let operator = operator_tag(&raw_text).to_string();
        debug!(anchor = %self.anchor, operator = %operator, text = %raw_text, "control structure");
        result.structures.push(ControlStructure {
            anchor: self.anchor,
            raw_text,
            operator,
            runs: self.runs,
            table: self.table,
        });
    }
}

/// Scan the document for control structures.
///
/// Consecutive runs carrying `annotation_style` within one paragraph form a
/// single structure; structures with blank text are dropped.
pub fn scan(tree: &DocumentTree, annotation_style: &str) -> ScanResult {
    let mut result = ScanResult::default();
    let mut current: Option<Accumulator> = None;

    for visit in document_runs(tree) {
        let Some(run) = tree.get_run(visit.run) else { continue };
        let annotated = is_annotation_run(tree, run, annotation_style);

        if let Some(acc) = current.take() {
            if annotated && acc.anchor == visit.paragraph {
                current = Some(acc);
            } else {
                acc.close(&mut result);
            }
        }

        if annotated {
            let acc = current.get_or_insert_with(|| Accumulator::open(&visit));
            acc.runs.push(visit.run);
            acc.text.push_str(&run.text);
        }
    }

    if let Some(acc) = current {
        acc.close(&mut result);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Paragraph, Run, Table, TableCell, TableRow};

    fn paragraph(tree: &mut DocumentTree, runs: &[(&str, bool)]) -> (NodeId, Vec<NodeId>) {
        let root = tree.root_id();
        let para = tree.insert_paragraph(Paragraph::new(), root, None).unwrap();
        let ids = runs
            .iter()
            .map(|&(text, toggle)| {
                let run = if toggle { Run::with_character_style(text, "Toggle") } else { Run::new(text) };
                tree.insert_run(run, para, None).unwrap()
            })
            .collect();
        (para, ids)
    }

    #[test]
    fn test_operator_tag() {
        assert_eq!(operator_tag("[NOT_EQUALS a b]"), "NOT_EQUALS");
        assert_eq!(operator_tag("[ YES x]"), "YES");
        assert_eq!(operator_tag("[]"), "");
        assert_eq!(operator_tag(""), "");
    }

    #[test]
    fn test_consecutive_runs_join() {
        let mut tree = DocumentTree::new();
        let (para, runs) = paragraph(&mut tree, &[("[YES ", true), ("have_CO2Sen]", true), (" body", false)]);
        let scan = scan(&tree, "Toggle");
        assert_eq!(scan.len(), 1);
        let cs = &scan.structures[0];
        assert_eq!(cs.anchor, para);
        assert_eq!(cs.raw_text, "[YES have_CO2Sen]");
        assert_eq!(cs.operator, "YES");
        assert_eq!(cs.runs, runs[..2].to_vec());
        assert!(cs.table.is_none());
        assert_eq!(scan.structure_for_run(runs[1]).map(|s| s.anchor), Some(para));
        assert!(scan.structure_for_run(runs[2]).is_none());
    }

    #[test]
    fn test_plain_run_splits_structures() {
        let mut tree = DocumentTree::new();
        paragraph(&mut tree, &[("[DELETE]", true), ("text", false), ("[NO x]", true)]);
        let scan = scan(&tree, "Toggle");
        let ops: Vec<_> = scan.structures.iter().map(|s| s.operator.as_str()).collect();
        assert_eq!(ops, vec!["DELETE", "NO"]);
    }

    #[test]
    fn test_structures_never_span_paragraphs() {
        let mut tree = DocumentTree::new();
        paragraph(&mut tree, &[("[YES a]", true)]);
        paragraph(&mut tree, &[("[YES b]", true)]);
        let scan = scan(&tree, "Toggle");
        assert_eq!(scan.len(), 2);
        assert_ne!(scan.structures[0].anchor, scan.structures[1].anchor);
    }

    #[test]
    fn test_blank_annotation_discarded() {
        let mut tree = DocumentTree::new();
        paragraph(&mut tree, &[("   ", true), ("x", false)]);
        assert!(scan(&tree, "Toggle").is_empty());
    }

    #[test]
    fn test_trailing_structure_is_closed() {
        let mut tree = DocumentTree::new();
        paragraph(&mut tree, &[("body", false), ("[DELETE]", true)]);
        assert_eq!(scan(&tree, "Toggle").len(), 1);
    }

    #[test]
    fn test_table_context_recorded() {
        let mut tree = DocumentTree::new();
        paragraph(&mut tree, &[("[YES a]", true)]);
        let table = tree.insert_table(Table::new(), None).unwrap();
        let row = tree.insert_table_row(TableRow::new(), table, None).unwrap();
        tree.insert_table_cell(TableCell::new(), row, None).unwrap();
        let cell = tree.insert_table_cell(TableCell::new(), row, None).unwrap();
        let para = tree.insert_paragraph_into_cell(Paragraph::new(), cell, None).unwrap();
        tree.insert_run(Run::with_character_style("[COLUMN YES b]", "Toggle"), para, None).unwrap();

        let scan = scan(&tree, "Toggle");
        assert_eq!(scan.len(), 2);
        let cs = &scan.structures[1];
        assert_eq!(cs.anchor, para);
        assert_eq!(cs.table, Some(TableContext { table, row, column: 1, cell }));
    }
}
