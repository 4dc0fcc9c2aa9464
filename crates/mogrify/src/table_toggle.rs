//! Table-scoped toggles: `[TABLE ...]`, `[ROW ...]`, `[COLUMN ...]`

use doc_model::{DocumentTree, NodeId};
use tracing::{debug, warn};

use crate::error::MogrifyError;
use crate::expression::{parse_directive, Directive, Evaluator, TableScope};
use crate::scanner::ControlStructure;
use crate::selections::SelectionLookup;
use crate::staging::DeletionSet;

/// What a table toggle did
#[derive(Debug, Default)]
pub struct TableToggleOutcome {
    /// Nodes staged for removal
    pub staged: Vec<NodeId>,
    /// Anomalies met while evaluating
    pub anomalies: Vec<MogrifyError>,
}

impl TableToggleOutcome {
    pub fn applied(&self) -> bool {
        !self.staged.is_empty()
    }
}

/// Evaluate a table-scoped structure and stage the table, row, or column.
///
/// Column membership is positional: every cell sharing the annotated cell's
/// index within its row.
pub fn apply_table_toggle<S: SelectionLookup + ?Sized>(
    tree: &DocumentTree,
    structure: &ControlStructure,
    evaluator: &Evaluator<'_, S>,
    deletions: &mut DeletionSet,
) -> TableToggleOutcome {
    let mut outcome = TableToggleOutcome::default();

    let (scope, condition) = match parse_directive(&structure.raw_text) {
        Ok(Directive::Table { scope, condition }) => (scope, condition),
        Ok(_) => {
            let err = MogrifyError::syntax(&structure.raw_text, "not a table toggle");
            warn!(error = %err, "table toggle skipped");
            outcome.anomalies.push(err);
            return outcome;
        }
        Err(err) => {
            warn!(error = %err, "table toggle skipped");
            outcome.anomalies.push(err);
            return outcome;
        }
    };

    let Some(ctx) = structure.table else {
        let err = MogrifyError::syntax(&structure.raw_text, "table toggle outside a table");
        warn!(error = %err, "table toggle skipped");
        outcome.anomalies.push(err);
        return outcome;
    };

    let assessment = evaluator.assess(&condition);
    outcome.anomalies = assessment.anomalies;
    if !assessment.remove {
        return outcome;
    }

    let targets = match scope {
        TableScope::Table => vec![ctx.table],
        TableScope::Row => vec![ctx.row],
        TableScope::Column => tree.column_cells(ctx.table, ctx.column),
    };
    for id in targets {
        if deletions.stage(id) {
            outcome.staged.push(id);
        }
    }
    debug!(scope = ?scope, staged = outcome.staged.len(), "table toggle applied");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name_map::NameMap;
    use crate::scanner::scan;
    use crate::selections::Selections;
    use doc_model::{Node, Paragraph, Run, Table, TableCell, TableRow};

    /// 3x3 table whose cells all read "same"; the annotation sits in (row, col)
    fn grid(tree: &mut DocumentTree, annotation: &str, at: (usize, usize)) -> (NodeId, Vec<Vec<NodeId>>) {
        let table = tree.insert_table(Table::new(), None).unwrap();
        let mut cells = Vec::new();
        for r in 0..3 {
            let row = tree.insert_table_row(TableRow::new(), table, None).unwrap();
            let mut row_cells = Vec::new();
            for c in 0..3 {
                let cell = tree.insert_table_cell(TableCell::new(), row, None).unwrap();
                let para = tree.insert_paragraph_into_cell(Paragraph::new(), cell, None).unwrap();
                tree.insert_run(Run::new("same"), para, None).unwrap();
                if (r, c) == at {
                    tree.insert_run(Run::with_character_style(annotation, "Toggle"), para, None).unwrap();
                }
                row_cells.push(cell);
            }
            cells.push(row_cells);
        }
        (table, cells)
    }

    fn apply(tree: &DocumentTree) -> (TableToggleOutcome, DeletionSet) {
        let map = NameMap::from_rows(vec![("a", "A", "")]);
        let sel = Selections::new().with("A", ["false"]);
        let evaluator = Evaluator::new(&map, &sel);
        let scan = scan(tree, "Toggle");
        let mut deletions = DeletionSet::new();
        let outcome = apply_table_toggle(tree, &scan.structures[0], &evaluator, &mut deletions);
        (outcome, deletions)
    }

    #[test]
    fn test_column_is_positional() {
        let mut tree = DocumentTree::new();
        let (_, cells) = grid(&mut tree, "[COLUMN YES a]", (1, 2));
        let (outcome, deletions) = apply(&tree);
        assert!(outcome.applied());
        let expected: Vec<NodeId> = cells.iter().map(|row| row[2]).collect();
        assert_eq!(outcome.staged, expected);
        for row in &cells {
            assert!(!deletions.contains(row[0]));
            assert!(!deletions.contains(row[1]));
        }
    }

    #[test]
    fn test_row_and_table() {
        let mut tree = DocumentTree::new();
        grid(&mut tree, "[ROW NO a]", (0, 0));
        let (outcome, _) = apply(&tree);
        assert!(!outcome.applied());

        let mut tree = DocumentTree::new();
        grid(&mut tree, "[ROW YES a]", (2, 0));
        let (outcome, _) = apply(&tree);
        let table = tree.tables().next().unwrap();
        assert_eq!(outcome.staged, vec![table.children()[2]]);

        let mut tree = DocumentTree::new();
        let (table, _) = grid(&mut tree, "[TABLE DELETE]", (0, 1));
        let (outcome, _) = apply(&tree);
        assert_eq!(outcome.staged, vec![table]);
    }

    #[test]
    fn test_toggle_outside_table_is_anomaly() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let para = tree.insert_paragraph(Paragraph::new(), root, None).unwrap();
        tree.insert_run(Run::with_character_style("[TABLE DELETE]", "Toggle"), para, None).unwrap();
        let (outcome, deletions) = apply(&tree);
        assert!(!outcome.applied());
        assert_eq!(outcome.anomalies.len(), 1);
        assert!(deletions.is_empty());
    }
}
