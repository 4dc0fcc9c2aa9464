//! Deletion staging and the single commit pass

use std::collections::HashSet;

use doc_model::{DocModelError, DocumentTree, NodeId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Ordered, de-duplicated set of nodes staged for removal.
///
/// Nothing is detached until [`DeletionSet::commit`] consumes the set, so
/// sibling walks during evaluation always see the original tree.
#[derive(Debug, Clone, Default)]
pub struct DeletionSet {
    order: Vec<NodeId>,
    seen: HashSet<NodeId>,
}

/// Outcome of committing a deletion set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    /// Nodes physically detached
    pub detached: usize,
    /// Nodes already gone, usually removed with a staged ancestor
    pub already_gone: usize,
    /// Nodes the tree refused to detach
    pub failed: usize,
}

impl DeletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a node. Returns `false` if it was already staged.
    pub fn stage(&mut self, id: NodeId) -> bool {
        if self.seen.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    /// Stage several nodes, returning how many were new
    pub fn stage_all(&mut self, ids: impl IntoIterator<Item = NodeId>) -> usize {
        ids.into_iter().filter(|&id| self.stage(id)).count()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Staged nodes in staging order
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.order.iter()
    }

    /// Detach every staged node from the tree, in staging order.
    pub fn commit(self, tree: &mut DocumentTree) -> CommitReport {
        let mut report = CommitReport::default();
        for id in self.order {
            match tree.detach(id) {
                Ok(node_type) => {
                    debug!(node = %id, kind = node_type.tag(), "detached");
                    report.detached += 1;
                }
                Err(DocModelError::NodeNotFound(_)) => {
                    info!(node = %id, "element was already gone");
                    report.already_gone += 1;
                }
                Err(err) => {
                    warn!(node = %id, error = %err, "could not detach node");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Node, Paragraph, Run, Table, TableCell, TableRow};

    #[test]
    fn test_stage_is_idempotent() {
        let mut set = DeletionSet::new();
        let id = NodeId::new();
        assert!(set.stage(id));
        assert!(!set.stage(id));
        assert_eq!(set.len(), 1);
        assert!(set.contains(id));
    }

    #[test]
    fn test_commit_tolerates_duplicates_and_descendants() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let para = tree.insert_paragraph(Paragraph::new(), root, None).unwrap();
        let run = tree.insert_run(Run::new("x"), para, None).unwrap();
        let table = tree.insert_table(Table::new(), None).unwrap();
        let row = tree.insert_table_row(TableRow::new(), table, None).unwrap();
        let cell = tree.insert_table_cell(TableCell::new(), row, None).unwrap();
        let keep = tree.insert_paragraph(Paragraph::new(), root, None).unwrap();

        let mut set = DeletionSet::new();
        set.stage(para);
        set.stage(para);
        set.stage(run);
        set.stage(table);
        set.stage(cell);

        let report = set.commit(&mut tree);
        assert_eq!(report.detached, 2);
        assert_eq!(report.already_gone, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(tree.document.children(), &[keep]);
    }

    #[test]
    fn test_commit_order_children_first() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let para = tree.insert_paragraph(Paragraph::new(), root, None).unwrap();
        let run = tree.insert_run(Run::new("x"), para, None).unwrap();

        let mut set = DeletionSet::new();
        set.stage_all([run, para]);
        let report = set.commit(&mut tree);
        assert_eq!(report.detached, 2);
        assert!(tree.nodes.paragraphs.is_empty());
    }
}
