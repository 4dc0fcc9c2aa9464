//! Section span discovery: stages an annotated paragraph and the rest of its section

use doc_model::{DocumentTree, Node, NodeId, NodeType};
use tracing::{debug, warn};

use crate::config::{MogrifyConfig, StandardFamily};
use crate::scanner::ScanResult;
use crate::staging::DeletionSet;

/// Walks the siblings following an anchor paragraph and stages the span
/// that belongs to its conditional section.
pub struct SectionRemover<'a> {
    tree: &'a DocumentTree,
    config: &'a MogrifyConfig,
    scan: &'a ScanResult,
}

impl<'a> SectionRemover<'a> {
    pub fn new(tree: &'a DocumentTree, config: &'a MogrifyConfig, scan: &'a ScanResult) -> Self {
        Self { tree, config, scan }
    }

    /// Stage the anchor and every sibling in its section.
    ///
    /// Returns the number of newly staged nodes.
    pub fn remove_section(&self, anchor: NodeId, deletions: &mut DeletionSet) -> usize {
        let is_box = self
            .config
            .box_styles()
            .iter()
            .any(|style| self.tree.paragraph_has_style(anchor, style));
        if is_box {
            return self.remove_info_box(anchor, deletions);
        }

        let Some(para) = self.tree.get_paragraph(anchor) else {
            warn!(anchor = %anchor, "section anchor is not a paragraph");
            return 0;
        };
        let level = para.effective_outline_level();
        let mut staged = 0;

        for &sibling in self.siblings(anchor) {
            match self.tree.node_type(sibling) {
                Some(NodeType::Paragraph) => {
                    let sibling_level = self
                        .tree
                        .get_paragraph(sibling)
                        .and_then(|p| p.outline_level());
                    if sibling_level.is_some_and(|l| l <= level) {
                        break;
                    }
                    staged += usize::from(deletions.stage(sibling));
                }
                Some(NodeType::Table) | Some(NodeType::Bookmark) => {
                    staged += usize::from(deletions.stage(sibling));
                }
                Some(NodeType::SectionBreak) => break,
                other => {
                    let tag = other.map(|t| t.tag()).unwrap_or("missing");
                    let tag = match self.tree.nodes.opaque.get(&sibling) {
                        Some(block) => block.tag.as_str(),
                        None => tag,
                    };
                    warn!(tag = %tag, "saw unrecognized tag");
                }
            }
        }

        staged += usize::from(deletions.stage(anchor));
        debug!(anchor = %anchor, level, staged, "section staged");
        staged
    }

    /// Info-box variant: the box runs over level-0 paragraphs until one opens
    /// a new standards toggle.
    fn remove_info_box(&self, anchor: NodeId, deletions: &mut DeletionSet) -> usize {
        let mut staged = usize::from(deletions.stage(anchor));

        for &sibling in self.siblings(anchor) {
            let Some(para) = self.tree.get_paragraph(sibling) else {
                continue;
            };
            if para.outline_level() != Some(0) {
                break;
            }
            if self.opens_standards_toggle(para.children()) {
                break;
            }
            staged += usize::from(deletions.stage(sibling));
        }

        debug!(anchor = %anchor, staged, "info box staged");
        staged
    }

    fn opens_standards_toggle(&self, runs: &[NodeId]) -> bool {
        runs.iter().any(|&run| {
            self.scan
                .structure_for_run(run)
                .is_some_and(|cs| StandardFamily::from_keyword(&cs.operator).is_some())
        })
    }

    fn siblings(&self, anchor: NodeId) -> &'a [NodeId] {
        match self.tree.following_siblings(anchor) {
            Ok(siblings) => siblings,
            Err(err) => {
                warn!(anchor = %anchor, error = %err, "cannot walk siblings");
                &[]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;
    use doc_model::{BookmarkMarker, OpaqueBlock, Paragraph, Run, SectionBreak, SectionBreakType, Style, Table};

    fn para(tree: &mut DocumentTree, style: &str) -> NodeId {
        let root = tree.root_id();
        let id = tree.insert_paragraph(Paragraph::with_paragraph_style(style), root, None).unwrap();
        tree.insert_run(Run::new(style), id, None).unwrap();
        id
    }

    fn staged(tree: &DocumentTree, anchor: NodeId) -> Vec<NodeId> {
        let config = MogrifyConfig::default();
        let scan = scan(tree, &config.annotation_style);
        let mut deletions = DeletionSet::new();
        SectionRemover::new(tree, &config, &scan).remove_section(anchor, &mut deletions);
        deletions.iter().copied().collect()
    }

    #[test]
    fn test_span_stops_at_shallower_heading() {
        let mut tree = DocumentTree::new();
        let anchor = para(&mut tree, "Heading 2");
        let a = para(&mut tree, "Heading 3");
        let b = para(&mut tree, "Heading 3");
        let _h1 = para(&mut tree, "Heading 1");
        let _h2 = para(&mut tree, "Heading 2");

        assert_eq!(staged(&tree, anchor), vec![a, b, anchor]);
    }

    #[test]
    fn test_span_stops_at_same_level() {
        let mut tree = DocumentTree::new();
        let anchor = para(&mut tree, "Heading2");
        let body = para(&mut tree, "Normal");
        let _next = para(&mut tree, "Heading2");
        assert_eq!(staged(&tree, anchor), vec![body, anchor]);
    }

    #[test]
    fn test_body_anchor_runs_to_next_heading() {
        let mut tree = DocumentTree::new();
        let anchor = para(&mut tree, "Normal");
        let body = para(&mut tree, "Custom Body");
        let _h4 = para(&mut tree, "Heading 4");
        assert_eq!(staged(&tree, anchor), vec![body, anchor]);
    }

    #[test]
    fn test_tables_bookmarks_and_breaks() {
        let mut tree = DocumentTree::new();
        let anchor = para(&mut tree, "Heading 1");
        let table = tree.insert_table(Table::new(), None).unwrap();
        let mark = tree.insert_bookmark(BookmarkMarker::new("_Ref1").unwrap(), None).unwrap();
        let opaque = tree.insert_opaque(OpaqueBlock::new("sdt"), None).unwrap();
        let body = para(&mut tree, "Normal");
        tree.insert_section_break(SectionBreak::new(SectionBreakType::NextPage), None).unwrap();
        let _after = para(&mut tree, "Normal");

        let result = staged(&tree, anchor);
        assert_eq!(result, vec![table, mark, body, anchor]);
        assert!(!result.contains(&opaque));
    }

    #[test]
    fn test_info_box_variant() {
        let mut tree = DocumentTree::new();
        tree.style_registry_mut()
            .register(Style::paragraph("BoxHeading", "Box Heading").with_outline_level(0));
        let anchor = para(&mut tree, "Info. box");
        let inside = para(&mut tree, "BoxHeading");
        let toggle = para(&mut tree, "BoxHeading");
        tree.insert_run(Run::with_character_style("[VENT 621]", "Toggle"), toggle, None).unwrap();
        let _after = para(&mut tree, "BoxHeading");

        assert_eq!(staged(&tree, anchor), vec![anchor, inside]);
    }

    #[test]
    fn test_box_style_matched_by_id() {
        let mut tree = DocumentTree::new();
        tree.style_registry_mut()
            .register(Style::paragraph("Info. box", "Information Box"));
        let anchor = para(&mut tree, "Info. box");
        let _body = para(&mut tree, "Normal");
        assert_eq!(tree.paragraph_style_name(anchor), Some("Information Box"));
        assert_eq!(staged(&tree, anchor), vec![anchor]);
    }

    #[test]
    fn test_info_box_ends_at_non_zero_level() {
        let mut tree = DocumentTree::new();
        let anchor = para(&mut tree, "Instr. box");
        let _body = para(&mut tree, "Normal");
        assert_eq!(staged(&tree, anchor), vec![anchor]);
    }

    #[test]
    fn test_anchor_inside_cell() {
        use doc_model::{TableCell, TableRow};
        let mut tree = DocumentTree::new();
        let table = tree.insert_table(Table::new(), None).unwrap();
        let row = tree.insert_table_row(TableRow::new(), table, None).unwrap();
        let cell = tree.insert_table_cell(TableCell::new(), row, None).unwrap();
        let anchor = tree.insert_paragraph_into_cell(Paragraph::new(), cell, None).unwrap();
        let next = tree.insert_paragraph_into_cell(Paragraph::new(), cell, None).unwrap();
        let _outside = para(&mut tree, "Normal");
        assert_eq!(staged(&tree, anchor), vec![next, anchor]);
    }
}
