//! Mogrification Engine
//!
//! Orchestrates one run over a document: scan annotations, stage boxes,
//! standards, sections and table toggles, substitute units, strip markup,
//! then commit every staged deletion in a single pass.

use doc_model::{DocumentTree, Node, NodeId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::MogrifyConfig;
use crate::expression::{parse_directive, Directive, Evaluator};
use crate::name_map::NameMap;
use crate::scanner::{document_runs, is_annotation_run, scan, ScanResult};
use crate::section_remover::SectionRemover;
use crate::selections::SelectionLookup;
use crate::staging::{CommitReport, DeletionSet};
use crate::table_toggle::apply_table_toggle;
use crate::units::apply_units;

/// Summary of a mogrification run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MogrifyReport {
    pub structures_found: usize,
    pub boxes_removed: usize,
    pub sections_removed: usize,
    pub table_toggles_applied: usize,
    pub units_substituted: usize,
    pub annotation_runs_stripped: usize,
    pub anomalies: usize,
    pub nodes_staged: usize,
    pub nodes_detached: usize,
    pub nodes_already_gone: usize,
    pub summary: String,
}

impl MogrifyReport {
    fn finish(&mut self, commit: CommitReport) {
        self.nodes_detached = commit.detached;
        self.nodes_already_gone = commit.already_gone;
        self.anomalies += commit.failed;
        self.summary = format!(
            "Processed {} annotations ({} sections, {} table toggles, {} units, {} anomalies); detached {} nodes",
            self.structures_found,
            self.sections_removed,
            self.table_toggles_applied,
            self.units_substituted,
            self.anomalies,
            self.nodes_detached,
        );
    }
}

/// Applies selections to an annotated document
pub struct Mogrifier {
    name_map: NameMap,
    config: MogrifyConfig,
}

impl Mogrifier {
    pub fn new(name_map: NameMap, config: MogrifyConfig) -> Self {
        Self { name_map, config }
    }

    /// Mogrifier with the default catalog configuration
    pub fn with_name_map(name_map: NameMap) -> Self {
        Self::new(name_map, MogrifyConfig::default())
    }

    pub fn name_map(&self) -> &NameMap {
        &self.name_map
    }

    pub fn config(&self) -> &MogrifyConfig {
        &self.config
    }

    /// Mogrify the tree in place.
    ///
    /// No node is detached until every pass has finished staging, so every
    /// section walk sees the original document.
    pub fn mogrify<S: SelectionLookup + ?Sized>(
        &self,
        tree: &mut DocumentTree,
        selections: &S,
    ) -> MogrifyReport {
        let mut report = MogrifyReport::default();
        let mut deletions = DeletionSet::new();

        let scan = scan(tree, &self.config.annotation_style);
        report.structures_found = scan.len();
        info!(structures = scan.len(), "scanned annotations");

        report.boxes_removed = self.stage_boxes(tree, selections, &mut deletions);

        let evaluator = Evaluator::new(&self.name_map, selections);
        {
            let remover = SectionRemover::new(tree, &self.config, &scan);
            self.apply_standards(&scan, selections, &remover, &mut deletions, &mut report);
            self.apply_sections(&scan, &evaluator, &remover, &mut deletions, &mut report);
        }
        self.apply_tables(tree, &scan, &evaluator, &mut deletions, &mut report);

        let units = apply_units(tree, &scan.structures, &self.name_map, selections, &self.config);
        report.units_substituted = units.substituted;
        report.anomalies += units.anomalies.len();

        report.annotation_runs_stripped = self.stage_annotation_runs(tree, &mut deletions);

        report.nodes_staged = deletions.len();
        let commit = deletions.commit(tree);
        report.finish(commit);
        info!(summary = %report.summary, "mogrification complete");
        report
    }

    /// Info boxes when the remove flag is set; instruction boxes always
    fn stage_boxes<S: SelectionLookup + ?Sized>(
        &self,
        tree: &DocumentTree,
        selections: &S,
        deletions: &mut DeletionSet,
    ) -> usize {
        let remove_info = selections.is_set(&self.config.remove_info_boxes_key);
        let boxes: Vec<NodeId> = tree
            .paragraphs()
            .filter(|para| {
                tree.paragraph_has_style(para.id(), &self.config.instruction_box_style)
                    || (remove_info && tree.paragraph_has_style(para.id(), &self.config.info_box_style))
            })
            .map(|para| para.id())
            .collect();
        debug!(count = boxes.len(), remove_info, "boxes staged");
        deletions.stage_all(boxes)
    }

    fn apply_standards<S: SelectionLookup + ?Sized>(
        &self,
        scan: &ScanResult,
        selections: &S,
        remover: &SectionRemover<'_>,
        deletions: &mut DeletionSet,
        report: &mut MogrifyReport,
    ) {
        for structure in &scan.structures {
            let Ok(Directive::Standard { family, code }) = parse_directive(&structure.raw_text) else {
                continue;
            };
            let Some(toggle) = self.config.standard(family, &code) else {
                warn!(family = family.as_str(), code = %code, "unknown standard code");
                report.anomalies += 1;
                continue;
            };
            if selections.is_set(&toggle.selection_key) {
                remover.remove_section(structure.anchor, deletions);
                report.sections_removed += 1;
            }
        }
    }

    fn apply_sections<S: SelectionLookup + ?Sized>(
        &self,
        scan: &ScanResult,
        evaluator: &Evaluator<'_, S>,
        remover: &SectionRemover<'_>,
        deletions: &mut DeletionSet,
        report: &mut MogrifyReport,
    ) {
        for structure in &scan.structures {
            let condition = match parse_directive(&structure.raw_text) {
                Ok(Directive::Section(condition)) => condition,
                Ok(_) => continue,
                Err(err) => {
                    if !self.is_units_operator(&structure.operator) {
                        warn!(error = %err, "annotation kept");
                        report.anomalies += 1;
                    }
                    continue;
                }
            };
            let assessment = evaluator.assess(&condition);
            report.anomalies += assessment.anomalies.len();
            if assessment.remove {
                remover.remove_section(structure.anchor, deletions);
                report.sections_removed += 1;
            }
        }
    }

    fn apply_tables<S: SelectionLookup + ?Sized>(
        &self,
        tree: &DocumentTree,
        scan: &ScanResult,
        evaluator: &Evaluator<'_, S>,
        deletions: &mut DeletionSet,
        report: &mut MogrifyReport,
    ) {
        for structure in &scan.structures {
            if !matches!(parse_directive(&structure.raw_text), Ok(Directive::Table { .. })) {
                continue;
            }
            let outcome = apply_table_toggle(tree, structure, evaluator, deletions);
            report.anomalies += outcome.anomalies.len();
            if outcome.applied() {
                report.table_toggles_applied += 1;
            }
        }
    }

    /// Stage every run still carrying the annotation style
    fn stage_annotation_runs(&self, tree: &DocumentTree, deletions: &mut DeletionSet) -> usize {
        let runs: Vec<NodeId> = document_runs(tree)
            .into_iter()
            .filter(|visit| {
                tree.get_run(visit.run)
                    .is_some_and(|run| is_annotation_run(tree, run, &self.config.annotation_style))
            })
            .map(|visit| visit.run)
            .collect();
        let count = runs.len();
        deletions.stage_all(runs);
        count
    }

    /// UNITS annotations are parsed by the units pass, possibly under a mapped name
    fn is_units_operator(&self, operator: &str) -> bool {
        self.name_map.resolve_or_literal(operator) == self.config.units_key
    }
}

/// Mogrify a tree with the default configuration
pub fn mogrify<S: SelectionLookup + ?Sized>(
    tree: &mut DocumentTree,
    name_map: &NameMap,
    selections: &S,
) -> MogrifyReport {
    Mogrifier::with_name_map(name_map.clone()).mogrify(tree, selections)
}
