//! Unit substitution for `[UNITS [si] [ip]]` annotations

use doc_model::DocumentTree;
use tracing::{debug, warn};

use crate::config::MogrifyConfig;
use crate::error::{MogrifyError, Result};
use crate::expression::parse_unit_alternatives;
use crate::name_map::NameMap;
use crate::scanner::ControlStructure;
use crate::selections::SelectionLookup;

/// Outcome of the unit substitution pass
#[derive(Debug, Default)]
pub struct UnitsOutcome {
    /// Annotations rewritten
    pub substituted: usize,
    /// Annotations left untouched because of an anomaly
    pub anomalies: Vec<MogrifyError>,
}

/// Rewrite every UNITS annotation with the selected rendering.
///
/// The first run of the annotation receives the chosen text and loses its
/// character style; the remaining runs stay annotation-styled and are
/// stripped later with the rest of the markup.
pub fn apply_units<S: SelectionLookup + ?Sized>(
    tree: &mut DocumentTree,
    structures: &[ControlStructure],
    name_map: &NameMap,
    selections: &S,
    config: &MogrifyConfig,
) -> UnitsOutcome {
    let mut outcome = UnitsOutcome::default();
    for structure in structures {
        if name_map.resolve_or_literal(&structure.operator) != config.units_key {
            continue;
        }
        match substitute(tree, structure, name_map, selections, config) {
            Ok(()) => outcome.substituted += 1,
            Err(err) => {
                warn!(error = %err, "units annotation left unmodified");
                outcome.anomalies.push(err);
            }
        }
    }
    outcome
}

fn substitute<S: SelectionLookup + ?Sized>(
    tree: &mut DocumentTree,
    structure: &ControlStructure,
    name_map: &NameMap,
    selections: &S,
    config: &MogrifyConfig,
) -> Result<()> {
    let (si, ip) = parse_unit_alternatives(&structure.raw_text)?;

    let selected = selections
        .lookup(&config.units_key)
        .ok_or_else(|| MogrifyError::InvalidUnitSystem(String::new()))?;
    let si_sentinel = name_map.resolve_or_literal(&config.si_sentinel);
    let ip_sentinel = name_map.resolve_or_literal(&config.ip_sentinel);

    let text = if selected.iter().any(|v| v == si_sentinel) {
        si
    } else if selected.iter().any(|v| v == ip_sentinel) {
        ip
    } else {
        return Err(MogrifyError::InvalidUnitSystem(selected.join(",")));
    };

    let first = structure
        .runs
        .first()
        .copied()
        .ok_or_else(|| MogrifyError::syntax(&structure.raw_text, "annotation has no runs"))?;
    let run = tree
        .get_run_mut(first)
        .ok_or(doc_model::DocModelError::NodeNotFound(first.as_uuid()))?;
    debug!(run = %first, text = %text, "units substituted");
    run.text = text;
    run.set_character_style(None);
    Ok(())
}
