//! Document Mogrification
//!
//! Resolves the conditional annotations embedded in a control sequence
//! document against a set of user selections, and prunes the document
//! accordingly.
//!
//! # Features
//!
//! - Annotation scanning over body paragraphs and table cells
//! - Boolean toggles: `YES`, `NO`, `EQUALS`, `NOT_EQUALS`, `ANY`, `DELETE`, `AND`, `OR`
//! - Section removal honoring heading nesting, info boxes, bookmarks and section breaks
//! - Table, row and column toggles
//! - SI/IP unit substitution
//! - Two-pass stage-then-commit deletion
//!
//! # Example
//!
//! ```rust
//! use doc_model::{DocumentTree, Paragraph, Run};
//! use mogrify::{Mogrifier, NameMap, Selections};
//!
//! let mut tree = DocumentTree::new();
//! let root = tree.root_id();
//! let para = tree.insert_paragraph(Paragraph::with_paragraph_style("Heading 2"), root, None).unwrap();
//! tree.insert_run(Run::with_character_style("[DELETE]", "Toggle"), para, None).unwrap();
//! tree.insert_run(Run::new("Obsolete section"), para, None).unwrap();
//!
//! let report = Mogrifier::with_name_map(NameMap::new()).mogrify(&mut tree, &Selections::new());
//! assert_eq!(report.sections_removed, 1);
//! assert!(tree.get_paragraph(para).is_none());
//! ```

mod config;
mod error;
mod name_map;
mod selections;
mod staging;
pub mod engine;
pub mod expression;
pub mod scanner;
pub mod section_remover;
pub mod table_toggle;
pub mod units;

// Re-export main types
pub use config::{MogrifyConfig, StandardFamily, StandardToggle};
pub use engine::{mogrify, Mogrifier, MogrifyReport};
pub use error::{MogrifyError, Result};
pub use expression::{
    evaluate, parse_condition, parse_directive, parse_unit_alternatives, Assessment, Condition, Directive,
    Evaluator, TableScope,
};
pub use name_map::{NameMap, NameMapConfig};
pub use scanner::{scan, ControlStructure, ScanResult, TableContext};
pub use section_remover::SectionRemover;
pub use selections::{is_truthy, reduces_to_true, SelectionLookup, Selections};
pub use staging::{CommitReport, DeletionSet};
pub use table_toggle::{apply_table_toggle, TableToggleOutcome};
pub use units::{apply_units, UnitsOutcome};
