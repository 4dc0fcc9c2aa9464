//! Document Model - Core document tree structure and types
//!
//! This crate provides the arena-backed document tree the mogrification
//! passes operate on: block-level nodes addressed by stable node IDs, a
//! style registry that resolves paragraph outline levels, and JSON
//! (de)serialization of the whole tree.

mod node;
mod document;
mod paragraph;
mod run;
mod node_id;
mod tree;
mod error;
pub mod style;
mod bookmark;
pub mod table;
pub mod section;

pub use node::*;
pub use document::*;
pub use paragraph::*;
pub use run::*;
pub use node_id::*;
pub use tree::*;
pub use error::*;
pub use style::*;
pub use bookmark::*;
pub use table::*;
pub use section::*;
