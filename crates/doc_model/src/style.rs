//! Style system - style identifiers, registry, and outline levels
//!
//! Paragraph styles carry the document's outline structure: a heading style
//! either declares an explicit outline level or follows the "Heading N"
//! naming convention. Outline levels are resolved once, when a paragraph
//! enters the tree, so that later passes never look at style names to find
//! section boundaries.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Level reported for paragraphs whose style carries no outline level.
///
/// Deeper than any real heading, so it never closes a section.
pub const BODY_OUTLINE_LEVEL: u8 = 100;

// =============================================================================
// Style Identifier
// =============================================================================

/// Unique identifier for a style
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleId(pub String);

impl StyleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StyleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StyleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for StyleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Style Types
// =============================================================================

/// The type of style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleType {
    /// Paragraph style - applied to entire paragraphs
    Paragraph,
    /// Character style - applied to text runs
    Character,
}

/// A named style definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    /// Unique identifier (e.g. "Heading2")
    pub id: StyleId,
    /// Display name (e.g. "Heading 2")
    pub name: String,
    /// Style type
    pub style_type: StyleType,
    /// Base style this style inherits from
    pub based_on: Option<StyleId>,
    /// Explicit outline level; overrides the name convention
    pub outline_level: Option<u8>,
    /// Whether this is a built-in style
    pub built_in: bool,
}

impl Style {
    /// Create a new paragraph style
    pub fn paragraph(id: impl Into<StyleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            style_type: StyleType::Paragraph,
            based_on: None,
            outline_level: None,
            built_in: false,
        }
    }

    /// Create a new character style
    pub fn character(id: impl Into<StyleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            style_type: StyleType::Character,
            based_on: None,
            outline_level: None,
            built_in: false,
        }
    }

    /// Set the base style
    pub fn with_based_on(mut self, base: impl Into<StyleId>) -> Self {
        self.based_on = Some(base.into());
        self
    }

    /// Set an explicit outline level
    pub fn with_outline_level(mut self, level: u8) -> Self {
        self.outline_level = Some(level);
        self
    }

    /// Set as built-in
    pub fn as_built_in(mut self) -> Self {
        self.built_in = true;
        self
    }
}

/// Parse the outline level encoded in a "Heading N" style name
pub fn heading_level_from_name(name: &str) -> Option<u8> {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    let re = HEADING.get_or_init(|| Regex::new(r"^Heading (\d+)").expect("static pattern"));
    re.captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
}

// =============================================================================
// Style Registry
// =============================================================================

/// Registry for storing and looking up styles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleRegistry {
    /// All styles indexed by ID
    styles: HashMap<StyleId, Style>,
}

impl StyleRegistry {
    /// Create a new style registry with built-in styles
    pub fn new() -> Self {
        let mut registry = Self {
            styles: HashMap::new(),
        };
        registry.register_built_in_styles();
        registry
    }

    fn register_built_in_styles(&mut self) {
        self.register(Style::paragraph("Normal", "Normal").as_built_in());
        self.register(
            Style::character("DefaultParagraphFont", "Default Paragraph Font").as_built_in(),
        );

        for level in 1..=9u8 {
            let heading = Style::paragraph(format!("Heading{level}"), format!("Heading {level}"))
                .with_based_on("Normal")
                .with_outline_level(level)
                .as_built_in();
            self.register(heading);
        }
    }

    /// Register a style in the registry
    pub fn register(&mut self, style: Style) {
        self.styles.insert(style.id.clone(), style);
    }

    /// Get a style by ID
    pub fn get(&self, id: &StyleId) -> Option<&Style> {
        self.styles.get(id)
    }

    /// Check if a style exists
    pub fn contains(&self, id: &StyleId) -> bool {
        self.styles.contains_key(id)
    }

    /// Display name for a style ID.
    ///
    /// Unregistered IDs are taken to be their own display name, which is how
    /// styles imported from a foreign catalog show up.
    pub fn display_name<'a>(&'a self, id: &'a StyleId) -> &'a str {
        self.styles
            .get(id)
            .map(|s| s.name.as_str())
            .unwrap_or_else(|| id.as_str())
    }

    /// Resolve the outline level of a paragraph style.
    ///
    /// Walks the `based_on` chain looking for an explicit level, then falls
    /// back to the "Heading N" naming convention of the style itself.
    pub fn outline_level(&self, id: &StyleId) -> Option<u8> {
        let mut current = Some(id.clone());
        let mut visited = std::collections::HashSet::new();

        while let Some(cid) = current {
            if !visited.insert(cid.clone()) {
                break; // Circular reference protection
            }
            match self.styles.get(&cid) {
                Some(style) => {
                    if let Some(level) = style.outline_level {
                        return Some(level);
                    }
                    current = style.based_on.clone();
                }
                None => break,
            }
        }

        heading_level_from_name(self.display_name(id))
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_registry_creation() {
        let registry = StyleRegistry::new();
        assert!(registry.contains(&StyleId::new("Normal")));
        assert!(registry.contains(&StyleId::new("Heading1")));
        assert!(registry.contains(&StyleId::new("Heading9")));
    }

    #[test]
    fn test_builtin_heading_levels() {
        let registry = StyleRegistry::new();
        assert_eq!(registry.outline_level(&StyleId::new("Heading2")), Some(2));
        assert_eq!(registry.outline_level(&StyleId::new("Normal")), None);
    }

    #[test]
    fn test_unregistered_name_convention() {
        let registry = StyleRegistry::new();
        assert_eq!(registry.outline_level(&StyleId::new("Heading 3")), Some(3));
        assert_eq!(registry.outline_level(&StyleId::new("Info. box")), None);
        assert_eq!(registry.display_name(&StyleId::new("Info. box")), "Info. box");
    }

    #[test]
    fn test_explicit_level_is_inherited() {
        let mut registry = StyleRegistry::new();
        registry.register(Style::paragraph("InfoboxHeading", "Infobox Heading").with_outline_level(0));
        registry.register(
            Style::paragraph("InfoboxHeadingAlt", "Infobox Heading Alt").with_based_on("InfoboxHeading"),
        );
        assert_eq!(registry.outline_level(&StyleId::new("InfoboxHeadingAlt")), Some(0));
    }

    #[test]
    fn test_circular_based_on_terminates() {
        let mut registry = StyleRegistry::new();
        registry.register(Style::paragraph("A", "A").with_based_on("B"));
        registry.register(Style::paragraph("B", "B").with_based_on("A"));
        assert_eq!(registry.outline_level(&StyleId::new("A")), None);
    }

    #[test]
    fn test_heading_level_from_name() {
        assert_eq!(heading_level_from_name("Heading 12"), Some(12));
        assert_eq!(heading_level_from_name("Heading"), None);
        assert_eq!(heading_level_from_name("Subheading 2"), None);
    }
}
