//! Short-name map loaded from the annotation catalog CSV

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MogrifyError, Result};

/// Name map CSV configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NameMapConfig {
    /// Delimiter character
    pub delimiter: char,
    /// Whether to trim whitespace from values
    pub trim_whitespace: bool,
    /// Header of the short identifier column
    pub short_id_header: String,
    /// Header of the primary target column
    pub primary_header: String,
    /// Header of the fallback target column
    pub fallback_header: String,
}

impl Default for NameMapConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            trim_whitespace: true,
            short_id_header: "Short ID".to_string(),
            primary_header: "Modelica Path".to_string(),
            fallback_header: "Fallback Path".to_string(),
        }
    }
}

impl NameMapConfig {
    /// Set the delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to trim whitespace
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    /// Set the three column headers
    pub fn with_headers(
        mut self,
        short_id: impl Into<String>,
        primary: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        self.short_id_header = short_id.into();
        self.primary_header = primary.into();
        self.fallback_header = fallback.into();
        self
    }
}

/// Lookup from short annotation identifiers to long selection keys or values
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    entries: HashMap<String, String>,
    duplicates: Vec<String>,
}

impl NameMap {
    /// Create an empty name map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping. The first mapping for a short id wins; later ones are
    /// recorded as duplicates and return `false`.
    pub fn insert(&mut self, short: impl Into<String>, long: impl Into<String>) -> bool {
        let short = short.into();
        if self.entries.contains_key(&short) {
            warn!(short_id = %short, "duplicate short id in name map, keeping first");
            self.duplicates.push(short);
            return false;
        }
        self.entries.insert(short, long.into());
        true
    }

    /// Build from `(short id, primary target, fallback target)` rows.
    ///
    /// The first non-blank target wins; rows with no target are skipped.
    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        for (short, primary, fallback) in rows {
            map.insert_row(short.as_ref(), primary.as_ref(), fallback.as_ref());
        }
        map
    }

    fn insert_row(&mut self, short: &str, primary: &str, fallback: &str) {
        let short = short.trim();
        if short.is_empty() {
            return;
        }
        let target = [primary.trim(), fallback.trim()]
            .into_iter()
            .find(|t| !t.is_empty());
        match target {
            Some(target) => {
                self.insert(short, target);
            }
            None => warn!(short_id = %short, "name map row has no target, skipping"),
        }
    }

    /// Parse a name map from a CSV string
    pub fn from_csv_str(data: &str, config: &NameMapConfig) -> Result<Self> {
        Self::from_reader(data.as_bytes(), config)
    }

    /// Parse a name map from a CSV file
    pub fn from_csv_file(path: impl AsRef<Path>, config: &NameMapConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MogrifyError::FileNotFound(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, config)
    }

    fn from_reader<R: Read>(reader: R, config: &NameMapConfig) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(config.delimiter as u8)
            .has_headers(true)
            .trim(if config.trim_whitespace {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let find = |name: &str| headers.iter().position(|h| h == name);
        let (short_col, primary_col, fallback_col) =
            match (find(&config.short_id_header), find(&config.primary_header)) {
                (Some(short), Some(primary)) => (short, primary, find(&config.fallback_header)),
                _ if headers.len() >= 2 => (0, 1, (headers.len() > 2).then_some(2)),
                _ => return Err(MogrifyError::ColumnNotFound(config.primary_header.clone())),
            };

        let mut map = Self::new();
        for record in csv_reader.records() {
            let record = record?;
            map.insert_row(
                record.get(short_col).unwrap_or(""),
                record.get(primary_col).unwrap_or(""),
                fallback_col.and_then(|c| record.get(c)).unwrap_or(""),
            );
        }
        debug!(entries = map.len(), duplicates = map.duplicates.len(), "loaded name map");
        Ok(map)
    }

    /// Look up the long identifier for a short id
    pub fn get(&self, short: &str) -> Option<&str> {
        self.entries.get(short).map(String::as_str)
    }

    /// Resolve a token through the map, falling back to the token itself
    pub fn resolve_or_literal<'a>(&'a self, token: &'a str) -> &'a str {
        match self.get(token) {
            Some(long) => long,
            None => {
                debug!(token = %token, "token not in name map, using it literally");
                token
            }
        }
    }

    /// Short ids that appeared more than once in the input
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_headers() {
        let data = "Short ID,Modelica Path,Fallback Path\n\
                    have_CO2Sen,Buildings.Controls.have_CO2Sen,\n\
                    ReliefFan,,Buildings.Types.BuildingPressure.ReliefFan\n";
        let map = NameMap::from_csv_str(data, &NameMapConfig::default()).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("have_CO2Sen"), Some("Buildings.Controls.have_CO2Sen"));
        assert_eq!(map.get("ReliefFan"), Some("Buildings.Types.BuildingPressure.ReliefFan"));
    }

    #[test]
    fn test_columns_found_by_name() {
        let data = "Notes,Modelica Path,Short ID\nignored,A.long,a\n";
        let map = NameMap::from_csv_str(data, &NameMapConfig::default()).unwrap();
        assert_eq!(map.get("a"), Some("A.long"));
    }

    #[test]
    fn test_positional_fallback() {
        let data = "id;target\nx;X.path\n";
        let config = NameMapConfig::default().with_delimiter(';');
        let map = NameMap::from_csv_str(data, &config).unwrap();
        assert_eq!(map.get("x"), Some("X.path"));
    }

    #[test]
    fn test_duplicates_first_wins() {
        let map = NameMap::from_rows(vec![
            ("a", "first", ""),
            ("a", "second", ""),
            ("b", "", ""),
        ]);
        assert_eq!(map.get("a"), Some("first"));
        assert_eq!(map.duplicates(), &["a".to_string()]);
        assert_eq!(map.get("b"), None);
    }

    #[test]
    fn test_blank_short_ids_skipped() {
        let data = "Short ID,Modelica Path\n  ,X.path\ny,Y.path\n";
        let map = NameMap::from_csv_str(data, &NameMapConfig::default()).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_single_column_rejected() {
        let result = NameMap::from_csv_str("Short ID\nx\n", &NameMapConfig::default());
        assert!(matches!(result, Err(MogrifyError::ColumnNotFound(_))));
    }

    #[test]
    fn test_resolve_or_literal() {
        let map = NameMap::from_rows(vec![("SI", "Units.SI", "")]);
        assert_eq!(map.resolve_or_literal("SI"), "Units.SI");
        assert_eq!(map.resolve_or_literal("IP"), "IP");
    }

    #[test]
    fn test_missing_file() {
        let result = NameMap::from_csv_file("/nonexistent/map.csv", &NameMapConfig::default());
        assert!(matches!(result, Err(MogrifyError::FileNotFound(_))));
    }
}
