//! Annotation mini-language: tokenizer, recursive-descent parser, evaluator
//!
//! An annotation body is a bracketed word sequence:
//!
//! ```text
//! [YES have_CO2Sen]
//! [EQUALS buiPreCon ReliefFan]
//! [ANY buiPreCon ReturnFanMeasuredAir ReturnFanCalculatedAir]
//! [AND [YES a] [OR [NO b] [DELETE]]]
//! [ROW EQUALS typ VAV]
//! [UNITS [9 minutes per °C] [5 minutes per °F]]
//! [VENT 621]
//! ```
//!
//! Words are maximal runs of alphanumeric characters and underscores; any
//! other character outside the brackets separates words. Conditions evaluate
//! to `true` when the annotated region must be removed.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::StandardFamily;
use crate::error::{MogrifyError, Result};
use crate::name_map::NameMap;
use crate::scanner::ControlStructure;
use crate::selections::{reduces_to_true, SelectionLookup};

/// Operators accepted in a condition
pub const CONDITION_OPERATORS: [&str; 8] =
    ["YES", "NO", "EQUALS", "NOT_EQUALS", "ANY", "DELETE", "AND", "OR"];

// =============================================================================
// Expression Tree
// =============================================================================

/// A parsed condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    Yes { key: String },
    No { key: String },
    Equals { key: String, value: String },
    NotEquals { key: String, value: String },
    Any { key: String, values: Vec<String> },
    Delete,
    And { left: Box<Condition>, right: Box<Condition> },
    Or { left: Box<Condition>, right: Box<Condition> },
}

/// Scope qualifier of a table toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableScope {
    Table,
    Row,
    Column,
}

impl TableScope {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "TABLE" => Some(Self::Table),
            "ROW" => Some(Self::Row),
            "COLUMN" => Some(Self::Column),
            _ => None,
        }
    }
}

/// A complete annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    /// Remove the rest of the section when the condition holds
    Section(Condition),
    /// Remove a table, row, or column when the condition holds
    Table { scope: TableScope, condition: Condition },
    /// Replace the annotation with one of two unit renderings
    Units { si: String, ip: String },
    /// Standards toggle such as `[VENT 621]`
    Standard { family: StandardFamily, code: String },
}

// =============================================================================
// Tokenizer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    Word(&'a str),
}

#[derive(Debug, Clone, Copy)]
struct Spanned<'a> {
    token: Token<'a>,
    start: usize,
    end: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn tokenize(src: &str) -> Vec<Spanned<'_>> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;

    for (i, c) in src.char_indices() {
        if is_word_char(c) {
            word_start.get_or_insert(i);
            continue;
        }
        if let Some(start) = word_start.take() {
            tokens.push(Spanned { token: Token::Word(&src[start..i]), start, end: i });
        }
        match c {
            '[' => tokens.push(Spanned { token: Token::Open, start: i, end: i + 1 }),
            ']' => tokens.push(Spanned { token: Token::Close, start: i, end: i + 1 }),
            _ => {}
        }
    }
    if let Some(start) = word_start {
        tokens.push(Spanned { token: Token::Word(&src[start..]), start, end: src.len() });
    }
    tokens
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Spanned<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, tokens: tokenize(src), pos: 0 }
    }

    fn error(&self, message: impl Into<String>) -> MogrifyError {
        MogrifyError::syntax(self.src, message)
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).map(|s| s.token)
    }

    fn bump(&mut self) -> Option<Spanned<'a>> {
        let tok = self.tokens.get(self.pos).copied();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_open(&mut self) -> Result<Spanned<'a>> {
        match self.bump() {
            Some(s) if s.token == Token::Open => Ok(s),
            _ => Err(self.error("expected '['")),
        }
    }

    fn expect_close(&mut self) -> Result<Spanned<'a>> {
        match self.bump() {
            Some(s) if s.token == Token::Close => Ok(s),
            Some(Spanned { token: Token::Word(w), .. }) => {
                Err(self.error(format!("unexpected word {w:?}")))
            }
            _ => Err(self.error("expected ']'")),
        }
    }

    fn word(&mut self, what: &str) -> Result<&'a str> {
        match self.peek() {
            Some(Token::Word(w)) => {
                self.pos += 1;
                Ok(w)
            }
            _ => Err(self.error(format!("expected {what}"))),
        }
    }

    fn finish(&self) -> Result<()> {
        if self.pos < self.tokens.len() {
            return Err(self.error("trailing input after annotation"));
        }
        Ok(())
    }

    fn directive(&mut self) -> Result<Directive> {
        self.expect_open()?;
        let op = self.word("operator")?;
        let directive = if let Some(scope) = TableScope::from_keyword(op) {
            let condition = self.condition()?;
            Directive::Table { scope, condition }
        } else if op == "UNITS" {
            let (si, ip) = self.unit_alternatives()?;
            Directive::Units { si, ip }
        } else if let Some(family) = StandardFamily::from_keyword(op) {
            let code = self.word("standard code")?.to_string();
            Directive::Standard { family, code }
        } else {
            Directive::Section(self.condition_after(op)?)
        };
        self.expect_close()?;
        self.finish()?;
        Ok(directive)
    }

    fn condition(&mut self) -> Result<Condition> {
        let op = self.word("operator")?;
        self.condition_after(op)
    }

    fn condition_after(&mut self, op: &str) -> Result<Condition> {
        let cond = match op {
            "YES" => Condition::Yes { key: self.word("short name")?.into() },
            "NO" => Condition::No { key: self.word("short name")?.into() },
            "EQUALS" => Condition::Equals {
                key: self.word("short name")?.into(),
                value: self.word("value")?.into(),
            },
            "NOT_EQUALS" => Condition::NotEquals {
                key: self.word("short name")?.into(),
                value: self.word("value")?.into(),
            },
            "ANY" => {
                let key = self.word("short name")?.into();
                let mut values = vec![self.word("value")?.to_string()];
                while let Some(Token::Word(w)) = self.peek() {
                    values.push(w.to_string());
                    self.pos += 1;
                }
                Condition::Any { key, values }
            }
            "DELETE" => Condition::Delete,
            "AND" => {
                let (left, right) = self.nested_pair()?;
                Condition::And { left, right }
            }
            "OR" => {
                let (left, right) = self.nested_pair()?;
                Condition::Or { left, right }
            }
            other => return Err(MogrifyError::UnknownOperator(other.to_string())),
        };
        Ok(cond)
    }

    fn nested(&mut self) -> Result<Box<Condition>> {
        self.expect_open()?;
        let cond = self.condition()?;
        self.expect_close()?;
        Ok(Box::new(cond))
    }

    fn nested_pair(&mut self) -> Result<(Box<Condition>, Box<Condition>)> {
        let left = self.nested()?;
        let right = self.nested()?;
        Ok((left, right))
    }

    /// Raw inner text of the next bracket group, brackets balanced
    fn raw_group(&mut self) -> Result<String> {
        let open = self.expect_open()?;
        let mut depth = 1usize;
        while let Some(tok) = self.bump() {
            match tok.token {
                Token::Open => depth += 1,
                Token::Close => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.src[open.end..tok.start].trim().to_string());
                    }
                }
                Token::Word(_) => {}
            }
        }
        Err(self.error("unbalanced '['"))
    }

    fn unit_alternatives(&mut self) -> Result<(String, String)> {
        let si = self.raw_group()?;
        let ip = self.raw_group()?;
        if si.is_empty() || ip.is_empty() {
            return Err(self.error("empty unit alternative"));
        }
        Ok((si, ip))
    }
}

/// Parse a complete annotation
pub fn parse_directive(text: &str) -> Result<Directive> {
    Parser::new(text.trim()).directive()
}

/// Parse a bracketed condition such as `[YES a]`
pub fn parse_condition(text: &str) -> Result<Condition> {
    let mut parser = Parser::new(text.trim());
    let cond = parser.nested()?;
    parser.finish()?;
    Ok(*cond)
}

/// Parse `[<operator> [alt1] [alt2]]` with any operator word
pub fn parse_unit_alternatives(text: &str) -> Result<(String, String)> {
    let mut parser = Parser::new(text.trim());
    parser.expect_open()?;
    parser.word("operator")?;
    let alternatives = parser.unit_alternatives()?;
    parser.expect_close()?;
    parser.finish()?;
    Ok(alternatives)
}

// =============================================================================
// Evaluator
// =============================================================================

/// Result of evaluating a condition, with the anomalies met on the way
#[derive(Debug, Default)]
pub struct Assessment {
    /// Whether the region must be removed
    pub remove: bool,
    /// Logged anomalies that forced a conservative answer
    pub anomalies: Vec<MogrifyError>,
}

/// Evaluates conditions against a name map and selections.
///
/// Evaluation never mutates its inputs; both operands of `AND` and `OR` are
/// always evaluated.
pub struct Evaluator<'a, S: SelectionLookup + ?Sized> {
    name_map: &'a NameMap,
    selections: &'a S,
}

impl<'a, S: SelectionLookup + ?Sized> Evaluator<'a, S> {
    pub fn new(name_map: &'a NameMap, selections: &'a S) -> Self {
        Self { name_map, selections }
    }

    /// Whether the structure's region must be removed
    pub fn evaluate(&self, structure: &ControlStructure) -> bool {
        self.assess_text(&structure.raw_text).remove
    }

    /// Parse and evaluate annotation text.
    ///
    /// Table qualifiers are stripped; units and standards annotations are not
    /// conditions and report an anomaly.
    pub fn assess_text(&self, text: &str) -> Assessment {
        let condition = match parse_directive(text) {
            Ok(Directive::Section(cond)) | Ok(Directive::Table { condition: cond, .. }) => cond,
            Ok(other) => {
                let err = MogrifyError::syntax(text, format!("not a condition: {other:?}"));
                warn!(error = %err, "annotation kept");
                return Assessment { remove: false, anomalies: vec![err] };
            }
            Err(err) => {
                warn!(error = %err, "annotation kept");
                return Assessment { remove: false, anomalies: vec![err] };
            }
        };
        let assessment = self.assess(&condition);
        debug!(text = %text, remove = assessment.remove, "evaluated annotation");
        assessment
    }

    /// Evaluate a parsed condition
    pub fn assess(&self, condition: &Condition) -> Assessment {
        let mut anomalies = Vec::new();
        let remove = self.decide(condition, &mut anomalies);
        Assessment { remove, anomalies }
    }

    fn decide(&self, condition: &Condition, anomalies: &mut Vec<MogrifyError>) -> bool {
        match self.check(condition, anomalies) {
            Ok(remove) => remove,
            Err(err) => {
                warn!(error = %err, "condition kept");
                anomalies.push(err);
                false
            }
        }
    }

    fn check(&self, condition: &Condition, anomalies: &mut Vec<MogrifyError>) -> Result<bool> {
        let remove = match condition {
            Condition::Yes { key } => match self.selected(key)? {
                Some(values) => !reduces_to_true(values),
                None => true,
            },
            Condition::No { key } => match self.selected(key)? {
                Some(values) => reduces_to_true(values),
                None => true,
            },
            Condition::Equals { key, value } => match self.selected(key)? {
                Some(values) => !self.contains(values, value),
                None => true,
            },
            Condition::NotEquals { key, value } => match self.selected(key)? {
                Some(values) => self.contains(values, value),
                None => true,
            },
            Condition::Any { key, values: compare } => match self.selected(key)? {
                Some(values) => !compare.iter().any(|c| self.contains(values, c)),
                None => true,
            },
            Condition::Delete => true,
            Condition::And { left, right } => {
                let l = self.decide(left, anomalies);
                let r = self.decide(right, anomalies);
                l && r
            }
            Condition::Or { left, right } => {
                let l = self.decide(left, anomalies);
                let r = self.decide(right, anomalies);
                l || r
            }
        };
        Ok(remove)
    }

    /// Selected values for a short name; `Err` when the short name is unmapped
    fn selected(&self, short: &str) -> Result<Option<&'a [String]>> {
        let key = self
            .name_map
            .get(short)
            .ok_or_else(|| MogrifyError::UnknownShortName(short.to_string()))?;
        let selections: &'a S = self.selections;
        let values = selections.lookup(key);
        if values.is_none() {
            debug!(key = %key, "path not found in selections, removing");
        }
        Ok(values)
    }

    fn contains(&self, values: &[String], short_value: &str) -> bool {
        let target = self.name_map.resolve_or_literal(short_value);
        values.iter().any(|v| v == target)
    }
}

/// Whether a control structure's region must be removed
pub fn evaluate<S: SelectionLookup + ?Sized>(
    structure: &ControlStructure,
    name_map: &NameMap,
    selections: &S,
) -> bool {
    Evaluator::new(name_map, selections).evaluate(structure)
}
