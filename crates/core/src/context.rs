//! Mutable state owned by a single analysis run
//!
//! Analyzers hold no state of their own. Everything that accumulates while a
//! tree is walked (variable bindings, the per-category processed ranges and
//! the values that supersede earlier URL fragments) lives here and is thrown
//! away when the run ends.

use crate::config::JshunterConfig;
use crate::position::{LineIndex, Position};
use crate::resolver::Bindings;
use crate::syntax::Span;
use std::collections::HashSet;

/// Set of `(start, end)` ranges that already produced (or were claimed by) a match
#[derive(Debug, Default, Clone)]
pub struct ProcessedRanges {
    spans: HashSet<Span>,
}

impl ProcessedRanges {
    /// Record `span`; returns `false` if it was already present
    pub fn mark(&mut self, span: Span) -> bool {
        self.spans.insert(span)
    }

    pub fn contains(&self, span: Span) -> bool {
        self.spans.contains(&span)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// One [`ProcessedRanges`] per match category; categories never share ranges
#[derive(Debug, Default, Clone)]
pub struct ProcessedSets {
    pub urls: ProcessedRanges,
    pub graphql: ProcessedRanges,
    /// Template literals consumed by a `gql`-tagged template
    pub graphql_templates: ProcessedRanges,
    pub domxss: ProcessedRanges,
    pub events: ProcessedRanges,
    /// Member expressions already reported as the target of a location write
    pub location_writes: ProcessedRanges,
    pub httpapi: ProcessedRanges,
}

/// Per-run analysis state, passed by `&mut` into every analyzer call
pub struct AnalysisContext<'a> {
    source: &'a str,
    config: &'a JshunterConfig,
    lines: LineIndex,
    pub bindings: Bindings,
    pub processed: ProcessedSets,
    superseding: Vec<String>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(source: &'a str, config: &'a JshunterConfig) -> Self {
        Self {
            source,
            config,
            lines: LineIndex::new(source),
            bindings: Bindings::default(),
            processed: ProcessedSets::default(),
            superseding: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn config(&self) -> &'a JshunterConfig {
        self.config
    }

    /// Source text covered by `span`
    pub fn text(&self, span: Span) -> &'a str {
        span.text(self.source)
    }

    /// 1-based position of a byte offset
    pub fn position(&self, offset: usize) -> Position {
        self.lines.position(offset)
    }

    /// Remember a value reconstructed from a dynamic declarator; URL matches
    /// that are strict substrings of it are dropped when the run finishes
    pub fn supersede(&mut self, value: String) {
        if !self.superseding.contains(&value) {
            self.superseding.push(value);
        }
    }

    pub fn superseding(&self) -> &[String] {
        &self.superseding
    }

    /// True if `value` is a strict substring of some superseding value
    pub fn is_superseded(&self, value: &str) -> bool {
        self.superseding
            .iter()
            .any(|full| full.len() > value.len() && full.contains(value))
    }
}
