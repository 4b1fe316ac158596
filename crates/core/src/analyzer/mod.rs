//! Node analyzers and the facade that drives them
//!
//! Every analyzer looks at one node at a time and appends to its own
//! collection in [`AnalyzerResult`]. Recursion is owned entirely by the
//! traversal engine; analyzers only inspect a node and its direct children.
//! Each analyzer can be enabled/disabled via `.jshunter.toml`.

pub mod dom_xss;
pub mod event_handlers;
pub mod graphql;
pub mod http_api;
pub mod urls;

use crate::config::JshunterConfig;
use crate::context::AnalysisContext;
use crate::finding::AnalyzerResult;
use crate::parser::{ParseError, ParserDispatcher, SourceParser};
use crate::syntax::SyntaxNode;
use crate::traversal::traverse;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for per-node analyzers
///
/// Implementations are stateless; everything that accumulates during a run
/// lives in the [`AnalysisContext`], so one instance can serve any number of
/// runs, concurrently.
pub trait NodeAnalyzer: Send + Sync {
    /// Human-readable name of this analyzer
    fn name(&self) -> &str;

    /// Whether this analyzer is enabled given the current config
    fn is_enabled(&self, config: &JshunterConfig) -> bool;

    /// Inspect `node` and append any matches to this analyzer's collection
    fn analyze_node(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    );
}

/// Failure to analyze a file at all
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Single-pass analysis facade
///
/// Parses a source, walks the tree once and offers every node to each enabled
/// analyzer in a fixed order (HTTP API, GraphQL, DOM XSS, URLs, events).
pub struct JsAnalyzer {
    config: JshunterConfig,
    parsers: ParserDispatcher,
    analyzers: Vec<Box<dyn NodeAnalyzer>>,
}

impl JsAnalyzer {
    /// Create a facade with all built-in analyzers
    pub fn new(config: JshunterConfig) -> Self {
        Self {
            config,
            parsers: ParserDispatcher::new(),
            analyzers: vec![
                Box::new(http_api::HttpApiAnalyzer::new()),
                Box::new(graphql::GraphqlAnalyzer::new()),
                Box::new(dom_xss::DomXssAnalyzer::new()),
                Box::new(urls::UrlAnalyzer::new()),
                Box::new(event_handlers::EventHandlerAnalyzer::new()),
            ],
        }
    }

    pub fn config(&self) -> &JshunterConfig {
        &self.config
    }

    /// Extensions (with leading dot) that have a dedicated grammar
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.parsers.supported_extensions()
    }

    /// Names of the analyzers that will run under the current config
    pub fn enabled_analyzers(&self) -> Vec<&str> {
        self.analyzers
            .iter()
            .filter(|a| a.is_enabled(&self.config))
            .map(|a| a.name())
            .collect()
    }

    /// Run every enabled analyzer over an already-parsed tree
    pub fn analyze_tree(&self, root: &SyntaxNode, source: &str) -> AnalyzerResult {
        let enabled: Vec<&dyn NodeAnalyzer> = self
            .analyzers
            .iter()
            .filter(|a| a.is_enabled(&self.config))
            .map(|a| a.as_ref())
            .collect();

        let mut ctx = AnalysisContext::new(source, &self.config);
        let mut results = AnalyzerResult::default();

        traverse(
            root,
            self.config.analysis.effective_max_depth(),
            |node, _depth| {
                for analyzer in &enabled {
                    analyzer.analyze_node(node, &mut ctx, &mut results);
                }
            },
        );

        // Fragments superseded by a fuller reconstructed value
        if !ctx.superseding().is_empty() {
            let before = results.urls.len();
            results.urls.retain(|m| !ctx.is_superseded(&m.value));
            let retracted = before - results.urls.len();
            if retracted > 0 {
                tracing::trace!("retracted {} superseded URL fragment(s)", retracted);
            }
        }

        results
    }

    /// Analyze JavaScript source text
    pub fn analyze_source(&self, source: &str) -> Result<AnalyzerResult, AnalyzeError> {
        let parser = self.parsers.parser_for(Path::new("input.js"));
        self.analyze_source_with(source, parser)
    }

    /// Analyze source text with a specific grammar
    ///
    /// A tree with syntax errors yields an empty result unless
    /// `allow_partial_parse` is set.
    pub fn analyze_source_with(
        &self,
        source: &str,
        parser: &dyn SourceParser,
    ) -> Result<AnalyzerResult, AnalyzeError> {
        let output = parser.parse(source)?;

        if output.has_errors() && !self.config.analysis.allow_partial_parse {
            let first = &output.errors[0];
            tracing::warn!(
                "{} syntax error(s) ({} at {}:{}), skipping analysis",
                output.errors.len(),
                first.message,
                first.line,
                first.column
            );
            return Ok(AnalyzerResult::default());
        }

        Ok(self.analyze_tree(&output.root, source))
    }

    /// Read and analyze one file; the grammar is picked by extension
    pub fn analyze_file(&self, path: &Path) -> Result<AnalyzerResult, AnalyzeError> {
        let source = std::fs::read_to_string(path).map_err(|source| AnalyzeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parser = self.parsers.parser_for(path);

        let results = self.analyze_source_with(&source, parser)?;
        tracing::debug!(
            "{}: {} url(s), {} graphql, {} dom-xss, {} event(s), {} http call(s)",
            path.display(),
            results.urls.len(),
            results.graphql.len(),
            results.domxss.len(),
            results.events.len(),
            results.httpapi.len()
        );
        Ok(results)
    }

    /// Analyze files in parallel; results come back in input order
    pub fn analyze_files(
        &self,
        files: &[PathBuf],
    ) -> Vec<(PathBuf, Result<AnalyzerResult, AnalyzeError>)> {
        self.analyze_files_with(files, |_| {})
    }

    /// Like [`analyze_files`](Self::analyze_files), calling `on_done` from the
    /// worker thread as each file finishes (e.g. to advance a progress bar)
    pub fn analyze_files_with<F>(
        &self,
        files: &[PathBuf],
        on_done: F,
    ) -> Vec<(PathBuf, Result<AnalyzerResult, AnalyzeError>)>
    where
        F: Fn(&Path) + Sync + Send,
    {
        files
            .par_iter()
            .map(|path| {
                let result = self.analyze_file(path);
                on_done(path);
                (path.clone(), result)
            })
            .collect()
    }
}

impl Default for JsAnalyzer {
    fn default() -> Self {
        Self::new(JshunterConfig::default())
    }
}
