//! JSHunter Core - static attack-surface discovery for JavaScript
//!
//! This crate provides the analysis engine behind the `jshunter` CLI:
//! - JavaScript/TypeScript parsing via Tree-sitter, lowered into a typed syntax tree
//! - A single depth-bounded traversal feeding five independent analyzers
//!   (URLs, GraphQL, DOM XSS sinks, event handlers, HTTP client calls)
//! - Static string reconstruction with confidence-scored URL classification
//! - Configuration and gitignore-aware file discovery

pub mod analyzer;
pub mod classify;
pub mod config;
pub mod context;
pub mod discovery;
pub mod finding;
pub mod parser;
pub mod position;
pub mod resolver;
pub mod syntax;
pub mod traversal;

pub use analyzer::{AnalyzeError, JsAnalyzer, NodeAnalyzer};
pub use classify::{DiscoverySite, GraphqlValidator, UrlClassifier};
pub use config::JshunterConfig;
pub use context::AnalysisContext;
pub use discovery::discover_files;
pub use finding::{
    AnalyzerResult, DomXssMatch, DomXssType, EventMatch, EventType, GraphqlMatch, GraphqlType,
    HttpApiMatch, HttpApiType, UrlMatch, UrlMetadata, UrlType,
};
pub use parser::{ParseError, ParseOutput, ParserDispatcher, SourceParser};
pub use position::{LineIndex, Position};
pub use resolver::{resolve, Bindings, PLACEHOLDER};
pub use syntax::{NodeKind, Span, SyntaxNode};
pub use traversal::traverse;

/// JSHunter version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
