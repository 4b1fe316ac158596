//! Source parsers that lower JavaScript-family files into the typed syntax tree

pub mod javascript;

use crate::syntax::SyntaxNode;
use std::path::Path;
use thiserror::Error;

pub use javascript::JavaScriptParser;

/// Error types for parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}

/// A syntax error reported by the parser, 1-based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Result of parsing one source text
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub root: SyntaxNode,
    /// Recoverable syntax errors; the tree is still complete but may contain
    /// placeholder nodes where the errors were found
    pub errors: Vec<ParseDiagnostic>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Trait for language-specific parsers
pub trait SourceParser: Send + Sync {
    /// Get the name of the language this parser handles
    fn language_name(&self) -> &str;

    /// Get file extensions this parser handles (e.g., [".js", ".mjs"])
    fn file_extensions(&self) -> &[&str];

    /// Parse source text into the typed syntax tree
    fn parse(&self, source: &str) -> Result<ParseOutput, ParseError>;
}

/// Dispatcher that routes files to the appropriate grammar
pub struct ParserDispatcher {
    /// JavaScript first; it doubles as the fallback grammar
    parsers: [JavaScriptParser; 3],
}

impl ParserDispatcher {
    /// Create a dispatcher with the JavaScript, TypeScript and TSX grammars
    pub fn new() -> Self {
        Self {
            parsers: [
                JavaScriptParser::javascript(),
                JavaScriptParser::typescript(),
                JavaScriptParser::tsx(),
            ],
        }
    }

    /// Find a parser for the given file path based on extension
    pub fn find_parser(&self, file_path: &Path) -> Option<&dyn SourceParser> {
        let extension = file_path.extension()?.to_str()?;
        let extension_with_dot = format!(".{}", extension.to_lowercase());

        self.parsers
            .iter()
            .find(|parser| {
                parser
                    .file_extensions()
                    .contains(&extension_with_dot.as_str())
            })
            .map(|parser| parser as &dyn SourceParser)
    }

    /// Parser for `file_path`, falling back to plain JavaScript for unknown
    /// extensions (bundles are often served as `.php`, `.txt`, or no extension)
    pub fn parser_for(&self, file_path: &Path) -> &dyn SourceParser {
        self.find_parser(file_path).unwrap_or(&self.parsers[0])
    }

    /// Get all supported file extensions
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|parser| parser.file_extensions().iter().copied())
            .collect()
    }
}

impl Default for ParserDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
