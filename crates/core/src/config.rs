//! Configuration file parsing for .jshunter.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file searched for in the target directory and its ancestors
pub const CONFIG_FILE_NAME: &str = ".jshunter.toml";

/// Depth bound used when deep traversal is disabled
pub const SHALLOW_TRAVERSAL_DEPTH: usize = 10;

/// Main configuration structure for .jshunter.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JshunterConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub heuristics: HeuristicsConfig,

    #[serde(default)]
    pub modules: ModulesConfig,

    #[serde(default)]
    pub ignore: IgnoreConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Options that shape one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// URL matches below this confidence are dropped
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Nodes deeper than this (root = 0) are skipped together with their subtrees
    #[serde(default = "default_max_traversal_depth")]
    pub max_traversal_depth: usize,

    #[serde(default = "default_min_path_length")]
    pub min_path_length: usize,

    #[serde(default = "default_max_path_length")]
    pub max_path_length: usize,

    /// Keep `./` and `../` paths
    #[serde(default = "default_true")]
    pub include_relative_paths: bool,

    /// Keep file paths and reward recognized extensions
    #[serde(default = "default_true")]
    pub include_file_extensions: bool,

    /// Reject literals, keywords and other words that are never URLs
    #[serde(default = "default_true")]
    pub exclude_common_words: bool,

    /// Track `let/const/var` string values so later references resolve
    #[serde(default = "default_true")]
    pub enable_variable_tracking: bool,

    /// Inspect object literal properties with URL-ish keys (`url`, `endpoint`, ...)
    #[serde(default = "default_true")]
    pub enable_object_property_analysis: bool,

    /// When false the traversal depth is capped at [`SHALLOW_TRAVERSAL_DEPTH`]
    #[serde(default = "default_true")]
    pub enable_deep_traversal: bool,

    /// Analyze files whose syntax tree contains recoverable errors
    #[serde(default)]
    pub allow_partial_parse: bool,
}

/// Empirically chosen thresholds and confidence bonuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicsConfig {
    /// Shannon entropy (bits/char) at or above which a candidate is treated as a token
    #[serde(default = "default_entropy_threshold")]
    pub entropy_threshold: f64,

    /// Maximum number of programming keywords tolerated in a GraphQL schema fragment
    #[serde(default = "default_schema_keyword_limit")]
    pub schema_keyword_limit: usize,

    #[serde(default = "default_graphql_min_length")]
    pub graphql_min_length: usize,

    #[serde(default = "default_schema_min_length")]
    pub schema_min_length: usize,

    /// Minimum length of the text between an operation's outer braces
    #[serde(default = "default_selection_min_length")]
    pub selection_min_length: usize,

    #[serde(default = "default_api_bonus")]
    pub api_bonus: f64,

    #[serde(default = "default_extension_bonus")]
    pub extension_bonus: f64,

    #[serde(default = "default_query_bonus")]
    pub query_bonus: f64,

    #[serde(default = "default_mime_bonus")]
    pub mime_bonus: f64,

    #[serde(default = "default_property_bonus")]
    pub property_bonus: f64,

    #[serde(default = "default_http_call_bonus")]
    pub http_call_bonus: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulesConfig {
    /// Enable/disable the individual analyzers
    #[serde(default = "default_true")]
    pub urls: bool,

    #[serde(default = "default_true")]
    pub graphql: bool,

    #[serde(default = "default_true")]
    pub domxss: bool,

    #[serde(default = "default_true")]
    pub events: bool,

    #[serde(default = "default_true")]
    pub httpapi: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoreConfig {
    /// Paths to ignore during directory discovery
    #[serde(default = "default_ignore_paths")]
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format ("json" or "terminal")
    #[serde(default = "default_format")]
    pub format: String,

    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
}

// Default functions
fn default_confidence_threshold() -> f64 {
    0.5
}

fn default_max_traversal_depth() -> usize {
    200
}

fn default_min_path_length() -> usize {
    3
}

fn default_max_path_length() -> usize {
    2000
}

fn default_true() -> bool {
    true
}

fn default_entropy_threshold() -> f64 {
    4.9
}

fn default_schema_keyword_limit() -> usize {
    2
}

fn default_graphql_min_length() -> usize {
    15
}

fn default_schema_min_length() -> usize {
    20
}

fn default_selection_min_length() -> usize {
    3
}

fn default_api_bonus() -> f64 {
    0.1
}

fn default_extension_bonus() -> f64 {
    0.1
}

fn default_query_bonus() -> f64 {
    0.05
}

fn default_mime_bonus() -> f64 {
    0.15
}

fn default_property_bonus() -> f64 {
    0.1
}

fn default_http_call_bonus() -> f64 {
    0.1
}

fn default_ignore_paths() -> Vec<String> {
    vec![
        "node_modules/".to_string(),
        ".git/".to_string(),
        "target/".to_string(),
        "coverage/".to_string(),
        ".next/cache/".to_string(),
    ]
}

fn default_format() -> String {
    "json".to_string()
}

impl Default for JshunterConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty TOML should parse to defaults")
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            max_traversal_depth: default_max_traversal_depth(),
            min_path_length: default_min_path_length(),
            max_path_length: default_max_path_length(),
            include_relative_paths: true,
            include_file_extensions: true,
            exclude_common_words: true,
            enable_variable_tracking: true,
            enable_object_property_analysis: true,
            enable_deep_traversal: true,
            allow_partial_parse: false,
        }
    }
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            entropy_threshold: default_entropy_threshold(),
            schema_keyword_limit: default_schema_keyword_limit(),
            graphql_min_length: default_graphql_min_length(),
            schema_min_length: default_schema_min_length(),
            selection_min_length: default_selection_min_length(),
            api_bonus: default_api_bonus(),
            extension_bonus: default_extension_bonus(),
            query_bonus: default_query_bonus(),
            mime_bonus: default_mime_bonus(),
            property_bonus: default_property_bonus(),
            http_call_bonus: default_http_call_bonus(),
        }
    }
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            urls: true,
            graphql: true,
            domxss: true,
            events: true,
            httpapi: true,
        }
    }
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            paths: default_ignore_paths(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            pretty: true,
        }
    }
}

impl AnalysisConfig {
    /// Depth bound actually applied by the traversal engine
    pub fn effective_max_depth(&self) -> usize {
        if self.enable_deep_traversal {
            self.max_traversal_depth
        } else {
            self.max_traversal_depth.min(SHALLOW_TRAVERSAL_DEPTH)
        }
    }
}

impl JshunterConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: JshunterConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Find and load .jshunter.toml from the given directory or its ancestors
    pub fn find_and_load(start_dir: &Path) -> Result<Self> {
        let mut current = start_dir;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::from_file(&config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // No config found, use defaults
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
