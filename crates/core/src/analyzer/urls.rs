//! URL, endpoint and path discovery
//!
//! Candidate strings are reconstructed with the string-value resolver and
//! scored by [`UrlClassifier`]. Parents are visited before their children, so
//! the first (richest) context that claims a byte range wins: a literal that
//! is the first argument of `fetch(...)` is reported once, with the HTTP call
//! bonus, and not again when the literal itself is visited.

use super::NodeAnalyzer;
use crate::classify::url::{HTTP_CALL_NAMES, URL_PROPERTY_NAMES};
use crate::classify::{DiscoverySite, UrlClassifier};
use crate::config::JshunterConfig;
use crate::context::AnalysisContext;
use crate::finding::{AnalyzerResult, UrlMatch, UrlType};
use crate::resolver::{is_concat_call, is_dynamic, normalize_url, resolve};
use crate::syntax::{NodeKind, Span, SyntaxNode};

/// Identifier callees whose first argument is treated as a URL
const URL_CALLEES: &[&str] = &[
    "fetch", "axios", "request", "get", "post", "put", "delete", "patch", "open",
];

/// `$.<method>` / `jQuery.<method>` calls that take a URL first
const JQUERY_AJAX_METHODS: &[&str] = &["ajax", "get", "post", "put", "delete"];

/// Assignment targets (`x.href = ...`) that receive a URL
const URL_ASSIGNMENT_TARGETS: &[&str] = &["href", "src", "location"];

pub struct UrlAnalyzer;

impl UrlAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn analyze_literal(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        if let Some(value) = node.as_string_literal() {
            emit(ctx, results, node.span, value, DiscoverySite::Plain);
        }
    }

    /// Templates, `+` chains and `.concat()` calls
    fn analyze_expression(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        if let Some(value) = resolve(node, &ctx.bindings) {
            emit(ctx, results, node.span, &value, DiscoverySite::Plain);
        }
    }

    fn analyze_call(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let NodeKind::Call { callee, arguments } = &node.kind else {
            return;
        };

        if let Some(name) = callee.as_identifier() {
            if URL_CALLEES.contains(&name) {
                let site = if HTTP_CALL_NAMES.contains(&name) {
                    DiscoverySite::HttpCallArgument
                } else {
                    DiscoverySite::Plain
                };
                self.analyze_argument(arguments.first(), site, ctx, results);
            }
            return;
        }

        let Some((object, method)) = callee.as_member() else {
            return;
        };

        let is_jquery = object.is_identifier("$") || object.is_identifier("jQuery");
        if is_jquery && JQUERY_AJAX_METHODS.contains(&method) {
            let site = if HTTP_CALL_NAMES.contains(&method) {
                DiscoverySite::HttpCallArgument
            } else {
                DiscoverySite::Plain
            };
            self.analyze_argument(arguments.first(), site, ctx, results);
        } else if method == "load" {
            self.analyze_argument(arguments.first(), DiscoverySite::Plain, ctx, results);
        } else if (method == "replace" || method == "assign") && object.is_location_object() {
            self.analyze_argument(arguments.first(), DiscoverySite::Plain, ctx, results);
        } else if is_concat_call(node) {
            self.analyze_expression(node, ctx, results);
        }
    }

    fn analyze_argument(
        &self,
        argument: Option<&SyntaxNode>,
        site: DiscoverySite,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let Some(argument) = argument else {
            return;
        };
        if let Some(value) = resolve(argument, &ctx.bindings) {
            emit(ctx, results, argument.span, &value, site);
        }
    }

    fn analyze_assignment(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let NodeKind::Assignment { left, right, .. } = &node.kind else {
            return;
        };
        let Some(property) = left.member_property() else {
            return;
        };
        if !URL_ASSIGNMENT_TARGETS.contains(&property) {
            return;
        }

        let site = if URL_PROPERTY_NAMES.contains(&property) {
            DiscoverySite::UrlProperty
        } else {
            DiscoverySite::Plain
        };
        if let Some(value) = resolve(right, &ctx.bindings) {
            emit(ctx, results, right.span, &value, site);
        }
    }

    /// Bind the declared name and report the initializer
    fn analyze_declarator(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let NodeKind::VariableDeclarator { id, init } = &node.kind else {
            return;
        };
        let (Some(name), Some(init)) = (id.as_identifier(), init.as_deref()) else {
            return;
        };
        let Some(value) = resolve(init, &ctx.bindings) else {
            return;
        };

        ctx.bindings.bind(name, value.clone());
        if is_dynamic(init) {
            ctx.supersede(normalize_url(&value));
        }
        emit(ctx, results, init.span, &value, DiscoverySite::Plain);
    }

    fn analyze_property(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let (Some(key), Some(value_node)) = (node.property_key(), node.property_value()) else {
            return;
        };
        if !URL_PROPERTY_NAMES.contains(&key) {
            return;
        }
        if let Some(value) = resolve(value_node, &ctx.bindings) {
            emit(ctx, results, value_node.span, &value, DiscoverySite::UrlProperty);
        }
    }
}

/// Validate, classify and record one candidate for `span`
fn emit(
    ctx: &mut AnalysisContext<'_>,
    results: &mut AnalyzerResult,
    span: Span,
    raw: &str,
    site: DiscoverySite,
) {
    if ctx.processed.urls.contains(span) {
        return;
    }

    let config = ctx.config();
    let classifier = UrlClassifier::new(config);
    let value = normalize_url(raw);
    if !classifier.is_valid_candidate(&value) {
        return;
    }

    let classification = classifier.classify(&value, site);
    let analysis = &config.analysis;
    match classification.kind {
        UrlType::RelativePath if !analysis.include_relative_paths => return,
        UrlType::FilePath if !analysis.include_file_extensions => return,
        _ => {}
    }
    if classification.metadata.confidence < analysis.confidence_threshold {
        return;
    }

    ctx.processed.urls.mark(span);
    let pos = ctx.position(span.start);
    results.urls.push(UrlMatch {
        value,
        line: pos.line,
        column: pos.column,
        kind: classification.kind,
        metadata: classification.metadata,
        span,
    });
}

impl Default for UrlAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeAnalyzer for UrlAnalyzer {
    fn name(&self) -> &str {
        "URL & Endpoint"
    }

    fn is_enabled(&self, config: &JshunterConfig) -> bool {
        config.modules.urls
    }

    fn analyze_node(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let analysis = &ctx.config().analysis;
        match &node.kind {
            NodeKind::Literal { .. } => self.analyze_literal(node, ctx, results),
            NodeKind::TemplateLiteral { .. } => self.analyze_expression(node, ctx, results),
            NodeKind::Binary { operator, .. } if operator == "+" => {
                self.analyze_expression(node, ctx, results)
            }
            NodeKind::Call { .. } => self.analyze_call(node, ctx, results),
            NodeKind::Assignment { .. } => self.analyze_assignment(node, ctx, results),
            NodeKind::VariableDeclarator { .. } if analysis.enable_variable_tracking => {
                self.analyze_declarator(node, ctx, results)
            }
            NodeKind::Property { .. } if analysis.enable_object_property_analysis => {
                self.analyze_property(node, ctx, results)
            }
            _ => {}
        }
    }
}
