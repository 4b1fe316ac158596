//! GraphQL operation and schema discovery
//!
//! Looks at string and template literals, `gql`-tagged templates,
//! `JSON.parse("...")` calls carrying a serialized document, and object
//! literals shaped like a pre-compiled document.

use super::NodeAnalyzer;
use crate::classify::graphql::{
    classify, literal_to_json, looks_like_document_object, reconstruct_document,
    starts_with_keyword, GENERIC_OBJECT_DOCUMENT,
};
use crate::classify::GraphqlValidator;
use crate::config::JshunterConfig;
use crate::context::AnalysisContext;
use crate::finding::{AnalyzerResult, GraphqlMatch};
use crate::syntax::{NodeKind, Span, SyntaxNode};
use regex::Regex;
use std::sync::OnceLock;

fn graphql_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:gql|graphql|GraphQL)$").unwrap())
}

pub struct GraphqlAnalyzer;

impl GraphqlAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn analyze_literal(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let Some(value) = node.as_string_literal() else {
            return;
        };
        let validator = GraphqlValidator::new(&ctx.config().heuristics);
        if validator.is_plausible_operation(value) && starts_with_keyword(value) {
            emit(ctx, results, node.span, value.to_string());
        }
    }

    /// Untagged template: validated without its `${...}` parts, reported with them
    fn analyze_template(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        if ctx.processed.graphql_templates.contains(node.span) {
            return;
        }
        let NodeKind::TemplateLiteral { quasis, .. } = &node.kind else {
            return;
        };

        let stripped: String = quasis.iter().map(|q| q.raw.as_str()).collect();
        let validator = GraphqlValidator::new(&ctx.config().heuristics);
        if !validator.is_plausible_operation(&stripped) || !starts_with_keyword(&stripped) {
            return;
        }

        let value = template_body(ctx.text(node.span)).to_string();
        ctx.processed.graphql_templates.mark(node.span);
        emit(ctx, results, node.span, value);
    }

    fn analyze_tagged_template(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let NodeKind::TaggedTemplate { tag, quasi } = &node.kind else {
            return;
        };

        // The inner template is never reported on its own, tag or not
        ctx.processed.graphql_templates.mark(quasi.span);

        let tag_name = match tag.as_identifier() {
            Some(name) => name,
            None => ctx.text(tag.span),
        };
        if !graphql_tag_regex().is_match(tag_name) {
            return;
        }

        let NodeKind::TemplateLiteral { quasis, .. } = &quasi.kind else {
            return;
        };
        let stripped: String = quasis.iter().map(|q| q.raw.as_str()).collect();
        let validator = GraphqlValidator::new(&ctx.config().heuristics);
        if !validator.is_plausible_operation(&stripped) {
            return;
        }

        let value = template_body(ctx.text(quasi.span)).to_string();
        emit(ctx, results, node.span, value);
    }

    /// `JSON.parse("{\"kind\":\"Document\",...}")`
    fn analyze_json_parse(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let NodeKind::Call { callee, arguments } = &node.kind else {
            return;
        };
        if !callee.is_member_of("JSON", "parse") {
            return;
        }
        let Some(arg) = arguments.first() else {
            return;
        };
        let Some(text) = arg.as_string_literal() else {
            return;
        };

        let doc: serde_json::Value = match serde_json::from_str(text) {
            Ok(doc) => doc,
            Err(_) => return,
        };
        let Some(rebuilt) = reconstruct_document(&doc) else {
            return;
        };

        let validator = GraphqlValidator::new(&ctx.config().heuristics);
        if validator.is_plausible_operation(&rebuilt) {
            emit(ctx, results, arg.span, rebuilt);
        }
    }

    /// Object literal that is itself a compiled document
    fn analyze_object(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        if !looks_like_document_object(node) {
            return;
        }

        let rebuilt = literal_to_json(node)
            .and_then(|doc| reconstruct_document(&doc))
            .unwrap_or_else(|| GENERIC_OBJECT_DOCUMENT.to_string());

        let validator = GraphqlValidator::new(&ctx.config().heuristics);
        if validator.is_plausible_operation(&rebuilt) {
            emit(ctx, results, node.span, rebuilt);
        }
    }
}

/// Template source without its enclosing backticks
fn template_body(raw: &str) -> &str {
    let raw = raw.strip_prefix('`').unwrap_or(raw);
    raw.strip_suffix('`').unwrap_or(raw)
}

fn emit(ctx: &mut AnalysisContext<'_>, results: &mut AnalyzerResult, span: Span, value: String) {
    if !ctx.processed.graphql.mark(span) {
        return;
    }
    let pos = ctx.position(span.start);
    results.graphql.push(GraphqlMatch {
        kind: classify(&value),
        value,
        line: pos.line,
        column: pos.column,
        span,
    });
}

impl Default for GraphqlAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeAnalyzer for GraphqlAnalyzer {
    fn name(&self) -> &str {
        "GraphQL"
    }

    fn is_enabled(&self, config: &JshunterConfig) -> bool {
        config.modules.graphql
    }

    fn analyze_node(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        match &node.kind {
            NodeKind::Literal { .. } => self.analyze_literal(node, ctx, results),
            NodeKind::TemplateLiteral { .. } => self.analyze_template(node, ctx, results),
            NodeKind::TaggedTemplate { .. } => self.analyze_tagged_template(node, ctx, results),
            NodeKind::Call { .. } => self.analyze_json_parse(node, ctx, results),
            NodeKind::Object { .. } => self.analyze_object(node, ctx, results),
            _ => {}
        }
    }
}
