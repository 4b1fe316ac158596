//! DOM cross-site-scripting sink detection
//!
//! Flags `eval(...)`, `document.write/writeln(...)`, `.postMessage(...)`,
//! `innerHTML` and `document.domain` assignments, and React's
//! `dangerouslySetInnerHTML` in call arguments or JSX attributes.

use super::NodeAnalyzer;
use crate::config::JshunterConfig;
use crate::context::AnalysisContext;
use crate::finding::{AnalyzerResult, DomXssMatch, DomXssType};
use crate::syntax::{NodeKind, Span, SyntaxNode};
use regex::Regex;
use std::sync::OnceLock;

const DANGEROUS_HTML: &str = "dangerouslySetInnerHTML";

struct EvalPatterns {
    embedded: Regex,
    call: Regex,
}

fn eval_patterns() -> &'static EvalPatterns {
    static PATTERNS: OnceLock<EvalPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| EvalPatterns {
        // "evaluation", "medieval", ...
        embedded: Regex::new(r"(?i)\w+eval\w+").unwrap(),
        call: Regex::new(r"\beval\s*\(").unwrap(),
    })
}

/// Text-level filter for sinks that are documentation or unrelated APIs
fn is_false_positive(text: &str, kind: DomXssType) -> bool {
    if text.contains("//") || text.contains("/*") || text.contains("*/") {
        return true;
    }
    if text.contains("Test ") || text.contains("Example:") {
        return true;
    }

    match kind {
        DomXssType::Eval => {
            let p = eval_patterns();
            p.embedded.is_match(text) && !p.call.is_match(text)
        }
        DomXssType::InnerHtml => text.contains("\"innerHTML\"") || text.contains("'innerHTML'"),
        DomXssType::Write => ["file.write", "stream.write", "fs.write", "console.write"]
            .iter()
            .any(|api| text.contains(api)),
        _ => false,
    }
}

/// An object-literal argument with a `dangerouslySetInnerHTML` key
fn has_dangerous_html_argument(arguments: &[SyntaxNode]) -> bool {
    arguments.iter().any(|arg| match &arg.kind {
        NodeKind::Object { properties } => properties
            .iter()
            .any(|p| p.property_key() == Some(DANGEROUS_HTML)),
        _ => false,
    })
}

pub struct DomXssAnalyzer;

impl DomXssAnalyzer {
    pub fn new() -> Self {
        Self
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
        if !ctx.processed.domxss.mark(node.span) {
            return;
        }

        if callee.is_identifier("eval") {
            emit(ctx, results, node.span, DomXssType::Eval);
            return;
        }

        if let Some((object, method)) = callee.as_member() {
            if object.is_identifier("document") && (method == "write" || method == "writeln") {
                emit(ctx, results, node.span, DomXssType::Write);
                return;
            }
            if method == "postMessage" {
                emit(ctx, results, node.span, DomXssType::PostMessage);
                return;
            }
        }

        let member_callee = matches!(callee.kind, NodeKind::Member { .. });
        if (member_callee || has_dangerous_html_argument(arguments))
            && ctx.text(node.span).contains(DANGEROUS_HTML)
        {
            emit(ctx, results, node.span, DomXssType::DangerousHtml);
        }
    }

    fn analyze_assignment(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let NodeKind::Assignment { left, .. } = &node.kind else {
            return;
        };
        if !ctx.processed.domxss.mark(node.span) {
            return;
        }

        if left.member_property() == Some("innerHTML") {
            emit(ctx, results, node.span, DomXssType::InnerHtml);
        } else if left.is_member_of("document", "domain") {
            emit(ctx, results, node.span, DomXssType::Domain);
        }
    }

    /// `<div dangerouslySetInnerHTML={{ __html: html }} />`
    fn analyze_jsx_attribute(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let NodeKind::JsxAttribute { name, .. } = &node.kind else {
            return;
        };
        if name != DANGEROUS_HTML || !ctx.processed.domxss.mark(node.span) {
            return;
        }
        emit(ctx, results, node.span, DomXssType::DangerousHtml);
    }
}

fn emit(ctx: &mut AnalysisContext<'_>, results: &mut AnalyzerResult, span: Span, kind: DomXssType) {
    let text = ctx.text(span);
    if is_false_positive(text, kind) {
        return;
    }
    let pos = ctx.position(span.start);
    results.domxss.push(DomXssMatch {
        value: text.to_string(),
        line: pos.line,
        column: pos.column,
        kind,
        span,
    });
}

impl Default for DomXssAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeAnalyzer for DomXssAnalyzer {
    fn name(&self) -> &str {
        "DOM XSS"
    }

    fn is_enabled(&self, config: &JshunterConfig) -> bool {
        config.modules.domxss
    }

    fn analyze_node(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        match &node.kind {
            NodeKind::Call { .. } => self.analyze_call(node, ctx, results),
            NodeKind::Assignment { .. } => self.analyze_assignment(node, ctx, results),
            NodeKind::JsxAttribute { .. } => self.analyze_jsx_attribute(node, ctx, results),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_inside_longer_word_is_ignored() {
        assert!(is_false_positive("evaluationeval_x", DomXssType::Eval));
        assert!(!is_false_positive("eval(code)", DomXssType::Eval));
    }

    #[test]
    fn commented_or_documented_text_is_ignored() {
        assert!(is_false_positive("document.write('//x')", DomXssType::Write));
        assert!(is_false_positive("el.innerHTML = 'Example: <b>'", DomXssType::InnerHtml));
        assert!(!is_false_positive("el.innerHTML = html", DomXssType::InnerHtml));
    }
}
