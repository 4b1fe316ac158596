//! Client-side event and navigation hooks
//!
//! Reports listener registration, `window.open`, `onmessage`/`onhashchange`
//! handlers, writes to `location` and navigation-relevant reads of
//! `location.*`.

use super::NodeAnalyzer;
use crate::config::JshunterConfig;
use crate::context::AnalysisContext;
use crate::finding::{AnalyzerResult, EventMatch, EventType};
use crate::syntax::{NodeKind, Span, SyntaxNode};

/// `location.<prop>` values whose sub-properties are navigation targets
const LOCATION_PARTS: &[&str] = &["href", "hash", "pathname", "search"];

/// `location.<prop>` reads worth reporting
const LOCATION_READS: &[&str] = &["href", "hash", "pathname", "search", "replace", "assign"];

/// True for assignment targets that navigate or rewrite the current location
fn is_location_target(left: &SyntaxNode) -> bool {
    if left.is_member_of("window", "location") || left.is_member_of("document", "location") {
        return true;
    }
    let Some((object, _)) = left.as_member() else {
        return false;
    };
    if object.is_identifier("location") || object.is_member_of("window", "location") {
        return true;
    }
    object
        .as_member()
        .is_some_and(|(inner, part)| inner.is_identifier("location") && LOCATION_PARTS.contains(&part))
}

pub struct EventHandlerAnalyzer;

impl EventHandlerAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn analyze_call(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let NodeKind::Call { callee, .. } = &node.kind else {
            return;
        };
        if !ctx.processed.events.mark(node.span) {
            return;
        }

        if callee.member_property() == Some("addEventListener") {
            emit(ctx, results, node.span, EventType::Listener);
        } else if callee.is_member_of("window", "open") || callee.is_identifier("open") {
            emit(ctx, results, node.span, EventType::WindowOpen);
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
        if !ctx.processed.events.mark(node.span) {
            return;
        }

        match left.member_property() {
            Some("onmessage") => emit(ctx, results, node.span, EventType::OnMessage),
            Some("onhashchange") => emit(ctx, results, node.span, EventType::OnHashChange),
            _ if is_location_target(left) => {
                // A write is not also a read
                ctx.processed.location_writes.mark(left.span);
                emit(ctx, results, node.span, EventType::Location);
            }
            _ => {}
        }
    }

    fn analyze_member(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let Some((object, property)) = node.as_member() else {
            return;
        };
        if !object.is_identifier("location") || !LOCATION_READS.contains(&property) {
            return;
        }
        if ctx.processed.location_writes.contains(node.span) {
            return;
        }
        if !ctx.processed.events.mark(node.span) {
            return;
        }
        emit(ctx, results, node.span, EventType::Location);
    }
}

fn emit(ctx: &mut AnalysisContext<'_>, results: &mut AnalyzerResult, span: Span, kind: EventType) {
    let pos = ctx.position(span.start);
    results.events.push(EventMatch {
        value: ctx.text(span).to_string(),
        line: pos.line,
        column: pos.column,
        kind,
        span,
    });
}

impl Default for EventHandlerAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeAnalyzer for EventHandlerAnalyzer {
    fn name(&self) -> &str {
        "Event Handlers"
    }

    fn is_enabled(&self, config: &JshunterConfig) -> bool {
        config.modules.events
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
            NodeKind::Member { .. } => self.analyze_member(node, ctx, results),
            _ => {}
        }
    }
}
