//! HTTP client call sites: fetch, axios, jQuery AJAX and XMLHttpRequest
//!
//! Method and URL are filled in only when they are plain string literals at
//! the call site; nothing is resolved through variables here.

use super::NodeAnalyzer;
use crate::config::JshunterConfig;
use crate::context::AnalysisContext;
use crate::finding::{AnalyzerResult, HttpApiMatch, HttpApiType};
use crate::syntax::{NodeKind, Span, SyntaxNode};

const AXIOS_METHODS: &[&str] = &[
    "get", "post", "put", "delete", "patch", "head", "options", "request",
];

const JQUERY_AJAX_METHODS: &[&str] = &["ajax", "get", "post", "put", "delete"];

/// Verbs accepted as the first argument of `<xhr>.open(...)`
const HTTP_VERBS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// What could be read statically from a call
#[derive(Debug, Default)]
struct CallDetails {
    method: Option<String>,
    url: Option<String>,
    options: Option<Vec<String>>,
}

impl CallDetails {
    /// Read `url`, `method`/`type` and the key list from an options object
    fn merge_object(&mut self, object: &SyntaxNode) {
        let NodeKind::Object { properties } = &object.kind else {
            return;
        };

        if self.url.is_none() {
            self.url = object
                .object_property("url")
                .and_then(SyntaxNode::as_string_literal)
                .map(str::to_string);
        }
        if self.method.is_none() {
            self.method = object
                .object_property("method")
                .or_else(|| object.object_property("type"))
                .and_then(SyntaxNode::as_string_literal)
                .map(str::to_uppercase);
        }

        let keys: Vec<String> = properties
            .iter()
            .filter_map(|p| p.property_key())
            .map(str::to_string)
            .collect();
        if !keys.is_empty() {
            self.options = Some(keys);
        }
    }
}

fn literal_url(arg: Option<&SyntaxNode>) -> Option<String> {
    arg.and_then(SyntaxNode::as_string_literal)
        .map(str::to_string)
}

fn is_object(node: &SyntaxNode) -> bool {
    matches!(node.kind, NodeKind::Object { .. })
}

pub struct HttpApiAnalyzer;

impl HttpApiAnalyzer {
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
        if !ctx.processed.httpapi.mark(node.span) {
            return;
        }

        if let Some(name) = callee.as_identifier() {
            match name {
                "fetch" => {
                    let mut details = CallDetails {
                        url: literal_url(arguments.first()),
                        ..CallDetails::default()
                    };
                    if let Some(options) = arguments.get(1) {
                        details.merge_object(options);
                    }
                    emit(ctx, results, node.span, HttpApiType::Fetch, details);
                }
                "axios" => {
                    let details = Self::config_call(arguments);
                    emit(ctx, results, node.span, HttpApiType::Axios, details);
                }
                _ => {}
            }
            return;
        }

        let Some((object, method)) = callee.as_member() else {
            return;
        };

        if object.is_identifier("axios") && AXIOS_METHODS.contains(&method) {
            let details = if method == "request" {
                Self::config_call(arguments)
            } else {
                let mut details = CallDetails {
                    url: literal_url(arguments.first()),
                    method: Some(method.to_uppercase()),
                    ..CallDetails::default()
                };
                // axios.get(url, config) / axios.post(url, data, config)
                if let Some(config) = arguments.iter().skip(1).rev().find(|a| is_object(a)) {
                    details.merge_object(config);
                }
                details
            };
            emit(ctx, results, node.span, HttpApiType::Axios, details);
            return;
        }

        let is_jquery = object.is_identifier("$") || object.is_identifier("jQuery");
        if is_jquery && JQUERY_AJAX_METHODS.contains(&method) {
            let details = if method == "ajax" {
                // $.ajax(settings) or $.ajax(url, settings)
                Self::config_call(arguments)
            } else {
                CallDetails {
                    url: literal_url(arguments.first()),
                    method: Some(method.to_uppercase()),
                    ..CallDetails::default()
                }
            };
            emit(ctx, results, node.span, HttpApiType::Jquery, details);
            return;
        }

        if method == "load" {
            let details = CallDetails {
                url: literal_url(arguments.first()),
                method: Some("GET".to_string()),
                ..CallDetails::default()
            };
            emit(ctx, results, node.span, HttpApiType::Jquery, details);
            return;
        }

        if method == "open" && !object.is_identifier("window") {
            let verb = arguments
                .first()
                .and_then(SyntaxNode::as_string_literal)
                .map(str::to_uppercase)
                .filter(|v| HTTP_VERBS.contains(&v.as_str()));
            if let Some(verb) = verb {
                let details = CallDetails {
                    url: literal_url(arguments.get(1)),
                    method: Some(verb),
                    ..CallDetails::default()
                };
                emit(ctx, results, node.span, HttpApiType::Method, details);
            }
        }
    }

    /// `f(url)`, `f(config)` or `f(url, config)`
    fn config_call(arguments: &[SyntaxNode]) -> CallDetails {
        let mut details = CallDetails::default();
        match arguments.first() {
            Some(first) if is_object(first) => details.merge_object(first),
            Some(first) => {
                details.url = first.as_string_literal().map(str::to_string);
                if let Some(config) = arguments.get(1) {
                    details.merge_object(config);
                }
            }
            None => {}
        }
        details
    }

    fn analyze_new(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        let NodeKind::New { callee, .. } = &node.kind else {
            return;
        };
        if !ctx.processed.httpapi.mark(node.span) {
            return;
        }
        if callee.is_identifier("XMLHttpRequest") {
            emit(ctx, results, node.span, HttpApiType::Xhr, CallDetails::default());
        }
    }
}

fn emit(
    ctx: &mut AnalysisContext<'_>,
    results: &mut AnalyzerResult,
    span: Span,
    kind: HttpApiType,
    details: CallDetails,
) {
    let pos = ctx.position(span.start);
    results.httpapi.push(HttpApiMatch {
        value: ctx.text(span).to_string(),
        line: pos.line,
        column: pos.column,
        kind,
        method: details.method,
        url: details.url,
        options: details.options,
        span,
    });
}

impl Default for HttpApiAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeAnalyzer for HttpApiAnalyzer {
    fn name(&self) -> &str {
        "HTTP API"
    }

    fn is_enabled(&self, config: &JshunterConfig) -> bool {
        config.modules.httpapi
    }

    fn analyze_node(
        &self,
        node: &SyntaxNode,
        ctx: &mut AnalysisContext<'_>,
        results: &mut AnalyzerResult,
    ) {
        match &node.kind {
            NodeKind::Call { .. } => self.analyze_call(node, ctx, results),
            NodeKind::New { .. } => self.analyze_new(node, ctx, results),
            _ => {}
        }
    }
}
