//! Tests for the analysis facade: determinism, dedup, positions and limits

use jshunter_core::parser::JavaScriptParser;
use jshunter_core::{
    AnalyzeError, AnalyzerResult, JsAnalyzer, JshunterConfig, SourceParser, Span,
};
use std::collections::HashSet;
use tempfile::TempDir;

const SAMPLE: &str = r#"
const API = "https://api.shop.example.net/v2";
const usersUrl = `${API}/users`;

async function load(id) {
  const res = await fetch(usersUrl + "/" + id, { method: "GET", credentials: "include" });
  document.getElementById("out").innerHTML = await res.text();
  window.addEventListener("hashchange", () => render(location.hash));
  axios.post("/api/v2/audit", { id });
  return gql`
    query UserById($id: ID!) {
      user(id: $id) { name email }
    }
  `;
}

const cfg = { endpoint: "/rest/status", timeout: 3000 };
eval(localStorage.getItem("snippet"));
"#;

fn analyze(source: &str) -> AnalyzerResult {
    JsAnalyzer::default().analyze_source(source).unwrap()
}

/// 1-based position by counting newlines before `offset`
fn naive_position(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    (line, offset - line_start + 1)
}

fn all_spans(result: &AnalyzerResult) -> Vec<(&'static str, Span, usize, usize)> {
    let mut spans = Vec::new();
    spans.extend(result.urls.iter().map(|m| ("urls", m.span, m.line, m.column)));
    spans.extend(result.graphql.iter().map(|m| ("graphql", m.span, m.line, m.column)));
    spans.extend(result.domxss.iter().map(|m| ("domxss", m.span, m.line, m.column)));
    spans.extend(result.events.iter().map(|m| ("events", m.span, m.line, m.column)));
    spans.extend(result.httpapi.iter().map(|m| ("httpapi", m.span, m.line, m.column)));
    spans
}

// ── Whole-run properties ─────────────────────────────────────────

#[test]
fn test_sample_finds_every_category() {
    let result = analyze(SAMPLE);

    assert!(!result.urls.is_empty());
    assert_eq!(result.graphql.len(), 1);
    assert_eq!(result.domxss.len(), 2);
    assert!(!result.events.is_empty());
    assert_eq!(result.httpapi.len(), 2);
    assert_eq!(
        result.total(),
        result.urls.len()
            + result.graphql.len()
            + result.domxss.len()
            + result.events.len()
            + result.httpapi.len()
    );
}

#[test]
fn test_idempotent_across_fresh_facades() {
    let first = JsAnalyzer::default().analyze_source(SAMPLE).unwrap();
    let second = JsAnalyzer::default().analyze_source(SAMPLE).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_facade_reuse_does_not_leak_state() {
    let analyzer = JsAnalyzer::default();
    let first = analyzer.analyze_source(SAMPLE).unwrap();
    let _other = analyzer
        .analyze_source(r#"const API = "/something/else";"#)
        .unwrap();
    let again = analyzer.analyze_source(SAMPLE).unwrap();
    assert_eq!(first, again);
}

#[test]
fn test_no_duplicate_spans_per_category() {
    let result = analyze(SAMPLE);
    let mut seen: HashSet<(&str, Span)> = HashSet::new();
    for (category, span, _, _) in all_spans(&result) {
        assert!(seen.insert((category, span)), "duplicate {category} match at {span:?}");
    }
}

#[test]
fn test_positions_match_newline_counting() {
    let result = analyze(SAMPLE);
    for (category, span, line, column) in all_spans(&result) {
        assert!(line >= 1 && column >= 1);
        assert_eq!(
            (line, column),
            naive_position(SAMPLE, span.start),
            "{category} match at {span:?}"
        );
    }
}

#[test]
fn test_positions_count_bytes_after_multibyte_text() {
    let source = "const s = \"héllo\"; eval(x);";
    let result = analyze(source);
    let m = &result.domxss[0];
    assert_eq!(m.span.start, source.find("eval").unwrap());
    assert_eq!(m.column, source.find("eval").unwrap() + 1);
}

#[test]
fn test_categories_report_in_discovery_order() {
    let result = analyze(
        r#"
        eval(a);
        document.write(b);
        eval(c);
        "#,
    );
    let values: Vec<&str> = result.domxss.iter().map(|m| m.value.as_str()).collect();
    assert_eq!(values, vec!["eval(a)", "document.write(b)", "eval(c)"]);
}

// ── Variable tracking ────────────────────────────────────────────

#[test]
fn test_superseded_fragment_is_retracted() {
    let result = analyze(r#"const base = "/api"; const full = base + "/users";"#);
    let values: Vec<&str> = result.urls.iter().map(|m| m.value.as_str()).collect();
    assert_eq!(values, vec!["/api/users"]);
}

#[test]
fn test_template_declarator_supersedes_base() {
    let result = analyze(
        r#"
        const base = "/api/v3";
        const orders = `${base}/orders`;
        "#,
    );
    let values: Vec<&str> = result.urls.iter().map(|m| m.value.as_str()).collect();
    assert_eq!(values, vec!["/api/v3/orders"]);
}

#[test]
fn test_unrelated_literal_is_not_retracted() {
    let result = analyze(
        r#"
        const base = "/api";
        const full = base + "/users";
        const other = "/health/check";
        "#,
    );
    let values: Vec<&str> = result.urls.iter().map(|m| m.value.as_str()).collect();
    assert_eq!(values, vec!["/api/users", "/health/check"]);
}

#[test]
fn test_last_binding_wins() {
    let result = analyze(
        r#"
        let prefix = "/old";
        prefix = "/ignored";
        let prefix2 = "/v1";
        var prefix2 = "/v9";
        fetch(prefix2 + "/items");
        "#,
    );
    let values: Vec<&str> = result.urls.iter().map(|m| m.value.as_str()).collect();
    assert!(values.contains(&"/v9/items"));
    assert!(!values.contains(&"/v1/items"));
}

// ── Limits and failures ──────────────────────────────────────────

#[test]
fn test_depth_bound() {
    let source = r#"fetch("/api/deeply/nested");"#;

    let mut config = JshunterConfig::default();
    config.analysis.max_traversal_depth = 1;
    let shallow = JsAnalyzer::new(config).analyze_source(source).unwrap();
    assert!(shallow.is_empty());

    let deep = analyze(source);
    assert_eq!(deep.httpapi.len(), 1);
}

#[test]
fn test_shallow_traversal_caps_depth() {
    let source = "[[[[[[[[[[[[eval(x)]]]]]]]]]]]];";

    let mut config = JshunterConfig::default();
    config.analysis.enable_deep_traversal = false;
    assert_eq!(config.analysis.effective_max_depth(), 10);
    let capped = JsAnalyzer::new(config).analyze_source(source).unwrap();
    assert!(capped.domxss.is_empty());

    assert_eq!(analyze(source).domxss.len(), 1);
}

#[test]
fn test_sink_below_depth_bound_is_skipped() {
    let depth = 400;
    let source = format!("{}eval(x){};", "[".repeat(depth), "]".repeat(depth));
    let result = JsAnalyzer::default().analyze_source(&source).unwrap();
    assert!(result.domxss.is_empty());
}

#[test]
fn test_long_plus_chain_does_not_overflow() {
    let terms: Vec<String> = (0..1_500).map(|i| format!("\"/p{i}\"")).collect();
    let source = format!("var u = {};", terms.join(" + "));

    let output = JavaScriptParser::javascript().parse(&source).unwrap();
    assert!(output.errors.is_empty());

    let result = analyze(&source);
    assert!(result.domxss.is_empty());
}

#[test]
fn test_deeply_nested_parentheses() {
    let depth = 200_000;
    let source = format!("x = {}1{};", "(".repeat(depth), ")".repeat(depth));
    let result = analyze(&source);
    assert!(result.is_empty());
}

#[test]
fn test_deep_array_file_in_worker_pool() {
    let depth = 3_000;
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("deep.js");
    let source = format!("{}eval(x){};", "[".repeat(depth), "]".repeat(depth));
    std::fs::write(&path, source).unwrap();

    let results = JsAnalyzer::default().analyze_files(&[path]);
    assert_eq!(results.len(), 1);
    let result = results[0].1.as_ref().unwrap();
    assert!(result.domxss.is_empty());
}

#[test]
fn test_syntax_errors_yield_empty_result() {
    let source = "el.innerHTML = x;\nconst = ;";
    let result = analyze(source);
    assert!(result.is_empty());
}

#[test]
fn test_partial_parse_can_be_allowed() {
    let source = "el.innerHTML = x;\nconst = ;";
    let mut config = JshunterConfig::default();
    config.analysis.allow_partial_parse = true;
    let result = JsAnalyzer::new(config).analyze_source(source).unwrap();
    assert_eq!(result.domxss.len(), 1);
}

#[test]
fn test_empty_source() {
    assert!(analyze("").is_empty());
}

#[test]
fn test_enabled_analyzers_follow_config() {
    let mut config = JshunterConfig::default();
    assert_eq!(JsAnalyzer::new(config.clone()).enabled_analyzers().len(), 5);

    config.modules.urls = false;
    config.modules.events = false;
    let analyzer = JsAnalyzer::new(config);
    assert_eq!(
        analyzer.enabled_analyzers(),
        vec!["HTTP API", "GraphQL", "DOM XSS"]
    );
}

// ── Files ────────────────────────────────────────────────────────

#[test]
fn test_analyze_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("app.ts");
    std::fs::write(&path, r#"const url: string = "/api/v1/me"; fetch(url);"#).unwrap();

    let result = JsAnalyzer::default().analyze_file(&path).unwrap();
    assert_eq!(result.httpapi.len(), 1);
    assert!(result.urls.iter().any(|m| m.value == "/api/v1/me"));
}

#[test]
fn test_analyze_missing_file_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let err = JsAnalyzer::default()
        .analyze_file(&tmp.path().join("missing.js"))
        .unwrap_err();
    assert!(matches!(err, AnalyzeError::Io { .. }));
}

#[test]
fn test_analyze_files_keeps_input_order() {
    let tmp = TempDir::new().unwrap();
    let b = tmp.path().join("b.js");
    let a = tmp.path().join("a.js");
    let missing = tmp.path().join("missing.js");
    std::fs::write(&b, "eval(x);").unwrap();
    std::fs::write(&a, r#"fetch("/api/a");"#).unwrap();

    let files = vec![b.clone(), missing.clone(), a.clone()];
    let results = JsAnalyzer::default().analyze_files(&files);

    let paths: Vec<_> = results.iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(paths, files);

    assert_eq!(results[0].1.as_ref().unwrap().domxss.len(), 1);
    assert!(results[1].1.is_err());
    assert_eq!(results[2].1.as_ref().unwrap().httpapi.len(), 1);
}

#[test]
fn test_analyze_files_reports_progress() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let tmp = TempDir::new().unwrap();
    let files: Vec<_> = (0..8)
        .map(|i| {
            let path = tmp.path().join(format!("f{i}.js"));
            std::fs::write(&path, "eval(x);").unwrap();
            path
        })
        .collect();

    let done = AtomicUsize::new(0);
    let results = JsAnalyzer::default().analyze_files_with(&files, |_| {
        done.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(results.len(), 8);
    assert_eq!(done.load(Ordering::SeqCst), 8);
}
