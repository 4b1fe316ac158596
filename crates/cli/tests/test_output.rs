//! Tests for JSON and terminal output formatting

use jshunter_cli::output::json::{render_reports, render_result, FileReport};
use jshunter_cli::output::terminal;
use jshunter_core::{AnalyzerResult, JsAnalyzer};

fn analyze(source: &str) -> AnalyzerResult {
    JsAnalyzer::default().analyze_source(source).unwrap()
}

// ── Single-file JSON ─────────────────────────────────────────────

#[test]
fn test_single_result_has_all_categories() {
    let result = analyze("el.innerHTML = html;");
    let json = render_result(&result, true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    for key in ["urls", "graphql", "domxss", "events", "httpapi"] {
        assert!(value.get(key).is_some_and(|v| v.is_array()), "missing {key}");
    }
    assert_eq!(value["domxss"][0]["type"], "dom-innerHTML");
    assert_eq!(value["domxss"][0]["line"], 1);
    assert_eq!(value["domxss"][0]["column"], 1);
}

#[test]
fn test_url_metadata_uses_camel_case_keys() {
    let result = analyze(r#"fetch("https://api.example.com/v1/users?id=1");"#);
    let json = render_result(&result, false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let url = &value["urls"][0];
    assert_eq!(url["type"], "full-url");
    assert_eq!(url["metadata"]["queryParams"], "id=1");
    assert_eq!(url["metadata"]["isSecure"], true);
    assert!(url["metadata"].get("query_params").is_none());
    assert!(url.get("span").is_none());
}

#[test]
fn test_compact_json_is_single_line() {
    let result = analyze(r#"fetch("/api/users");"#);
    let compact = render_result(&result, false).unwrap();
    let pretty = render_result(&result, true).unwrap();

    assert!(!compact.contains('\n'));
    assert!(pretty.contains('\n'));
}

#[test]
fn test_http_match_fields() {
    let result = analyze(r#"fetch("/api", { method: "POST" });"#);
    let json = render_result(&result, true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let call = &value["httpapi"][0];
    assert_eq!(call["type"], "http-fetch");
    assert_eq!(call["method"], "POST");
    assert_eq!(call["url"], "/api");
}

// ── Multi-file JSON ──────────────────────────────────────────────

#[test]
fn test_reports_flatten_result_next_to_file() {
    let reports = vec![
        FileReport {
            file: "a.js".to_string(),
            result: analyze("eval(x);"),
            error: None,
        },
        FileReport {
            file: "b.js".to_string(),
            result: AnalyzerResult::default(),
            error: Some("Failed to read b.js".to_string()),
        },
    ];

    let json = render_reports(&reports, true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let list = value.as_array().unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["file"], "a.js");
    assert_eq!(list[0]["domxss"][0]["type"], "dom-eval");
    assert!(list[0].get("error").is_none());
    assert_eq!(list[1]["error"], "Failed to read b.js");
    assert!(list[1]["urls"].as_array().unwrap().is_empty());
}

// ── Terminal ─────────────────────────────────────────────────────

#[test]
fn test_terminal_render_lists_sections() {
    colored::control::set_override(false);

    let result = analyze(
        r#"
        fetch("/api/users");
        document.write(html);
        "#,
    );
    let text = terminal::render("app.js", &result);

    assert!(text.starts_with("app.js"));
    assert!(text.contains("URLs (1)"));
    assert!(text.contains("[api-endpoint] /api/users"));
    assert!(text.contains("DOM XSS sinks (1)"));
    assert!(text.contains("HTTP calls (1)"));
}

#[test]
fn test_terminal_render_empty() {
    colored::control::set_override(false);

    let text = terminal::render("empty.js", &AnalyzerResult::default());
    assert!(text.contains("nothing found"));
}

#[test]
fn test_terminal_match_line() {
    colored::control::set_override(false);

    let line = terminal::format_match("dom-eval", "eval(\n  code\n)", 3, 4);
    assert_eq!(line, "    [dom-eval] eval( code ) 3:4");
}
