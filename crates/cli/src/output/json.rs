//! JSON output formatting

use anyhow::Result;
use jshunter_core::AnalyzerResult;
use serde::Serialize;

/// One entry of a multi-file report
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,

    #[serde(flatten)]
    pub result: AnalyzerResult,

    /// Set when the file could not be read at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn to_string<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}

/// A single file's result, exactly as the core produced it
pub fn render_result(result: &AnalyzerResult, pretty: bool) -> Result<String> {
    to_string(result, pretty)
}

/// A list of `{ file, urls, graphql, domxss, events, httpapi }` objects
pub fn render_reports(reports: &[FileReport], pretty: bool) -> Result<String> {
    to_string(reports, pretty)
}
