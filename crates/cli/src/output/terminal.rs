//! Terminal output formatting

use colored::Colorize;
use jshunter_core::AnalyzerResult;

/// Longest value printed before truncating with an ellipsis
const MAX_VALUE_WIDTH: usize = 120;

fn shorten(value: &str) -> String {
    let single_line = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= MAX_VALUE_WIDTH {
        return single_line;
    }
    let mut out: String = single_line.chars().take(MAX_VALUE_WIDTH - 1).collect();
    out.push('…');
    out
}

pub fn format_match(kind: &str, value: &str, line: usize, column: usize) -> String {
    format!(
        "    {} {} {}",
        format!("[{}]", kind).cyan(),
        shorten(value),
        format!("{}:{}", line, column).dimmed()
    )
}

fn section(out: &mut Vec<String>, icon: &str, title: &str, lines: Vec<String>) {
    if lines.is_empty() {
        return;
    }
    out.push(format!("  {} {} ({})", icon, title.bold(), lines.len()));
    out.extend(lines);
}

/// Render one file's result as grouped, colored lines
pub fn render(file: &str, result: &AnalyzerResult) -> String {
    let mut out = vec![format!("{}", file.bold().underline())];

    if result.is_empty() {
        out.push(format!("  {}", "nothing found".dimmed()));
        return out.join("\n");
    }

    let urls = result
        .urls
        .iter()
        .map(|m| {
            format!(
                "{} {}",
                format_match(m.kind.as_str(), &m.value, m.line, m.column),
                format!("{:.2}", m.metadata.confidence).green()
            )
        })
        .collect();
    section(&mut out, "🔗", "URLs", urls);

    let graphql = result
        .graphql
        .iter()
        .map(|m| format_match(m.kind.as_str(), &m.value, m.line, m.column))
        .collect();
    section(&mut out, "◈", "GraphQL", graphql);

    let domxss = result
        .domxss
        .iter()
        .map(|m| format_match(m.kind.as_str(), &m.value, m.line, m.column).red().to_string())
        .collect();
    section(&mut out, "❌", "DOM XSS sinks", domxss);

    let events = result
        .events
        .iter()
        .map(|m| format_match(m.kind.as_str(), &m.value, m.line, m.column))
        .collect();
    section(&mut out, "⚡", "Events", events);

    let httpapi = result
        .httpapi
        .iter()
        .map(|m| {
            let target = match (&m.method, &m.url) {
                (Some(method), Some(url)) => format!(" {} {}", method.yellow(), url),
                (Some(method), None) => format!(" {}", method.yellow()),
                (None, Some(url)) => format!(" {}", url),
                (None, None) => String::new(),
            };
            format!(
                "{}{}",
                format_match(m.kind.as_str(), &m.value, m.line, m.column),
                target
            )
        })
        .collect();
    section(&mut out, "🌐", "HTTP calls", httpapi);

    out.join("\n")
}

/// One-line totals printed after a multi-file run
pub fn summary(files: usize, total: usize, failed: usize) -> String {
    let mut line = format!(
        "{} {} finding(s) in {} file(s)",
        "✅".green(),
        total.to_string().bold(),
        files
    );
    if failed > 0 {
        line.push_str(&format!(", {} unreadable", failed.to_string().red()));
    }
    line
}
