//! Default command: analyze files and directories

use anyhow::{bail, Context, Result};
use jshunter_core::{discover_files, AnalyzerResult, JsAnalyzer, JshunterConfig};
use std::path::{Path, PathBuf};

use crate::output::json::{self, FileReport};
use crate::output::terminal;
use crate::progress::create_progress_bar;
use crate::{Cli, OutputFormat};

pub fn run(cli: &Cli) -> Result<()> {
    let targets: Vec<PathBuf> = if cli.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.paths.clone()
    };

    for target in &targets {
        if !target.exists() {
            bail!("Path not found: {}", target.display());
        }
    }

    // ── 1. Config ────────────────────────────────────────────────
    let config = load_config(cli, &targets[0])?;
    let format = resolve_format(cli, &config);
    let pretty = config.output.pretty && !cli.compact;
    let analyzer = JsAnalyzer::new(config);

    tracing::debug!(
        "analyzers enabled: {}",
        analyzer.enabled_analyzers().join(", ")
    );

    // ── 2. Single file ───────────────────────────────────────────
    if let [file] = targets.as_slice() {
        if file.is_file() {
            let result = analyzer
                .analyze_file(file)
                .with_context(|| format!("Failed to analyze {}", file.display()))?;
            return print_single(file, &result, format, pretty);
        }
    }

    // ── 3. File Discovery ────────────────────────────────────────
    let files = collect_files(&analyzer, &targets)?;
    tracing::debug!("discovered {} file(s)", files.len());

    // ── 4. Analyze ───────────────────────────────────────────────
    let pb = create_progress_bar(files.len() as u64, "Analyzing", cli.quiet);
    let outcomes = analyzer.analyze_files_with(&files, |_| pb.inc(1));
    pb.finish_and_clear();

    let reports: Vec<FileReport> = outcomes
        .into_iter()
        .map(|(path, outcome)| match outcome {
            Ok(result) => FileReport {
                file: path.display().to_string(),
                result,
                error: None,
            },
            Err(e) => {
                tracing::warn!("{}", e);
                FileReport {
                    file: path.display().to_string(),
                    result: AnalyzerResult::default(),
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    // ── 5. Output ────────────────────────────────────────────────
    match format {
        OutputFormat::Json => println!("{}", json::render_reports(&reports, pretty)?),
        OutputFormat::Terminal => print_reports(&reports),
    }

    Ok(())
}

fn load_config(cli: &Cli, first_target: &Path) -> Result<JshunterConfig> {
    let mut config = match &cli.config {
        Some(path) => JshunterConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            let start = if first_target.is_file() {
                first_target.parent().unwrap_or_else(|| Path::new("."))
            } else {
                first_target
            };
            JshunterConfig::find_and_load(start)?
        }
    };

    if let Some(confidence) = cli.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            bail!("--confidence must be between 0.0 and 1.0, got {}", confidence);
        }
        config.analysis.confidence_threshold = confidence;
    }
    if let Some(depth) = cli.depth {
        config.analysis.max_traversal_depth = depth;
    }

    Ok(config)
}

fn resolve_format(cli: &Cli, config: &JshunterConfig) -> OutputFormat {
    if let Some(format) = cli.format {
        return format;
    }
    OutputFormat::from_config(&config.output.format).unwrap_or(OutputFormat::Json)
}

/// Files are taken as given; directories are walked for supported extensions
fn collect_files(analyzer: &JsAnalyzer, targets: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let extensions = analyzer.supported_extensions();
    let ignore_paths = &analyzer.config().ignore.paths;

    let mut files = Vec::new();
    for target in targets {
        if target.is_dir() {
            files.extend(discover_files(target, &extensions, ignore_paths)?);
        } else {
            files.push(target.clone());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn print_single(
    file: &Path,
    result: &AnalyzerResult,
    format: OutputFormat,
    pretty: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", json::render_result(result, pretty)?),
        OutputFormat::Terminal => println!("{}", terminal::render(&file.display().to_string(), result)),
    }
    Ok(())
}

fn print_reports(reports: &[FileReport]) {
    let mut total = 0;
    let mut failed = 0;

    for report in reports {
        if let Some(error) = &report.error {
            failed += 1;
            eprintln!("  {}: {}", report.file, error);
            continue;
        }
        total += report.result.total();
        println!("{}", terminal::render(&report.file, &report.result));
        println!();
    }

    println!("{}", terminal::summary(reports.len(), total, failed));
}
