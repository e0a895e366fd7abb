//! HTML report generation.
//!
//! The report is a single self-contained page written next to the audited
//! project. Rendering goes through handlebars so a project can supply its own
//! template; an unusable custom template falls back to the built-in one.
use crate::schema::{RunResult, Status};
use crate::snapshot::REPORT_FILE_NAME;
use crate::templates::REPORT_HTML_TEMPLATE;
use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const OWNER_LABEL: &str = "前端";

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub doc_port: u16,
    pub open: bool,
    pub template_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ReportContext<'a> {
    project_path: String,
    passed_count: usize,
    warning_count: usize,
    total_count: usize,
    owner: &'static str,
    generated_at: String,
    docs_home: String,
    phases: Vec<PhaseSection<'a>>,
}

/// A written report and, when opening was requested, why the viewer failed.
#[derive(Debug)]
pub struct ReportOutcome {
    pub path: PathBuf,
    pub viewer_error: Option<std::io::Error>,
}

#[derive(Debug, Serialize)]
struct PhaseSection<'a> {
    name: &'static str,
    items: Vec<ReportRow<'a>>,
}

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    name: &'a str,
    message: &'a str,
    passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendation: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_url: Option<String>,
}

/// Render the report, write it under `project_root`, and optionally open it.
///
/// Only rendering and writing are fatal. A viewer that cannot be launched is
/// handed back in the outcome so the caller decides where to tell the user.
pub fn generate(
    result: &RunResult,
    project_root: &Path,
    options: &ReportOptions,
) -> Result<ReportOutcome> {
    let context = build_context(result, project_root, options.doc_port);
    let html = render_html(&context, options.template_path.as_deref())?;
    let path = project_root.join(REPORT_FILE_NAME);
    fs::write(&path, html).with_context(|| format!("write report {}", path.display()))?;
    tracing::debug!(path = %path.display(), "report written");

    let viewer_error = if options.open {
        open::that(&path).err()
    } else {
        None
    };
    if let Some(err) = &viewer_error {
        tracing::debug!(error = %err, "viewer launch failed");
    }
    Ok(ReportOutcome { path, viewer_error })
}

fn build_context<'a>(
    result: &'a RunResult,
    project_root: &Path,
    doc_port: u16,
) -> ReportContext<'a> {
    let summary = result.summary();
    let phases = result
        .by_phase()
        .into_iter()
        .map(|(phase, verdicts)| PhaseSection {
            name: phase.label(),
            items: verdicts
                .into_iter()
                .map(|verdict| ReportRow {
                    name: &verdict.name,
                    message: &verdict.message,
                    passed: verdict.status == Status::Passed,
                    recommendation: verdict.recommendation.as_deref(),
                    doc_url: verdict
                        .doc_path
                        .as_deref()
                        .map(|doc_path| local_doc_url(doc_port, doc_path)),
                })
                .collect(),
        })
        .collect();

    ReportContext {
        project_path: project_root.display().to_string(),
        passed_count: summary.passed,
        warning_count: summary.warning,
        total_count: summary.total,
        owner: OWNER_LABEL,
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        docs_home: format!("http://localhost:{doc_port}"),
        phases,
    }
}

/// Guides are served by a local docs server while the report is open.
fn local_doc_url(doc_port: u16, doc_path: &str) -> String {
    format!("http://localhost:{doc_port}/{doc_path}")
}

fn render_html(context: &ReportContext<'_>, custom: Option<&Path>) -> Result<String> {
    if let Some(path) = custom {
        match render_custom(context, path) {
            Ok(html) => return Ok(html),
            Err(err) => {
                tracing::warn!(
                    template = %path.display(),
                    error = %format!("{err:#}"),
                    "custom report template unusable; using built-in template"
                );
            }
        }
    }
    render_template(REPORT_HTML_TEMPLATE, context).context("render built-in report template")
}

fn render_custom(context: &ReportContext<'_>, path: &Path) -> Result<String> {
    let template =
        fs::read_to_string(path).with_context(|| format!("read template {}", path.display()))?;
    render_template(&template, context)
        .with_context(|| format!("render template {}", path.display()))
}

fn render_template(template: &str, context: &ReportContext<'_>) -> Result<String> {
    let registry = Handlebars::new();
    Ok(registry.render_template(template, context)?)
}
