//! Console rendering of run results.
//!
//! Rendering is split from printing so the layout can be asserted in tests.
use crate::schema::{RunResult, Status, Summary};

/// Public documentation for each checklist item.
pub const DOCS_BASE_URL: &str = "https://github.com/tywd/optimize-cli/blob/main/docs";

pub fn print_results(result: &RunResult) {
    print!("{}", render_results(result));
}

pub fn print_summary(result: &RunResult) {
    print!("{}", render_summary(&result.summary()));
}

pub fn print_verbose_details(result: &RunResult) {
    print!("{}", render_verbose_details(result));
}

/// Verdicts grouped by phase, with remediation under each warning.
pub fn render_results(result: &RunResult) -> String {
    let mut out = String::from("\n🔍 检测结果:\n");
    for (phase, verdicts) in result.by_phase() {
        out.push_str(&format!("\n📂 {phase}:\n"));
        for verdict in verdicts {
            match verdict.status {
                Status::Passed => {
                    out.push_str(&format!("  ✅ {}: {}\n", verdict.name, verdict.message));
                }
                Status::Warning => {
                    out.push_str(&format!("  ⚠️  {}: {}\n", verdict.name, verdict.message));
                    if let Some(recommendation) = verdict.recommendation.as_deref() {
                        out.push_str(&format!("     💡 建议: {recommendation}\n"));
                    }
                    if let Some(doc_path) = verdict.doc_path.as_deref() {
                        out.push_str(&format!("     📚 详细文档: {}\n", doc_url(doc_path)));
                    }
                }
            }
        }
    }
    out
}

pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::from("\n📈 检测统计:\n");
    out.push_str(&format!("✅ 通过项: {}/{}\n", summary.passed, summary.total));
    out.push_str(&format!("⚠️  警告项: {}/{}\n", summary.warning, summary.total));
    if summary.warning > 0 {
        out.push_str("\n💡 建议关注警告项，它们可能影响页面性能\n");
    }
    out
}

/// Problem and remediation for every warning; empty when all rules passed.
pub fn render_verbose_details(result: &RunResult) -> String {
    let warnings: Vec<_> = result.iter().filter(|v| v.is_warning()).collect();
    if warnings.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n📋 详细建议:\n");
    for verdict in warnings {
        out.push_str(&format!("\n⚠️  {}\n", verdict.name));
        out.push_str(&format!("   问题: {}\n", verdict.message));
        if let Some(recommendation) = verdict.recommendation.as_deref() {
            out.push_str(&format!("   建议: {recommendation}\n"));
        }
    }
    out
}

pub fn doc_url(doc_path: &str) -> String {
    format!("{DOCS_BASE_URL}/{doc_path}.md")
}
