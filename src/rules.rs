//! The fixed performance checklist.
//!
//! Each rule is a plain function over a [`ProjectSnapshot`] returning a
//! [`Finding`]. Filesystem faults are returned as errors and downgraded to
//! warnings by the runner, so rule bodies stay linear and use `?` freely.
//!
//! # Rule shapes
//!
//! - count thresholds (domains, small files, sync scripts, dependencies)
//! - ratio cutoffs with a vacuous pass on an empty denominator
//! - presence of a qualifying pattern anywhere in the scanned files
//! - build-output prerequisites that short-circuit when nothing was built
use crate::schema::{Finding, Phase, RuleId};
use crate::snapshot::{ProjectSnapshot, SnapshotResult, BUILD_OUTPUT_EXCLUDES};

mod build;
mod dns;
mod http;
mod interactive;
mod render;

pub type RuleFn = fn(&ProjectSnapshot) -> SnapshotResult<Finding>;

/// One checklist entry: identity plus its evaluation function.
#[derive(Clone, Copy)]
pub struct RuleDefinition {
    pub phase: Phase,
    pub id: RuleId,
    pub evaluate: RuleFn,
}

impl std::fmt::Debug for RuleDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleDefinition")
            .field("phase", &self.phase)
            .field("id", &self.id)
            .finish()
    }
}

const fn rule(phase: Phase, id: RuleId, evaluate: RuleFn) -> RuleDefinition {
    RuleDefinition {
        phase,
        id,
        evaluate,
    }
}

/// Every rule, in display order.
pub const RULES: &[RuleDefinition] = &[
    rule(
        Phase::DnsResolution,
        RuleId::DnsPrefetch,
        dns::check_dns_prefetch,
    ),
    rule(
        Phase::DnsResolution,
        RuleId::DomainConsolidation,
        dns::check_domain_count,
    ),
    rule(
        Phase::HttpRequest,
        RuleId::SmallFileMerge,
        http::check_small_files,
    ),
    rule(
        Phase::HttpRequest,
        RuleId::RemoveUnusedResources,
        http::check_unused_resources,
    ),
    rule(
        Phase::HttpRequest,
        RuleId::ImageOptimization,
        http::check_image_formats,
    ),
    rule(
        Phase::HttpRequest,
        RuleId::CodeMinification,
        http::check_minification,
    ),
    rule(
        Phase::HttpRequest,
        RuleId::FileFingerprint,
        http::check_fingerprints,
    ),
    rule(
        Phase::HttpRequest,
        RuleId::CssDeferredLoading,
        http::check_deferred_css,
    ),
    rule(
        Phase::HttpRequest,
        RuleId::JsDeferAsync,
        http::check_sync_scripts,
    ),
    rule(
        Phase::HttpRequest,
        RuleId::ImageLazyLoading,
        http::check_lazy_images,
    ),
    rule(
        Phase::ParseRender,
        RuleId::JsScriptPosition,
        render::check_head_scripts,
    ),
    rule(
        Phase::ParseRender,
        RuleId::JsCodeSplitting,
        render::check_code_splitting,
    ),
    rule(
        Phase::ParseRender,
        RuleId::CssImportAvoidance,
        render::check_css_imports,
    ),
    rule(
        Phase::ParseRender,
        RuleId::CssSelectorSimplification,
        render::check_complex_selectors,
    ),
    rule(
        Phase::ParseRender,
        RuleId::CssAnimationSubstitution,
        render::check_css_animations,
    ),
    rule(
        Phase::Interactivity,
        RuleId::JsLongTaskSplitting,
        interactive::check_long_tasks,
    ),
    rule(
        Phase::Interactivity,
        RuleId::AvoidBlockingApi,
        interactive::check_blocking_apis,
    ),
    rule(
        Phase::Interactivity,
        RuleId::ThirdPartyScriptOptimization,
        interactive::check_third_party_scripts,
    ),
    rule(
        Phase::Interactivity,
        RuleId::ResourcePreloading,
        interactive::check_preloading,
    ),
    rule(
        Phase::BuildTooling,
        RuleId::BuildToolConfiguration,
        build::check_build_config,
    ),
    rule(
        Phase::BuildTooling,
        RuleId::BundleSizeOptimization,
        build::check_dependency_count,
    ),
];

const HTML_PATTERNS: &[&str] = &["**/*.html"];
const JS_PATTERNS: &[&str] = &["**/*.js"];
const CSS_PATTERNS: &[&str] = &["**/*.css"];
const BUILT_ASSET_PATTERNS: &[&str] = &["**/*.{js,css}"];

const MISSING_BUILD_OUTPUT: &str = "未找到构建产物目录(dist/build/out)";
const BUILD_FIRST: &str = "请先构建项目再进行检测";

/// Source files and their contents, read in path order.
fn read_sources(
    snapshot: &ProjectSnapshot,
    patterns: &[&str],
) -> SnapshotResult<Vec<(String, String)>> {
    let mut out = Vec::new();
    for rel in snapshot.list_source_files(patterns)? {
        let content = snapshot.read_text(&rel)?;
        out.push((rel, content));
    }
    Ok(out)
}

/// True when any source file matching `patterns` satisfies `pred`. Stops at the first hit.
fn any_source(
    snapshot: &ProjectSnapshot,
    patterns: &[&str],
    pred: impl Fn(&str) -> bool,
) -> SnapshotResult<bool> {
    for rel in snapshot.list_source_files(patterns)? {
        if pred(&snapshot.read_text(&rel)?) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Built JS/CSS assets as `(dir, path relative to dir)`, or `None` when the
/// project has no build output yet.
fn built_assets(snapshot: &ProjectSnapshot) -> SnapshotResult<Option<(&'static str, Vec<String>)>> {
    let Some(dir) = snapshot.build_output_dir() else {
        return Ok(None);
    };
    let files = snapshot.list_files_in(dir, BUILT_ASSET_PATTERNS, BUILD_OUTPUT_EXCLUDES)?;
    Ok(Some((dir, files)))
}

fn missing_build_output() -> Finding {
    Finding::warning(MISSING_BUILD_OUTPUT, BUILD_FIRST)
}

/// `matching / total >= cutoff`, vacuously true when there is nothing to measure.
pub(crate) fn ratio_at_least(matching: usize, total: usize, cutoff: f64) -> bool {
    total == 0 || matching as f64 / total as f64 >= cutoff
}

/// File stem: the final path component without its last extension.
fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
