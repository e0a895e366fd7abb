//! Schema types for rule identities, verdicts, and run results.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const RESULTS_SCHEMA_VERSION: u32 = 1;

/// Lifecycle phase a rule belongs to. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    DnsResolution,
    HttpRequest,
    ParseRender,
    Interactivity,
    BuildTooling,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::DnsResolution => "DNS解析阶段",
            Phase::HttpRequest => "HTTP请求阶段",
            Phase::ParseRender => "解析与渲染阶段",
            Phase::Interactivity => "交互就绪阶段",
            Phase::BuildTooling => "工程化落地阶段",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity of one checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    DnsPrefetch,
    DomainConsolidation,
    SmallFileMerge,
    RemoveUnusedResources,
    ImageOptimization,
    CodeMinification,
    FileFingerprint,
    CssDeferredLoading,
    JsDeferAsync,
    ImageLazyLoading,
    JsScriptPosition,
    JsCodeSplitting,
    CssImportAvoidance,
    CssSelectorSimplification,
    CssAnimationSubstitution,
    JsLongTaskSplitting,
    AvoidBlockingApi,
    ThirdPartyScriptOptimization,
    ResourcePreloading,
    BuildToolConfiguration,
    BundleSizeOptimization,
}

impl RuleId {
    /// Stable kebab-case identifier, also the documentation slug.
    pub fn slug(&self) -> &'static str {
        match self {
            RuleId::DnsPrefetch => "dns-prefetch",
            RuleId::DomainConsolidation => "domain-consolidation",
            RuleId::SmallFileMerge => "small-file-merge",
            RuleId::RemoveUnusedResources => "remove-unused-resources",
            RuleId::ImageOptimization => "image-optimization",
            RuleId::CodeMinification => "code-minification",
            RuleId::FileFingerprint => "file-fingerprint",
            RuleId::CssDeferredLoading => "css-deferred-loading",
            RuleId::JsDeferAsync => "js-defer-async",
            RuleId::ImageLazyLoading => "image-lazy-loading",
            RuleId::JsScriptPosition => "js-script-position",
            RuleId::JsCodeSplitting => "js-code-splitting",
            RuleId::CssImportAvoidance => "css-import-avoidance",
            RuleId::CssSelectorSimplification => "css-selector-simplification",
            RuleId::CssAnimationSubstitution => "css-animation-substitution",
            RuleId::JsLongTaskSplitting => "js-long-task-splitting",
            RuleId::AvoidBlockingApi => "avoid-blocking-api",
            RuleId::ThirdPartyScriptOptimization => "third-party-script-optimization",
            RuleId::ResourcePreloading => "resource-preloading",
            RuleId::BuildToolConfiguration => "build-tool-configuration",
            RuleId::BundleSizeOptimization => "bundle-size-optimization",
        }
    }

    /// Human-readable checklist item name.
    pub fn display_name(&self) -> &'static str {
        match self {
            RuleId::DnsPrefetch => "DNS预解析配置",
            RuleId::DomainConsolidation => "合并域名数量",
            RuleId::SmallFileMerge => "合并JS/CSS小文件",
            RuleId::RemoveUnusedResources => "移除未使用资源",
            RuleId::ImageOptimization => "图片格式优化与压缩",
            RuleId::CodeMinification => "代码压缩混淆",
            RuleId::FileFingerprint => "静态资源加文件指纹",
            RuleId::CssDeferredLoading => "非首屏CSS延迟加载",
            RuleId::JsDeferAsync => "JS使用defer/async",
            RuleId::ImageLazyLoading => "图片懒加载",
            RuleId::JsScriptPosition => "JS脚本位置优化",
            RuleId::JsCodeSplitting => "JS代码分割与动态加载",
            RuleId::CssImportAvoidance => "避免使用@import引入CSS",
            RuleId::CssSelectorSimplification => "简化CSS选择器",
            RuleId::CssAnimationSubstitution => "CSS动画替代JS动画",
            RuleId::JsLongTaskSplitting => "拆分JS长任务",
            RuleId::AvoidBlockingApi => "避免同步阻塞API",
            RuleId::ThirdPartyScriptOptimization => "第三方脚本优化加载",
            RuleId::ResourcePreloading => "预加载关键资源",
            RuleId::BuildToolConfiguration => "构建工具基础配置",
            RuleId::BundleSizeOptimization => "包体积异常检测",
        }
    }

    /// Documentation path relative to the docs site root.
    pub fn doc_path(&self) -> String {
        format!("optimizations/{}", self.slug())
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Passed,
    Warning,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Passed => f.write_str("passed"),
            Status::Warning => f.write_str("warning"),
        }
    }
}

/// Outcome of one rule, before the runner attaches identity and docs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    Passed {
        message: String,
    },
    Warning {
        message: String,
        recommendation: Option<String>,
    },
}

impl Finding {
    pub fn passed(message: impl Into<String>) -> Self {
        Finding::Passed {
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Finding::Warning {
            message: message.into(),
            recommendation: Some(recommendation.into()),
        }
    }

    /// Warning with no known remediation.
    pub fn bare_warning(message: impl Into<String>) -> Self {
        Finding::Warning {
            message: message.into(),
            recommendation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub id: RuleId,
    pub phase: Phase,
    pub name: String,
    pub status: Status,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_path: Option<String>,
}

impl Verdict {
    /// Attach rule identity to a finding. Documentation links ride on warnings only.
    pub fn from_finding(phase: Phase, id: RuleId, finding: Finding) -> Self {
        match finding {
            Finding::Passed { message } => Verdict {
                id,
                phase,
                name: id.display_name().to_string(),
                status: Status::Passed,
                message,
                recommendation: None,
                doc_path: None,
            },
            Finding::Warning {
                message,
                recommendation,
            } => Verdict {
                id,
                phase,
                name: id.display_name().to_string(),
                status: Status::Warning,
                message,
                recommendation: recommendation.filter(|text| !text.trim().is_empty()),
                doc_path: Some(id.doc_path()),
            },
        }
    }

    pub fn is_warning(&self) -> bool {
        self.status == Status::Warning
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub passed: usize,
    pub warning: usize,
    pub total: usize,
}

/// Ordered verdicts, one per registered rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunResult {
    pub verdicts: Vec<Verdict>,
}

impl RunResult {
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Verdict> {
        self.verdicts.iter()
    }

    pub fn summary(&self) -> Summary {
        let passed = self
            .verdicts
            .iter()
            .filter(|v| v.status == Status::Passed)
            .count();
        let warning = self
            .verdicts
            .iter()
            .filter(|v| v.status == Status::Warning)
            .count();
        Summary {
            passed,
            warning,
            total: self.verdicts.len(),
        }
    }

    /// Group verdicts by phase in first-seen order, preserving run order within a phase.
    pub fn by_phase(&self) -> Vec<(Phase, Vec<&Verdict>)> {
        let mut groups: Vec<(Phase, Vec<&Verdict>)> = Vec::new();
        for verdict in &self.verdicts {
            match groups.iter_mut().find(|(phase, _)| *phase == verdict.phase) {
                Some((_, items)) => items.push(verdict),
                None => groups.push((verdict.phase, vec![verdict])),
            }
        }
        groups
    }
}

/// Machine-readable output for `check --json`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport<'a> {
    pub schema_version: u32,
    pub project_path: String,
    pub elapsed_ms: u128,
    pub summary: Summary,
    pub results: &'a RunResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passed_verdict_carries_no_doc_path() {
        let verdict = Verdict::from_finding(
            Phase::DnsResolution,
            RuleId::DnsPrefetch,
            Finding::passed("ok"),
        );
        assert_eq!(verdict.status, Status::Passed);
        assert_eq!(verdict.doc_path, None);
        assert_eq!(verdict.recommendation, None);
    }

    #[test]
    fn warning_verdict_uses_static_doc_path() {
        let verdict = Verdict::from_finding(
            Phase::BuildTooling,
            RuleId::BundleSizeOptimization,
            Finding::warning("too many", "trim deps"),
        );
        assert_eq!(
            verdict.doc_path.as_deref(),
            Some("optimizations/bundle-size-optimization")
        );
        assert_eq!(verdict.name, "包体积异常检测");
    }

    #[test]
    fn blank_recommendation_is_dropped() {
        let verdict = Verdict::from_finding(
            Phase::HttpRequest,
            RuleId::SmallFileMerge,
            Finding::warning("msg", "  "),
        );
        assert_eq!(verdict.recommendation, None);
    }

    #[test]
    fn verdict_serializes_status_and_id() {
        let verdict = Verdict::from_finding(
            Phase::HttpRequest,
            RuleId::JsDeferAsync,
            Finding::bare_warning("boom"),
        );
        let value = serde_json::to_value(&verdict).expect("serialize verdict");
        assert_eq!(value["status"], "warning");
        assert_eq!(value["id"], "js-defer-async");
        assert_eq!(value["phase"], "http_request");
        assert!(value.get("recommendation").is_none());
    }

    #[test]
    fn by_phase_preserves_first_seen_order() {
        let result = RunResult {
            verdicts: vec![
                Verdict::from_finding(
                    Phase::HttpRequest,
                    RuleId::SmallFileMerge,
                    Finding::passed("a"),
                ),
                Verdict::from_finding(
                    Phase::DnsResolution,
                    RuleId::DnsPrefetch,
                    Finding::passed("b"),
                ),
                Verdict::from_finding(
                    Phase::HttpRequest,
                    RuleId::CodeMinification,
                    Finding::passed("c"),
                ),
            ],
        };
        let groups = result.by_phase();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Phase::HttpRequest);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[1].message, "c");
        assert_eq!(groups[1].0, Phase::DnsResolution);
    }
}
