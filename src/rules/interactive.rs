//! Interactivity readiness phase.
use super::{any_source, ratio_at_least, read_sources, HTML_PATTERNS, JS_PATTERNS};
use crate::schema::Finding;
use crate::snapshot::{ProjectSnapshot, SnapshotResult};
use regex::Regex;

const ASYNC_SCRIPT_RATIO: f64 = 0.5;
const BLOCKING_CALLS: &[&str] = &["alert(", "confirm(", "prompt("];

pub(super) fn check_long_tasks(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let found = any_source(snapshot, JS_PATTERNS, splits_long_tasks)?;
    if found {
        return Ok(Finding::passed("项目中已使用任务拆分技术"));
    }
    Ok(Finding::warning(
        "未发现长任务拆分处理",
        "建议使用setTimeout、requestIdleCallback或requestAnimationFrame拆分长任务",
    ))
}

fn splits_long_tasks(content: &str) -> bool {
    (content.contains("setTimeout") && content.contains('0'))
        || content.contains("requestIdleCallback")
        || content.contains("requestAnimationFrame")
}

pub(super) fn check_blocking_apis(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let found = any_source(snapshot, JS_PATTERNS, uses_blocking_api)?;
    if !found {
        return Ok(Finding::passed("未发现同步阻塞API调用"));
    }
    Ok(Finding::warning(
        "发现同步阻塞API调用",
        "建议避免使用alert、confirm、prompt等阻塞API",
    ))
}

/// Modal dialogs, or an `XMLHttpRequest` opened with `async = false`.
fn uses_blocking_api(content: &str) -> bool {
    BLOCKING_CALLS.iter().any(|call| content.contains(call))
        || (content.contains("XMLHttpRequest") && content.contains("false"))
}

pub(super) fn check_third_party_scripts(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let mut deferred = 0usize;
    let mut total = 0usize;
    for (_, content) in read_sources(snapshot, HTML_PATTERNS)? {
        let (file_deferred, file_total) = count_deferred_script_tags(&content);
        deferred += file_deferred;
        total += file_total;
    }
    if total == 0 {
        return Ok(Finding::passed("未发现脚本标签"));
    }
    if ratio_at_least(deferred, total, ASYNC_SCRIPT_RATIO) {
        return Ok(Finding::passed(format!(
            "异步加载脚本比例较高: {deferred}/{total}"
        )));
    }
    Ok(Finding::warning(
        format!("异步加载脚本比例较低: {deferred}/{total}"),
        "建议对第三方脚本使用async或defer属性实现异步加载",
    ))
}

/// Returns `(async_or_defer, total)` opening `<script>` tag counts.
pub(crate) fn count_deferred_script_tags(content: &str) -> (usize, usize) {
    let tag = Regex::new(r"(?i)<script[^>]*>").expect("regex for script tags");
    tag.find_iter(content).fold((0, 0), |(deferred, total), m| {
        let text = m.as_str();
        let is_deferred = text.contains("async") || text.contains("defer");
        (deferred + usize::from(is_deferred), total + 1)
    })
}

pub(super) fn check_preloading(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let found = any_source(snapshot, HTML_PATTERNS, |content| {
        content.contains(r#"rel="preload""#) || content.contains("rel='preload'")
    })?;
    if found {
        return Ok(Finding::passed("项目中已配置资源预加载"));
    }
    Ok(Finding::warning(
        "未发现资源预加载配置",
        r#"建议对关键资源使用<link rel="preload">实现预加载"#,
    ))
}
