//! Parse and render phase.
use super::{any_source, read_sources, CSS_PATTERNS, HTML_PATTERNS, JS_PATTERNS};
use crate::schema::Finding;
use crate::snapshot::{ProjectSnapshot, SnapshotResult};
use regex::Regex;

const HEAD_SCRIPT_FEW: usize = 2;
const COMPLEX_SELECTOR_RATIO: f64 = 0.1;
const LAYOUT_PROPERTIES: &[&str] = &["width", "height", "left", "top", "margin", "padding"];
const CSS_ANIMATION_MARKERS: &[&str] = &["animation:", "transform:", "@keyframes"];

pub(super) fn check_head_scripts(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let mut count = 0usize;
    for (_, content) in read_sources(snapshot, HTML_PATTERNS)? {
        count += count_head_scripts(&content);
    }
    let recommendation = "建议将非关键脚本移至body底部以避免阻塞HTML解析";
    Ok(if count == 0 {
        Finding::passed("未在head标签中发现脚本")
    } else if count <= HEAD_SCRIPT_FEW {
        Finding::warning(format!("head标签中存在少量脚本: {count}个"), recommendation)
    } else {
        Finding::warning(format!("head标签中存在较多脚本: {count}个"), recommendation)
    })
}

/// Script elements inside the first `<head>` block of a document.
pub(crate) fn count_head_scripts(content: &str) -> usize {
    let head = Regex::new(r"(?is)<head(?:\s[^>]*)?>(.*?)</head>").expect("regex for head block");
    let script = Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("regex for script elements");
    head.captures(content)
        .and_then(|cap| cap.get(1))
        .map(|inner| script.find_iter(inner.as_str()).count())
        .unwrap_or(0)
}

pub(super) fn check_code_splitting(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let found = any_source(snapshot, JS_PATTERNS, |content| {
        content.contains("import(") || content.contains("require.ensure")
    })?;
    if found {
        return Ok(Finding::passed("项目中已使用动态导入实现代码分割"));
    }
    Ok(Finding::warning(
        "未发现动态导入使用",
        "建议使用import()语法实现路由或组件级别的代码分割",
    ))
}

pub(super) fn check_css_imports(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let mut count = 0usize;
    for (_, content) in read_sources(snapshot, CSS_PATTERNS)? {
        count += count_css_imports(&content);
    }
    if count == 0 {
        return Ok(Finding::passed("未发现CSS中的@import语句"));
    }
    Ok(Finding::warning(
        format!("发现{count}个@import语句"),
        "建议使用link标签替代@import以避免阻塞CSS解析",
    ))
}

pub(crate) fn count_css_imports(content: &str) -> usize {
    let import = Regex::new(r#"(?i)@import\s+(?:url\()?['"][^'"]*['"]"#)
        .expect("regex for css @import");
    import.find_iter(content).count()
}

pub(super) fn check_complex_selectors(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let mut complex = 0usize;
    let mut total = 0usize;
    for (_, content) in read_sources(snapshot, CSS_PATTERNS)? {
        let (file_complex, file_total) = count_complex_selectors(&content);
        complex += file_complex;
        total += file_total;
    }
    if total == 0 {
        return Ok(Finding::passed("未发现CSS选择器"));
    }
    if (complex as f64 / total as f64) < COMPLEX_SELECTOR_RATIO {
        return Ok(Finding::passed(format!(
            "复杂选择器比例较低: {complex}/{total}"
        )));
    }
    Ok(Finding::warning(
        format!("复杂选择器比例较高: {complex}/{total}"),
        "建议简化复杂选择器以提高CSS解析性能",
    ))
}

/// Returns `(complex, total)` rule-block counts. A selector is complex when it
/// uses a combinator (`>`, `+`, `~`) or chains more than two classes.
pub(crate) fn count_complex_selectors(content: &str) -> (usize, usize) {
    let block = Regex::new(r"[^{}]*\{[^}]*\}").expect("regex for css rule blocks");
    block.find_iter(content).fold((0, 0), |(complex, total), m| {
        let selector = m.as_str().split('{').next().unwrap_or_default().trim();
        let is_complex = selector.contains('>')
            || selector.contains('+')
            || selector.contains('~')
            || selector.matches('.').count() > 2;
        (complex + usize::from(is_complex), total + 1)
    })
}

pub(super) fn check_css_animations(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let js_animation = any_source(snapshot, JS_PATTERNS, touches_layout_style)?;
    if !js_animation {
        return Ok(Finding::passed("未发现直接操作布局属性的JS动画"));
    }
    let css_animation = any_source(snapshot, CSS_PATTERNS, |content| {
        CSS_ANIMATION_MARKERS
            .iter()
            .any(|marker| content.contains(marker))
    })?;
    if css_animation {
        return Ok(Finding::warning(
            "发现JS动画操作，但已使用CSS动画",
            "建议优先使用CSS动画替代JS动画以提高性能",
        ));
    }
    Ok(Finding::warning(
        "发现JS动画操作且未使用CSS动画",
        "建议使用CSS transform和animation替代JS动画以提高性能",
    ))
}

fn touches_layout_style(content: &str) -> bool {
    content.contains(".style.") && LAYOUT_PROPERTIES.iter().any(|prop| content.contains(prop))
}
