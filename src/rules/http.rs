//! HTTP request phase: request count, payload size, and load ordering.
use super::{
    any_source, built_assets, file_stem, missing_build_output, ratio_at_least, read_sources,
    CSS_PATTERNS, HTML_PATTERNS, JS_PATTERNS,
};
use crate::schema::Finding;
use crate::snapshot::{ProjectSnapshot, SnapshotResult};
use regex::Regex;

const SMALL_FILE_BYTES: u64 = 10 * 1024;
const SMALL_FILE_LIMIT: usize = 3;
const JS_FILE_LIMIT: usize = 50;
const CSS_FILE_LIMIT: usize = 20;
const IMAGE_PATTERNS: &[&str] = &["**/*.{png,jpg,jpeg,gif,webp,avif}"];
const MODERN_IMAGE_RATIO: f64 = 0.5;
const MINIFIED_RATIO: f64 = 0.8;
const FINGERPRINT_RATIO: f64 = 0.8;
const FINGERPRINT_MIN_LEN: usize = 8;
const SYNC_SCRIPT_LIMIT: usize = 2;
const LAZY_IMAGE_RATIO: f64 = 0.5;

pub(super) fn check_small_files(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let Some((dir, files)) = built_assets(snapshot)? else {
        return Ok(missing_build_output());
    };
    let mut small = 0usize;
    for file in &files {
        let size = snapshot.file_size(&format!("{dir}/{file}"))?;
        if size > 0 && size < SMALL_FILE_BYTES {
            small += 1;
        }
    }
    if small <= SMALL_FILE_LIMIT {
        return Ok(Finding::passed(format!("小文件数量合理: {small}个")));
    }
    Ok(Finding::warning(
        format!("存在较多小文件: {small}个"),
        "建议配置webpack/vite的splitChunks选项来合并小文件，减少HTTP请求数量",
    ))
}

/// File-count heuristic; real coverage data is out of reach for a static scan.
pub(super) fn check_unused_resources(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let js = snapshot.list_source_files(JS_PATTERNS)?.len();
    let css = snapshot.list_source_files(CSS_PATTERNS)?.len();
    if js > JS_FILE_LIMIT || css > CSS_FILE_LIMIT {
        return Ok(Finding::warning(
            format!("可能存在未使用的资源文件(JS:{js}个, CSS:{css}个)"),
            "建议使用Webpack Bundle Analyzer等工具分析并移除未使用的代码",
        ));
    }
    Ok(Finding::passed("资源文件数量在合理范围内"))
}

pub(super) fn check_image_formats(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let images = snapshot.list_source_files(IMAGE_PATTERNS)?;
    let total = images.len();
    if total == 0 {
        return Ok(Finding::passed("项目中未发现图片资源"));
    }
    let modern = images.iter().filter(|file| is_modern_image(file)).count();
    if ratio_at_least(modern, total, MODERN_IMAGE_RATIO) {
        return Ok(Finding::passed(format!(
            "现代图片格式使用率较高: {modern}/{total}"
        )));
    }
    Ok(Finding::warning(
        format!("现代图片格式使用率较低: {modern}/{total}"),
        "建议使用WebP或AVIF格式替代传统格式以减小图片体积",
    ))
}

fn is_modern_image(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".webp") || lower.ends_with(".avif")
}

pub(super) fn check_minification(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let Some((_, files)) = built_assets(snapshot)? else {
        return Ok(missing_build_output());
    };
    let total = files.len();
    if total == 0 {
        return Ok(Finding::passed("未发现JS/CSS文件"));
    }
    let minified = files.iter().filter(|file| is_minified(file)).count();
    if ratio_at_least(minified, total, MINIFIED_RATIO) {
        return Ok(Finding::passed(format!("大部分文件已压缩: {minified}/{total}")));
    }
    Ok(Finding::warning(
        format!("部分文件未压缩: {minified}/{total}"),
        "建议配置Terser或cssnano等工具进行代码压缩",
    ))
}

pub(crate) fn is_minified(path: &str) -> bool {
    path.contains(".min.") || file_stem(path).ends_with(".min")
}

pub(super) fn check_fingerprints(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let Some((_, files)) = built_assets(snapshot)? else {
        return Ok(missing_build_output());
    };
    let total = files.len();
    if total == 0 {
        return Ok(Finding::passed("未发现JS/CSS文件"));
    }
    let hashed = files.iter().filter(|file| has_fingerprint(file)).count();
    if ratio_at_least(hashed, total, FINGERPRINT_RATIO) {
        return Ok(Finding::passed(format!(
            "大部分文件已添加指纹: {hashed}/{total}"
        )));
    }
    Ok(Finding::warning(
        format!("部分文件未添加指纹: {hashed}/{total}"),
        "建议在构建配置中启用文件指纹功能，如webpack的[contenthash]或vite的[hash]",
    ))
}

/// `index-3f9a2c1b.js` style names: a dash-separated trailing segment of 8+ chars.
pub(crate) fn has_fingerprint(path: &str) -> bool {
    let stem = file_stem(path);
    stem.contains('-')
        && stem
            .rsplit('-')
            .next()
            .is_some_and(|tail| tail.chars().count() >= FINGERPRINT_MIN_LEN)
}

pub(super) fn check_deferred_css(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let found = any_source(snapshot, HTML_PATTERNS, |content| {
        content.contains(r#"media="print""#) && content.contains("onload")
    })?;
    if found {
        return Ok(Finding::passed("项目中已配置CSS延迟加载"));
    }
    Ok(Finding::warning(
        "未发现CSS延迟加载配置",
        r#"建议对非首屏CSS使用media="print"配合onload="this.media='all'"实现延迟加载"#,
    ))
}

pub(super) fn check_sync_scripts(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let mut count = 0usize;
    for (_, content) in read_sources(snapshot, HTML_PATTERNS)? {
        count += count_sync_scripts(&content);
    }
    if count <= SYNC_SCRIPT_LIMIT {
        return Ok(Finding::passed(format!("同步脚本数量合理: {count}个")));
    }
    Ok(Finding::warning(
        format!("存在较多同步脚本: {count}个"),
        "建议对非关键脚本使用async或defer属性避免阻塞HTML解析",
    ))
}

/// Complete `<script>…</script>` elements whose opening tag has neither `async` nor `defer`.
pub(crate) fn count_sync_scripts(content: &str) -> usize {
    let element = Regex::new(r"(?is)<script([^>]*)>(.*?)</script>")
        .expect("regex for script elements");
    let loading = Regex::new(r"(?i)\b(?:async|defer)\b").expect("regex for async/defer");
    element
        .captures_iter(content)
        .filter(|cap| {
            let attrs = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            !loading.is_match(attrs)
        })
        .count()
}

pub(super) fn check_lazy_images(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let mut lazy = 0usize;
    let mut total = 0usize;
    for (_, content) in read_sources(snapshot, HTML_PATTERNS)? {
        let (file_lazy, file_total) = count_lazy_images(&content);
        lazy += file_lazy;
        total += file_total;
    }
    if total == 0 {
        return Ok(Finding::passed("未发现图片资源"));
    }
    if ratio_at_least(lazy, total, LAZY_IMAGE_RATIO) {
        return Ok(Finding::passed(format!("懒加载图片比例较高: {lazy}/{total}")));
    }
    Ok(Finding::warning(
        format!("懒加载图片比例较低: {lazy}/{total}"),
        r#"建议对非首屏图片使用loading="lazy"属性实现懒加载"#,
    ))
}

/// Returns `(lazy, total)` `<img>` tag counts.
pub(crate) fn count_lazy_images(content: &str) -> (usize, usize) {
    let img = Regex::new(r"(?i)<img[^>]*>").expect("regex for img tags");
    img.find_iter(content).fold((0, 0), |(lazy, total), tag| {
        let tag = tag.as_str();
        let is_lazy = tag.contains(r#"loading="lazy""#) || tag.contains("loading='lazy'");
        (lazy + usize::from(is_lazy), total + 1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minified_names() {
        assert!(is_minified("vendor.min.js"));
        assert!(is_minified("assets/app.min.css"));
        assert!(!is_minified("app.js"));
        assert!(!is_minified("admin.css"));
    }

    #[test]
    fn fingerprinted_names() {
        assert!(has_fingerprint("assets/index-3f9a2c1b.js"));
        assert!(has_fingerprint("vendor-BxYz12Abcd.css"));
        assert!(!has_fingerprint("index-abc.js"));
        assert!(!has_fingerprint("styles.css"));
        assert!(!has_fingerprint("app.3f9a2c1b.js"));
    }

    #[test]
    fn sync_scripts_skip_async_and_defer() {
        let html = r#"
            <script src="a.js"></script>
            <script async src="b.js"></script>
            <script defer src="c.js"></script>
            <SCRIPT type="module">
              console.log(1)
            </SCRIPT>
        "#;
        assert_eq!(count_sync_scripts(html), 2);
    }

    #[test]
    fn sync_scripts_ignore_attribute_substrings() {
        let html = r#"<script src="deferred-loader.js"></script>"#;
        assert_eq!(count_sync_scripts(html), 1);
    }

    #[test]
    fn lazy_images_counted_per_tag() {
        let html = r#"<img src="a.png" loading="lazy"><img src='b.png' loading='lazy'><IMG src="c.png">"#;
        assert_eq!(count_lazy_images(html), (2, 3));
    }
}
