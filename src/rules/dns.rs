//! DNS resolution phase.
use super::{any_source, HTML_PATTERNS};
use crate::schema::Finding;
use crate::snapshot::{ProjectSnapshot, SnapshotResult};
use std::collections::BTreeSet;

const STATIC_ASSET_PATTERNS: &[&str] = &["**/*.{js,css,png,jpg,jpeg,gif,svg,woff,woff2}"];
const DOMAIN_LIMIT: usize = 2;
const DOMAIN_ELEVATED: usize = 3;

pub(super) fn check_dns_prefetch(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let found = any_source(snapshot, HTML_PATTERNS, |content| {
        content.contains(r#"rel="dns-prefetch""#) || content.contains("rel='dns-prefetch'")
    })?;
    if found {
        return Ok(Finding::passed("项目中已配置DNS预解析"));
    }
    Ok(Finding::warning(
        "未发现DNS预解析配置",
        r#"建议在HTML的<head>标签中添加<link rel="dns-prefetch" href="//example.com">来预解析重要域名"#,
    ))
}

/// Static assets are grouped by their top-level directory, which stands in for
/// the host they would be served from.
pub(super) fn check_domain_count(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    let files = snapshot.list_source_files(STATIC_ASSET_PATTERNS)?;
    let count = asset_domains(&files).len();
    let recommendation = "建议将静态资源域名合并到2个以内以减少DNS解析开销";
    Ok(if count <= DOMAIN_LIMIT {
        Finding::passed(format!("静态资源域名数量合理: {count}个"))
    } else if count <= DOMAIN_ELEVATED {
        Finding::warning(format!("静态资源域名数量较多: {count}个"), recommendation)
    } else {
        Finding::warning(format!("静态资源域名数量过多: {count}个"), recommendation)
    })
}

fn asset_domains(files: &[String]) -> BTreeSet<&str> {
    files
        .iter()
        .filter_map(|file| {
            let mut parts = file.split('/');
            let first = parts.next()?;
            parts.next()?;
            (!first.contains('.')).then_some(first)
        })
        .collect()
}
