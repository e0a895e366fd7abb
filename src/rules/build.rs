//! Build tooling phase.
use crate::schema::Finding;
use crate::snapshot::{ProjectSnapshot, SnapshotResult};
use serde_json::Value;

const BUILD_CONFIG_FILES: &[&str] = &[
    "webpack.config.js",
    "vite.config.js",
    "rollup.config.js",
    "vue.config.js",
    "angular.json",
    "next.config.js",
    "nuxt.config.js",
];
const PACKAGE_JSON: &str = "package.json";
const DEPENDENCY_LIMIT: usize = 30;
const DEPENDENCY_ELEVATED: usize = 50;

pub(super) fn check_build_config(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    if BUILD_CONFIG_FILES.iter().any(|file| snapshot.exists(file)) {
        return Ok(Finding::passed("发现构建工具配置文件"));
    }
    Ok(Finding::warning(
        "未发现构建工具配置文件",
        "建议配置构建工具以启用Tree Shaking、压缩、指纹等优化功能",
    ))
}

pub(super) fn check_dependency_count(snapshot: &ProjectSnapshot) -> SnapshotResult<Finding> {
    if !snapshot.exists(PACKAGE_JSON) {
        return Ok(Finding::bare_warning("未发现package.json文件"));
    }
    let manifest = snapshot.read_json(PACKAGE_JSON)?;
    let count = dependency_count(&manifest);
    let recommendation = "建议检查是否有冗余依赖，使用webpack-bundle-analyzer分析包体积";
    Ok(if count <= DEPENDENCY_LIMIT {
        Finding::passed(format!("依赖数量合理: {count}个"))
    } else if count <= DEPENDENCY_ELEVATED {
        Finding::warning(format!("依赖数量较多: {count}个"), recommendation)
    } else {
        Finding::warning(format!("依赖数量过多: {count}个"), recommendation)
    })
}

/// Keys of `dependencies` plus `devDependencies`; non-object sections count as empty.
pub(crate) fn dependency_count(manifest: &Value) -> usize {
    ["dependencies", "devDependencies"]
        .iter()
        .filter_map(|key| manifest.get(key).and_then(Value::as_object))
        .map(|deps| deps.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_count_sums_both_sections() {
        let manifest = serde_json::json!({
            "dependencies": { "vue": "^3", "axios": "^1" },
            "devDependencies": { "vite": "^5" },
            "peerDependencies": { "ignored": "*" }
        });
        assert_eq!(dependency_count(&manifest), 3);
    }

    #[test]
    fn dependency_count_tolerates_missing_sections() {
        assert_eq!(dependency_count(&serde_json::json!({ "name": "app" })), 0);
        assert_eq!(dependency_count(&serde_json::json!([])), 0);
    }
}
