//! Project-owned configuration.
//!
//! An optional `optimize.config.json` at the project root tunes report
//! behavior. The rule set itself is fixed and never configurable.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const CONFIG_FILE_NAME: &str = "optimize.config.json";
pub const DEFAULT_DOC_PORT: u16 = 5173;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    pub schema_version: u32,
    #[serde(default = "default_doc_port")]
    pub doc_port: u16,
    #[serde(default = "default_open_report")]
    pub open_report: bool,
    /// Handlebars template relative to the project root; the built-in one is
    /// used when absent or unusable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_template: Option<String>,
}

fn default_doc_port() -> u16 {
    DEFAULT_DOC_PORT
}

fn default_open_report() -> bool {
    true
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            doc_port: DEFAULT_DOC_PORT,
            open_report: true,
            report_template: None,
        }
    }
}

/// Overrides taken from the command line; `None` keeps the configured value.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub doc_port: Option<u16>,
    pub no_open: bool,
}

/// Resolve the effective config for a project.
///
/// An explicit path must exist. The default `optimize.config.json` is optional.
pub fn resolve_config(
    project_root: &Path,
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<CheckConfig> {
    let mut config = match explicit {
        Some(path) => load_config(path)?,
        None => {
            let path = project_root.join(CONFIG_FILE_NAME);
            if path.is_file() {
                load_config(&path)?
            } else {
                tracing::debug!(path = %path.display(), "no project config; using defaults");
                CheckConfig::default()
            }
        }
    };
    if let Some(port) = overrides.doc_port {
        config.doc_port = port;
    }
    if overrides.no_open {
        config.open_report = false;
    }
    validate_config(&config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<CheckConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: CheckConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    Ok(config)
}

pub fn validate_config(config: &CheckConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.doc_port == 0 {
        return Err(anyhow!("doc_port must be non-zero"));
    }
    if let Some(template) = config.report_template.as_deref() {
        if template.trim().is_empty() {
            return Err(anyhow!("report_template must be non-empty when set"));
        }
        validate_relative_path(template, "report_template")?;
    }
    Ok(())
}

/// Template path resolved against the project root, if one is configured.
pub fn report_template_path(config: &CheckConfig, project_root: &Path) -> Option<PathBuf> {
    config
        .report_template
        .as_deref()
        .map(|rel| project_root.join(rel))
}

fn validate_relative_path(rel: &str, label: &str) -> Result<()> {
    let path = Path::new(rel);
    if path.is_absolute() {
        return Err(anyhow!("{label} must be a relative path (got {rel:?})"));
    }
    if path
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return Err(anyhow!("{label} must not contain '..' (got {rel:?})"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
