//! Read-only view of a project tree.
//!
//! Every query touches the filesystem again; nothing is cached between rules.
//! Paths handed out are `/`-separated and relative to the root (or to the
//! subdirectory a query was rooted at).
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Report file written by the generator; never part of the audited tree.
pub const REPORT_FILE_NAME: &str = "optimize-report.html";

/// Build-output directories, in preference order.
pub const BUILD_OUTPUT_DIRS: &[&str] = &["dist", "build", "out"];

/// Excludes applied to every source-tree scan.
pub const SOURCE_EXCLUDES: &[&str] = &[
    "node_modules/**",
    "dist/**",
    "build/**",
    "out/**",
    ".git/**",
    REPORT_FILE_NAME,
];

/// Excludes applied to scans inside a build-output directory.
pub const BUILD_OUTPUT_EXCLUDES: &[&str] = &["node_modules/**"];

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    #[error("读取 {path} 失败: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("解析 {path} 失败: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("无效的匹配模式 {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("遍历目录失败: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Clone)]
pub struct ProjectSnapshot {
    root: PathBuf,
}

impl ProjectSnapshot {
    /// Root the snapshot at an absolute project path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source files matching `patterns`, with [`SOURCE_EXCLUDES`] always applied.
    pub fn list_source_files(&self, patterns: &[&str]) -> SnapshotResult<Vec<String>> {
        self.list_files(patterns, &[])
    }

    /// Files under the root matching `patterns`, minus the default source
    /// excludes and any extra `excludes`.
    pub fn list_files(&self, patterns: &[&str], excludes: &[&str]) -> SnapshotResult<Vec<String>> {
        let mut all_excludes: Vec<&str> = SOURCE_EXCLUDES.to_vec();
        all_excludes.extend_from_slice(excludes);
        walk_matching(&self.root, patterns, &all_excludes)
    }

    /// Files under `dir` (relative to the root), returned relative to `dir`.
    pub fn list_files_in(
        &self,
        dir: &str,
        patterns: &[&str],
        excludes: &[&str],
    ) -> SnapshotResult<Vec<String>> {
        walk_matching(&self.root.join(dir), patterns, excludes)
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root.join(rel).exists()
    }

    pub fn read_text(&self, rel: &str) -> SnapshotResult<String> {
        let bytes = self.read_bytes(rel)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn read_json(&self, rel: &str) -> SnapshotResult<Value> {
        let bytes = self.read_bytes(rel)?;
        serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Parse {
            path: rel.to_string(),
            source,
        })
    }

    pub fn file_size(&self, rel: &str) -> SnapshotResult<u64> {
        let path = self.root.join(rel);
        fs::metadata(&path)
            .map(|meta| meta.len())
            .map_err(|err| io_error(rel, err))
    }

    /// First existing build-output directory, if the project has been built.
    pub fn build_output_dir(&self) -> Option<&'static str> {
        BUILD_OUTPUT_DIRS
            .iter()
            .copied()
            .find(|dir| self.root.join(dir).is_dir())
    }

    fn read_bytes(&self, rel: &str) -> SnapshotResult<Vec<u8>> {
        fs::read(self.root.join(rel)).map_err(|err| io_error(rel, err))
    }
}

fn io_error(rel: &str, err: io::Error) -> SnapshotError {
    if err.kind() == io::ErrorKind::NotFound {
        SnapshotError::NotFound {
            path: rel.to_string(),
        }
    } else {
        SnapshotError::Io {
            path: rel.to_string(),
            source: err,
        }
    }
}

fn compile_globset(patterns: &[&str]) -> SnapshotResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| SnapshotError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| SnapshotError::Pattern {
        pattern: patterns.join(","),
        source,
    })
}

/// Directory excludes written as `dir/**` also prune `dir` itself so the walk
/// never descends into it.
fn compile_dir_prunes(excludes: &[&str]) -> SnapshotResult<GlobSet> {
    let dirs: Vec<&str> = excludes
        .iter()
        .filter_map(|pattern| pattern.strip_suffix("/**"))
        .collect();
    compile_globset(&dirs)
}

fn walk_matching(base: &Path, patterns: &[&str], excludes: &[&str]) -> SnapshotResult<Vec<String>> {
    let includes = compile_globset(patterns)?;
    let exclude_set = compile_globset(excludes)?;
    let prunes = compile_dir_prunes(excludes)?;

    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(base)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match entry.path().strip_prefix(base) {
                Ok(rel) => !prunes.is_match(rel),
                Err(_) => true,
            }
        });
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(base) else {
            continue;
        };
        let rel = rel.to_string_lossy().replace('\\', "/");
        if includes.is_match(&rel) && !exclude_set.is_match(&rel) {
            files.push(rel);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
