use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod config;
mod output;
mod report;
mod rules;
mod runner;
mod schema;
mod snapshot;
mod templates;

use cli::{CheckArgs, Command, RootArgs};
use config::ConfigOverrides;
use report::ReportOptions;
use schema::{CheckReport, RESULTS_SCHEMA_VERSION};
use snapshot::ProjectSnapshot;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    match args.command {
        Command::Check(args) => cmd_check(args),
    }
}

/// Logs go to stderr so stdout carries only results.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .ok();
}

fn cmd_check(args: CheckArgs) -> Result<()> {
    init_tracing(args.verbose);

    let project_root = resolve_project_root(&args.path)?;
    let overrides = ConfigOverrides {
        doc_port: args.doc_port,
        no_open: args.no_open,
    };
    let config = config::resolve_config(&project_root, args.config.as_deref(), &overrides)?;
    tracing::debug!(?config, root = %project_root.display(), "resolved config");

    if !args.json {
        println!("🚀 开始检测项目性能优化项...");
        println!("📁 项目路径: {}", project_root.display());
    }

    let started = Instant::now();
    let snapshot = ProjectSnapshot::new(&project_root);
    let result = runner::run(&snapshot, rules::RULES);
    let elapsed = started.elapsed();

    if args.json {
        let report = CheckReport {
            schema_version: RESULTS_SCHEMA_VERSION,
            project_path: project_root.display().to_string(),
            elapsed_ms: elapsed.as_millis(),
            summary: result.summary(),
            results: &result,
        };
        let text = serde_json::to_string_pretty(&report).context("serialize results")?;
        println!("{text}");
    } else {
        println!("\n检测完成，耗时 {}ms", elapsed.as_millis());
        output::print_results(&result);
    }

    if args.report {
        let options = ReportOptions {
            doc_port: config.doc_port,
            open: config.open_report,
            template_path: config::report_template_path(&config, &project_root),
        };
        let outcome = report::generate(&result, &project_root, &options)?;
        notify(
            args.json,
            &format!("\n📊 检测报告已生成: {}", outcome.path.display()),
        );
        if outcome.viewer_error.is_some() {
            notify(
                args.json,
                &format!("无法自动打开浏览器，请手动打开: {}", outcome.path.display()),
            );
        }
        if !args.json {
            output::print_summary(&result);
        }
    }

    if args.verbose && !args.json {
        output::print_verbose_details(&result);
    }
    Ok(())
}

/// Side messages go to stderr under `--json` so stdout stays a single document.
fn notify(json: bool, line: &str) {
    if json {
        eprintln!("{}", line.trim_start());
    } else {
        println!("{line}");
    }
}

fn resolve_project_root(path: &Path) -> Result<std::path::PathBuf> {
    let root = path
        .canonicalize()
        .with_context(|| format!("project path {} does not exist", path.display()))?;
    if !root.is_dir() {
        return Err(anyhow!("project path {} is not a directory", root.display()));
    }
    Ok(root)
}
