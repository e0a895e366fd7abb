//! CLI argument parsing for the audit command.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "optimize-cli",
    version,
    about = "前端性能优化检测工具",
    after_help = "Examples:\n  optimize-cli check\n  optimize-cli check --path ./my-app --report\n  optimize-cli check -p ./my-app -v\n  optimize-cli check --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Check(CheckArgs),
}

/// Check command inputs for a single project.
#[derive(Parser, Debug)]
#[command(about = "检测项目中的前端性能优化项")]
pub struct CheckArgs {
    /// Project root to audit
    #[arg(short = 'p', long, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Write optimize-report.html into the project root
    #[arg(short = 'r', long)]
    pub report: bool,

    /// Print per-warning details and enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Emit machine-readable JSON output instead of the console listing
    #[arg(long)]
    pub json: bool,

    /// Port of the local docs server linked from the report
    #[arg(long, value_name = "PORT")]
    pub doc_port: Option<u16>,

    /// Do not open the report after writing it
    #[arg(long)]
    pub no_open: bool,

    /// Config file to use instead of <DIR>/optimize.config.json
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_defaults_to_current_dir() {
        let args = RootArgs::try_parse_from(["optimize-cli", "check"]).expect("parse");
        let Command::Check(check) = args.command;
        assert_eq!(check.path, PathBuf::from("."));
        assert!(!check.report);
        assert!(!check.verbose);
        assert_eq!(check.doc_port, None);
    }

    #[test]
    fn short_flags_match_long_flags() {
        let args = RootArgs::try_parse_from(["optimize-cli", "check", "-p", "site", "-r", "-v"])
            .expect("parse");
        let Command::Check(check) = args.command;
        assert_eq!(check.path, PathBuf::from("site"));
        assert!(check.report);
        assert!(check.verbose);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(RootArgs::try_parse_from(["optimize-cli"]).is_err());
    }
}
