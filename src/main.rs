//! # gitscribe CLI
//!
//! The `gitscribe` binary exports a Git repository's history as a tree of
//! Markdown artifacts with per-file secret-leak alerts and resumable
//! incremental re-runs.
//!
//! ## Usage
//!
//! ```bash
//! gitscribe export [--repo <path>] [--output <dir>] [flags]
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gitscribe export` | Run the export pipeline |
//! | `gitscribe state` | Show the persisted resumption state |
//! | `gitscribe init` | Scaffold a commented `gitscribe.toml` |
//!
//! ## Examples
//!
//! ```bash
//! # Export every branch of the current repository
//! gitscribe export --repo . --output ./export
//!
//! # Only two branches, twenty commits each, skipping vendored code
//! gitscribe export --branches main,dev --limit 20 --exclude vendor/
//!
//! # Reprocess everything, ignoring resumption state
//! gitscribe export --force
//!
//! # Machine-readable progress on stderr
//! gitscribe export --progress json
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use gitscribe::config::{self, CliOverrides, ExportOptions};
use gitscribe::export::run_export;
use gitscribe::models::ExportSummary;
use gitscribe::progress::ProgressMode;
use gitscribe::provider_git::{looks_like_repo, GitProvider};
use gitscribe::state::StateStore;
use gitscribe::writer::FsWriter;

/// gitscribe: export Git history as Markdown for AI and text tooling.
///
/// All flags can also be set in a `gitscribe.toml` config file; command-line
/// values win over the file, which wins over built-in defaults.
#[derive(Parser)]
#[command(
    name = "gitscribe",
    about = "Export Git repository history as a Markdown artifact tree",
    version,
    long_about = "gitscribe walks the branches of a Git repository and renders one Markdown \
    document per commit plus per-file snapshots with secret-leak alerts. Resumption state \
    under the output root makes re-runs incremental: already-exported branches and commits \
    are skipped unless --force is given."
)]
struct Cli {
    /// Path to a configuration file (TOML).
    ///
    /// When omitted, `./gitscribe.toml` is used if it exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the export pipeline.
    ///
    /// Resolves the branch set, exports new commits under bounded
    /// concurrency, and prints a run summary. Branch failures are listed
    /// in the summary and do not change the exit status; only errors
    /// before orchestration begins are fatal.
    Export {
        /// Repository to export. Defaults to the current directory.
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Output root for the artifact tree and state file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Branch selection: `all`, or a comma-separated list of names.
        #[arg(long)]
        branches: Option<String>,

        /// Per-branch cap on candidate commits (newest first).
        #[arg(long)]
        limit: Option<usize>,

        /// Skip file snapshots for blobs larger than this many bytes.
        #[arg(long)]
        max_file_bytes: Option<u64>,

        /// Write skip placeholders instead of file snapshots.
        #[arg(long)]
        no_files: bool,

        /// Disable secret scanning for this run.
        #[arg(long)]
        no_secret_scan: bool,

        /// Drop files whose path starts with this prefix (repeatable).
        #[arg(long = "exclude")]
        exclude: Vec<String>,

        /// Branch-level concurrency bound.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Reprocess branches and commits already marked exported.
        #[arg(long)]
        force: bool,

        /// Progress output on stderr: off, human, or json.
        ///
        /// Defaults to human when stderr is a TTY, off otherwise.
        #[arg(long)]
        progress: Option<String>,
    },

    /// Show the persisted resumption state for an output root.
    ///
    /// Prints the last export time, the processed commit count, and the
    /// branches already marked exported.
    State {
        /// Output root the state file lives under.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Scaffold a commented `gitscribe.toml` in the current directory.
    ///
    /// Refuses to overwrite an existing file.
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let file_config = load_file_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Export {
            repo,
            output,
            branches,
            limit,
            max_file_bytes,
            no_files,
            no_secret_scan,
            exclude,
            concurrency,
            force,
            progress,
        } => {
            let overrides = CliOverrides {
                repo,
                output,
                branches,
                commit_limit: limit,
                max_file_bytes,
                include_file_snapshots: if no_files { Some(false) } else { None },
                scan_secrets: if no_secret_scan { Some(false) } else { None },
                exclude_prefixes: if exclude.is_empty() {
                    None
                } else {
                    Some(exclude)
                },
                concurrency,
                force_update: force,
            };
            let options = config::resolve(file_config, overrides);
            let mode = match progress {
                Some(text) => text
                    .parse::<ProgressMode>()
                    .map_err(|err| anyhow::anyhow!(err))?,
                None => ProgressMode::default_for_tty(),
            };
            let summary = export(&options, mode).await?;
            print_summary(&options, &summary);
        }
        Commands::State { output } => {
            let options = config::resolve(file_config, CliOverrides::default());
            let output_root = output.unwrap_or(options.output_root);
            print_state(&output_root).await;
        }
        Commands::Init => {
            scaffold_config()?;
        }
    }

    Ok(())
}

async fn export(options: &ExportOptions, mode: ProgressMode) -> Result<ExportSummary> {
    if !looks_like_repo(&options.repo_path) {
        bail!(
            "{} does not look like a git repository",
            options.repo_path.display()
        );
    }
    let provider = GitProvider::new(options.repo_path.clone());
    let writer = FsWriter::new(options.output_root.clone());
    let reporter = mode.reporter();
    run_export(options, &provider, &writer, reporter.as_ref()).await
}

fn print_summary(options: &ExportOptions, summary: &ExportSummary) {
    println!("export {}", options.repo_path.display());
    println!("  branches attempted: {}", summary.branches_attempted);
    println!("  branches succeeded: {}", summary.branches_succeeded);
    println!("  commits exported: {}", summary.commits_exported);
    if !summary.failed_branches.is_empty() {
        println!("  failed: {}", summary.failed_branches.join(", "));
    }
    println!("ok");
}

async fn print_state(output_root: &Path) {
    let store = StateStore::load(output_root).await;
    let snapshot = store.snapshot();
    println!("state {}", output_root.display());
    println!("  last export: {}", snapshot.last_export.to_rfc3339());
    println!("  processed commits: {}", snapshot.processed_commits.len());
    if snapshot.exported_branches.is_empty() {
        println!("  exported branches: (none)");
    } else {
        println!(
            "  exported branches: {}",
            snapshot.exported_branches.join(", ")
        );
    }
}

/// Load the config file: explicit path errors are fatal, a discovered
/// `./gitscribe.toml` that fails to parse is only a warning.
fn load_file_config(explicit: Option<&Path>) -> Result<Option<config::FileConfig>> {
    if let Some(path) = explicit {
        return Ok(Some(config::load_file(path)?));
    }
    let discovered = PathBuf::from(config::CONFIG_FILE);
    if !discovered.exists() {
        return Ok(None);
    }
    match config::load_file(&discovered) {
        Ok(file) => Ok(Some(file)),
        Err(err) => {
            eprintln!("warning: ignoring {}: {:#}", discovered.display(), err);
            Ok(None)
        }
    }
}

fn scaffold_config() -> Result<()> {
    let path = PathBuf::from(config::CONFIG_FILE);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    std::fs::write(&path, CONFIG_TEMPLATE)?;
    println!("wrote {}", path.display());
    Ok(())
}

const CONFIG_TEMPLATE: &str = r#"# gitscribe configuration.
# Command-line flags override these values.

[export]
# Repository to export.
repo = "."

# Output root for the artifact tree and state file.
output = "./export"

# "all", or a comma-separated list of branch names.
branches = "all"

# Per-branch cap on candidate commits, newest first.
commit_limit = 50

# Skip file snapshots for blobs larger than this many bytes.
max_file_bytes = 262144

# Write real file snapshots (false writes skip placeholders instead).
include_file_snapshots = true

# Drop files whose path starts with any of these prefixes.
exclude_prefixes = []

# Scan fetched file content for secret leaks.
scan_secrets = true

# Branch-level concurrency bound.
concurrency = 4

# Extra secret patterns on top of the built-in set.
# [[export.secret_patterns]]
# name = "internal-token"
# pattern = "INT-[0-9]{8}"
"#;
