//! Run configuration.
//!
//! Three layers merge into one resolved [`ExportOptions`]: built-in
//! defaults, an optional `gitscribe.toml`, and command-line overrides, in
//! that order. Each merge stage is validated; validation clamps out-of-range
//! values with a stderr warning rather than failing the run.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::secrets::CustomPattern;

/// Config file name looked up in the working directory when `--config` is
/// not given.
pub const CONFIG_FILE: &str = "gitscribe.toml";

pub const DEFAULT_COMMIT_LIMIT: usize = 50;
pub const DEFAULT_MAX_FILE_BYTES: u64 = 256 * 1024;
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Fully resolved options for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Repository to export.
    pub repo_path: PathBuf,
    /// Root directory the artifact tree and state file live under.
    pub output_root: PathBuf,
    /// `"all"` or a comma-separated list of branch names.
    pub branches: String,
    /// Per-branch cap on candidate commits, newest first.
    pub commit_limit: usize,
    /// Blobs over this size get a skip placeholder instead of a snapshot.
    pub max_file_bytes: u64,
    /// When false, every file artifact degrades to a skip placeholder.
    pub include_file_snapshots: bool,
    /// A file is dropped when its path starts with any of these prefixes.
    pub exclude_prefixes: Vec<String>,
    pub scan_secrets: bool,
    /// Branch-level concurrency bound; commit-level is `min(10, concurrency)`.
    pub concurrency: usize,
    /// Reprocess everything, ignoring resumption state.
    pub force_update: bool,
    pub custom_patterns: Vec<CustomPattern>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("."),
            output_root: PathBuf::from("./export"),
            branches: "all".to_string(),
            commit_limit: DEFAULT_COMMIT_LIMIT,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            include_file_snapshots: true,
            exclude_prefixes: Vec::new(),
            scan_secrets: true,
            concurrency: DEFAULT_CONCURRENCY,
            force_update: false,
            custom_patterns: Vec::new(),
        }
    }
}

/// Optional-field mirror of [`ExportOptions`], as read from `gitscribe.toml`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub export: ExportSection,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ExportSection {
    pub repo: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub branches: Option<String>,
    pub commit_limit: Option<usize>,
    pub max_file_bytes: Option<u64>,
    pub include_file_snapshots: Option<bool>,
    pub exclude_prefixes: Option<Vec<String>>,
    pub scan_secrets: Option<bool>,
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub secret_patterns: Vec<CustomPattern>,
}

/// Optional-field mirror populated from command-line flags.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub repo: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub branches: Option<String>,
    pub commit_limit: Option<usize>,
    pub max_file_bytes: Option<u64>,
    pub include_file_snapshots: Option<bool>,
    pub scan_secrets: Option<bool>,
    pub exclude_prefixes: Option<Vec<String>>,
    pub concurrency: Option<usize>,
    pub force_update: bool,
}

/// Parse a config file.
pub fn load_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    Ok(config)
}

/// Merge defaults, file config, and CLI overrides into resolved options.
///
/// Validation runs after every stage so a bad value is attributed to the
/// layer that introduced it.
pub fn resolve(file: Option<FileConfig>, cli: CliOverrides) -> ExportOptions {
    let mut options = ExportOptions::default();
    validate(&mut options, "defaults");

    if let Some(file) = file {
        apply_file(&mut options, file.export);
        validate(&mut options, "config file");
    }

    apply_cli(&mut options, cli);
    validate(&mut options, "command line");

    options
}

fn apply_file(options: &mut ExportOptions, section: ExportSection) {
    if let Some(repo) = section.repo {
        options.repo_path = repo;
    }
    if let Some(output) = section.output {
        options.output_root = output;
    }
    if let Some(branches) = section.branches {
        options.branches = branches;
    }
    if let Some(limit) = section.commit_limit {
        options.commit_limit = limit;
    }
    if let Some(bytes) = section.max_file_bytes {
        options.max_file_bytes = bytes;
    }
    if let Some(include) = section.include_file_snapshots {
        options.include_file_snapshots = include;
    }
    if let Some(prefixes) = section.exclude_prefixes {
        options.exclude_prefixes = prefixes;
    }
    if let Some(scan) = section.scan_secrets {
        options.scan_secrets = scan;
    }
    if let Some(concurrency) = section.concurrency {
        options.concurrency = concurrency;
    }
    options.custom_patterns.extend(section.secret_patterns);
}

fn apply_cli(options: &mut ExportOptions, cli: CliOverrides) {
    if let Some(repo) = cli.repo {
        options.repo_path = repo;
    }
    if let Some(output) = cli.output {
        options.output_root = output;
    }
    if let Some(branches) = cli.branches {
        options.branches = branches;
    }
    if let Some(limit) = cli.commit_limit {
        options.commit_limit = limit;
    }
    if let Some(bytes) = cli.max_file_bytes {
        options.max_file_bytes = bytes;
    }
    if let Some(include) = cli.include_file_snapshots {
        options.include_file_snapshots = include;
    }
    if let Some(scan) = cli.scan_secrets {
        options.scan_secrets = scan;
    }
    if let Some(prefixes) = cli.exclude_prefixes {
        options.exclude_prefixes = prefixes;
    }
    if let Some(concurrency) = cli.concurrency {
        options.concurrency = concurrency;
    }
    if cli.force_update {
        options.force_update = true;
    }
}

/// Clamp out-of-range values, attributing the warning to `stage`.
fn validate(options: &mut ExportOptions, stage: &str) {
    if options.concurrency == 0 {
        eprintln!("warning: {}: concurrency must be >= 1, using 1", stage);
        options.concurrency = 1;
    }
    if options.commit_limit == 0 {
        eprintln!(
            "warning: {}: commit_limit must be >= 1, using {}",
            stage, DEFAULT_COMMIT_LIMIT
        );
        options.commit_limit = DEFAULT_COMMIT_LIMIT;
    }
    if options.branches.trim().is_empty() {
        eprintln!("warning: {}: empty branch selection, using \"all\"", stage);
        options.branches = "all".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_without_input() {
        let options = resolve(None, CliOverrides::default());
        assert_eq!(options.branches, "all");
        assert_eq!(options.commit_limit, DEFAULT_COMMIT_LIMIT);
        assert_eq!(options.concurrency, DEFAULT_CONCURRENCY);
        assert!(options.include_file_snapshots);
        assert!(options.scan_secrets);
        assert!(!options.force_update);
    }

    #[test]
    fn file_overrides_defaults_and_cli_overrides_file() {
        let file = FileConfig {
            export: ExportSection {
                branches: Some("main".to_string()),
                commit_limit: Some(10),
                concurrency: Some(8),
                ..Default::default()
            },
        };
        let cli = CliOverrides {
            commit_limit: Some(3),
            ..Default::default()
        };
        let options = resolve(Some(file), cli);
        assert_eq!(options.branches, "main");
        assert_eq!(options.commit_limit, 3);
        assert_eq!(options.concurrency, 8);
    }

    #[test]
    fn zero_concurrency_clamps_to_one() {
        let cli = CliOverrides {
            concurrency: Some(0),
            ..Default::default()
        };
        let options = resolve(None, cli);
        assert_eq!(options.concurrency, 1);
    }

    #[test]
    fn empty_branch_spec_falls_back_to_all() {
        let cli = CliOverrides {
            branches: Some("   ".to_string()),
            ..Default::default()
        };
        let options = resolve(None, cli);
        assert_eq!(options.branches, "all");
    }

    #[test]
    fn file_config_parses_patterns() {
        let toml_text = r#"
[export]
branches = "main,dev"
max_file_bytes = 1024

[[export.secret_patterns]]
name = "internal"
pattern = "INT-[0-9]+"
"#;
        let file: FileConfig = toml::from_str(toml_text).unwrap();
        let options = resolve(Some(file), CliOverrides::default());
        assert_eq!(options.branches, "main,dev");
        assert_eq!(options.max_file_bytes, 1024);
        assert_eq!(options.custom_patterns.len(), 1);
        assert_eq!(options.custom_patterns[0].name, "internal");
    }
}
