//! Export run coordination.
//!
//! Top-level driver for one export: loads resumption state, fetches the
//! repository identity, resolves the branch set, writes the run-level
//! artifacts, hands the branches to the orchestrator, persists state, and
//! reduces the outcomes to a summary. Anything that fails before
//! orchestration begins is fatal; afterwards only the state save remains,
//! and that is advisory.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::ExportOptions;
use crate::markdown;
use crate::models::{ExportSummary, RepositoryIdentity};
use crate::orchestrator::Orchestrator;
use crate::progress::ExportProgressReporter;
use crate::provider::SourceProvider;
use crate::secrets::SecretScanner;
use crate::state::StateStore;
use crate::writer::ArtifactWriter;

/// Run one export over `provider`, writing artifacts through `writer`.
///
/// Branch-scoped failures are folded into the summary; only errors raised
/// before orchestration (identity fetch, index/tag writes) surface as `Err`.
pub async fn run_export(
    options: &ExportOptions,
    provider: &dyn SourceProvider,
    writer: &dyn ArtifactWriter,
    reporter: &dyn ExportProgressReporter,
) -> Result<ExportSummary> {
    let state = StateStore::load(&options.output_root).await;

    let identity = provider
        .identity()
        .await
        .context("failed to read repository identity")?;

    let branches = resolve_branches(&options.branches, &identity);

    writer
        .write("index.md", &markdown::render_index(&identity))
        .await?;
    writer
        .write("tags.md", &markdown::render_tags(&identity))
        .await?;

    let scanner = SecretScanner::new().with_custom_patterns(&options.custom_patterns);
    let orchestrator = Orchestrator::new(
        provider,
        writer,
        &scanner,
        &state,
        options,
        &identity.name,
    );
    let outcomes = orchestrator.run(&branches, reporter).await;

    let commits_exported: usize = outcomes
        .iter()
        .map(|outcome| outcome.exported_commits.len())
        .sum();
    if commits_exported > 0 {
        state.set_last_export(Utc::now());
    }
    // Saved exactly once, whatever happened to individual branches.
    state.save().await;

    let failed_branches: Vec<String> = outcomes
        .iter()
        .filter(|outcome| !outcome.success)
        .map(|outcome| outcome.branch.clone())
        .collect();

    Ok(ExportSummary {
        branches_attempted: outcomes.len(),
        branches_succeeded: outcomes.len() - failed_branches.len(),
        commits_exported,
        failed_branches,
    })
}

/// Expand the branch selection against the repository identity.
///
/// The literal token `all` selects every branch; anything else is a
/// comma-separated list, trimmed, empty entries dropped.
pub fn resolve_branches(selection: &str, identity: &RepositoryIdentity) -> Vec<String> {
    if selection.trim() == "all" {
        return identity.branches.clone();
    }
    selection.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> RepositoryIdentity {
        RepositoryIdentity {
            name: "demo".to_string(),
            root: "/tmp/demo".to_string(),
            branches: vec!["main".to_string(), "dev".to_string()],
            tags: vec![],
        }
    }

    #[test]
    fn all_token_expands_to_identity_branches() {
        assert_eq!(resolve_branches("all", &identity()), vec!["main", "dev"]);
    }

    #[test]
    fn explicit_list_is_split_and_trimmed() {
        assert_eq!(
            resolve_branches(" main , feature/x ,, ", &identity()),
            vec!["main", "feature/x"]
        );
    }
}
