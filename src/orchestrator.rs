//! Branch export orchestration.
//!
//! Runs the per-branch and per-commit export work under two nested
//! concurrency bounds: at most `concurrency` branches in flight, and within
//! each branch at most `min(10, concurrency)` commits in flight. Batches at
//! both levels are issued sequentially and fanned out with
//! [`futures::future::join_all`], which keeps peak subprocess and file
//! handle usage bounded.
//!
//! Failures stay local: a commit error aborts only its enclosing branch,
//! and a branch error is recorded in that branch's outcome while the other
//! branches keep running. Commits that completed before a failure remain
//! marked processed.

use anyhow::{bail, Context, Result};
use futures::future::join_all;
use std::collections::HashMap;

use crate::config::ExportOptions;
use crate::markdown;
use crate::models::{BranchExportOutcome, BranchTask, CommitRecord, ExportProgress};
use crate::progress::ExportProgressReporter;
use crate::provider::SourceProvider;
use crate::secrets::SecretScanner;
use crate::state::StateStore;
use crate::writer::ArtifactWriter;

/// Commit-level fan-out cap within one branch.
const COMMIT_BATCH_CAP: usize = 10;

pub struct Orchestrator<'a> {
    provider: &'a dyn SourceProvider,
    writer: &'a dyn ArtifactWriter,
    scanner: &'a SecretScanner,
    state: &'a StateStore,
    options: &'a ExportOptions,
    repo_name: &'a str,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        provider: &'a dyn SourceProvider,
        writer: &'a dyn ArtifactWriter,
        scanner: &'a SecretScanner,
        state: &'a StateStore,
        options: &'a ExportOptions,
        repo_name: &'a str,
    ) -> Self {
        Self {
            provider,
            writer,
            scanner,
            state,
            options,
            repo_name,
        }
    }

    /// Export every branch in `branches`, returning one outcome per branch
    /// in the original order.
    ///
    /// Progress is reported around each batch; `completed_branches` counts
    /// attempts, not successes.
    pub async fn run(
        &self,
        branches: &[String],
        reporter: &dyn ExportProgressReporter,
    ) -> Vec<BranchExportOutcome> {
        let total = branches.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut completed = 0usize;
        let mut errors: Vec<String> = Vec::new();

        for batch in branches.chunks(self.options.concurrency.max(1)) {
            reporter.report(&ExportProgress {
                total_branches: total,
                completed_branches: completed,
                current: Some(batch.join(", ")),
                errors: errors.clone(),
            });

            let results = join_all(batch.iter().map(|branch| self.export_branch(branch))).await;

            completed += batch.len();
            for outcome in results {
                if let Some(error) = &outcome.error {
                    errors.push(format!("{}: {}", outcome.branch, error));
                }
                outcomes.push(outcome);
            }

            reporter.report(&ExportProgress {
                total_branches: total,
                completed_branches: completed,
                current: None,
                errors: errors.clone(),
            });
        }

        outcomes
    }

    async fn export_branch(&self, branch: &str) -> BranchExportOutcome {
        if self
            .state
            .should_skip_branch(branch, self.options.force_update)
        {
            // Incremental fast path: no provider calls at all.
            return BranchExportOutcome::success(branch, Vec::new());
        }

        let mut exported = Vec::new();
        match self.process_branch(branch, &mut exported).await {
            Ok(()) => BranchExportOutcome::success(branch, exported),
            Err(err) => BranchExportOutcome::failure(branch, exported, format!("{:#}", err)),
        }
    }

    async fn process_branch(&self, branch: &str, exported: &mut Vec<String>) -> Result<()> {
        let commits = self
            .provider
            .branch_commits(branch, self.options.commit_limit)
            .await?;
        let task = BranchTask {
            branch: branch.to_string(),
            commits,
        };

        let unprocessed = if self.options.force_update {
            task.commits.clone()
        } else {
            self.state.unprocessed_of(&task.commits)
        };

        if unprocessed.is_empty() {
            // A previous run may have processed every commit and then been
            // interrupted before recording the branch itself.
            self.state.mark_branch_exported(&task.branch);
            return Ok(());
        }

        // One metadata fetch per distinct candidate revision; the records
        // feed both the branch summary and the commit documents.
        let metas = join_all(task.commits.iter().map(|id| self.provider.commit_meta(id))).await;
        let mut records = Vec::with_capacity(task.commits.len());
        for (id, meta) in task.commits.iter().zip(metas) {
            records.push(meta.with_context(|| format!("commit {}", id))?);
        }

        let summary = markdown::render_branch_summary(self.repo_name, &task.branch, &records);
        self.writer
            .write(&markdown::branch_summary_path(&task.branch), &summary)
            .await?;

        let by_id: HashMap<&str, &CommitRecord> =
            records.iter().map(|record| (record.id.as_str(), record)).collect();

        let sub_batch = COMMIT_BATCH_CAP.min(self.options.concurrency).max(1);
        for chunk in unprocessed.chunks(sub_batch) {
            let by_id = &by_id;
            let branch = task.branch.as_str();
            let results = join_all(chunk.iter().map(|id| async move {
                match by_id.get(id.as_str()) {
                    Some(record) => self.export_commit(branch, record).await,
                    None => bail!("commit {} missing from candidate metadata", id),
                }
            }))
            .await;

            // Commits that finished are already marked processed; the first
            // failure aborts the branch before the next sub-batch starts.
            let mut first_err = None;
            for (id, result) in chunk.iter().zip(results) {
                match result {
                    Ok(()) => exported.push(id.clone()),
                    Err(err) => {
                        if first_err.is_none() {
                            first_err = Some(err.context(format!("commit {}", id)));
                        }
                    }
                }
            }
            if let Some(err) = first_err {
                return Err(err);
            }
        }

        self.state.mark_branch_exported(&task.branch);
        Ok(())
    }

    async fn export_commit(&self, branch: &str, record: &CommitRecord) -> Result<()> {
        let diff = self.provider.commit_diff(&record.id).await?;
        let tree = self.provider.tree_files(&record.id).await?;
        let retained: Vec<String> = tree
            .into_iter()
            .filter(|path| !self.is_excluded(path))
            .collect();

        // Every retained file runs concurrently; per-commit file counts are
        // small next to the branch and commit fan-out.
        let results =
            join_all(retained.iter().map(|path| self.export_file(&record.id, path))).await;
        for (path, result) in retained.iter().zip(results) {
            result.with_context(|| format!("file {}", path))?;
        }

        let document = markdown::render_commit(self.repo_name, branch, record, &diff, &retained);
        self.writer
            .write(&markdown::commit_path(&record.id), &document)
            .await?;

        // Marking last means a crash here retries the commit next run
        // instead of silently dropping it.
        self.state.mark_commit_processed(&record.id);
        Ok(())
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.options
            .exclude_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    async fn export_file(&self, commit_id: &str, path: &str) -> Result<()> {
        let artifact = markdown::file_path(commit_id, path);

        if !self.options.include_file_snapshots {
            let placeholder = markdown::render_snapshot_disabled(commit_id, path);
            return self.writer.write(&artifact, &placeholder).await;
        }

        let size = self.provider.blob_size(commit_id, path).await?;
        let content = match size {
            Some(size) if size <= self.options.max_file_bytes => {
                self.provider
                    .blob_content(commit_id, path, self.options.max_file_bytes)
                    .await?
            }
            _ => None,
        };

        let Some(content) = content else {
            let placeholder =
                markdown::render_snapshot_skipped(commit_id, path, self.options.max_file_bytes);
            return self.writer.write(&artifact, &placeholder).await;
        };

        let snapshot = markdown::render_file_snapshot(commit_id, path, &content);
        self.writer.write(&artifact, &snapshot).await?;

        if self.options.scan_secrets {
            let categories = self.scanner.scan(&content);
            if !categories.is_empty() {
                eprintln!(
                    "warning: possible secret in {} at {}: {}",
                    path,
                    commit_id,
                    categories.join(", ")
                );
                let alert = markdown::render_alert(self.repo_name, commit_id, path, &categories);
                self.writer
                    .write(&markdown::alert_path(commit_id, path), &alert)
                    .await?;
            }
        }

        Ok(())
    }
}
