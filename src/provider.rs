//! Source control provider contract.
//!
//! The export pipeline is written against this trait; the git CLI
//! implementation lives in [`crate::provider_git`] and tests substitute
//! scripted fakes. Every method is a suspension point and may fail with a
//! descriptive error; the pipeline treats any failure as local to the
//! calling unit (commit, file, or branch), never as fatal to the run.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CommitRecord, RepositoryIdentity};

#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Repository name, root path, branch and tag lists. Fetched once per run.
    async fn identity(&self) -> Result<RepositoryIdentity>;

    /// Up to `limit` commit ids reachable from `branch`, newest first.
    async fn branch_commits(&self, branch: &str, limit: usize) -> Result<Vec<String>>;

    /// Metadata for one commit.
    async fn commit_meta(&self, id: &str) -> Result<CommitRecord>;

    /// Unified diff against the first parent, or the full content for a
    /// root commit.
    async fn commit_diff(&self, id: &str) -> Result<String>;

    /// Every file path present in the tree at this revision.
    async fn tree_files(&self, id: &str) -> Result<Vec<String>>;

    /// Size of the blob at `path`, or `None` when it cannot be resolved at
    /// this revision.
    async fn blob_size(&self, id: &str, path: &str) -> Result<Option<u64>>;

    /// Blob content as text, or `None` when the blob is missing, larger
    /// than `max_bytes`, or not valid text.
    async fn blob_content(&self, id: &str, path: &str, max_bytes: u64) -> Result<Option<String>>;
}
