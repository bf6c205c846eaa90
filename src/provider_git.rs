//! Git CLI provider.
//!
//! Shells out to `git` in the repository working directory, one subprocess
//! per call. Field values come back through low-ASCII separator format
//! strings so commit messages with arbitrary content parse unambiguously.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::models::{CommitRecord, RepositoryIdentity};
use crate::provider::SourceProvider;

/// Unit separator; git fills it in via `%x1f`.
const SEP: char = '\u{1f}';

pub struct GitProvider {
    repo_path: PathBuf,
}

impl GitProvider {
    pub fn new(repo_path: PathBuf) -> Self {
        Self { repo_path }
    }

    /// Run git with `args`, failing with git's stderr text on a non-zero exit.
    async fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .await
            .with_context(|| "Failed to execute 'git'. Is git installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "git {} failed: {}",
                args.first().copied().unwrap_or(""),
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Like [`GitProvider::git`] but a non-zero exit maps to `Ok(None)`.
    /// Used for blob lookups where "not there" is an answer, not an error.
    async fn git_optional(&self, args: &[&str]) -> Result<Option<Vec<u8>>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .await
            .with_context(|| "Failed to execute 'git'. Is git installed?")?;

        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(output.stdout))
    }
}

#[async_trait]
impl SourceProvider for GitProvider {
    async fn identity(&self) -> Result<RepositoryIdentity> {
        let root = tokio::fs::canonicalize(&self.repo_path)
            .await
            .unwrap_or_else(|_| self.repo_path.clone());
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "repository".to_string());

        let branches = self
            .git(&[
                "for-each-ref",
                "refs/heads",
                "--format=%(refname:short)",
            ])
            .await?
            .lines()
            .map(str::to_string)
            .collect();
        let tags = self
            .git(&["for-each-ref", "refs/tags", "--format=%(refname:short)"])
            .await?
            .lines()
            .map(str::to_string)
            .collect();

        Ok(RepositoryIdentity {
            name,
            root: root.display().to_string(),
            branches,
            tags,
        })
    }

    async fn branch_commits(&self, branch: &str, limit: usize) -> Result<Vec<String>> {
        let limit_arg = format!("--max-count={}", limit);
        let out = self.git(&["rev-list", &limit_arg, branch]).await?;
        Ok(out.lines().map(str::to_string).collect())
    }

    async fn commit_meta(&self, id: &str) -> Result<CommitRecord> {
        let out = self
            .git(&["show", "-s", "--format=%an%x1f%ae%x1f%ad%x1f%P%x1f%B", id])
            .await?;
        let mut fields = out.splitn(5, SEP);
        let (author, contact, timestamp, parents, message) = match (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) {
            (Some(a), Some(c), Some(t), Some(p), Some(m)) => (a, c, t, p, m),
            _ => bail!("unexpected git show output for commit {}", id),
        };

        Ok(CommitRecord {
            id: id.to_string(),
            author: author.to_string(),
            author_contact: contact.to_string(),
            timestamp: timestamp.to_string(),
            message: message.trim_end().to_string(),
            parents: parents.split_whitespace().map(str::to_string).collect(),
        })
    }

    async fn commit_diff(&self, id: &str) -> Result<String> {
        // --format= drops the header; a root commit prints its full content.
        self.git(&["show", "--format=", "--patch", id]).await
    }

    async fn tree_files(&self, id: &str) -> Result<Vec<String>> {
        let out = self.git(&["ls-tree", "-r", "--name-only", id]).await?;
        Ok(out.lines().map(str::to_string).collect())
    }

    async fn blob_size(&self, id: &str, path: &str) -> Result<Option<u64>> {
        let spec = format!("{}:{}", id, path);
        let out = self.git_optional(&["cat-file", "-s", &spec]).await?;
        Ok(out.and_then(|bytes| {
            String::from_utf8_lossy(&bytes).trim().parse::<u64>().ok()
        }))
    }

    async fn blob_content(&self, id: &str, path: &str, max_bytes: u64) -> Result<Option<String>> {
        let spec = format!("{}:{}", id, path);
        let bytes = match self.git_optional(&["cat-file", "-p", &spec]).await? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        if bytes.len() as u64 > max_bytes {
            return Ok(None);
        }
        Ok(String::from_utf8(bytes).ok())
    }
}

/// Whether `path` looks like the root of a git work tree.
pub fn looks_like_repo(path: &Path) -> bool {
    path.join(".git").exists()
}
