//! Core data models used throughout gitscribe.
//!
//! These types describe the repository being exported, the commits flowing
//! through the pipeline, and the per-branch results and progress events the
//! orchestrator produces.

/// Repository metadata, fetched once per run from the source provider.
#[derive(Debug, Clone)]
pub struct RepositoryIdentity {
    pub name: String,
    pub root: String,
    pub branches: Vec<String>,
    pub tags: Vec<String>,
}

/// A single commit as reported by the source provider.
///
/// Fetched at most once per distinct revision per run. The timestamp is kept
/// as the opaque string the provider printed; gitscribe never parses it.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub id: String,
    pub author: String,
    pub author_contact: String,
    pub timestamp: String,
    pub message: String,
    pub parents: Vec<String>,
}

impl CommitRecord {
    /// First line of the commit message, for summaries and headers.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// A branch name plus the ordered (newest first) candidate commit ids for
/// this run. Derived fresh each run, never persisted.
#[derive(Debug, Clone)]
pub struct BranchTask {
    pub branch: String,
    pub commits: Vec<String>,
}

/// Result of attempting to export one branch.
///
/// `exported_commits` lists the commits actually processed this run, even
/// when the branch later failed partway through.
#[derive(Debug, Clone)]
pub struct BranchExportOutcome {
    pub branch: String,
    pub exported_commits: Vec<String>,
    pub success: bool,
    pub error: Option<String>,
}

impl BranchExportOutcome {
    /// The branch was skipped or completed without error.
    pub fn success(branch: &str, exported_commits: Vec<String>) -> Self {
        Self {
            branch: branch.to_string(),
            exported_commits,
            success: true,
            error: None,
        }
    }

    /// The branch failed; commits exported before the failure are retained.
    pub fn failure(branch: &str, exported_commits: Vec<String>, error: String) -> Self {
        Self {
            branch: branch.to_string(),
            exported_commits,
            success: false,
            error: Some(error),
        }
    }
}

/// A progress snapshot emitted around each branch batch.
///
/// `completed_branches` counts branches attempted (success or failure) and
/// never decreases. `current` names the branches a batch is starting, when
/// known.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    pub total_branches: usize,
    pub completed_branches: usize,
    pub current: Option<String>,
    pub errors: Vec<String>,
}

/// Final counts for one export run.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub branches_attempted: usize,
    pub branches_succeeded: usize,
    pub commits_exported: usize,
    pub failed_branches: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_is_first_message_line() {
        let record = CommitRecord {
            id: "abc".to_string(),
            author: "A".to_string(),
            author_contact: "a@example.com".to_string(),
            timestamp: "now".to_string(),
            message: "fix parser\n\nlonger body".to_string(),
            parents: vec![],
        };
        assert_eq!(record.subject(), "fix parser");
    }

    #[test]
    fn subject_of_empty_message() {
        let record = CommitRecord {
            id: "abc".to_string(),
            author: "A".to_string(),
            author_contact: String::new(),
            timestamp: String::new(),
            message: String::new(),
            parents: vec![],
        };
        assert_eq!(record.subject(), "");
    }

    #[test]
    fn failure_outcome_keeps_partial_commits() {
        let outcome =
            BranchExportOutcome::failure("main", vec!["c1".to_string()], "boom".to_string());
        assert!(!outcome.success);
        assert_eq!(outcome.exported_commits, vec!["c1".to_string()]);
        assert_eq!(outcome.error.as_deref(), Some("boom"));
    }
}
