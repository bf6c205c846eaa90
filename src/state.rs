//! Resumption state persistence.
//!
//! A single JSON record under the output root remembers which commits and
//! branches previous runs already exported, so re-runs only do new work.
//! The record is loaded once at run start, mutated in memory while the
//! pipeline runs, and written back exactly once when the run finishes.
//! Load and save never fail the export: a missing or unreadable record
//! degrades to a fresh one, and a failed save only loses this run's
//! incremental progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Location of the state record, relative to the output root.
pub const STATE_FILE: &str = ".gitscribe/state.json";

/// On-disk shape of the resumption record.
///
/// The two collections are persisted as sorted, deduplicated sequences and
/// rebuilt as sets on load, so the serialized form stays deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumptionState {
    pub last_export: DateTime<Utc>,
    #[serde(default)]
    pub processed_commits: Vec<String>,
    #[serde(default)]
    pub exported_branches: Vec<String>,
}

struct Inner {
    last_export: DateTime<Utc>,
    processed_commits: BTreeSet<String>,
    exported_branches: BTreeSet<String>,
}

/// In-memory store over the persisted record.
///
/// Mutation happens from concurrently running branch and commit tasks, so
/// the sets sit behind a mutex; each operation is a single short lock with
/// no await inside.
pub struct StateStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl StateStore {
    /// Read the persisted record from under `output_root`.
    ///
    /// On a missing file, parse failure, or schema mismatch this returns a
    /// fresh initial state (timestamp now, both sets empty) and logs a
    /// warning. It never raises.
    pub async fn load(output_root: &Path) -> Self {
        let path = output_root.join(STATE_FILE);
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(text) => match serde_json::from_str::<ResumptionState>(&text) {
                Ok(state) => Some(state),
                Err(err) => {
                    eprintln!(
                        "warning: ignoring unreadable state file {}: {}",
                        path.display(),
                        err
                    );
                    None
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    eprintln!("note: no previous export state, starting fresh");
                } else {
                    eprintln!(
                        "warning: could not read state file {}: {}",
                        path.display(),
                        err
                    );
                }
                None
            }
        };

        let state = state.unwrap_or_else(|| ResumptionState {
            last_export: Utc::now(),
            processed_commits: Vec::new(),
            exported_branches: Vec::new(),
        });

        Self {
            path,
            inner: Mutex::new(Inner {
                last_export: state.last_export,
                processed_commits: state.processed_commits.into_iter().collect(),
                exported_branches: state.exported_branches.into_iter().collect(),
            }),
        }
    }

    /// Serialize and overwrite the persisted record.
    ///
    /// An I/O failure is logged and swallowed; losing one run's incremental
    /// progress never fails the export.
    pub async fn save(&self) {
        let snapshot = self.snapshot();
        let json = match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => json,
            Err(err) => {
                eprintln!("warning: could not serialize export state: {}", err);
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(err) = tokio::fs::create_dir_all(parent).await {
                eprintln!(
                    "warning: could not create state directory {}: {}",
                    parent.display(),
                    err
                );
                return;
            }
        }
        if let Err(err) = tokio::fs::write(&self.path, json).await {
            eprintln!(
                "warning: could not write state file {}: {}",
                self.path.display(),
                err
            );
        }
    }

    /// Current in-memory state as its serializable form.
    pub fn snapshot(&self) -> ResumptionState {
        let inner = self.inner.lock().expect("state lock poisoned");
        ResumptionState {
            last_export: inner.last_export,
            processed_commits: inner.processed_commits.iter().cloned().collect(),
            exported_branches: inner.exported_branches.iter().cloned().collect(),
        }
    }

    pub fn is_branch_exported(&self, name: &str) -> bool {
        self.inner
            .lock()
            .expect("state lock poisoned")
            .exported_branches
            .contains(name)
    }

    pub fn is_commit_processed(&self, id: &str) -> bool {
        self.inner
            .lock()
            .expect("state lock poisoned")
            .processed_commits
            .contains(id)
    }

    /// In-memory only; durability happens solely at [`StateStore::save`].
    pub fn mark_branch_exported(&self, name: &str) {
        self.inner
            .lock()
            .expect("state lock poisoned")
            .exported_branches
            .insert(name.to_string());
    }

    /// In-memory only; durability happens solely at [`StateStore::save`].
    pub fn mark_commit_processed(&self, id: &str) {
        self.inner
            .lock()
            .expect("state lock poisoned")
            .processed_commits
            .insert(id.to_string());
    }

    /// Filter out ids already marked processed, preserving relative order.
    pub fn unprocessed_of(&self, ids: &[String]) -> Vec<String> {
        let inner = self.inner.lock().expect("state lock poisoned");
        ids.iter()
            .filter(|id| !inner.processed_commits.contains(*id))
            .cloned()
            .collect()
    }

    /// Whether a branch can be skipped outright this run.
    pub fn should_skip_branch(&self, name: &str, force_update: bool) -> bool {
        if force_update {
            return false;
        }
        self.is_branch_exported(name)
    }

    /// Stamp the record with a new last-export time. Called by the
    /// coordinator only when the run actually exported something, so an
    /// all-skipped run re-saves a byte-identical record.
    pub fn set_last_export(&self, at: DateTime<Utc>) {
        self.inner.lock().expect("state lock poisoned").last_export = at;
    }
}
