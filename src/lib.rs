//! # gitscribe
//!
//! Export a Git repository's history as a tree of Markdown artifacts for
//! AI and other text-consuming tools.
//!
//! gitscribe walks the branches of a repository, renders one Markdown
//! document per commit (header, message, diff, file links) plus per-file
//! snapshots with secret-leak alerts, and remembers what it has already
//! exported so re-runs only process new work.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌────────────┐
//! │ Coordinator │──▶│ Orchestrator │──▶│ Unit work  │
//! │  (export)   │   │  (branches)  │   │ commit/file│
//! └──────┬──────┘   └──────┬───────┘   └─────┬──────┘
//!        │                 │                 │
//!        ▼                 ▼                 ▼
//!  ResumptionState   ExportProgress    SourceProvider
//!   (state.json)      (stderr/json)    SecretScanner
//!                                      ArtifactWriter
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! gitscribe export --repo . --output ./export
//! gitscribe export --branches main,dev --limit 20
//! gitscribe state --output ./export
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Defaults, TOML config file, CLI overrides, merge |
//! | [`models`] | Core data types |
//! | [`provider`] | Source control provider contract |
//! | [`provider_git`] | Git CLI provider |
//! | [`state`] | Persisted resumption state |
//! | [`secrets`] | Secret pattern scanning |
//! | [`markdown`] | Artifact rendering |
//! | [`writer`] | Artifact persistence and path sanitization |
//! | [`progress`] | Progress reporting |
//! | [`orchestrator`] | Bounded-concurrency branch/commit export |
//! | [`export`] | Top-level run coordination |

pub mod config;
pub mod export;
pub mod markdown;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod provider;
pub mod provider_git;
pub mod secrets;
pub mod state;
pub mod writer;
