//! Export progress reporting.
//!
//! The orchestrator calls a reporter synchronously around each branch
//! batch; there is no buffering because the consumers (a stderr printer)
//! are fast and local. Progress goes to **stderr** so stdout stays
//! parseable for scripts.

use std::io::Write;

use crate::models::ExportProgress;

/// Receives progress snapshots from the orchestrator.
pub trait ExportProgressReporter: Send + Sync {
    fn report(&self, progress: &ExportProgress);
}

/// Human-friendly lines: `export  3 / 10 branches  (starting: main, dev)`.
pub struct StderrProgress;

impl ExportProgressReporter for StderrProgress {
    fn report(&self, progress: &ExportProgress) {
        let mut line = format!(
            "export  {} / {} branches",
            progress.completed_branches, progress.total_branches
        );
        if let Some(current) = &progress.current {
            line.push_str(&format!("  (starting: {})", current));
        }
        if !progress.errors.is_empty() {
            line.push_str(&format!("  [{} failed]", progress.errors.len()));
        }
        line.push('\n');
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ExportProgressReporter for JsonProgress {
    fn report(&self, progress: &ExportProgress) {
        let obj = serde_json::json!({
            "event": "progress",
            "total_branches": progress.total_branches,
            "completed_branches": progress.completed_branches,
            "current": progress.current,
            "errors": progress.errors,
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ExportProgressReporter for NoProgress {
    fn report(&self, _progress: &ExportProgress) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode; the caller passes it to the export.
    pub fn reporter(&self) -> Box<dyn ExportProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

impl std::str::FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(ProgressMode::Off),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            other => Err(format!(
                "unknown progress mode '{}'; expected off, human, or json",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_from_str() {
        assert_eq!("off".parse::<ProgressMode>().unwrap(), ProgressMode::Off);
        assert_eq!("json".parse::<ProgressMode>().unwrap(), ProgressMode::Json);
        assert!("loud".parse::<ProgressMode>().is_err());
    }
}
