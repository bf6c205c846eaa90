//! Artifact persistence.
//!
//! The pipeline hands fully rendered text to an [`ArtifactWriter`] keyed by
//! a relative path; the filesystem implementation roots everything under the
//! configured output directory and overwrites on rewrite. Logical names are
//! sanitized here before they become path components.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Sink for rendered artifacts. Overwriting an existing path is expected.
#[async_trait]
pub trait ArtifactWriter: Send + Sync {
    async fn write(&self, relative_path: &str, text: &str) -> Result<()>;
}

/// Writes artifacts under a root directory, creating parents as needed.
pub struct FsWriter {
    root: PathBuf,
}

impl FsWriter {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl ArtifactWriter for FsWriter {
    async fn write(&self, relative_path: &str, text: &str) -> Result<()> {
        let path = self.root.join(relative_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        tokio::fs::write(&path, text)
            .await
            .with_context(|| format!("Failed to write artifact {}", path.display()))?;
        Ok(())
    }
}

/// Reduce one logical name to a safe path component.
///
/// Keeps alphanumerics, `.`, `-` and `_`; any run of other characters
/// collapses to a single `-`. Names that would resolve to the current or
/// parent directory come back as `_`.
pub fn sanitize_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_' {
            out.push(ch);
            last_was_dash = false;
        } else if !last_was_dash {
            out.push('-');
            last_was_dash = true;
        }
    }
    let trimmed = out.trim_matches('-').to_string();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        "_".to_string()
    } else {
        trimmed
    }
}

/// Artifact file name for a repository file path.
///
/// The whole path becomes one sanitized component; a short content hash of
/// the original path keeps distinct originals distinct after sanitization.
pub fn file_artifact_name(path: &str) -> String {
    format!("{}-{}.md", sanitize_component(path), short_hash(path))
}

/// First 8 hex digits of the sha256 of `input`.
pub fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitize_keeps_safe_chars() {
        assert_eq!(sanitize_component("src/main.rs"), "src-main.rs");
        assert_eq!(sanitize_component("feature/add thing"), "feature-add-thing");
        assert_eq!(sanitize_component("a//b!!c"), "a-b-c");
    }

    #[test]
    fn sanitize_rejects_dot_names() {
        assert_eq!(sanitize_component(".."), "_");
        assert_eq!(sanitize_component("."), "_");
        assert_eq!(sanitize_component("///"), "_");
    }

    #[test]
    fn distinct_paths_get_distinct_names() {
        // Both sanitize to the same base; the hash suffix keeps them apart.
        let a = file_artifact_name("a/b.rs");
        let b = file_artifact_name("a!b.rs");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn fs_writer_creates_parents_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let writer = FsWriter::new(tmp.path().to_path_buf());

        writer.write("commits/abc.md", "first").await.unwrap();
        writer.write("commits/abc.md", "second").await.unwrap();

        let text = std::fs::read_to_string(tmp.path().join("commits/abc.md")).unwrap();
        assert_eq!(text, "second");
    }
}
