//! Markdown renderers for every artifact kind.
//!
//! All renderers are deterministic string builders over already-fetched
//! data; no I/O happens here. Artifact layout under the output root:
//!
//! | Artifact | Path |
//! |----------|------|
//! | Repository index | `index.md` |
//! | Tag list | `tags.md` |
//! | Branch summary | `branches/<branch>.md` |
//! | Commit document | `commits/<id>.md` |
//! | File snapshot | `files/<short-id>/<file>.md` |
//! | Secret alert | `alerts/<short-id>-<file>.md` |

use crate::models::{CommitRecord, RepositoryIdentity};
use crate::writer::{file_artifact_name, sanitize_component};

/// Relative path of the branch summary artifact.
pub fn branch_summary_path(branch: &str) -> String {
    format!("branches/{}.md", sanitize_component(branch))
}

/// Relative path of the commit document artifact.
pub fn commit_path(id: &str) -> String {
    format!("commits/{}.md", sanitize_component(id))
}

/// Relative path of a file snapshot artifact.
pub fn file_path(commit_id: &str, path: &str) -> String {
    format!("files/{}/{}", short_id(commit_id), file_artifact_name(path))
}

/// Relative path of a secret alert artifact.
pub fn alert_path(commit_id: &str, path: &str) -> String {
    format!("alerts/{}-{}", short_id(commit_id), file_artifact_name(path))
}

fn short_id(commit_id: &str) -> String {
    let sanitized = sanitize_component(commit_id);
    sanitized.chars().take(12).collect()
}

/// Repository index: name, location, branch and tag overview.
pub fn render_index(identity: &RepositoryIdentity) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Repository: {}\n\n", identity.name));
    out.push_str(&format!("- Root: `{}`\n", identity.root));
    out.push_str(&format!("- Branches: {}\n", identity.branches.len()));
    out.push_str(&format!("- Tags: {}\n\n", identity.tags.len()));
    out.push_str("## Branches\n\n");
    if identity.branches.is_empty() {
        out.push_str("(none)\n");
    } else {
        for branch in &identity.branches {
            out.push_str(&format!(
                "- [{}]({})\n",
                branch,
                branch_summary_path(branch)
            ));
        }
    }
    out
}

/// Tag list, one bullet per tag.
pub fn render_tags(identity: &RepositoryIdentity) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Tags: {}\n\n", identity.name));
    if identity.tags.is_empty() {
        out.push_str("(none)\n");
    } else {
        for tag in &identity.tags {
            out.push_str(&format!("- `{}`\n", tag));
        }
    }
    out
}

/// Branch summary listing every candidate commit, newest first.
///
/// All candidates appear, not only the ones processed this run, so a reader
/// always sees the full recent history window.
pub fn render_branch_summary(
    repo_name: &str,
    branch: &str,
    candidates: &[CommitRecord],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Branch `{}` of {}\n\n", branch, repo_name));
    out.push_str(&format!("Recent commits: {}\n\n", candidates.len()));
    for record in candidates {
        out.push_str(&format!(
            "- [`{}`](../{}) {} ({})\n",
            record.id,
            commit_path(&record.id),
            record.subject(),
            record.author,
        ));
    }
    out
}

/// Full commit document: header block, message, diff, file links.
pub fn render_commit(
    repo_name: &str,
    branch: &str,
    record: &CommitRecord,
    diff: &str,
    retained_files: &[String],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Commit {}\n\n", record.id));
    out.push_str(&format!("- Repository: {}\n", repo_name));
    out.push_str(&format!("- Branch: {}\n", branch));
    out.push_str(&format!(
        "- Author: {} <{}>\n",
        record.author, record.author_contact
    ));
    out.push_str(&format!("- Date: {}\n", record.timestamp));
    if record.parents.is_empty() {
        out.push_str("- Parents: (root commit)\n");
    } else {
        out.push_str(&format!("- Parents: {}\n", record.parents.join(", ")));
    }
    out.push_str(&format!("- Files: {}\n", retained_files.len()));
    out.push_str(&format!("- Subject: {}\n\n", record.subject()));

    out.push_str("## Message\n\n");
    out.push_str(record.message.trim_end());
    out.push_str("\n\n## Diff\n\n```diff\n");
    out.push_str(diff.trim_end());
    out.push_str("\n```\n");

    out.push_str("\n## Files\n\n");
    if retained_files.is_empty() {
        out.push_str("(none)\n");
    } else {
        for path in retained_files {
            out.push_str(&format!(
                "- [`{}`](../{})\n",
                path,
                file_path(&record.id, path)
            ));
        }
    }
    out
}

/// File snapshot: the blob content fenced with a best-effort language tag.
pub fn render_file_snapshot(commit_id: &str, path: &str, content: &str) -> String {
    let fence_tag = language_for_path(path).unwrap_or("");
    let mut out = String::new();
    out.push_str(&format!("# {} @ {}\n\n", path, commit_id));
    out.push_str(&format!("```{}\n", fence_tag));
    out.push_str(content.trim_end_matches('\n'));
    out.push_str("\n```\n");
    out
}

/// Placeholder written when file snapshot export is disabled for the run.
pub fn render_snapshot_disabled(commit_id: &str, path: &str) -> String {
    format!(
        "# {} @ {}\n\nSnapshot skipped: file export is disabled for this run.\n",
        path, commit_id
    )
}

/// Placeholder written when the blob is over the size limit or unreadable.
pub fn render_snapshot_skipped(commit_id: &str, path: &str, max_file_bytes: u64) -> String {
    format!(
        "# {} @ {}\n\nSnapshot skipped: file is larger than {} bytes or not readable as text at this revision.\n",
        path, commit_id, max_file_bytes
    )
}

/// Secret alert naming the file, commit, and matched categories.
///
/// Deliberately carries category names only, never the matched text.
pub fn render_alert(repo_name: &str, commit_id: &str, path: &str, categories: &[String]) -> String {
    let mut out = String::new();
    out.push_str("# Potential secret leak\n\n");
    out.push_str(&format!("- Repository: {}\n", repo_name));
    out.push_str(&format!("- Commit: {}\n", commit_id));
    out.push_str(&format!("- File: `{}`\n", path));
    out.push_str("- Matched categories:\n");
    for category in categories {
        out.push_str(&format!("  - {}\n", category));
    }
    out
}

/// Best-effort syntax tag from the file extension. Unknown extensions get
/// an untagged fence.
pub fn language_for_path(path: &str) -> Option<&'static str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    if name.eq_ignore_ascii_case("dockerfile") {
        return Some("dockerfile");
    }
    if name.eq_ignore_ascii_case("makefile") {
        return Some("makefile");
    }
    let ext = name.rsplit_once('.').map(|(_, ext)| ext)?;
    match ext.to_ascii_lowercase().as_str() {
        "rs" => Some("rust"),
        "py" => Some("python"),
        "js" | "mjs" | "cjs" => Some("javascript"),
        "jsx" => Some("jsx"),
        "ts" => Some("typescript"),
        "tsx" => Some("tsx"),
        "go" => Some("go"),
        "rb" => Some("ruby"),
        "java" => Some("java"),
        "kt" | "kts" => Some("kotlin"),
        "c" | "h" => Some("c"),
        "cpp" | "cc" | "cxx" | "hpp" | "hh" => Some("cpp"),
        "cs" => Some("csharp"),
        "swift" => Some("swift"),
        "php" => Some("php"),
        "pl" | "pm" => Some("perl"),
        "ex" | "exs" => Some("elixir"),
        "erl" => Some("erlang"),
        "hs" => Some("haskell"),
        "scala" => Some("scala"),
        "lua" => Some("lua"),
        "sh" | "bash" | "zsh" => Some("bash"),
        "ps1" => Some("powershell"),
        "sql" => Some("sql"),
        "md" | "markdown" => Some("markdown"),
        "json" => Some("json"),
        "yaml" | "yml" => Some("yaml"),
        "toml" => Some("toml"),
        "xml" => Some("xml"),
        "html" | "htm" => Some("html"),
        "css" => Some("css"),
        "scss" => Some("scss"),
        "proto" => Some("protobuf"),
        "tf" => Some("hcl"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CommitRecord {
        CommitRecord {
            id: "deadbeef1234".to_string(),
            author: "Ada".to_string(),
            author_contact: "ada@example.com".to_string(),
            timestamp: "Mon Jan 5 10:00:00 2026 +0000".to_string(),
            message: "add parser\n\nhandles nested input".to_string(),
            parents: vec!["cafebabe".to_string()],
        }
    }

    #[test]
    fn commit_document_has_header_and_sections() {
        let doc = render_commit(
            "demo",
            "main",
            &record(),
            "--- a/x\n+++ b/x\n",
            &["src/lib.rs".to_string()],
        );
        assert!(doc.contains("# Commit deadbeef1234"));
        assert!(doc.contains("- Author: Ada <ada@example.com>"));
        assert!(doc.contains("- Parents: cafebabe"));
        assert!(doc.contains("- Files: 1"));
        assert!(doc.contains("```diff"));
        assert!(doc.contains("src/lib.rs"));
    }

    #[test]
    fn root_commit_has_no_parent_line_entries() {
        let mut root = record();
        root.parents.clear();
        let doc = render_commit("demo", "main", &root, "", &[]);
        assert!(doc.contains("- Parents: (root commit)"));
        assert!(doc.contains("(none)"));
    }

    #[test]
    fn snapshot_uses_language_tag() {
        let doc = render_file_snapshot("abc", "src/main.rs", "fn main() {}\n");
        assert!(doc.contains("```rust\n"));
        let doc = render_file_snapshot("abc", "LICENSE", "text");
        assert!(doc.contains("```\n"));
    }

    #[test]
    fn language_guessing() {
        assert_eq!(language_for_path("a/b/c.py"), Some("python"));
        assert_eq!(language_for_path("Dockerfile"), Some("dockerfile"));
        assert_eq!(language_for_path("weird.zzz"), None);
        assert_eq!(language_for_path("noext"), None);
    }

    #[test]
    fn skipped_placeholder_cites_limit() {
        let doc = render_snapshot_skipped("abc", "big.bin", 1024);
        assert!(doc.contains("1024 bytes"));
    }

    #[test]
    fn alert_names_categories_only() {
        let doc = render_alert(
            "demo",
            "abc",
            "config.env",
            &["aws-access-token".to_string()],
        );
        assert!(doc.contains("aws-access-token"));
        assert!(doc.contains("config.env"));
    }

    #[test]
    fn branch_summary_lists_all_candidates() {
        let doc = render_branch_summary("demo", "main", &[record()]);
        assert!(doc.contains("add parser"));
        assert!(doc.contains("Ada"));
        assert!(doc.contains("deadbeef1234"));
    }
}
