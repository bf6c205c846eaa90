//! Git CLI provider tests against a real throwaway repository.
//!
//! Each test builds a small repo with the git binary in a tempdir and
//! skips cleanly when git is not installed.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use gitscribe::export::run_export;
use gitscribe::config::ExportOptions;
use gitscribe::progress::NoProgress;
use gitscribe::provider::SourceProvider;
use gitscribe::provider_git::GitProvider;
use gitscribe::writer::FsWriter;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn git(repo: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Test User",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(repo)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Create a repo with two commits on `main` and return its path.
fn setup_repo(tmp: &TempDir) -> PathBuf {
    let repo = tmp.path().join("demo-repo");
    std::fs::create_dir_all(&repo).unwrap();
    git(&repo, &["init", "--quiet"]);
    git(&repo, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    std::fs::write(repo.join("README.md"), "# Demo\n").unwrap();
    std::fs::write(repo.join("app.py"), "print('one')\n").unwrap();
    git(&repo, &["add", "."]);
    git(&repo, &["commit", "-q", "-m", "initial import"]);

    std::fs::write(repo.join("app.py"), "print('one')\nprint('two')\n").unwrap();
    git(&repo, &["add", "."]);
    git(&repo, &["commit", "-q", "-m", "add second line\n\nlonger body here"]);

    git(&repo, &["tag", "v0.1"]);
    repo
}

#[tokio::test]
async fn identity_reports_branches_and_tags() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }
    let tmp = TempDir::new().unwrap();
    let repo = setup_repo(&tmp);
    let provider = GitProvider::new(repo);

    let identity = provider.identity().await.unwrap();
    assert_eq!(identity.name, "demo-repo");
    assert_eq!(identity.branches, vec!["main".to_string()]);
    assert_eq!(identity.tags, vec!["v0.1".to_string()]);
}

#[tokio::test]
async fn commit_listing_metadata_and_diff() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }
    let tmp = TempDir::new().unwrap();
    let repo = setup_repo(&tmp);
    let provider = GitProvider::new(repo);

    let commits = provider.branch_commits("main", 10).await.unwrap();
    assert_eq!(commits.len(), 2);

    let head = provider.commit_meta(&commits[0]).await.unwrap();
    assert_eq!(head.author, "Test User");
    assert_eq!(head.author_contact, "test@example.com");
    assert_eq!(head.subject(), "add second line");
    assert!(head.message.contains("longer body here"));
    assert_eq!(head.parents, vec![commits[1].clone()]);

    let root = provider.commit_meta(&commits[1]).await.unwrap();
    assert!(root.parents.is_empty());

    let diff = provider.commit_diff(&commits[0]).await.unwrap();
    assert!(diff.contains("+print('two')"));

    let capped = provider.branch_commits("main", 1).await.unwrap();
    assert_eq!(capped, vec![commits[0].clone()]);
}

#[tokio::test]
async fn tree_and_blob_access() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }
    let tmp = TempDir::new().unwrap();
    let repo = setup_repo(&tmp);
    let provider = GitProvider::new(repo);

    let commits = provider.branch_commits("main", 10).await.unwrap();
    let head = &commits[0];

    let mut files = provider.tree_files(head).await.unwrap();
    files.sort();
    assert_eq!(files, vec!["README.md".to_string(), "app.py".to_string()]);

    let size = provider.blob_size(head, "app.py").await.unwrap();
    assert_eq!(size, Some("print('one')\nprint('two')\n".len() as u64));
    assert_eq!(provider.blob_size(head, "missing.txt").await.unwrap(), None);

    let content = provider.blob_content(head, "app.py", 4096).await.unwrap();
    assert_eq!(content.as_deref(), Some("print('one')\nprint('two')\n"));
    assert_eq!(
        provider.blob_content(head, "app.py", 4).await.unwrap(),
        None
    );
    assert_eq!(
        provider.blob_content(head, "missing.txt", 4096).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn full_export_over_a_real_repository() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }
    let tmp = TempDir::new().unwrap();
    let repo = setup_repo(&tmp);
    let output_root = tmp.path().join("out");

    let options = ExportOptions {
        repo_path: repo.clone(),
        output_root: output_root.clone(),
        ..ExportOptions::default()
    };
    let provider = GitProvider::new(repo);
    let writer = FsWriter::new(output_root.clone());

    let summary = run_export(&options, &provider, &writer, &NoProgress)
        .await
        .unwrap();
    assert_eq!(summary.branches_attempted, 1);
    assert_eq!(summary.branches_succeeded, 1);
    assert_eq!(summary.commits_exported, 2);

    let index = std::fs::read_to_string(output_root.join("index.md")).unwrap();
    assert!(index.contains("demo-repo"));
    assert!(std::fs::read_to_string(output_root.join("branches/main.md"))
        .unwrap()
        .contains("add second line"));

    let commits = std::fs::read_dir(output_root.join("commits")).unwrap().count();
    assert_eq!(commits, 2);

    // Snapshots carry language-tagged fences.
    let files_root = output_root.join("files");
    let mut found_python = false;
    for commit_dir in std::fs::read_dir(&files_root).unwrap() {
        for entry in std::fs::read_dir(commit_dir.unwrap().path()).unwrap() {
            let text = std::fs::read_to_string(entry.unwrap().path()).unwrap();
            if text.contains("```python") {
                found_python = true;
            }
        }
    }
    assert!(found_python);
}
