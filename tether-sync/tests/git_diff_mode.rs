//! Diff mode against a real repository. Skipped when `git` is not on PATH.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;
use tether_core::{types::ChangeBasis, Config};
use tether_sync::{pipeline::run, Action};

fn git_available() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn run_git(root: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .status()
        .expect("run git");
    assert!(status.success(), "git command failed: git -C {root:?} {args:?}");
}

fn init_site() -> (TempDir, Config) {
    let root = TempDir::new().expect("root");
    run_git(root.path(), &["init", "-q"]);
    run_git(root.path(), &["config", "user.email", "test@example.com"]);
    run_git(root.path(), &["config", "user.name", "test"]);
    run_git(root.path(), &["config", "commit.gpgsign", "false"]);
    let config = Config {
        mode: ChangeBasis::Diff,
        ..Config::default()
    };
    fs::create_dir_all(config.pages_root(root.path())).expect("mkdir pages");
    (root, config)
}

fn commit_all(root: &Path, message: &str) {
    run_git(root, &["add", "-A"]);
    run_git(root, &["commit", "-q", "-m", message]);
}

#[test]
fn renamed_file_gets_field_rewritten() {
    if !git_available() {
        return;
    }
    let (root, config) = init_site();
    let pages = config.pages_root(root.path());
    fs::write(pages.join("old-name.yaml"), "title: A\npermalink: old-name\n").unwrap();
    fs::write(pages.join("other.yaml"), "title: Other\npermalink: other\n").unwrap();
    commit_all(root.path(), "add pages");

    fs::rename(pages.join("old-name.yaml"), pages.join("new-name.yaml")).unwrap();
    commit_all(root.path(), "rename page");

    let report = run(root.path(), &config, false).expect("run");
    assert_eq!(report.files.len(), 1, "only the renamed page changed: {report:?}");
    assert!(matches!(report.files[0].action, Action::Updated { .. }));
    assert_eq!(
        fs::read_to_string(pages.join("new-name.yaml")).unwrap(),
        "title: A\npermalink: new-name\n"
    );
    assert!(!pages.join("old-name.yaml").exists());
}

#[test]
fn edited_field_renames_file() {
    if !git_available() {
        return;
    }
    let (root, config) = init_site();
    let pages = config.pages_root(root.path());
    fs::write(pages.join("launch.yaml"), "title: L\npermalink: launch\n").unwrap();
    commit_all(root.path(), "add page");

    fs::write(pages.join("launch.yaml"), "title: L\npermalink: big launch\n").unwrap();
    commit_all(root.path(), "edit permalink");

    let report = run(root.path(), &config, false).expect("run");
    assert!(matches!(report.files[0].action, Action::Renamed { .. }));
    assert!(pages.join("big-launch.yaml").exists());
    assert!(!pages.join("launch.yaml").exists());
}

#[test]
fn first_commit_treats_pages_as_new() {
    if !git_available() {
        return;
    }
    let (root, config) = init_site();
    let pages = config.pages_root(root.path());
    fs::write(pages.join("intro.yaml"), "title: Intro\n").unwrap();
    commit_all(root.path(), "initial");

    let report = run(root.path(), &config, false).expect("run");
    assert_eq!(report.summary().updated, 1);
    assert_eq!(
        fs::read_to_string(pages.join("intro.yaml")).unwrap(),
        "title: Intro\npermalink: intro\n"
    );
}
