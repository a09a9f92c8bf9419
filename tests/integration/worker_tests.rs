//! Watcher tests driving the real binary in worker mode.

#![cfg(unix)]

use super::support::RecordingDialog;
use mdtohtml::watcher::Watcher;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn worker(config_dir: &Path, markdown: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_mdtohtml"));
    command
        .arg("--config")
        .arg(config_dir.join("absent.toml"))
        .arg("--worker")
        .arg(format!("/Markdown:{}", markdown.display()))
        .env_remove("RUST_LOG");
    command
}

#[test]
fn test_worker_question_becomes_dialog() {
    let dir = tempdir().unwrap();
    let md = dir.path().join("a.md");
    let html = dir.path().join("a.html");
    fs::write(&md, "# Fresh\n").unwrap();
    fs::write(&html, "stale").unwrap();

    let mut dialog = RecordingDialog::answering(&[true]);
    let code = Watcher::new()
        .run(&mut worker(dir.path(), &md), &mut dialog)
        .unwrap();

    assert_eq!(code, 0);
    assert_eq!(
        dialog.questions,
        vec![format!(
            "The file \"{}\" already exists.\n\nDo you want to overwrite it?",
            html.display()
        )]
    );
    assert!(dialog.errors.is_empty());
    assert_eq!(fs::read_to_string(&html).unwrap(), "<h1>Fresh</h1>\n");
}

#[test]
fn test_worker_declined_is_silent_failure() {
    let dir = tempdir().unwrap();
    let md = dir.path().join("a.md");
    let html = dir.path().join("a.html");
    fs::write(&md, "# Fresh\n").unwrap();
    fs::write(&html, "stale").unwrap();

    let mut dialog = RecordingDialog::answering(&[false]);
    let code = Watcher::new()
        .run(&mut worker(dir.path(), &md), &mut dialog)
        .unwrap();

    assert_eq!(code, 1);
    assert_eq!(dialog.questions.len(), 1);
    assert!(dialog.errors.is_empty());
    assert_eq!(fs::read_to_string(&html).unwrap(), "stale");
}

#[test]
fn test_worker_error_is_relayed() {
    let dir = tempdir().unwrap();
    let md = dir.path().join("missing.md");

    let mut dialog = RecordingDialog::default();
    let code = Watcher::new()
        .run(&mut worker(dir.path(), &md), &mut dialog)
        .unwrap();

    assert_eq!(code, 1);
    assert!(dialog.questions.is_empty());
    assert_eq!(
        dialog.errors,
        vec![format!("\"{}\" cannot be found.", md.display())]
    );
}
