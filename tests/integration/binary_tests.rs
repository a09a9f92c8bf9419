//! End-to-end tests of the compiled binary.
//!
//! Off Windows the native dialog is the console one: questions on stdout,
//! errors and help on stderr. On Windows it is a real message box, which
//! would block the test run.

#![cfg(not(windows))]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::tempdir;

fn mdtohtml(config_dir: &Path, args: &[&str], input: &str) -> Output {
    mdtohtml_with_env(config_dir, args, input, &[])
}

fn mdtohtml_with_env(
    config_dir: &Path,
    args: &[&str],
    input: &str,
    vars: &[(&str, &str)],
) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_mdtohtml"))
        .arg("--config")
        .arg(config_dir.join("absent.toml"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("MDTOHTML_HOST")
        .env_remove("MDTOHTML_LOG_FILE")
        .envs(vars.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    if let Some(mut stdin) = child.stdin.take() {
        // The child may exit before reading anything.
        let _ = stdin.write_all(input.as_bytes());
    }
    child.wait_with_output().unwrap()
}

#[test]
fn test_help_exits_one() {
    let dir = tempdir().unwrap();
    let output = mdtohtml(dir.path(), &["/Help"], "");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Syntax:"));
    assert!(stderr.contains("/Unset"));
}

#[test]
fn test_malformed_argument_shows_help() {
    let dir = tempdir().unwrap();
    let output = mdtohtml(dir.path(), &["/Convert"], "");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Syntax:"));
}

#[test]
fn test_too_many_arguments_shows_help() {
    let dir = tempdir().unwrap();
    let output = mdtohtml(dir.path(), &["/Set", "/Unset"], "");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_unset_is_unsupported_off_windows() {
    let dir = tempdir().unwrap();
    let output = mdtohtml(dir.path(), &["/Unset"], "");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("The shortcut menu can only be configured on Windows."));
}

#[test]
fn test_convert_writes_html() {
    let dir = tempdir().unwrap();
    let md = dir.path().join("page.md");
    fs::write(&md, "# Page\n").unwrap();

    let arg = format!("/Markdown:{}", md.display());
    let output = mdtohtml(dir.path(), &[&arg], "");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        fs::read_to_string(dir.path().join("page.html")).unwrap(),
        "<h1>Page</h1>\n"
    );
}

#[test]
fn test_convert_overwrite_answered_on_stdin() {
    let dir = tempdir().unwrap();
    let md = dir.path().join("page.md");
    let html = dir.path().join("page.html");
    fs::write(&md, "new\n").unwrap();
    fs::write(&html, "old").unwrap();
    let arg = format!("/Markdown:{}", md.display());

    let declined = mdtohtml(dir.path(), &[&arg], "n\n");
    assert_eq!(declined.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&declined.stdout).ends_with("Do you want to overwrite it?\n"));
    assert_eq!(fs::read_to_string(&html).unwrap(), "old");

    let accepted = mdtohtml(dir.path(), &[&arg], "y\n");
    assert_eq!(accepted.status.code(), Some(0));
    assert_eq!(fs::read_to_string(&html).unwrap(), "<p>new</p>\n");
}

#[test]
fn test_unopenable_log_file_still_converts() {
    let dir = tempdir().unwrap();
    let md = dir.path().join("a.md");
    fs::write(&md, "# A\n").unwrap();
    let log_file = dir.path().join("missing").join("sub").join("x.log");
    let arg = format!("/Markdown:{}", md.display());

    let output = mdtohtml_with_env(
        dir.path(),
        &[&arg],
        "",
        &[("MDTOHTML_LOG_FILE", log_file.to_str().unwrap())],
    );

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        fs::read_to_string(dir.path().join("a.html")).unwrap(),
        "<h1>A</h1>\n"
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to open log file"));
}

#[test]
fn test_worker_host_relays_overwrite_question() {
    let dir = tempdir().unwrap();
    let md = dir.path().join("page.md");
    let html = dir.path().join("page.html");
    fs::write(&md, "# Page\n").unwrap();
    fs::write(&html, "old").unwrap();
    let arg = format!("/Markdown:{}", md.display());

    let output = mdtohtml_with_env(dir.path(), &["-v", &arg], "y\n", &[("MDTOHTML_HOST", "worker")]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        format!(
            "The file \"{}\" already exists.\n\nDo you want to overwrite it?\n",
            html.display()
        )
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("Starting worker"));
    assert_eq!(fs::read_to_string(&html).unwrap(), "<h1>Page</h1>\n");
}

#[test]
fn test_worker_host_declined_exits_one() {
    let dir = tempdir().unwrap();
    let md = dir.path().join("page.md");
    let html = dir.path().join("page.html");
    fs::write(&md, "# Page\n").unwrap();
    fs::write(&html, "old").unwrap();
    let arg = format!("/Markdown:{}", md.display());

    let output = mdtohtml_with_env(dir.path(), &[&arg], "n\n", &[("MDTOHTML_HOST", "worker")]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(fs::read_to_string(&html).unwrap(), "old");
}
