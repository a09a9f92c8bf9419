//! Integration tests for command dispatch.

use super::support::RecordingDialog;
use mdtohtml::cli::{parse_command, Command};
use mdtohtml::config::Config;
use mdtohtml::convert::OutputFormat;
use mdtohtml::shell::{KeyStore, MemoryKeyStore, ShellVerb, ICON_VALUE};
use mdtohtml::{App, ExitCode};
use std::fs;
use tempfile::tempdir;

const APP_PATH: &str = r"C:\Program Files\MarkdownToHtml\mdtohtml.exe";

fn app_with(config: Config, dialog: RecordingDialog) -> App<RecordingDialog, MemoryKeyStore> {
    App::new(config, dialog, MemoryKeyStore::new(), APP_PATH)
}

#[test]
fn test_default_command_installs_with_icon() {
    let mut app = app_with(Config::default(), RecordingDialog::default());
    let command = parse_command(None).unwrap();

    assert_eq!(app.execute(&command), ExitCode::Success);

    let store = app.store();
    assert_eq!(
        store.get_string(&ShellVerb::command_key(), "").unwrap().as_deref(),
        Some(r#""C:\Program Files\MarkdownToHtml\mdtohtml.exe" /Markdown:"%1""#)
    );
    assert_eq!(
        store
            .get_string(&ShellVerb::verb_key(), ICON_VALUE)
            .unwrap()
            .as_deref(),
        Some(APP_PATH)
    );
    assert!(app.dialog().errors.is_empty());
}

#[test]
fn test_set_noicon_uses_configured_label() {
    let config = Config {
        verb_label: "Export as &HTML".to_string(),
        ..Config::default()
    };
    let mut app = app_with(config, RecordingDialog::default());

    let command = parse_command(Some("/Set:NoIcon")).unwrap();
    assert_eq!(app.execute(&command), ExitCode::Success);

    let store = app.store();
    assert_eq!(
        store.get_string(&ShellVerb::verb_key(), "").unwrap().as_deref(),
        Some("Export as &HTML")
    );
    assert_eq!(
        store.get_string(&ShellVerb::verb_key(), ICON_VALUE).unwrap(),
        None
    );
}

#[test]
fn test_unset_when_not_installed_succeeds() {
    let mut app = app_with(Config::default(), RecordingDialog::default());
    assert_eq!(app.execute(&Command::Unset), ExitCode::Success);
    assert!(app.store().is_empty());
}

#[test]
fn test_help_exits_with_failure() {
    let mut app = app_with(Config::default(), RecordingDialog::default());
    assert_eq!(app.execute(&Command::Help), ExitCode::Failure);

    let helps = &app.dialog().helps;
    assert_eq!(helps.len(), 1);
    assert!(helps[0].contains("mdtohtml /Markdown:<markdown file path>"));
    assert!(helps[0].contains("mdtohtml [/Set[:NoIcon]]"));
}

#[test]
fn test_convert_missing_file_reports_and_fails() {
    let dir = tempdir().unwrap();
    let md = dir.path().join("gone.md");
    let mut app = app_with(Config::default(), RecordingDialog::default());

    assert_eq!(
        app.execute(&Command::Convert(md.clone())),
        ExitCode::Failure
    );
    assert_eq!(
        app.dialog().errors,
        vec![format!("\"{}\" cannot be found.", md.display())]
    );
}

#[test]
fn test_convert_declined_fails_silently() {
    let dir = tempdir().unwrap();
    let md = dir.path().join("a.md");
    fs::write(&md, "# A\n").unwrap();
    fs::write(dir.path().join("a.html"), "keep me").unwrap();

    let mut app = app_with(Config::default(), RecordingDialog::answering(&[false]));

    assert_eq!(app.execute(&Command::Convert(md)), ExitCode::Failure);
    assert_eq!(app.dialog().questions.len(), 1);
    assert!(app.dialog().errors.is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("a.html")).unwrap(),
        "keep me"
    );
}

#[test]
fn test_convert_honors_output_config() {
    let dir = tempdir().unwrap();
    let md = dir.path().join("a.md");
    fs::write(&md, "# Release Notes\n\nDone.\n").unwrap();

    let config = Config {
        output: OutputFormat::Document,
        ..Config::default()
    };
    let mut app = app_with(config, RecordingDialog::default());

    assert_eq!(app.execute(&Command::Convert(md)), ExitCode::Success);
    let html = fs::read_to_string(dir.path().join("a.html")).unwrap();
    assert!(html.contains("<title>Release Notes</title>"));
    assert!(html.contains("<p>Done.</p>"));
}

#[test]
fn test_convert_leaves_registry_alone() {
    let dir = tempdir().unwrap();
    let md = dir.path().join("a.md");
    fs::write(&md, "x\n").unwrap();

    let mut app = app_with(Config::default(), RecordingDialog::default());
    assert_eq!(app.execute(&Command::Convert(md)), ExitCode::Success);
    assert!(app.store().is_empty());
}
