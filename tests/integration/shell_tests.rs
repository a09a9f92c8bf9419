//! Integration tests for the shell verb against the in-memory key store.

use mdtohtml::shell::{KeyStore, MemoryKeyStore, ShellVerb, DEFAULT_LABEL, ICON_VALUE, SHELL_KEY};
use std::path::Path;

#[test]
fn test_reinstall_moves_command_to_new_location() {
    let mut store = MemoryKeyStore::new();
    let verb = ShellVerb::default();

    verb.install(&mut store, Path::new(r"C:\Old\mdtohtml.exe"), true)
        .unwrap();
    verb.install(&mut store, Path::new(r"D:\New\mdtohtml.exe"), true)
        .unwrap();

    assert_eq!(
        store.get_string(&ShellVerb::command_key(), "").unwrap().as_deref(),
        Some(r#""D:\New\mdtohtml.exe" /Markdown:"%1""#)
    );
    assert_eq!(
        store
            .get_string(&ShellVerb::verb_key(), ICON_VALUE)
            .unwrap()
            .as_deref(),
        Some(r"D:\New\mdtohtml.exe")
    );
}

#[test]
fn test_uninstall_removes_extra_subkeys() {
    let mut store = MemoryKeyStore::new();
    let verb = ShellVerb::default();
    verb.install(&mut store, Path::new(r"C:\mdtohtml.exe"), false)
        .unwrap();
    // Something else added below the verb key.
    store
        .set_string(&format!(r"{}\DropTarget", ShellVerb::verb_key()), "CLSID", "{0}")
        .unwrap();

    verb.uninstall(&mut store).unwrap();

    assert!(!store.contains_key(&ShellVerb::verb_key()));
    assert!(!store.contains_key(&format!(r"{}\DropTarget", ShellVerb::verb_key())));
    // The shared shell key stays for other verbs.
    assert!(store.contains_key(SHELL_KEY));
}

#[test]
fn test_install_through_mutable_reference() {
    let mut store = MemoryKeyStore::new();
    {
        let mut borrowed: &mut MemoryKeyStore = &mut store;
        ShellVerb::default()
            .install(&mut borrowed, Path::new(r"C:\mdtohtml.exe"), true)
            .unwrap();
    }
    assert_eq!(
        store.get_string(&ShellVerb::verb_key(), "").unwrap().as_deref(),
        Some(DEFAULT_LABEL)
    );
}

#[test]
fn test_install_through_boxed_store() {
    let mut store: Box<dyn KeyStore> = Box::new(MemoryKeyStore::new());
    let verb = ShellVerb::new("Convert to HTML");
    verb.install(&mut store, Path::new(r"C:\mdtohtml.exe"), true)
        .unwrap();
    assert!(ShellVerb::is_installed(&store).unwrap());
    assert_eq!(
        store.get_string(&ShellVerb::verb_key(), "").unwrap().as_deref(),
        Some(verb.label())
    );
}

#[cfg(not(windows))]
#[test]
fn test_native_store_is_unavailable_off_windows() {
    let mut store = mdtohtml::shell::native_store();
    let result = ShellVerb::default().install(&mut store, Path::new("/opt/mdtohtml"), true);
    assert!(matches!(result, Err(mdtohtml::Error::Unsupported)));
}
