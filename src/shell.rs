//! The per-user "Convert to HTML" shell verb for `.md` files.
//!
//! Registry layout under `HKEY_CURRENT_USER`:
//!
//! ```text
//! SOFTWARE\Classes\SystemFileAssociations\.md\shell\cthtml
//!     (Default) = "Convert to &HTML"
//!     Icon      = "C:\Tools\mdtohtml.exe"        (omitted with /Set:NoIcon)
//!     command
//!         (Default) = "\"C:\Tools\mdtohtml.exe\" /Markdown:\"%1\""
//! ```
//!
//! All registry access goes through [`KeyStore`] so the verb logic can be
//! exercised against [`MemoryKeyStore`] on any platform.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Shell verbs registered for every `.md` file regardless of its ProgID.
pub const SHELL_KEY: &str = r"SOFTWARE\Classes\SystemFileAssociations\.md\shell";

/// Name of the verb key.
pub const VERB: &str = "cthtml";

/// Menu text; `&` marks the access key.
pub const DEFAULT_LABEL: &str = "Convert to &HTML";

/// Value holding the icon resource reference.
pub const ICON_VALUE: &str = "Icon";

/// Hierarchical string store with registry semantics.
///
/// Key paths are backslash separated and case-insensitive. The empty value
/// name addresses the key's default value.
pub trait KeyStore {
    /// Set a string value, creating the key and its parents.
    fn set_string(&mut self, key: &str, name: &str, value: &str) -> Result<()>;

    /// Read a string value. Missing keys and values read as `None`.
    fn get_string(&self, key: &str, name: &str) -> Result<Option<String>>;

    /// Delete a value. Missing keys and values are not an error.
    fn delete_value(&mut self, key: &str, name: &str) -> Result<()>;

    /// Delete a key with all its subkeys. A missing key is not an error.
    fn delete_tree(&mut self, key: &str) -> Result<()>;
}

impl<T: KeyStore + ?Sized> KeyStore for Box<T> {
    fn set_string(&mut self, key: &str, name: &str, value: &str) -> Result<()> {
        (**self).set_string(key, name, value)
    }

    fn get_string(&self, key: &str, name: &str) -> Result<Option<String>> {
        (**self).get_string(key, name)
    }

    fn delete_value(&mut self, key: &str, name: &str) -> Result<()> {
        (**self).delete_value(key, name)
    }

    fn delete_tree(&mut self, key: &str) -> Result<()> {
        (**self).delete_tree(key)
    }
}

impl<T: KeyStore + ?Sized> KeyStore for &mut T {
    fn set_string(&mut self, key: &str, name: &str, value: &str) -> Result<()> {
        (**self).set_string(key, name, value)
    }

    fn get_string(&self, key: &str, name: &str) -> Result<Option<String>> {
        (**self).get_string(key, name)
    }

    fn delete_value(&mut self, key: &str, name: &str) -> Result<()> {
        (**self).delete_value(key, name)
    }

    fn delete_tree(&mut self, key: &str) -> Result<()> {
        (**self).delete_tree(key)
    }
}

/// The shortcut-menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellVerb {
    label: String,
}

impl Default for ShellVerb {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL)
    }
}

impl ShellVerb {
    /// Verb with a custom menu label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Menu label written to the verb key.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Full path of the verb key.
    #[must_use]
    pub fn verb_key() -> String {
        format!(r"{SHELL_KEY}\{VERB}")
    }

    /// Full path of the verb's command key.
    #[must_use]
    pub fn command_key() -> String {
        format!(r"{SHELL_KEY}\{VERB}\command")
    }

    /// Command line Explorer runs for the selected file.
    #[must_use]
    pub fn command_line(app: &Path) -> String {
        format!("\"{}\" /Markdown:\"%1\"", app.display())
    }

    /// Write the verb, pointing its command at `app`.
    ///
    /// # Errors
    ///
    /// Propagates the first failing registry operation.
    pub fn install<S: KeyStore + ?Sized>(&self, store: &mut S, app: &Path, icon: bool) -> Result<()> {
        let verb_key = Self::verb_key();
        store.set_string(&Self::command_key(), "", &Self::command_line(app))?;
        store.set_string(&verb_key, "", &self.label)?;
        if icon {
            store.set_string(&verb_key, ICON_VALUE, &app.display().to_string())?;
        } else {
            store.delete_value(&verb_key, ICON_VALUE)?;
        }
        log::info!(
            "Installed shell verb {} ({})",
            verb_key,
            if icon { "with icon" } else { "without icon" }
        );
        Ok(())
    }

    /// Remove the verb key and everything below it.
    ///
    /// # Errors
    ///
    /// Propagates a failing registry delete.
    pub fn uninstall<S: KeyStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        let verb_key = Self::verb_key();
        store.delete_tree(&verb_key)?;
        log::info!("Removed shell verb {}", verb_key);
        Ok(())
    }

    /// Whether a command is registered for the verb.
    ///
    /// # Errors
    ///
    /// Propagates a failing registry read.
    pub fn is_installed<S: KeyStore + ?Sized>(store: &S) -> Result<bool> {
        Ok(store.get_string(&Self::command_key(), "")?.is_some())
    }
}

/// In-memory [`KeyStore`] keyed by lowercase paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryKeyStore {
    keys: BTreeMap<String, BTreeMap<String, String>>,
}

impl MemoryKeyStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains_key(&fold(key))
    }

    /// Number of keys, including intermediate ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn fold(key: &str) -> String {
    key.trim_matches('\\').to_lowercase()
}

fn is_within(candidate: &str, key: &str) -> bool {
    candidate == key
        || candidate
            .strip_prefix(key)
            .is_some_and(|rest| rest.starts_with('\\'))
}

impl KeyStore for MemoryKeyStore {
    fn set_string(&mut self, key: &str, name: &str, value: &str) -> Result<()> {
        let key = fold(key);
        let mut parent = String::new();
        for part in key.split('\\') {
            if !parent.is_empty() {
                parent.push('\\');
            }
            parent.push_str(part);
            self.keys.entry(parent.clone()).or_default();
        }
        self.keys
            .entry(key)
            .or_default()
            .insert(name.to_lowercase(), value.to_string());
        Ok(())
    }

    fn get_string(&self, key: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .keys
            .get(&fold(key))
            .and_then(|values| values.get(&name.to_lowercase()))
            .cloned())
    }

    fn delete_value(&mut self, key: &str, name: &str) -> Result<()> {
        if let Some(values) = self.keys.get_mut(&fold(key)) {
            values.remove(&name.to_lowercase());
        }
        Ok(())
    }

    fn delete_tree(&mut self, key: &str) -> Result<()> {
        let key = fold(key);
        self.keys.retain(|candidate, _| !is_within(candidate, &key));
        Ok(())
    }
}

#[cfg(windows)]
pub use self::win32::WinRegistry;

#[cfg(windows)]
mod win32 {
    use super::KeyStore;
    use crate::error::{Error, Result};
    use std::io;
    use winreg::enums::{HKEY_CURRENT_USER, KEY_SET_VALUE};
    use winreg::RegKey;

    /// [`KeyStore`] over `HKEY_CURRENT_USER`.
    pub struct WinRegistry {
        root: RegKey,
    }

    impl WinRegistry {
        /// Store rooted at the current user's hive.
        #[must_use]
        pub fn current_user() -> Self {
            Self {
                root: RegKey::predef(HKEY_CURRENT_USER),
            }
        }
    }

    fn registry_error(key: &str) -> impl FnOnce(io::Error) -> Error + '_ {
        move |source| Error::Registry {
            key: key.to_string(),
            source,
        }
    }

    fn missing_is_ok(result: io::Result<()>) -> io::Result<()> {
        match result {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    impl KeyStore for WinRegistry {
        fn set_string(&mut self, key: &str, name: &str, value: &str) -> Result<()> {
            let (subkey, _) = self.root.create_subkey(key).map_err(registry_error(key))?;
            subkey.set_value(name, &value).map_err(registry_error(key))
        }

        fn get_string(&self, key: &str, name: &str) -> Result<Option<String>> {
            let subkey = match self.root.open_subkey(key) {
                Ok(subkey) => subkey,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(registry_error(key)(e)),
            };
            match subkey.get_value::<String, _>(name) {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(registry_error(key)(e)),
            }
        }

        fn delete_value(&mut self, key: &str, name: &str) -> Result<()> {
            let subkey = match self.root.open_subkey_with_flags(key, KEY_SET_VALUE) {
                Ok(subkey) => subkey,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(registry_error(key)(e)),
            };
            missing_is_ok(subkey.delete_value(name)).map_err(registry_error(key))
        }

        fn delete_tree(&mut self, key: &str) -> Result<()> {
            missing_is_ok(self.root.delete_subkey_all(key)).map_err(registry_error(key))
        }
    }
}

/// Placeholder store for platforms without a registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl KeyStore for Unavailable {
    fn set_string(&mut self, _key: &str, _name: &str, _value: &str) -> Result<()> {
        Err(Error::Unsupported)
    }

    fn get_string(&self, _key: &str, _name: &str) -> Result<Option<String>> {
        Err(Error::Unsupported)
    }

    fn delete_value(&mut self, _key: &str, _name: &str) -> Result<()> {
        Err(Error::Unsupported)
    }

    fn delete_tree(&mut self, _key: &str) -> Result<()> {
        Err(Error::Unsupported)
    }
}

/// The platform's registry.
#[must_use]
pub fn native_store() -> Box<dyn KeyStore> {
    #[cfg(windows)]
    {
        Box::new(WinRegistry::current_user())
    }

    #[cfg(not(windows))]
    {
        Box::new(Unavailable)
    }
}
