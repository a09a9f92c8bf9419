//! Modal presentation of errors, prompts and help.
//!
//! Every user-facing message goes through the [`Dialog`] trait. On Windows
//! the native implementation is a `MessageBoxW` call; the console
//! implementation backs the worker side of the [`crate::watcher`] protocol and
//! is the fallback on other platforms.

use std::io::{self, BufRead, BufReader, Stderr, Stdin, Stdout, Write};

/// Title shared by every dialog.
pub const TITLE: &str = "Convert to HTML";

/// Something that can show the three kinds of message this tool needs.
pub trait Dialog {
    /// Show an error with a single OK button.
    fn error(&mut self, message: &str);

    /// Ask a Yes/No question. Only an explicit Yes returns `true`.
    fn confirm(&mut self, message: &str) -> bool;

    /// Show the usage text with a single OK button and no icon.
    fn help(&mut self, text: &str);
}

impl<T: Dialog + ?Sized> Dialog for Box<T> {
    fn error(&mut self, message: &str) {
        (**self).error(message);
    }

    fn confirm(&mut self, message: &str) -> bool {
        (**self).confirm(message)
    }

    fn help(&mut self, text: &str) {
        (**self).help(text);
    }
}

impl<T: Dialog + ?Sized> Dialog for &mut T {
    fn error(&mut self, message: &str) {
        (**self).error(message);
    }

    fn confirm(&mut self, message: &str) -> bool {
        (**self).confirm(message)
    }

    fn help(&mut self, text: &str) {
        (**self).help(text);
    }
}

/// Line-oriented dialog over arbitrary streams.
///
/// Questions go to `output` followed by a flush, then one answer line is read
/// from `input`. Errors and help go to `errors`.
#[derive(Debug)]
pub struct ConsoleDialog<R, W, E> {
    input: R,
    output: W,
    errors: E,
}

impl ConsoleDialog<BufReader<Stdin>, Stdout, Stderr> {
    /// Dialog over the process's standard streams.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout(), io::stderr())
    }
}

impl<R, W, E> ConsoleDialog<R, W, E> {
    /// Build a dialog over the given streams.
    pub fn new(input: R, output: W, errors: E) -> Self {
        Self {
            input,
            output,
            errors,
        }
    }

    /// Take the streams back, e.g. to inspect what was written.
    pub fn into_parts(self) -> (R, W, E) {
        (self.input, self.output, self.errors)
    }
}

impl<R: BufRead, W: Write, E: Write> Dialog for ConsoleDialog<R, W, E> {
    fn error(&mut self, message: &str) {
        if let Err(e) = writeln!(self.errors, "{message}").and_then(|()| self.errors.flush()) {
            log::debug!("Failed to write error message: {}", e);
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        if let Err(e) = writeln!(self.output, "{message}").and_then(|()| self.output.flush()) {
            log::debug!("Failed to write prompt: {}", e);
            return false;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) => false,
            Ok(_) => answer.trim_start().starts_with(['y', 'Y']),
            Err(e) => {
                log::debug!("Failed to read answer: {}", e);
                false
            }
        }
    }

    fn help(&mut self, text: &str) {
        if let Err(e) = write!(self.errors, "{text}").and_then(|()| self.errors.flush()) {
            log::debug!("Failed to write help text: {}", e);
        }
    }
}

#[cfg(windows)]
pub use self::win32::MessageBox;

#[cfg(windows)]
mod win32 {
    use super::{Dialog, TITLE};
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use windows::core::PCWSTR;
    use windows::Win32::UI::WindowsAndMessaging::{
        MessageBoxW, IDYES, MB_ICONERROR, MB_ICONWARNING, MB_OK, MB_SETFOREGROUND, MB_YESNO,
        MESSAGEBOX_RESULT, MESSAGEBOX_STYLE,
    };

    /// Native modal message box.
    #[derive(Debug, Clone)]
    pub struct MessageBox {
        title: Vec<u16>,
    }

    impl MessageBox {
        /// Message box titled [`TITLE`].
        #[must_use]
        pub fn new() -> Self {
            Self { title: wide(TITLE) }
        }

        fn show(&self, text: &str, style: MESSAGEBOX_STYLE) -> MESSAGEBOX_RESULT {
            let text = wide(text);
            // SAFETY: both buffers are NUL-terminated and outlive the call.
            unsafe {
                MessageBoxW(
                    None,
                    PCWSTR(text.as_ptr()),
                    PCWSTR(self.title.as_ptr()),
                    style | MB_SETFOREGROUND,
                )
            }
        }
    }

    impl Default for MessageBox {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Dialog for MessageBox {
        fn error(&mut self, message: &str) {
            self.show(message, MB_OK | MB_ICONERROR);
        }

        fn confirm(&mut self, message: &str) -> bool {
            self.show(message, MB_YESNO | MB_ICONWARNING) == IDYES
        }

        fn help(&mut self, text: &str) {
            self.show(text, MB_OK);
        }
    }

    fn wide(text: &str) -> Vec<u16> {
        OsStr::new(text)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect()
    }
}

/// The platform's native dialog.
#[must_use]
pub fn native() -> Box<dyn Dialog> {
    #[cfg(windows)]
    {
        Box::new(MessageBox::new())
    }

    #[cfg(not(windows))]
    {
        Box::new(ConsoleDialog::stdio())
    }
}
