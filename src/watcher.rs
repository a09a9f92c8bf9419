//! Launcher side of the hidden-console worker.
//!
//! The launcher starts the worker with all three standard streams piped and
//! relays the worker's console conversation as dialogs:
//!
//! - stdout lines accumulate into a pending message; a line ending in `?`
//!   turns the message into a Yes/No dialog and the answer (`Y` or `N`) is
//!   written back to the worker's stdin
//! - stderr is collected and shown as one error dialog after the worker exits
//! - stdout left over when the worker fails is shown as an error as well
//!
//! The worker side of the protocol is [`crate::dialog::ConsoleDialog`].

use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;

use crate::dialog::Dialog;
use crate::error::{Error, Result};

/// Answer sent for Yes.
pub const YES: &str = "Y";

/// Answer sent for No.
pub const NO: &str = "N";

/// Exit code reported when the worker was killed by a signal.
const KILLED_EXIT_CODE: i32 = 1;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Supervises one worker process.
#[derive(Debug, Clone, Copy, Default)]
pub struct Watcher;

impl Watcher {
    /// Create a watcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run the worker to completion and return its exit code.
    ///
    /// # Errors
    ///
    /// [`Error::Worker`] when the process cannot be spawned or waited for.
    /// Failures writing an answer are only logged, since the worker may have
    /// exited in the meantime.
    pub fn run<D: Dialog + ?Sized>(&self, command: &mut Command, dialog: &mut D) -> Result<i32> {
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        hide_console(command);

        log::debug!("Starting worker: {:?}", command);
        let mut child = command.spawn().map_err(Error::Worker)?;

        let mut stdin = child.stdin.take();
        let stdout = take_stream(child.stdout.take(), "stdout")?;
        let mut stderr = take_stream(child.stderr.take(), "stderr")?;

        let stderr_reader = thread::spawn(move || {
            let mut text = String::new();
            if let Err(e) = stderr.read_to_string(&mut text) {
                log::debug!("Failed to read worker stderr: {}", e);
            }
            text
        });

        let pending = relay_prompts(BufReader::new(stdout), stdin.as_mut(), dialog);
        drop(stdin);

        let code = wait(&mut child)?;
        let errors = stderr_reader.join().unwrap_or_default();
        log::debug!("Worker exited with code {}", code);

        let errors = errors.trim();
        let pending = pending.trim();
        if !errors.is_empty() {
            dialog.error(errors);
        } else if code != 0 && !pending.is_empty() {
            dialog.error(pending);
        }

        Ok(code)
    }
}

/// Read worker output until it closes, asking every question it prints.
/// Returns the unanswered remainder.
fn relay_prompts<R: BufRead, D: Dialog + ?Sized>(
    output: R,
    mut answers: Option<&mut ChildStdin>,
    dialog: &mut D,
) -> String {
    let mut pending: Vec<String> = Vec::new();

    for line in output.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::debug!("Worker stdout closed: {}", e);
                break;
            }
        };

        let is_question = line.trim_end().ends_with('?');
        pending.push(line);
        if !is_question {
            continue;
        }

        let question = pending.join("\n");
        pending.clear();
        let answer = if dialog.confirm(question.trim()) { YES } else { NO };
        log::debug!("Worker asked a question, answering {}", answer);

        if let Some(stdin) = answers.as_deref_mut() {
            if let Err(e) = send_answer(stdin, answer) {
                log::debug!("Failed to answer worker: {}", e);
            }
        }
    }

    pending.join("\n")
}

fn send_answer<W: Write>(stdin: &mut W, answer: &str) -> io::Result<()> {
    writeln!(stdin, "{answer}")?;
    stdin.flush()
}

fn take_stream<T>(stream: Option<T>, name: &str) -> Result<T> {
    stream.ok_or_else(|| Error::Worker(io::Error::other(format!("worker {name} was not captured"))))
}

fn wait(child: &mut Child) -> Result<i32> {
    let status = child.wait().map_err(Error::Worker)?;
    Ok(status.code().unwrap_or(KILLED_EXIT_CODE))
}

#[cfg(windows)]
fn hide_console(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console(_command: &mut Command) {}
