use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{anyhow, bail, Result};

/// Write-only access to a clipboard
pub trait Clipboard: Send {
    fn write_text(&self, text: &str) -> Result<()>;
}

type CopyCommand<'a> = (&'a str, &'a [&'a str]);

#[cfg(target_os = "macos")]
const COPY_COMMANDS: &[CopyCommand<'static>] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const COPY_COMMANDS: &[CopyCommand<'static>] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const COPY_COMMANDS: &[CopyCommand<'static>] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// The platform clipboard, reached through the usual copy command.
///
/// Commands are tried in order until one takes the text and exits cleanly.
/// wl-copy, xclip and xsel fork a background process to serve the selection,
/// so the command we spawn returns as soon as it has read its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        copy_with(COPY_COMMANDS, text)
    }
}

fn copy_with(commands: &[CopyCommand<'_>], text: &str) -> Result<()> {
    for (program, args) in commands {
        match run_copy_command(program, args, text) {
            Ok(()) => {
                log::debug!("copied {} bytes with {}", text.len(), program);
                return Ok(());
            }
            Err(err) => log::debug!("clipboard command {} failed: {}", program, err),
        }
    }

    Err(anyhow!("no clipboard command succeeded"))
}

fn run_copy_command(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Dropping stdin closes the pipe so the command sees end of input
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Err(std::io::Error::other("no stdin")),
    };

    // Always reap the child, even when the write failed
    let status = child.wait()?;
    written?;
    if !status.success() {
        bail!("exited with {}", status);
    }
    Ok(())
}
