use std::io::Write;

use anyhow::{Result, anyhow};
use clap::Parser;
use taskflow_app::MemoryTaskFlow;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::handlers;
use crate::Command;

/// One line of shell input, parsed with the regular subcommand grammar.
#[derive(Parser, Debug)]
#[command(name = "taskflow", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    cmd: Command,
}

/// Read commands line by line from `input` until EOF or `exit`.
///
/// Every command runs against the same `flow`, so state persists between
/// lines. Failures are reported on `out` and do not end the session.
///
/// # Errors
/// Returns an error only when reading input or writing output fails.
pub async fn run_shell<R, W>(flow: &MemoryTaskFlow, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let words = match shell_words::split(&line) {
            Ok(words) => words,
            Err(err) => {
                writeln!(out, "error: {}", anyhow!("Failed to parse input: {err}"))?;
                continue;
            }
        };
        match words.first().map(String::as_str) {
            None => continue,
            Some("exit" | "quit") => break,
            Some(_) => {}
        }

        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(err) => {
                write!(out, "{}", err.render())?;
                continue;
            }
        };
        tracing::debug!(command = ?parsed.cmd, "shell command");
        if let Err(err) = handlers::run(parsed.cmd, flow, out).await {
            writeln!(out, "error: {err:#}")?;
        }
    }
    out.flush()?;
    Ok(())
}
