//! External command execution for subprocess-backed collaborators

use std::io::ErrorKind;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::{Error, Result};

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub(crate) struct CommandOutput {
    /// Exit code, or `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Run `argv`, optionally feeding `stdin`, and capture its output.
pub(crate) async fn run_command(argv: &[String], stdin: Option<&[u8]>) -> Result<CommandOutput> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::config("command is empty"))?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(program = %program, args = args.len(), "spawning collaborator command");
    let mut child = cmd.spawn()?;

    // Stdin is fed while output is drained so neither side can fill a pipe
    // and stall. A child that exits without reading its input is not an error.
    let pipe = child.stdin.take();
    let feed = async move {
        let (Some(input), Some(mut pipe)) = (stdin, pipe) else {
            return Ok(());
        };
        let written = match pipe.write_all(input).await {
            Ok(()) => pipe.shutdown().await,
            Err(e) => Err(e),
        };
        match written {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                tracing::debug!("collaborator closed stdin before reading all input");
                Ok(())
            }
            other => other,
        }
    };

    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    let output = output?;
    fed?;
    Ok(CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}
