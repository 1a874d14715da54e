// External command runner with hidden windows
// Runs OS tools (schtasks, systemctl) in the background and captures their output

use async_process::{Command, Stdio};
use std::ffi::OsStr;
use thiserror::Error;

// Windows constant to hide the console window
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("erreur d'entrée/sortie lors de l'exécution de {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Exit code 0 is the only success signal.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs `program` with `args` without a visible window and waits for it.
///
/// A non-zero exit is not an error here; only a failure to launch is.
pub async fn run_command<I, S>(program: &str, args: I) -> Result<CommandOutput, CommandError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(windows)]
    {
        use async_process::windows::CommandExt;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    let output = command.output().await.map_err(|source| CommandError::Io {
        program: program.to_string(),
        source,
    })?;

    let captured = CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    if !captured.stdout.trim().is_empty() {
        tracing::debug!(program, "stdout: {}", captured.stdout.trim());
    }
    if !captured.stderr.trim().is_empty() {
        tracing::debug!(program, "stderr: {}", captured.stderr.trim());
    }

    Ok(captured)
}
