use std::{io, process::Stdio};

use async_trait::async_trait;
use tokio::process::Command;

use crate::core::{
    cmd::{CommandDescriptor, ErrMode, Superuser},
    traits::{SpawnError, Spawner},
};

/// Runs commands as local child processes, optionally through an elevation
/// program such as `sudo -n`.
#[derive(Debug, Clone)]
pub struct ProcessSpawner {
    elevate_with: Vec<String>,
}

impl ProcessSpawner {
    pub fn new(elevate_with: Vec<String>) -> Self {
        Self { elevate_with }
    }

    fn elevated<'a>(&'a self, cmd: &'a CommandDescriptor) -> Vec<&'a str> {
        self.elevate_with
            .iter()
            .map(String::as_str)
            .chain(cmd.argv())
            .collect()
    }

    /// `elevated` marks argv as wrapped in `elevate_with`, so a refusal from
    /// the elevation program can be told apart from a failing command.
    async fn run(&self, argv: &[&str], err: ErrMode, elevated: bool) -> Result<(), SpawnError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(SpawnError::new("empty command").with_problem("internal-error"));
        };

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                SpawnError::new(format!("{program}: {e}")).with_problem(io_problem(&e))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let status = output.status.code();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let fallback = match status {
            Some(code) => format!("{program} exited with status {code}"),
            None => format!("{program} was terminated by a signal"),
        };
        let message = match err {
            ErrMode::Message if !stderr.is_empty() => stderr.clone(),
            ErrMode::Out => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let merged = [stdout.trim(), stderr.as_str()]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
                if merged.is_empty() { fallback } else { merged }
            }
            _ => fallback,
        };

        // classified from raw stderr, the message may no longer contain it
        let problem = if elevated && self.elevation_refused(&stderr) {
            Some(ELEVATION_REFUSED)
        } else {
            stderr_problem(&stderr)
        };
        let mut error = SpawnError::new(message).with_status(status);
        if let Some(problem) = problem {
            error = error.with_problem(problem);
        }
        Err(error)
    }
}

#[async_trait]
impl Spawner for ProcessSpawner {
    async fn spawn(&self, cmd: &CommandDescriptor) -> Result<(), SpawnError> {
        let err = cmd.options().err;
        match cmd.options().superuser {
            Superuser::None => self.run(&cmd.argv(), err, false).await,
            Superuser::Require => {
                if self.elevate_with.is_empty() {
                    return Err(SpawnError::new("no elevation program configured")
                        .with_problem("access-denied"));
                }
                self.run(&self.elevated(cmd), err, true).await
            }
            Superuser::Try if self.elevate_with.is_empty() => {
                self.run(&cmd.argv(), err, false).await
            }
            Superuser::Try => match self.run(&self.elevated(cmd), err, true).await {
                Err(e) if elevation_unavailable(&e) => {
                    tracing::debug!(
                        "[Spawner] elevation unavailable ({e}), running {} as is",
                        cmd.program()
                    );
                    self.run(&cmd.argv(), err, false).await
                }
                other => other,
            },
        }
    }
}

impl ProcessSpawner {
    /// stderr written by the elevation program when it will not elevate
    fn elevation_refused(&self, stderr: &str) -> bool {
        let lower = stderr.to_ascii_lowercase();
        let elevator = self.elevate_with.first().map(String::as_str).unwrap_or_default();
        lower.starts_with(&format!("{elevator}:"))
            && (lower.contains("password is required")
                || lower.contains("terminal is required")
                || lower.contains("not in the sudoers")
                || lower.contains("not allowed to"))
    }
}

const ELEVATION_REFUSED: &str = "elevation-refused";

/// The elevation program itself failed, not the wrapped command.
fn elevation_unavailable(e: &SpawnError) -> bool {
    match e.problem.as_deref() {
        Some("not-found") => e.exit_status.is_none(),
        Some(ELEVATION_REFUSED) => true,
        _ => false,
    }
}

fn io_problem(e: &io::Error) -> &'static str {
    match e.kind() {
        io::ErrorKind::NotFound => "not-found",
        io::ErrorKind::PermissionDenied => "access-denied",
        _ => "internal-error",
    }
}

fn stderr_problem(stderr: &str) -> Option<&'static str> {
    if stderr.contains("Permission denied") || stderr.contains("Operation not permitted") {
        Some("access-denied")
    } else if stderr.contains("No such file or directory") {
        Some("not-found")
    } else {
        None
    }
}

/// Logs every command and reports success without running anything.
#[derive(Debug, Default, Clone)]
pub struct DryRunSpawner;

#[async_trait]
impl Spawner for DryRunSpawner {
    async fn spawn(&self, cmd: &CommandDescriptor) -> Result<(), SpawnError> {
        tracing::info!("[DryRun] {cmd} ({:?})", cmd.options());
        println!("would run: {cmd}");
        Ok(())
    }
}
