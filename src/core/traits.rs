use async_trait::async_trait;
use thiserror::Error;

use crate::core::{
    cmd::CommandDescriptor,
    model::component::DirPath,
    msg::{Alert, ForceDeletePrompt},
};

/// Failure reported by a spawner. Only the message reaches the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SpawnError {
    pub message: String,
    pub exit_status: Option<i32>,
    /// short machine-readable reason, e.g. `not-found`, `access-denied`
    pub problem: Option<String>,
}

impl SpawnError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_status: None,
            problem: None,
        }
    }

    pub fn with_status(mut self, status: Option<i32>) -> Self {
        self.exit_status = status;
        self
    }

    pub fn with_problem(mut self, problem: &str) -> Self {
        self.problem = Some(problem.to_string());
        self
    }
}

/// Runs external programs
#[async_trait]
pub trait Spawner: Send + Sync {
    async fn spawn(&self, cmd: &CommandDescriptor) -> Result<(), SpawnError>;
}

/// Dialogs, alerts and navigation on the client side.
pub trait Frontend: Send + Sync {
    /// dismiss the active modal
    fn close_dialog(&self);
    /// replace the modal with the force-delete escalation
    fn show_force_delete(&self, prompt: ForceDeletePrompt);
    fn set_error_message(&self, message: String);
    fn set_delete_failed(&self, failed: bool);
    fn add_alert(&self, alert: Alert);
    fn location_go(&self, path: DirPath);
}
