use crate::core::model::component::{DirPath, Entry, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Hard,
    Symbolic,
}

/// What the user asked for. Consumed once by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    /// An empty selection means the viewed directory itself.
    Delete {
        path: DirPath,
        selection: Selection,
    },
    /// Retry of a failed delete; a failure here is final.
    ForceDelete {
        path: DirPath,
        selection: Selection,
    },
    Rename {
        path: DirPath,
        target: Entry,
        name: String,
    },
    CreateDirectory {
        path: DirPath,
        name: String,
    },
    CreateLink {
        path: DirPath,
        kind: LinkKind,
        /// only its last segment is used
        original: String,
        name: String,
    },
    EditPermissions {
        path: DirPath,
        /// entry as listed, with its current mode/owner/group
        entry: Entry,
        mode: u32,
        owner: String,
        group: String,
    },
    Paste {
        sources: Vec<String>,
        target: String,
        as_symlink: bool,
    },
}

impl OperationRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Delete { .. } => "delete",
            Self::ForceDelete { .. } => "force_delete",
            Self::Rename { .. } => "rename",
            Self::CreateDirectory { .. } => "create_directory",
            Self::CreateLink { .. } => "create_link",
            Self::EditPermissions { .. } => "edit_permissions",
            Self::Paste { .. } => "paste",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Danger,
}

/// Non-blocking notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub severity: Severity,
    /// wall clock millis at creation
    pub id: i64,
}

impl Alert {
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Danger,
            id: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Escalation shown after a plain delete failed
#[derive(Debug, Clone, PartialEq)]
pub struct ForceDeletePrompt {
    pub path: DirPath,
    pub selection: Selection,
    pub initial_error: String,
}

impl ForceDeletePrompt {
    pub fn into_request(self) -> OperationRequest {
        OperationRequest::ForceDelete {
            path: self.path,
            selection: self.selection,
        }
    }
}

/// Everything the runner loop reacts to
#[derive(Debug)]
pub enum Msg {
    Request(OperationRequest),
    /// one dispatched request finished, successfully or not
    Settled(&'static str),

    // frontend calls coming back from handlers
    DialogClosed,
    ShowForceDelete(ForceDeletePrompt),
    ErrorMessage(String),
    DeleteFailed(bool),
    Alert(Alert),
    Navigate { path: DirPath, encoded: String },
}
