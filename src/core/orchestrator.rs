//! Turns operation requests into external commands and reconciles the
//! client state once they settle.
//!
//! Every handler recovers its own failures: nothing here returns an error to
//! the caller. A failure ends up as an error message, a force-delete prompt,
//! or an alert.

use std::sync::Arc;

use crate::core::{
    cmd::{CommandDescriptor, ExecOptions},
    model::{
        component::{DirPath, Entry, Selection},
        nav::SharedNav,
    },
    msg::{Alert, ForceDeletePrompt, LinkKind, OperationRequest},
    traits::{Frontend, SpawnError, Spawner},
};

pub struct Orchestrator {
    spawner: Arc<dyn Spawner>,
    frontend: Arc<dyn Frontend>,
    nav: SharedNav,
    options: ExecOptions,
}

impl Orchestrator {
    pub fn new(
        spawner: Arc<dyn Spawner>,
        frontend: Arc<dyn Frontend>,
        nav: SharedNav,
        options: ExecOptions,
    ) -> Self {
        Self {
            spawner,
            frontend,
            nav,
            options,
        }
    }

    /// Commands a request would issue, in order, without running them.
    pub fn plan(&self, req: &OperationRequest) -> Vec<CommandDescriptor> {
        match req {
            OperationRequest::Delete { path, selection }
            | OperationRequest::ForceDelete { path, selection } => {
                vec![delete_command(path, selection, self.options)]
            }
            OperationRequest::Rename { path, target, name } => {
                vec![RenamePlan::new(path, target, name).command(self.options)]
            }
            OperationRequest::CreateDirectory { path, name } => {
                vec![CommandDescriptor::make_dir(path.child(name), self.options)]
            }
            OperationRequest::CreateLink {
                path,
                kind,
                original,
                name,
            } => vec![link_command(path, *kind, original, name, self.options)],
            OperationRequest::EditPermissions {
                path,
                entry,
                mode,
                owner,
                group,
            } => permission_steps(path, entry, *mode, owner, group, self.options),
            OperationRequest::Paste {
                sources,
                target,
                as_symlink,
            } => vec![paste_command(sources, target, *as_symlink)],
        }
    }

    pub async fn dispatch(&self, req: OperationRequest) {
        tracing::info!("[Orchestrator] {} requested", req.name());
        match req {
            OperationRequest::Delete { path, selection } => self.delete(path, selection).await,
            OperationRequest::ForceDelete { path, selection } => {
                self.force_delete(path, selection).await
            }
            OperationRequest::Rename { path, target, name } => {
                self.rename(path, target, name).await
            }
            OperationRequest::CreateDirectory { path, name } => {
                self.create_directory(path, name).await
            }
            OperationRequest::CreateLink {
                path,
                kind,
                original,
                name,
            } => self.create_link(path, kind, original, name).await,
            OperationRequest::EditPermissions {
                path,
                entry,
                mode,
                owner,
                group,
            } => {
                self.edit_permissions(path, entry, mode, owner, group)
                    .await
            }
            OperationRequest::Paste {
                sources,
                target,
                as_symlink,
            } => self.paste(sources, target, as_symlink).await,
        }
    }

    async fn spawn(&self, cmd: &CommandDescriptor) -> Result<(), SpawnError> {
        tracing::debug!("[Orchestrator] spawn `{cmd}`");
        let result = self.spawner.spawn(cmd).await;
        if let Err(e) = &result {
            tracing::warn!("[Orchestrator] `{cmd}` failed: {e}");
        }
        result
    }

    async fn delete(&self, path: DirPath, selection: Selection) {
        let cmd = delete_command(&path, &selection, self.options);
        let result = self.spawn(&cmd).await;
        self.frontend.close_dialog();

        match result {
            Ok(()) => {
                let mut nav = self.nav.lock().await;
                nav.clear_selection();
                if selection.is_empty() {
                    nav.drop_current();
                    drop(nav);
                    self.frontend.location_go(path.parent());
                }
            }
            Err(e) => self.frontend.show_force_delete(ForceDeletePrompt {
                path,
                selection,
                initial_error: e.message,
            }),
        }
    }

    async fn force_delete(&self, path: DirPath, selection: Selection) {
        let cmd = delete_command(&path, &selection, self.options);
        match self.spawn(&cmd).await {
            Ok(()) => self.frontend.close_dialog(),
            Err(e) => {
                self.frontend.set_delete_failed(true);
                self.frontend.set_error_message(e.message);
            }
        }
    }

    async fn rename(&self, path: DirPath, target: Entry, name: String) {
        let plan = RenamePlan::new(&path, &target, &name);
        match self.spawn(&plan.command(self.options)).await {
            Ok(()) => {
                if plan.moves_current {
                    self.nav.lock().await.drop_current();
                    self.frontend.location_go(DirPath::parse(&plan.destination));
                }
                self.frontend.close_dialog();
            }
            Err(e) => self.frontend.set_error_message(e.message),
        }
    }

    async fn create_directory(&self, path: DirPath, name: String) {
        let cmd = CommandDescriptor::make_dir(path.child(&name), self.options);
        self.close_or_report(&cmd).await;
    }

    async fn create_link(&self, path: DirPath, kind: LinkKind, original: String, name: String) {
        let cmd = link_command(&path, kind, &original, &name, self.options);
        self.close_or_report(&cmd).await;
    }

    async fn edit_permissions(
        &self,
        path: DirPath,
        entry: Entry,
        mode: u32,
        owner: String,
        group: String,
    ) {
        let steps = permission_steps(&path, &entry, mode, &owner, &group, self.options);
        match self.run_chain(&steps).await {
            Ok(()) => self.frontend.close_dialog(),
            Err(e) => self.frontend.set_error_message(e.message),
        }
    }

    async fn paste(&self, sources: Vec<String>, target: String, as_symlink: bool) {
        let cmd = paste_command(&sources, &target, as_symlink);
        if let Err(e) = self.spawn(&cmd).await {
            self.frontend.add_alert(Alert::danger(e.message));
        }
    }

    async fn close_or_report(&self, cmd: &CommandDescriptor) {
        match self.spawn(cmd).await {
            Ok(()) => self.frontend.close_dialog(),
            Err(e) => self.frontend.set_error_message(e.message),
        }
    }

    /// Runs steps one after another and stops at the first failure.
    /// Steps that already succeeded are left in place.
    async fn run_chain(&self, steps: &[CommandDescriptor]) -> Result<(), SpawnError> {
        for step in steps {
            self.spawn(step).await?;
        }
        Ok(())
    }
}

/// `rm -r` over the selection, or over the viewed directory when nothing is
/// selected.
fn delete_command(path: &DirPath, selection: &Selection, options: ExecOptions) -> CommandDescriptor {
    let targets = if selection.is_empty() {
        vec![path.join()]
    } else {
        selection.iter().map(|entry| path.child(&entry.name)).collect()
    };
    CommandDescriptor::remove_recursive(targets, options)
}

struct RenamePlan {
    source: String,
    destination: String,
    /// the viewed directory itself is being renamed
    moves_current: bool,
}

impl RenamePlan {
    fn new(path: &DirPath, target: &Entry, name: &str) -> Self {
        if target.is_current_dir() {
            let segments = path.segments();
            let parent = segments[..segments.len() - 1].join("/");
            Self {
                source: path.join(),
                destination: format!("{parent}/{name}"),
                moves_current: true,
            }
        } else {
            Self {
                source: path.child(&target.name),
                destination: path.child(name),
                moves_current: false,
            }
        }
    }

    fn command(&self, options: ExecOptions) -> CommandDescriptor {
        CommandDescriptor::rename(self.source.clone(), self.destination.clone(), options)
    }
}

/// Links always point at a sibling: only the basename of `original` is kept.
fn link_command(
    path: &DirPath,
    kind: LinkKind,
    original: &str,
    name: &str,
    options: ExecOptions,
) -> CommandDescriptor {
    let basename = original.rsplit('/').next().unwrap_or(original);
    CommandDescriptor::link(
        kind == LinkKind::Symbolic,
        path.child(basename),
        path.child(name),
        options,
    )
}

/// chmod first, chown second, each only when its part changed.
fn permission_steps(
    path: &DirPath,
    entry: &Entry,
    mode: u32,
    owner: &str,
    group: &str,
    options: ExecOptions,
) -> Vec<CommandDescriptor> {
    let target = path.child(&entry.name);
    let mut steps = Vec::with_capacity(2);
    if entry.mode != Some(mode) {
        steps.push(CommandDescriptor::change_mode(mode, target.clone(), options));
    }
    if entry.owner.as_deref() != Some(owner) || entry.group.as_deref() != Some(group) {
        steps.push(CommandDescriptor::change_owner(owner, group, target, options));
    }
    steps
}

/// Pastes run in the background with plain options.
fn paste_command(sources: &[String], target: &str, as_symlink: bool) -> CommandDescriptor {
    if as_symlink {
        CommandDescriptor::symlink_into(sources.to_vec(), target.to_string(), ExecOptions::plain())
    } else {
        CommandDescriptor::copy_into(sources.to_vec(), target.to_string(), ExecOptions::plain())
    }
}
