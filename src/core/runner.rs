use std::sync::Arc;

use color_eyre::{Result as Res, eyre::eyre};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};

use crate::core::{
    cmd::ExecOptions,
    config::Config,
    model::{
        component::DirPath,
        nav::{NavState, SharedNav},
    },
    msg::{Msg, OperationRequest, Severity},
    orchestrator::Orchestrator,
    service::{
        frontend::ChannelFrontend,
        spawner::{DryRunSpawner, ProcessSpawner},
    },
    traits::Spawner,
};

/// Drives requests to completion and plays the part of the dialogs.
///
/// Each request runs on its own task; nothing serializes them.
pub struct Runner {
    orchestrator: Arc<Orchestrator>,
    nav: SharedNav,
    tx: UnboundedSender<Msg>,
    rx: UnboundedReceiver<Msg>,
    assume_yes: bool,
    in_flight: usize,
    failed: bool,
}

impl Runner {
    pub fn new(config: &Config, dry_run: bool, assume_yes: bool, path: DirPath) -> Self {
        let spawner: Arc<dyn Spawner> = if dry_run {
            Arc::new(DryRunSpawner)
        } else {
            Arc::new(ProcessSpawner::new(config.exec.elevate_with.clone()))
        };
        Self::with_spawner(spawner, config.exec.options(), assume_yes, path)
    }

    pub fn with_spawner(
        spawner: Arc<dyn Spawner>,
        options: ExecOptions,
        assume_yes: bool,
        path: DirPath,
    ) -> Self {
        let (tx, rx) = unbounded_channel();
        let nav = NavState::new(path).shared();
        let frontend = Arc::new(ChannelFrontend::new(tx.clone()));
        let orchestrator = Arc::new(Orchestrator::new(spawner, frontend, nav.clone(), options));
        Self {
            orchestrator,
            nav,
            tx,
            rx,
            assume_yes,
            in_flight: 0,
            failed: false,
        }
    }

    pub fn nav(&self) -> SharedNav {
        Arc::clone(&self.nav)
    }

    /// Runs `request` and whatever it escalates to. Returns false when the
    /// user was shown an error.
    pub async fn run(&mut self, request: OperationRequest) -> Res<bool> {
        self.tx
            .send(Msg::Request(request))
            .map_err(|_| eyre!("runner channel closed"))?;

        while let Some(msg) = self.rx.recv().await {
            self.handle_msg(msg).await?;
            if self.in_flight == 0 {
                break;
            }
        }

        Ok(!self.failed)
    }

    fn submit(&mut self, request: OperationRequest) {
        for cmd in self.orchestrator.plan(&request) {
            tracing::debug!("[Runner] planned `{cmd}`");
        }
        self.in_flight += 1;

        let orchestrator = Arc::clone(&self.orchestrator);
        let tx = self.tx.clone();
        let name = request.name();
        tokio::spawn(async move {
            orchestrator.dispatch(request).await;
            let _ = tx.send(Msg::Settled(name));
        });
    }

    async fn handle_msg(&mut self, msg: Msg) -> Res<()> {
        match msg {
            Msg::Request(request) => self.submit(request),
            Msg::Settled(name) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                tracing::info!("[Runner] {name} settled, {} in flight", self.in_flight);
            }
            Msg::DialogClosed => tracing::debug!("[Runner] dialog closed"),
            Msg::ShowForceDelete(prompt) => {
                eprintln!("delete failed: {}", prompt.initial_error);
                if self.confirm("Force delete?").await? {
                    self.submit(prompt.into_request());
                } else {
                    self.failed = true;
                }
            }
            Msg::ErrorMessage(message) => {
                eprintln!("error: {message}");
                self.failed = true;
            }
            Msg::DeleteFailed(failed) => {
                if failed {
                    eprintln!("force delete failed, giving up");
                    self.failed = true;
                }
            }
            Msg::Alert(alert) => {
                eprintln!("[{:?}] {}", alert.severity, alert.message);
                if alert.severity == Severity::Danger {
                    self.failed = true;
                }
            }
            Msg::Navigate { path, encoded } => {
                tracing::info!("[Runner] navigate to {path} ({encoded})");
                println!("now in {path}");
                let mut nav = self.nav.lock().await;
                nav.go(path);
                tracing::debug!(
                    "[Runner] history at {} of {}",
                    nav.history.index() + 1,
                    nav.history.len()
                );
            }
        }
        Ok(())
    }

    async fn confirm(&self, question: &str) -> Res<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        eprint!("{question} [y/N] ");
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(matches!(line.trim(), "y" | "Y" | "yes"))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::core::{
        cmd::CommandDescriptor,
        model::component::Entry,
        traits::SpawnError,
    };

    /// fails the first `failures` commands
    struct FlakySpawner {
        failures: Mutex<usize>,
    }

    #[async_trait]
    impl Spawner for FlakySpawner {
        async fn spawn(&self, _cmd: &CommandDescriptor) -> Result<(), SpawnError> {
            let mut left = self.failures.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                Err(SpawnError::new("Device or resource busy"))
            } else {
                Ok(())
            }
        }
    }

    fn runner(failures: usize) -> Runner {
        Runner::with_spawner(
            Arc::new(FlakySpawner {
                failures: Mutex::new(failures),
            }),
            ExecOptions::privileged(),
            true,
            DirPath::parse("/home/bob/docs"),
        )
    }

    #[tokio::test]
    async fn test_force_delete_after_failure() {
        let mut runner = runner(1);
        let ok = runner
            .run(OperationRequest::Delete {
                path: DirPath::parse("/home/bob/docs"),
                selection: vec![Entry::named("a")],
            })
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_force_delete_failure_reports() {
        let mut runner = runner(2);
        let ok = runner
            .run(OperationRequest::Delete {
                path: DirPath::parse("/home/bob/docs"),
                selection: vec![Entry::named("a")],
            })
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_rename_current_moves_view() {
        let mut runner = runner(0);
        let nav = runner.nav();
        let ok = runner
            .run(OperationRequest::Rename {
                path: DirPath::parse("/home/bob/docs"),
                target: Entry::current_dir("docs", 4),
                name: "archive".into(),
            })
            .await
            .unwrap();
        assert!(ok);
        let nav = nav.lock().await;
        assert_eq!(nav.path.join(), "/home/bob/archive");
        assert_eq!((nav.history.len(), nav.history.index()), (2, 1));
    }

    #[tokio::test]
    async fn test_paste_failure_is_an_alert() {
        let mut runner = runner(1);
        let nav = runner.nav();
        let ok = runner
            .run(OperationRequest::Paste {
                sources: vec!["/a".into()],
                target: "/home/bob/docs".into(),
                as_symlink: false,
            })
            .await
            .unwrap();
        assert!(!ok);
        assert_eq!(nav.lock().await.path.join(), "/home/bob/docs");
    }
}
