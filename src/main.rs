mod cli;
mod core;
mod logging;

use std::{env, process::ExitCode};

use clap::Parser;
use color_eyre::Result;

use crate::{
    cli::Cli,
    core::{config::Config, model::component::DirPath, runner::Runner},
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let _guard = logging::init(&config.log.dir(), &cli.log_filter(&config.log.level))?;

    tracing::info!("[main] program start...");

    let start = match (&cli.path, &config.default_path) {
        (Some(path), _) => path.clone(),
        (None, Some(path)) => path.to_string_lossy().into_owned(),
        (None, None) => env::current_dir()?.to_string_lossy().into_owned(),
    };
    let path = DirPath::parse(&start);

    let mut runner = Runner::new(&config, cli.dry_run, cli.yes, path.clone());
    let request = cli.op.into_request(&path)?;
    let ok = runner.run(request).await?;

    tracing::info!("[main] program ended in {}", runner.nav().lock().await.path);
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
