mod arg_parser;
mod config;
mod runner;

use anyhow::{Context, Error};
use arg_parser::ArgParser;
use clap::Parser;
use config::Config;
use joblib::Supervisor;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode, Error> {
    init_tracing();
    let args = ArgParser::parse();

    let config = match args.config_file {
        Some(ref path) => Config::load(path).context("failed to load config file")?,
        None => Config::builtin(args.variant).context("failed to load built-in jobs")?,
    };
    let config = config.select(&args.only)?;
    let root = config::resolve_root(args.root.as_deref(), args.config_file.as_deref())
        .context("failed to resolve project root")?;
    let interpreter = config::resolve_interpreter(args.python.as_deref(), &config);
    let jobs = config.to_jobs(&root, &interpreter, &args.envs);
    let supervisor = Supervisor::new(jobs).kind(config.kind.clone());

    if args.list {
        print!("{}", format_jobs(&supervisor));
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(data_dir) = config.prepare_data_dir(&root)? {
        tracing::debug!(path = %data_dir.display(), "data directory ready");
    }

    let outcome = match args.every {
        None => runner::run_once(&supervisor, tokio::io::stdout()).await?,
        Some(secs) => {
            let shutdown = runner::interrupt().context("failed to listen for Ctrl-C")?;
            runner::run_every(
                &supervisor,
                runner::clamp_interval(secs),
                tokio::io::stdout,
                shutdown,
            )
            .await?
        }
    };
    Ok(ExitCode::from(outcome.exit_code()))
}

/// Diagnostics go to stderr so stdout only carries the tagged job output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// One line per job: name, command line and working directory.
fn format_jobs(supervisor: &Supervisor) -> String {
    supervisor
        .jobs()
        .iter()
        .map(|job| {
            format!(
                "{}\t{} {}\t(in {})\n",
                job.name(),
                job.program(),
                job.arguments().join(" "),
                job.working_dir().display()
            )
        })
        .collect()
}
