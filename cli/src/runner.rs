use anyhow::{Context, Error};
use joblib::{Outcome, Supervisor};
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

/// Shortest allowed pause between two periodic batches.
pub const MIN_INTERVAL: Duration = Duration::from_secs(60);

pub fn clamp_interval(secs: u64) -> Duration {
    Duration::from_secs(secs).max(MIN_INTERVAL)
}

/// Resolves on the next Ctrl-C.
///
/// The handler is installed here, before any batch starts, so an interrupt
/// that arrives mid-batch is held until the batch is done.
pub fn interrupt() -> io::Result<impl Future<Output = ()>> {
    let mut interrupts = signal(SignalKind::interrupt())?;
    Ok(async move {
        if interrupts.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    })
}

/// Run the batch once, writing the combined output to `out`.
pub async fn run_once<W>(supervisor: &Supervisor, out: W) -> Result<Outcome, Error>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outcome, _) = supervisor
        .run(out)
        .await
        .context("failed to supervise jobs")?;
    Ok(outcome)
}

/// Run the batch, then again every `interval`, until `shutdown` resolves.
///
/// `shutdown` is only honoured between batches; a running batch always
/// finishes. Returns the outcome of the last batch.
pub async fn run_every<W, F, S>(
    supervisor: &Supervisor,
    interval: Duration,
    mut out: F,
    shutdown: S,
) -> Result<Outcome, Error>
where
    W: AsyncWrite + Unpin + Send + 'static,
    F: FnMut() -> W,
    S: Future<Output = ()>,
{
    info!(seconds = interval.as_secs(), "scheduled scrapers");
    tokio::pin!(shutdown);
    loop {
        let outcome = run_once(supervisor, out()).await?;
        tokio::select! {
            _ = &mut shutdown => {
                info!("stopping periodic runs");
                return Ok(outcome);
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
