mod table;

use crate::actors::{printer::PrinterHandle, worker::WorkerHandle};
use crate::error::{Error, Result};
use crate::events::{JobStatus, WorkerEvent};
use crate::job::Job;
use crate::outcome::Outcome;
use crate::types::RunId;
pub use table::JobState;
use table::JobTable;

use tokio::{io::AsyncWrite, sync::mpsc};
use tracing::{debug, info, info_span, warn, Instrument};

/// Default word used for jobs in the supervisor's `[META]` lines.
pub const DEFAULT_KIND: &str = "scraper";

/// Runs a fixed list of jobs concurrently and reports whether all of them succeeded.
///
/// Every job is started as its own child process, in declaration order, without
/// waiting for the previous ones. Their output is merged into one stream with
/// each line tagged `[<name>] `. Jobs are never cancelled: a failing job only
/// marks the batch as failed.
#[derive(Clone, Debug)]
pub struct Supervisor {
    jobs: Vec<Job>,
    kind: String,
}

impl Supervisor {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            jobs,
            kind: DEFAULT_KIND.to_string(),
        }
    }

    /// Set the word used for jobs in `[META]` lines (`launching APRA scraper`).
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Run every job to completion, writing the combined output to `out`.
    ///
    /// The summary line is always the last line written. The output stream is
    /// handed back once everything has been flushed.
    pub async fn run<W>(&self, out: W) -> Result<(Outcome, W)>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let run_id = RunId::new_v4();
        let span = info_span!("run", %run_id, jobs = self.jobs.len());
        async move {
            let (printer, finished) = PrinterHandle::spawn(out);
            let outcome = self.supervise(&printer).await;
            if outcome.succeeded() {
                printer.meta(format!("all {}s finished successfully", self.kind)).await;
            } else {
                printer.meta(format!("one or more {}s failed", self.kind)).await;
            }
            drop(printer);

            let out = finished
                .await
                .map_err(|_| Error::TaskPanicked("printer"))?
                .map_err(Error::Output)?;
            info!(succeeded = outcome.succeeded(), "run finished");
            Ok((outcome, out))
        }
        .instrument(span)
        .await
    }

    async fn supervise(&self, printer: &PrinterHandle) -> Outcome {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let mut table = JobTable::new(&self.jobs);

        for (index, job) in self.jobs.iter().enumerate() {
            printer.meta(format!("launching {} {}", job.name(), self.kind)).await;
            match WorkerHandle::spawn(index, job, printer.clone(), events_tx.clone()) {
                Ok(worker) => {
                    debug!(job = job.name(), pid = ?worker.pid(), "job started");
                    table.launched(index, worker);
                }
                Err(err) => {
                    warn!(job = job.name(), program = job.program(), %err, "failed to start job");
                    let status = JobStatus::NotStarted { kind: err.kind() };
                    self.record(&mut table, printer, index, status).await;
                }
            }
        }
        // only workers hold senders from here on
        drop(events_tx);

        while table.has_pending() {
            match events_rx.recv().await {
                Some(WorkerEvent::Finished { index, status }) => {
                    self.record(&mut table, printer, index, status).await;
                }
                None => {
                    for index in table.pending() {
                        warn!(job = ?table.name(index), "worker exited without reporting");
                        self.record(&mut table, printer, index, JobStatus::Lost).await;
                    }
                }
            }
        }

        table.into_outcome()
    }

    async fn record(
        &self,
        table: &mut JobTable,
        printer: &PrinterHandle,
        index: usize,
        status: JobStatus,
    ) {
        let pid = table.pid(index);
        let Some(state) = table.finish(index, status) else {
            return;
        };
        let name = table.name(index).unwrap_or_default();
        debug!(job = name, ?pid, ?status, "job recorded");
        if let JobState::Failed(code) = state {
            printer.meta(format!("{} {} failed (exit {})", name, self.kind, code)).await;
        }
    }
}
