mod actor;

use crate::actors::printer::PrinterHandle;
use crate::events::WorkerEvent;
use crate::job::Job;
use actor::Actor;
use std::{io, process::Stdio};
use tokio::{process, sync::mpsc};

/// Handle to a running job's worker.
///
/// The worker owns the child process, forwards its output to the printer line
/// by line and reports a single `WorkerEvent::Finished` once the process has
/// exited and both of its output streams are drained.
#[derive(Debug)]
pub struct WorkerHandle {
    pid: Option<u32>,
}

impl WorkerHandle {
    pub fn spawn(
        index: usize,
        job: &Job,
        printer: PrinterHandle,
        events: mpsc::UnboundedSender<WorkerEvent>,
    ) -> io::Result<Self> {
        let mut command = process::Command::new(job.program());
        let child = command
            .args(job.arguments())
            .current_dir(job.working_dir())
            .envs(job.environment().iter().map(|(key, val)| (key, val)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let pid = child.id();
        Actor::spawn(index, job.shared_name(), child, printer, events);
        Ok(Self { pid })
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}
