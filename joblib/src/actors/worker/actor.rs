use crate::actors::printer::PrinterHandle;
use crate::events::{JobStatus, WorkerEvent};
use crate::lines;
use crate::types::JobName;

use bytes::BytesMut;
use futures::future::join_all;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Child,
    sync::mpsc,
};
use tracing::{debug, warn};

pub struct Actor {
    index: usize,
    name: JobName,
    printer: PrinterHandle,
    events: mpsc::UnboundedSender<WorkerEvent>,
}

impl Actor {
    pub fn spawn(
        index: usize,
        name: JobName,
        child: Child,
        printer: PrinterHandle,
        events: mpsc::UnboundedSender<WorkerEvent>,
    ) {
        let actor = Self {
            index,
            name,
            printer,
            events,
        };
        tokio::spawn(async move { actor.run(child).await });
    }

    async fn run(self, mut child: Child) {
        // pipe stdout and stderr to the printer while the child runs
        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pumps.push(tokio::spawn(forward_lines(
                stdout,
                self.name.clone(),
                self.printer.clone(),
            )));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(tokio::spawn(forward_lines(
                stderr,
                self.name.clone(),
                self.printer.clone(),
            )));
        }

        let status = match child.wait().await {
            Ok(exit_status) => JobStatus::from(exit_status),
            Err(err) => {
                warn!(job = %self.name, %err, "failed to wait for job");
                JobStatus::Lost
            }
        };

        // every output line must be queued before the result is reported
        for pump in join_all(pumps).await {
            if let Err(err) = pump {
                warn!(job = %self.name, %err, "output pump exited unexpectedly");
            }
        }

        debug!(job = %self.name, ?status, "job finished");
        let _ = self.events.send(WorkerEvent::Finished {
            index: self.index,
            status,
        });
    }
}

async fn forward_lines<R>(mut reader: R, name: JobName, printer: PrinterHandle)
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(4096);
    loop {
        match reader.read_buf(&mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                while let Some(line) = lines::next_line(&mut buf) {
                    printer.line(&name, line).await;
                }
            }
            Err(err) => {
                warn!(job = %name, %err, "failed to read job output");
                break;
            }
        }
    }
    if let Some(line) = lines::remainder(&mut buf) {
        printer.line(&name, line).await;
    }
}
