mod actor;
mod messages;

use crate::types::{JobName, OutputLine};
use actor::Actor;
use messages::Message;
use std::io;
use tokio::{io::AsyncWrite, sync::mpsc, task::JoinHandle};

/// Tag used for the supervisor's own lines.
const META_TAG: &str = "META";

/// Lines that may be queued before senders have to wait for the printer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// A `Printer` which owns the combined output stream and writes tagged lines to it one at a time.
///
/// This struct is actually an actor handle. Clones share the same printer; the
/// printer finishes once every handle has been dropped, and the returned join
/// handle then yields the output stream back.
///
/// The queue is bounded: when the output stream falls behind, senders wait,
/// which in turn stops the workers from reading their children's pipes.
#[derive(Clone)]
pub struct PrinterHandle {
    sender: mpsc::Sender<Message>,
    meta_tag: JobName,
}

impl PrinterHandle {
    pub fn spawn<W>(out: W) -> (Self, JoinHandle<io::Result<W>>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self::with_capacity(out, DEFAULT_QUEUE_CAPACITY)
    }

    /// Spawn a printer whose queue holds at most `capacity` lines.
    pub fn with_capacity<W>(out: W, capacity: usize) -> (Self, JoinHandle<io::Result<W>>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (sender, inbox) = mpsc::channel(capacity);
        let finished = Actor::spawn(inbox, out);
        let handle = Self {
            sender,
            meta_tag: META_TAG.into(),
        };
        (handle, finished)
    }

    /// Queue one line of job output, waiting while the queue is full.
    pub async fn line(&self, tag: &JobName, data: OutputLine) {
        let _ = self
            .sender
            .send(Message::Line {
                tag: tag.clone(),
                data,
            })
            .await;
    }

    /// Queue one supervisor line, tagged `[META]`.
    pub async fn meta(&self, text: impl Into<String>) {
        let _ = self
            .sender
            .send(Message::Line {
                tag: self.meta_tag.clone(),
                data: OutputLine::from(text.into()),
            })
            .await;
    }
}
