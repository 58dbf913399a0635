use super::messages::Message;

use bytes::{BufMut, BytesMut};
use std::io;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::mpsc,
    task::JoinHandle,
};

pub struct Actor<W> {
    inbox: mpsc::Receiver<Message>,
    out: W,
}

impl<W> Actor<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn spawn(inbox: mpsc::Receiver<Message>, out: W) -> JoinHandle<io::Result<W>> {
        let actor = Self { inbox, out };
        tokio::spawn(async move { actor.run().await })
    }

    async fn run(mut self) -> io::Result<W> {
        while let Some(msg) = self.inbox.recv().await {
            match msg {
                Message::Line { tag, data } => self.write_line(&tag, &data).await?,
            }
        }
        self.out.flush().await?;
        Ok(self.out)
    }

    /// Assemble the whole line first so it reaches the stream in one write.
    async fn write_line(&mut self, tag: &str, data: &[u8]) -> io::Result<()> {
        let mut line = BytesMut::with_capacity(tag.len() + data.len() + 4);
        line.put_u8(b'[');
        line.put_slice(tag.as_bytes());
        line.put_slice(b"] ");
        line.put_slice(data);
        line.put_u8(b'\n');
        self.out.write_all(&line).await?;
        self.out.flush().await
    }
}
