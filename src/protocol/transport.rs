//! # Protocol transport.
//!
//! [`Transport`] is the seam between the event loop and the supervisor: it
//! receives one [`Envelope`] at a time and writes acknowledgments.
//! [`StdioTransport`] implements it over any async reader/writer pair; in
//! production that pair is the process's stdin/stdout.
//!
//! ## Rules
//! - `recv()` writes and flushes `READY\n` before blocking on the header line.
//! - End of input before a full frame maps to [`ListenerError::Closed`].
//! - `ack()` flushes the token before returning.

use async_trait::async_trait;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::{Ack, Envelope, Headers, READY_TOKEN};
use crate::error::ListenerError;

/// Receive/acknowledge seam of the event listener protocol.
#[async_trait]
pub trait Transport: Send {
    /// Announces readiness and blocks until the next event arrives.
    async fn recv(&mut self) -> Result<Envelope, ListenerError>;

    /// Writes an acknowledgment for the event last received.
    async fn ack(&mut self, ack: Ack) -> Result<(), ListenerError>;
}

/// Stream-backed transport.
pub struct StdioTransport<R, W> {
    reader: R,
    writer: W,
    line: String,
}

impl StdioTransport<io::BufReader<io::Stdin>, io::Stdout> {
    /// Transport over the process's own stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a transport over the given streams.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    async fn write_token(&mut self, token: &[u8], context: &'static str) -> Result<(), ListenerError> {
        self.writer
            .write_all(token)
            .await
            .map_err(ListenerError::io(context))?;
        self.writer.flush().await.map_err(ListenerError::io(context))
    }
}

#[async_trait]
impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Envelope, ListenerError> {
        self.write_token(READY_TOKEN, "writing ready token").await?;

        self.line.clear();
        let n = self
            .reader
            .read_line(&mut self.line)
            .await
            .map_err(ListenerError::io("reading header line"))?;
        if n == 0 {
            return Err(ListenerError::Closed);
        }

        let headers = Headers::parse(&self.line)?;
        let len = headers.payload_len()?;

        // `len` comes off the wire; grow the buffer as bytes arrive.
        let mut payload = Vec::new();
        let read = (&mut self.reader)
            .take(len as u64)
            .read_to_end(&mut payload)
            .await
            .map_err(ListenerError::io("reading payload"))?;
        if read < len {
            return Err(ListenerError::Closed);
        }

        Ok(Envelope::new(headers, String::from_utf8_lossy(&payload)))
    }

    async fn ack(&mut self, ack: Ack) -> Result<(), ListenerError> {
        self.write_token(ack.as_bytes(), "writing acknowledgment").await
    }
}
