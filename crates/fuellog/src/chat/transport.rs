//! Delivery of actions and replies.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{debug, info};

use crate::error::Result;
use crate::session::SessionId;

use super::render::render;
use super::{Action, Assistant, Reply};

/// A channel that yields inbound actions and carries replies back.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Wait for the next action. `None` means the peer is gone.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    async fn recv(&mut self) -> Result<Option<Action>>;

    /// Deliver a reply.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    async fn send(&mut self, reply: &Reply) -> Result<()>;
}

enum Line {
    Blank,
    Action(Action),
    UnknownCommand(String),
}

/// `/start` and `/<callback>` are actions, anything else is text.
fn decode_line(line: &str) -> Line {
    let line = line.trim();
    if line.is_empty() {
        return Line::Blank;
    }

    match line.strip_prefix('/') {
        Some("start") => Line::Action(Action::Start),
        Some(command) => Action::from_callback(command)
            .map_or_else(|| Line::UnknownCommand(line.to_string()), Line::Action),
        None => Line::Action(Action::Text(line.to_string())),
    }
}

/// Line-oriented transport over a reader and a writer.
#[derive(Debug)]
pub struct LineTransport<R, W> {
    lines: Lines<R>,
    writer: W,
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Read lines from `reader`, write replies to `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: reader.lines(),
            writer,
        }
    }

    /// Give back the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    async fn write_block(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<R, W> Transport for LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Option<Action>> {
        while let Some(line) = self.lines.next_line().await? {
            match decode_line(&line) {
                Line::Blank => {}
                Line::Action(action) => return Ok(Some(action)),
                Line::UnknownCommand(command) => {
                    debug!("Ignoring unknown command {}", command);
                    self.write_block(&format!(
                        "Unknown command {command}. Send /start to open the main menu."
                    ))
                    .await?;
                }
            }
        }
        Ok(None)
    }

    async fn send(&mut self, reply: &Reply) -> Result<()> {
        self.write_block(&render(reply)).await
    }
}

/// Drive one conversation until the transport closes.
///
/// Opens with the main menu and returns the number of inbound actions
/// handled.
///
/// # Errors
///
/// Returns an error only if the transport fails; handling errors are
/// replies.
pub async fn run_session<T>(
    transport: &mut T,
    assistant: &mut Assistant,
    session: &SessionId,
    user_id: &str,
) -> Result<usize>
where
    T: Transport + ?Sized,
{
    info!("Session {} opened for user {}", session, user_id);
    let greeting = assistant.handle(session, user_id, Action::Start);
    transport.send(&greeting).await?;

    let mut handled = 0;
    while let Some(action) = transport.recv().await? {
        let reply = assistant.handle(session, user_id, action);
        transport.send(&reply).await?;
        handled += 1;
    }

    info!("Session {} closed after {} actions", session, handled);
    Ok(handled)
}
