//! Console transport
//!
//! Line-oriented stand-in for a chat gateway, used by `boshu run`. Every
//! input line is one event from the named user:
//!
//! ```text
//! alice /boshu --limit 2 --deadline 10m
//! bob join msg-1
//! alice cancel msg-1
//! ```
//!
//! Cards and notices are written to stdout as text blocks or JSON lines.

use super::traits::*;
use crate::recruit::command::parse_recruit_command;
use crate::recruit::render::Card;
use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

/// Channel every console event belongs to
pub const CONSOLE_CHANNEL: &str = "console";

/// How cards and notices are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Outbound record written for each chat effect
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Output<'a> {
    Card {
        message: &'a MessageId,
        edited: bool,
        card: &'a Card,
    },
    Ephemeral {
        user: &'a UserId,
        text: &'a str,
    },
    Notice {
        text: &'a str,
    },
}

/// stdin/stdout chat client
#[derive(Clone)]
pub struct ConsoleClient {
    events: Arc<Mutex<mpsc::UnboundedReceiver<InboundEvent>>>,
    next_message_id: Arc<AtomicU64>,
    format: OutputFormat,
}

impl ConsoleClient {
    /// Read events from the process's stdin
    pub fn stdin(format: OutputFormat) -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()), format)
    }

    /// Read events from any line source
    pub fn from_reader<R>(reader: R, format: OutputFormat) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(read_events(reader, sender));

        Self {
            events: Arc::new(Mutex::new(receiver)),
            next_message_id: Arc::new(AtomicU64::new(1)),
            format,
        }
    }

    fn emit(&self, output: &Output<'_>) -> ChatResult<()> {
        let rendered = format_output(output, self.format)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", rendered).map_err(|e| ChatError::Delivery(e.to_string()))
    }
}

async fn read_events<R>(reader: R, sender: mpsc::UnboundedSender<InboundEvent>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let channel = ChannelId(CONSOLE_CHANNEL.to_string());

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read console input: {}", e);
                break;
            }
        };

        match parse_line(&line, &channel) {
            Ok(Some(event)) => {
                if sender.send(event).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("! {}", e),
        }
    }
}

/// Parse one console line into an inbound event.
///
/// Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str, channel: &ChannelId) -> ChatResult<Option<InboundEvent>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (user, rest) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| ChatError::InvalidEvent(format!("missing command after '{}'", line)))?;
    let user = UserId(user.to_string());
    let rest = rest.trim();

    if rest.starts_with('/') {
        return match parse_recruit_command(rest) {
            Ok(Some(args)) => Ok(Some(InboundEvent::Command {
                channel: channel.clone(),
                user,
                args,
            })),
            Ok(None) => Err(ChatError::InvalidEvent(format!("unknown command '{}'", rest))),
            Err(e) => Err(ChatError::InvalidEvent(e.to_string())),
        };
    }

    let mut parts = rest.split_whitespace();
    let action: Action = parts.next().unwrap_or_default().parse()?;
    let message = parts
        .next()
        .ok_or_else(|| ChatError::InvalidEvent(format!("'{}' requires a message id", action)))?;

    Ok(Some(InboundEvent::Interaction {
        message: MessageId(message.to_string()),
        user,
        action,
    }))
}

/// Render an output record in the requested format.
pub fn format_output(output: &Output<'_>, format: OutputFormat) -> ChatResult<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string(output).map_err(|e| ChatError::Delivery(e.to_string()))
        }
        OutputFormat::Text => Ok(format_text(output)),
    }
}

fn format_text(output: &Output<'_>) -> String {
    match output {
        Output::Card {
            message,
            edited,
            card,
        } => {
            let controls = if card.controls.is_empty() {
                "(no controls)".to_string()
            } else {
                card.controls
                    .iter()
                    .map(|c| format!("[{}]", c.label))
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            format!(
                "== {} {} ==\n{}\n{}\n{}:\n{}\n{}\n",
                message,
                if *edited { "(edited)" } else { "(new)" },
                card.title,
                card.description,
                card.participants.name,
                card.participants.value,
                controls
            )
        }
        Output::Ephemeral { user, text } => format!("(only {} sees) {}", user, text),
        Output::Notice { text } => format!(">> {}", text),
    }
}

#[async_trait]
impl ChatClient for ConsoleClient {
    async fn post_card(&self, _channel: &ChannelId, card: &Card) -> ChatResult<MessageId> {
        let id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        let message = MessageId(format!("msg-{}", id));
        self.emit(&Output::Card {
            message: &message,
            edited: false,
            card,
        })?;
        Ok(message)
    }

    async fn edit_card(&self, message: &MessageId, card: &Card) -> ChatResult<()> {
        self.emit(&Output::Card {
            message,
            edited: true,
            card,
        })
    }

    async fn send_ephemeral(
        &self,
        _channel: &ChannelId,
        user: &UserId,
        text: &str,
    ) -> ChatResult<()> {
        self.emit(&Output::Ephemeral { user, text })
    }

    async fn send_notice(&self, _channel: &ChannelId, text: &str) -> ChatResult<()> {
        self.emit(&Output::Notice { text })
    }

    async fn receive_events(&self) -> ChatResult<Vec<InboundEvent>> {
        let mut events = self.events.lock().await;
        let mut batch = Vec::new();

        loop {
            match events.try_recv() {
                Ok(event) => batch.push(event),
                Err(mpsc::error::TryRecvError::Empty) => return Ok(batch),
                Err(mpsc::error::TryRecvError::Disconnected) if batch.is_empty() => {
                    return Err(ChatError::Disconnected)
                }
                Err(mpsc::error::TryRecvError::Disconnected) => return Ok(batch),
            }
        }
    }
}
