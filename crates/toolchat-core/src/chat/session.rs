//! Interactive chat session
//!
//! Drives the conversation loop: read a line, ask the model, run any tool
//! calls it requests one after another, ask the model again for a summary,
//! and keep the history consistent when any of those steps fails.

use std::borrow::Cow;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::log_info;
use crate::logging::Logger;
use crate::providers::{AssistantReply, CompletionOptions, Provider, ProviderModelConfig};
use crate::tools::{ToolError, ToolRegistry};
use crate::types::{Message, ToolCallRequest};

use super::history::ConversationHistory;
use super::turn::{tool_failure_reply, TurnError, TurnOutcome, TurnResult, MALFORMED_ARGUMENTS_REPLY};

/// Errors that end a session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to discover tools: {0}")]
    Discovery(#[source] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Whether a line asks to end the session
pub fn is_exit_command(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit")
}

/// A single chat session against one model and one tool registry
pub struct ChatSession {
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    registry: ToolRegistry,
    /// Sampling options; tool fields are set per request
    options: CompletionOptions,
    history: ConversationHistory,
    logger: Arc<dyn Logger>,
}

impl ChatSession {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: ProviderModelConfig,
        registry: ToolRegistry,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            provider,
            model,
            registry,
            options: CompletionOptions::default(),
            history: ConversationHistory::new(),
            logger,
        }
    }

    /// Set sampling options
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options.without_tools();
        self
    }

    /// Replace the history, e.g. to seed a system prompt or earlier turns
    pub fn with_history(mut self, history: ConversationHistory) -> Self {
        self.history = history;
        self
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Discover tools; must succeed before the first turn
    pub async fn start(&self) -> SessionResult<usize> {
        self.registry.refresh().await.map_err(SessionError::Discovery)
    }

    /// Handle one line of user input
    ///
    /// Never fails: every in-turn error is folded into the returned outcome
    /// and the history is left in a consistent state.
    pub async fn handle_input(&mut self, line: &str) -> TurnOutcome {
        if is_exit_command(line) {
            return TurnOutcome::Exit;
        }

        let checkpoint = self.history.checkpoint();
        self.history.push(Message::user(line));

        match self.run_turn().await {
            Ok(outcome) => outcome,
            Err(error) => {
                self.history.rollback_to(checkpoint);
                self.recover(error)
            }
        }
    }

    async fn run_turn(&mut self) -> TurnResult<TurnOutcome> {
        let options = self.options.clone().with_tools(self.registry.descriptors());
        let reply = self.complete(&options).await?;

        if !reply.has_tool_calls() {
            let content = reply.content_or_empty().to_string();
            self.history.push(reply.into_message());
            return Ok(TurnOutcome::Reply(content));
        }

        let calls = reply.tool_calls.clone();
        self.logger.info(&format!(
            "Model decided to call {} tool(s): {}",
            calls.len(),
            calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
        ));
        self.history.push(reply.into_message());

        for call in &calls {
            let output = self.dispatch(call).await?;
            self.history.push(Message::tool_result(call, output));
        }

        let options = self.options.clone().without_tools();
        let summary = self.complete(&options).await?;
        let content = summary.content_or_empty().to_string();
        self.history.push(summary.into_message());

        Ok(TurnOutcome::ToolReply {
            content,
            tool_calls: calls.len(),
        })
    }

    async fn complete(&self, options: &CompletionOptions) -> TurnResult<AssistantReply> {
        self.provider
            .complete(self.history.as_slice(), &self.model, options)
            .await
            .map_err(TurnError::Transport)
    }

    async fn dispatch(&self, call: &ToolCallRequest) -> TurnResult<String> {
        log_info!(self.logger, "  Tool Name: {}", call.name);
        log_info!(self.logger, "  Tool Arguments (string): {}", call.arguments);

        let arguments = call
            .parse_arguments()
            .map_err(|source| TurnError::MalformedArguments {
                tool: call.name.clone(),
                arguments: call.arguments.clone(),
                source,
            })?;
        log_info!(self.logger, "  Tool Arguments (parsed): {}", arguments);

        log_info!(self.logger, "Calling tool '{}' with args {}...", call.name, arguments);
        let output = self
            .registry
            .call_tool(&call.name, arguments)
            .await
            .map_err(|source| TurnError::ToolFailed {
                tool: call.name.clone(),
                source,
            })?;
        log_info!(self.logger, "Tool '{}' output: {}", call.name, output);

        Ok(output.content)
    }

    /// Turn a failed turn into its outcome; the history is already rolled back
    ///
    /// The diagnostic is part of the conversation, so it is logged at info
    /// level and shows on stdout next to the replies.
    fn recover(&mut self, error: TurnError) -> TurnOutcome {
        self.logger.info(&error.to_string());

        match error {
            TurnError::Transport(source) => TurnOutcome::Discarded(source.to_string()),
            TurnError::MalformedArguments { .. } => {
                self.history.push(Message::assistant(MALFORMED_ARGUMENTS_REPLY));
                TurnOutcome::Recovered(MALFORMED_ARGUMENTS_REPLY.to_string())
            }
            TurnError::ToolFailed { source, .. } => {
                let text = tool_failure_reply(&source);
                self.history.push(Message::assistant(text.clone()));
                TurnOutcome::Recovered(text)
            }
        }
    }

    /// Run the interactive loop until `exit` or end of input
    ///
    /// Lines that are not valid UTF-8 are decoded lossily instead of ending
    /// the session.
    pub async fn run<R, W>(&mut self, mut input: R, mut output: W) -> SessionResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut raw = Vec::new();
        self.logger.info("--- Starting Chat Session ---");

        loop {
            output.write_all(b"You: ").await?;
            output.flush().await?;

            raw.clear();
            if input.read_until(b'\n', &mut raw).await? == 0 {
                self.logger.debug("[ChatSession] End of input");
                break;
            }
            let line = decode_line(&raw);
            if let Cow::Owned(_) = line {
                self.logger.debug("[ChatSession] Input was not valid UTF-8; replaced invalid bytes");
            }

            let outcome = self.handle_input(&line).await;
            if outcome.is_exit() {
                break;
            }
            if let Some(text) = outcome.assistant_text() {
                output.write_all(format!("Assistant: {}\n", text).as_bytes()).await?;
                output.flush().await?;
            }
        }

        Ok(())
    }
}

/// Strip the line terminator (`\n` or `\r\n`) and decode
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line)
}
