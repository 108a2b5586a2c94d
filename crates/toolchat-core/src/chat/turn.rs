//! Turn results

use thiserror::Error;

use crate::providers::ProviderError;
use crate::tools::ToolError;

/// Assistant text stored when a tool call's arguments cannot be parsed
pub const MALFORMED_ARGUMENTS_REPLY: &str = "I encountered an error processing the tool arguments.";

/// Assistant text stored when a tool call fails
pub fn tool_failure_reply(error: &ToolError) -> String {
    format!("I encountered an error while trying to use a tool: {}", error)
}

/// Why a turn did not complete
#[derive(Error, Debug)]
pub enum TurnError {
    /// The model endpoint could not be reached or returned an error
    #[error("Error calling the model: {0}")]
    Transport(#[source] ProviderError),

    /// The model's argument payload is not valid JSON
    #[error("Malformed JSON arguments for tool '{tool}': {arguments}")]
    MalformedArguments {
        tool: String,
        arguments: String,
        #[source]
        source: serde_json::Error,
    },

    /// The tool call itself failed
    #[error("Error executing tool '{tool}': {source}")]
    ToolFailed {
        tool: String,
        #[source]
        source: ToolError,
    },
}

pub type TurnResult<T> = Result<T, TurnError>;

/// What handling one input line produced
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The user asked to end the session
    Exit,
    /// Plain-text answer
    Reply(String),
    /// Answer produced after running tools
    ToolReply { content: String, tool_calls: usize },
    /// Model call failed; the turn was dropped and nothing was stored
    Discarded(String),
    /// A tool call failed; the turn was replaced by this assistant message
    Recovered(String),
}

impl TurnOutcome {
    /// Assistant text to show the user, if the turn produced any
    pub fn assistant_text(&self) -> Option<&str> {
        match self {
            TurnOutcome::Reply(text) | TurnOutcome::Recovered(text) => Some(text),
            TurnOutcome::ToolReply { content, .. } => Some(content),
            TurnOutcome::Exit | TurnOutcome::Discarded(_) => None,
        }
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, TurnOutcome::Exit)
    }
}
