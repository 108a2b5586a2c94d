//! Conversation loop
//!
//! ```rust,ignore
//! let registry = ToolRegistry::new(Arc::new(mcp_client), logger.clone());
//! let mut session = ChatSession::new(provider, model, registry, logger);
//! session.start().await?;
//! session.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
//! ```

mod history;
mod session;
mod turn;

pub use history::{Checkpoint, ConversationHistory};
pub use session::{is_exit_command, ChatSession, SessionError, SessionResult};
pub use turn::{tool_failure_reply, TurnError, TurnOutcome, TurnResult, MALFORMED_ARGUMENTS_REPLY};
