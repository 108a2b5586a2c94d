//! Core types for chat and tool interactions
//!
//! This module contains all the shared types used across providers, the tool
//! bridge and the conversation loop.

mod message;
mod tool;

pub use message::{Message, MessageRole};
pub use tool::{FunctionDescriptor, ToolCallRequest, ToolChoice, ToolDescriptor, ToolOutput, ToolSpec};
