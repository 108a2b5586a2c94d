//! Tool management module
//!
//! This module provides tool discovery, translation and execution for model
//! tool calling.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ChatSession                                │
//! └─────────────────────────────────────────────┘
//!           │ descriptors() / call_tool()
//!           ▼
//! ┌─────────────────────────────────────────────┐
//! │  ToolRegistry                               │
//! │    - caches ToolSpecs fetched at startup    │
//! │    - bridge: ToolSpec -> ToolDescriptor     │
//! └─────────────────────────────────────────────┘
//!           │ ToolBackend
//!           ▼
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │  McpClient (rmcp)    │  │  LocalToolBackend    │
//! │  tools/list, call    │  │  in-process handlers │
//! └──────────────────────┘  └──────────────────────┘
//! ```

mod backend;
mod bridge;
mod local;
mod registry;

pub use backend::{ToolBackend, ToolError, ToolResult};
pub use bridge::to_descriptors;
pub use local::{LocalToolBackend, RecordedCall};
pub use registry::ToolRegistry;
