//! Event handling and user interactions for chat-mux.
//!
//! This module provides functionality for handling chat events:
//! - Dispatching each incoming message on its own task
//! - Built-in routes (`help`, `ping`, and the fallback reply)

pub mod builtin;
pub mod message;
