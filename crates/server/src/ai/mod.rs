//! General-purpose chat powered by Claude API

pub mod client;
pub mod responder;

pub use client::ClaudeClient;
pub use responder::responder_for;
