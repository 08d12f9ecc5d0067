// Chat assistant
// Implements: request validation, system prompt assembly, upstream relay.
// All upstream calls go through llm_client; nothing here talks HTTP outbound.

pub mod handlers;
pub mod models;
pub mod prompts;
pub mod relay;
