//! Minimal client for the Gemini `generateContent` endpoint.

pub mod client;
pub mod types;

pub use client::{CompletionClient, GeminiClient, GeminiError};
