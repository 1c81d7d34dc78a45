#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Chat-driven DeFi copilot.
//!
//! Each user message becomes one pipeline run: market and portfolio context
//! is gathered from the chain, rendered into a system prompt, sent with a
//! bounded transcript to the completion endpoint, and the answer is split
//! into display text, an optional suggested action and follow-up prompts.
//!
//! # Key Features
//! - Concurrent context assembly with all-or-nothing failure
//! - Transcript window of the most recent turns
//! - Best-effort `$$$` action extraction with typed validation
//! - Confirmed dispatch with slippage-protected swap and liquidity floors

mod context;
mod copilot;
mod dispatch;
mod error;
mod extract;
mod history;
mod prompt;
mod session;
mod suggestions;

pub use context::ContextAssembler;
pub use copilot::{AssistantReply, Copilot, CopilotConfig};
pub use dispatch::{ActionDispatcher, DEFAULT_SLIPPAGE_PERCENT, apply_slippage};
pub use error::CopilotError;
pub use extract::{Extraction, extract_action};
pub use history::{DEFAULT_HISTORY_LIMIT, HistoryStats, HistoryWindow};
pub use prompt::{DEFAULT_ASSISTANT_NAME, PromptBuilder};
pub use session::ConversationSession;
pub use suggestions::{BASELINE_SUGGESTIONS, MAX_SUGGESTIONS, SuggestionGenerator};
