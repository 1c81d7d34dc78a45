//! The chat-turn pipeline.
//!
//! `ask` runs one turn: assemble context, render the system prompt, call the
//! model, extract any suggested action and build follow-up suggestions. It
//! never touches the chain's write side. Dispatch happens only through
//! `execute` / `execute_payload`, after the user has confirmed.

use std::sync::Arc;

use genre_core::{
    ActionPayload, ChainClient, CompletionParams, LLMProvider, SuggestedAction, TxHash, Usage,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::context::ContextAssembler;
use crate::dispatch::{ActionDispatcher, DEFAULT_SLIPPAGE_PERCENT};
use crate::extract::extract_action;
use crate::history::{DEFAULT_HISTORY_LIMIT, HistoryStats, HistoryWindow};
use crate::prompt::{DEFAULT_ASSISTANT_NAME, PromptBuilder};
use crate::session::ConversationSession;
use crate::suggestions::SuggestionGenerator;
use crate::CopilotError;

#[derive(Debug, Clone)]
pub struct CopilotConfig {
    pub params: CompletionParams,
    /// Transcript turns sent per request, counting the new user message.
    pub history_limit: usize,
    pub assistant_name: String,
    pub slippage_percent: Decimal,
    pub suggestions: SuggestionGenerator,
}

impl Default for CopilotConfig {
    fn default() -> Self {
        Self {
            params: CompletionParams::new("gpt-4"),
            history_limit: DEFAULT_HISTORY_LIMIT,
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            slippage_percent: DEFAULT_SLIPPAGE_PERCENT,
            suggestions: SuggestionGenerator::default(),
        }
    }
}

impl CopilotConfig {
    #[must_use]
    pub fn with_params(mut self, params: CompletionParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub const fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    #[must_use]
    pub fn with_assistant_name(mut self, name: String) -> Self {
        self.assistant_name = name;
        self
    }

    #[must_use]
    pub const fn with_slippage_percent(mut self, slippage_percent: Decimal) -> Self {
        self.slippage_percent = slippage_percent;
        self
    }

    #[must_use]
    pub fn with_suggestions(mut self, suggestions: SuggestionGenerator) -> Self {
        self.suggestions = suggestions;
        self
    }
}

/// What the user sees for one turn.
#[derive(Debug, Clone)]
pub struct AssistantReply {
    /// Model text with any action payload removed.
    pub text: String,
    pub action: Option<SuggestedAction>,
    pub suggestions: Vec<String>,
    pub usage: Option<Usage>,
}

pub struct Copilot<P = Arc<dyn LLMProvider>, C = Arc<dyn ChainClient>>
where
    P: Send + Sync,
    C: Send + Sync,
{
    provider: P,
    chain: C,
    config: CopilotConfig,
    prompt: PromptBuilder,
    window: HistoryWindow,
    session: ConversationSession,
}

impl<P, C> Copilot<P, C>
where
    P: LLMProvider + Send + Sync,
    C: ChainClient + Send + Sync,
{
    pub fn new(provider: P, chain: C, config: CopilotConfig) -> Self {
        info!(
            "Creating copilot: model={}, history_limit={}",
            config.params.model, config.history_limit
        );
        Self {
            provider,
            chain,
            prompt: PromptBuilder::new(config.assistant_name.clone()),
            window: HistoryWindow::new(config.history_limit),
            config,
            session: ConversationSession::new(),
        }
    }

    /// Run one chat turn for `address`.
    ///
    /// The transcript only grows once the model has answered, so a failed or
    /// abandoned turn leaves it untouched.
    pub async fn ask(
        &mut self,
        message: &str,
        address: &str,
    ) -> Result<AssistantReply, CopilotError> {
        info!(
            "Processing message for {address} (session {}, {} prior turns)",
            self.session.id,
            self.session.message_count()
        );

        let (market, user) = ContextAssembler::new(&self.chain).assemble(address).await?;
        let system_prompt = self.prompt.build(&market, &user);

        let messages =
            self.window
                .build_llm_messages(&system_prompt, self.session.messages(), message);
        let stats = HistoryStats::of(&messages[1..]);
        debug!(
            "Sending {} messages to the model ({} user, {} assistant, ~{} tokens of transcript)",
            messages.len(),
            stats.user_messages,
            stats.assistant_messages,
            stats.estimated_tokens
        );

        let response = self.provider.chat(&messages, &self.config.params).await?;

        let extraction = extract_action(&response.content);
        let suggestions = self.config.suggestions.generate(message, &market);

        self.session
            .record_exchange(message.to_string(), response.content);

        if let Some(action) = &extraction.action {
            info!("Model suggested action: {action}");
        }

        Ok(AssistantReply {
            text: extraction.text,
            action: extraction.action,
            suggestions,
            usage: response.usage,
        })
    }

    /// Dispatch a confirmed action and return the transaction hash.
    pub async fn execute(
        &self,
        action: &SuggestedAction,
        address: &str,
    ) -> Result<TxHash, CopilotError> {
        self.dispatcher().dispatch(action, address).await
    }

    /// Validate and dispatch an action received in wire form.
    pub async fn execute_payload(
        &self,
        payload: &ActionPayload,
        address: &str,
    ) -> Result<TxHash, CopilotError> {
        self.dispatcher().dispatch_payload(payload, address).await
    }

    /// Forget the transcript.
    pub fn reset(&mut self) {
        info!("Clearing transcript for session {}", self.session.id);
        self.session.clear();
    }

    #[must_use]
    pub const fn session(&self) -> &ConversationSession {
        &self.session
    }

    #[must_use]
    pub const fn config(&self) -> &CopilotConfig {
        &self.config
    }

    fn dispatcher(&self) -> ActionDispatcher<'_, C> {
        ActionDispatcher::new(&self.chain).with_slippage_percent(self.config.slippage_percent)
    }
}
