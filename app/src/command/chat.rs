//! Multi-turn chat with the copilot against the demo network.
//!
//! Suggested actions are never executed on their own: the user confirms each
//! one at an `Execute? [y/N]` prompt.

use std::io::Write;

use genre_copilot::{AssistantReply, Copilot};
use genre_core::{ChainClient, LLMProvider};
use tracing::{debug, info};

use super::{build_copilot_config, init_common_components};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
    /// Optional wallet address override
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components()?;
        let copilot_config = build_copilot_config(&common.config, input.model)?;
        let address = input
            .address
            .unwrap_or_else(|| common.config.wallet.address.clone());

        info!("Starting chat for {address}");
        let mut copilot = Copilot::new(common.provider, common.chain, copilot_config);

        if let Some(msg) = input.message {
            let reply = copilot.ask(&msg, &address).await?;
            print_reply(&reply);
            confirm_and_execute(&copilot, &reply, &address).await?;
        } else {
            run_interactive(&mut copilot, &address).await?;
        }

        Ok(())
    }
}

async fn run_interactive<P, C>(copilot: &mut Copilot<P, C>, address: &str) -> anyhow::Result<()>
where
    P: LLMProvider + Send + Sync,
    C: ChainClient + Send + Sync,
{
    println!("=== {} ===", copilot.config().assistant_name);
    println!("Wallet: {address}");
    println!("Type 'exit', 'quit' or Ctrl+C to leave, '/reset' to start over.\n");

    loop {
        let Some(input) = prompt("> ")? else {
            break;
        };

        if matches!(input.as_str(), "exit" | "quit" | "q") {
            println!(
                "\nSession ended. Total turns: {}",
                copilot.session().message_count() / 2
            );
            break;
        }

        if input == "/reset" {
            copilot.reset();
            println!("Conversation cleared.\n");
            continue;
        }

        if input.is_empty() {
            continue;
        }

        match copilot.ask(&input, address).await {
            Ok(reply) => {
                print_reply(&reply);
                if let Err(e) = confirm_and_execute(copilot, &reply, address).await {
                    eprintln!("Error: {e}");
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                if e.is_transient() {
                    eprintln!("(temporary failure, try again)");
                }
            }
        }
    }

    Ok(())
}

fn print_reply(reply: &AssistantReply) {
    println!("\n{}\n", reply.text);

    if let Some(action) = &reply.action {
        println!("Suggested action: {action}");
    }
    if !reply.suggestions.is_empty() {
        println!("Try asking:");
        for suggestion in &reply.suggestions {
            println!("  - {suggestion}");
        }
    }
    println!();

    if let Some(usage) = &reply.usage {
        debug!(
            "Tokens: {} prompt + {} completion = {} total",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }
}

async fn confirm_and_execute<P, C>(
    copilot: &Copilot<P, C>,
    reply: &AssistantReply,
    address: &str,
) -> anyhow::Result<()>
where
    P: LLMProvider + Send + Sync,
    C: ChainClient + Send + Sync,
{
    let Some(action) = &reply.action else {
        return Ok(());
    };

    let answer = prompt("Execute? [y/N] ")?.unwrap_or_default();
    if !answer.eq_ignore_ascii_case("y") {
        println!("Skipped.\n");
        return Ok(());
    }

    let tx = copilot.execute(action, address).await?;
    println!("Submitted {} ({tx})\n", action.kind());
    Ok(())
}

/// Read one trimmed line; `None` on end of input.
fn prompt(label: &str) -> anyhow::Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
