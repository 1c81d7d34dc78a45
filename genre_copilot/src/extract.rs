//! Pulls a `$$$`-delimited action payload out of assistant text.
//!
//! Model output is free text, so finding a payload is best effort: a missing
//! or malformed payload simply means "no action". Malformed payloads are
//! reported as a `genre::extract` warning event and never reach the caller.

use std::sync::OnceLock;

use genre_core::{ActionPayload, SuggestedAction};
use regex::Regex;
use tracing::{debug, warn};

const DELIMITER: &str = "$$$";

static ACTION_SPAN: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn action_span() -> &'static Regex {
    ACTION_SPAN.get_or_init(|| {
        Regex::new(r"(?s)\$\$\$(.*?)\$\$\$").expect("Static regex pattern is guaranteed to be valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Assistant text with every payload span removed, trimmed.
    pub text: String,
    pub action: Option<SuggestedAction>,
}

fn parse_payload(raw: &str) -> Option<SuggestedAction> {
    let payload: ActionPayload = match serde_json::from_str(raw.trim()) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(target: "genre::extract", error = %e, payload = raw, "discarding malformed action payload");
            return None;
        }
    };

    match SuggestedAction::try_from(&payload) {
        Ok(action) => {
            debug!(target: "genre::extract", kind = action.kind(), "extracted action");
            Some(action)
        }
        Err(e) => {
            warn!(target: "genre::extract", error = %e, kind = %payload.kind, "discarding invalid action payload");
            None
        }
    }
}

/// Split raw assistant output into display text and an optional action.
///
/// Only the first span is parsed; every span is stripped from the text.
#[must_use]
pub fn extract_action(raw: &str) -> Extraction {
    let action = action_span()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_payload(m.as_str()));

    let stripped = action_span().replace_all(raw, "");
    // An unpaired marker cannot be matched as a span but must not leak either.
    let text = stripped.replace(DELIMITER, "").trim().to_string();

    Extraction { text, action }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_stake_action() {
        let raw = "The current APY is 15%.\n$$${\"type\":\"stake\",\"params\":{\"amount\":\"10\"}}$$$";
        let extraction = extract_action(raw);

        assert_eq!(
            extraction.action,
            Some(SuggestedAction::Stake {
                amount: "10".to_string()
            })
        );
        assert_eq!(extraction.text, "The current APY is 15%.");
        assert!(!extraction.text.contains('$'));
    }

    #[test]
    fn payload_may_span_lines() {
        let raw = "Sure.\n$$${\n  \"type\": \"swap\",\n  \"params\": {\"fromToken\": \"ROOT\", \"toToken\": \"TRN\", \"amount\": \"100\"}\n}$$$\nConfirm?";
        let extraction = extract_action(raw);

        assert_eq!(
            extraction.action,
            Some(SuggestedAction::Swap {
                from_token: "ROOT".to_string(),
                to_token: "TRN".to_string(),
                amount: "100".to_string(),
            })
        );
        assert_eq!(extraction.text, "Sure.\n\nConfirm?");
    }

    #[test]
    fn malformed_payload_yields_no_action() {
        let raw = "Let's stake. $$${type: stake, params}$$$";
        let extraction = extract_action(raw);

        assert!(extraction.action.is_none());
        assert_eq!(extraction.text, "Let's stake.");
    }

    #[test]
    fn unknown_kind_yields_no_action() {
        let raw = "$$${\"type\":\"bridge\",\"params\":{}}$$$ Bridging soon.";
        let extraction = extract_action(raw);

        assert!(extraction.action.is_none());
        assert_eq!(extraction.text, "Bridging soon.");
    }

    #[test]
    fn no_payload_returns_trimmed_text() {
        let extraction = extract_action("  Hello there!  \n");
        assert!(extraction.action.is_none());
        assert_eq!(extraction.text, "Hello there!");
    }

    #[test]
    fn only_first_span_is_parsed_but_all_are_removed() {
        let raw = "A $$${\"type\":\"unstake\",\"params\":{\"amount\":\"1\"}}$$$ B $$${\"type\":\"stake\",\"params\":{\"amount\":\"2\"}}$$$ C";
        let extraction = extract_action(raw);

        assert_eq!(
            extraction.action,
            Some(SuggestedAction::Unstake {
                amount: "1".to_string()
            })
        );
        assert_eq!(extraction.text, "A  B  C");
    }

    #[test]
    fn unpaired_marker_is_removed() {
        let extraction = extract_action("Costs $$$ a lot");
        assert!(extraction.action.is_none());
        assert!(!extraction.text.contains(DELIMITER));
    }
}
