use async_trait::async_trait;
use genre_core::{ChatMessage, CompletionParams, LLMProvider, LLMResponse, ProviderError, Usage};
use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::retry::{RetryPolicy, retry_with_backoff};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating OpenAiProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn build_request(messages: &[ChatMessage], params: &CompletionParams) -> serde_json::Value {
        json!({
            "model": params.model,
            "messages": messages,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
            "top_p": params.top_p,
            "frequency_penalty": params.frequency_penalty,
            "presence_penalty": params.presence_penalty,
        })
    }

    fn parse_response(response: &serde_json::Value) -> Result<LLMResponse, ProviderError> {
        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ProviderError::InvalidResponse("missing content".to_string()))?
            .to_string();

        let usage = response["usage"].as_object().map(|u| {
            let count = |field: &str| {
                u.get(field)
                    .and_then(serde_json::Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(0)
            };
            Usage {
                prompt_tokens: count("prompt_tokens"),
                completion_tokens: count("completion_tokens"),
                total_tokens: count("total_tokens"),
            }
        });

        Ok(LLMResponse { content, usage })
    }

    /// Helper method to send a single request
    async fn try_send(&self, request: &serde_json::Value) -> Result<LLMResponse, ProviderError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Self::parse_response(&body)
    }
}

#[async_trait]
impl LLMProvider for OpenAiProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<LLMResponse, ProviderError> {
        let request = Self::build_request(messages, params);

        info!(
            "Sending request to completion endpoint: model={}, messages={}",
            params.model,
            messages.len()
        );

        let response = retry_with_backoff(
            || self.try_send(&request),
            &self.retry,
            ProviderError::is_transient,
        )
        .await?;

        info!("Received response from completion endpoint");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Consume one HTTP request (headers plus `content-length` body).
    async fn read_request(socket: &mut TcpStream) {
        let mut request = Vec::new();
        let mut chunk = [0_u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&request);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= header_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    /// Serve every connection with the same canned response; returns the
    /// base URL and a connection counter.
    async fn serve(status_line: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let seen = connections.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                seen.fetch_add(1, Ordering::SeqCst);
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        (format!("http://{addr}/v1"), connections)
    }

    fn local_provider(base_url: String) -> OpenAiProvider {
        OpenAiProvider {
            client: Client::builder().no_proxy().build().unwrap(),
            ..OpenAiProvider::new("sk-invalid".to_string())
        }
        .with_base_url(base_url)
    }

    #[tokio::test]
    async fn error_status_keeps_upstream_body() {
        let (base_url, connections) = serve(
            "401 Unauthorized",
            r#"{"error":{"message":"Incorrect API key provided"}}"#,
        )
        .await;
        let provider = local_provider(base_url);

        let err = provider
            .chat(&[ChatMessage::user("hi")], &CompletionParams::new("gpt-4"))
            .await
            .unwrap_err();

        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Incorrect API key provided"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Default policy: a single attempt.
        assert_eq!(connections.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn server_errors_are_retried_up_to_the_budget() {
        let (base_url, connections) =
            serve("503 Service Unavailable", r#"{"error":"overloaded"}"#).await;
        let provider = local_provider(base_url)
            .with_retry_policy(RetryPolicy::new(3, vec![Duration::from_millis(1)]));

        let err = provider
            .chat(&[ChatMessage::user("hi")], &CompletionParams::new("gpt-4"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Status { status: 503, .. }));
        assert!(err.is_transient());
        assert_eq!(connections.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn success_body_is_parsed() {
        let (base_url, _) = serve(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#,
        )
        .await;
        let response = local_provider(base_url)
            .chat(&[ChatMessage::user("hi")], &CompletionParams::new("gpt-4"))
            .await
            .unwrap();

        assert_eq!(response.content, "hello");
        assert!(response.usage.is_none());
    }

    #[test]
    fn request_carries_messages_and_sampling() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let request = OpenAiProvider::build_request(&messages, &CompletionParams::new("gpt-4"));

        assert_eq!(request["model"], "gpt-4");
        assert_eq!(request["messages"][0]["role"], "system");
        assert_eq!(request["messages"][1]["content"], "hi");
        assert_eq!(request["temperature"], 0.7);
        assert_eq!(request["max_tokens"], 500);
        assert_eq!(request["top_p"], 1.0);
        assert_eq!(request["frequency_penalty"], 0.0);
        assert_eq!(request["presence_penalty"], 0.0);
    }

    #[test]
    fn parses_first_choice_and_usage() {
        let body = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "Staking APY is 15%."}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ],
            "usage": {"prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128}
        });
        let response = OpenAiProvider::parse_response(&body).unwrap();
        assert_eq!(response.content, "Staking APY is 15%.");
        let usage = response.usage.unwrap();
        assert_eq!(usage.total_tokens, 128);
    }

    #[test]
    fn missing_content_is_invalid() {
        let body = json!({"choices": []});
        assert!(matches!(
            OpenAiProvider::parse_response(&body),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let provider =
            OpenAiProvider::new("key".to_string()).with_base_url("http://localhost:8080/v1/".to_string());
        assert_eq!(provider.base_url, "http://localhost:8080/v1");
    }
}
