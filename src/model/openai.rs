use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::{future, StreamExt};
use log::{debug, info};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionBackend, DeltaStream, UpstreamError};
use crate::config::Config;
use crate::web::models::Message;

const DONE_SENTINEL: &str = "[DONE]";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let url = format!("{}/chat/completions", config.base_url);
        info!("Using completion API at: {} (model {})", url, config.model);

        // No overall timeout: a reply streams for as long as the provider keeps
        // producing tokens.
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn stream_chat(&self, messages: Vec<Message>) -> Result<DeltaStream, UpstreamError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: &messages,
            stream: true,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("Sending {} messages to completion API", messages.len());

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "text/event-stream")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        let deltas = response
            .bytes_stream()
            .eventsource()
            .take_while(|event| future::ready(!is_done(event)))
            .filter_map(|event| future::ready(decode_event(event).transpose()))
            .boxed();

        Ok(deltas)
    }
}

fn is_done<E>(event: &Result<Event, E>) -> bool {
    matches!(event, Ok(event) if event.data.trim() == DONE_SENTINEL)
}

/// Turns one upstream SSE event into a delta. Events without assistant text
/// (role announcements, finish markers, keep-alives) yield `None`.
fn decode_event(
    event: Result<Event, EventStreamError<reqwest::Error>>,
) -> Result<Option<String>, UpstreamError> {
    let event = event.map_err(|e| UpstreamError::Stream(e.to_string()))?;
    if event.data.trim().is_empty() {
        return Ok(None);
    }

    let chunk: ChatCompletionChunk = serde_json::from_str(&event.data)?;
    if let Some(error) = chunk.error {
        return Err(UpstreamError::Provider(error.message));
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}
