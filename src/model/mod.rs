mod openai;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::web::models::Message;

pub use openai::OpenAiClient;

/// Incremental assistant text, in the order the provider produced it.
pub type DeltaStream = BoxStream<'static, Result<String, UpstreamError>>;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to completion API failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("completion stream broke: {0}")]
    Stream(String),
    #[error("could not decode completion chunk: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("completion API error: {0}")]
    Provider(String),
}

/// Anything that can turn a prompt into a stream of reply deltas.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Resolves once the provider has accepted the request; errors before that
    /// point are returned here, later ones arrive through the stream.
    async fn stream_chat(&self, messages: Vec<Message>) -> Result<DeltaStream, UpstreamError>;
}
