//! Trivia question source.
//!
//! The HTTP adapter owns transport only: request timeout, status mapping and
//! JSON decoding into a [`TriviaQuestion`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::games::models::TriviaQuestion;

/// Errors raised while fetching a question
#[derive(Debug, thiserror::Error)]
pub enum TriviaError {
    #[error("trivia request failed: {0}")]
    Transport(String),

    #[error("trivia provider answered with status {0}")]
    Status(u16),

    #[error("trivia provider returned no question")]
    Empty,
}

/// Port for fetching one trivia question
#[async_trait]
pub trait TriviaProvider: Send + Sync {
    async fn fetch_question(&self) -> Result<TriviaQuestion, TriviaError>;
}

/// Trivia provider that calls a JSON endpoint returning a list of questions
pub struct HttpTriviaProvider {
    client: Client,
    endpoint: String,
}

impl HttpTriviaProvider {
    /// Build a provider whose requests are bounded by `timeout`
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl TriviaProvider for HttpTriviaProvider {
    async fn fetch_question(&self) -> Result<TriviaQuestion, TriviaError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| TriviaError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Trivia provider returned status {}", status);
            return Err(TriviaError::Status(status.as_u16()));
        }

        let questions: Vec<TriviaQuestion> = response
            .json()
            .await
            .map_err(|e| TriviaError::Transport(e.to_string()))?;

        questions.into_iter().next().ok_or(TriviaError::Empty)
    }
}
