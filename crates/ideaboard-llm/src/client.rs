use std::time::Duration;

use ideaboard_core::{
  conversation::Turn,
  model::{ChatModel, ModelError},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const REQUEST_TIMEOUT_SECS: u64 = 120;
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1500;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
  pub api_key:  String,
  pub model:    String,
  pub base_url: String,
}

impl OpenAiConfig {
  /// Defaults for everything but the key.
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:  api_key.into(),
      model:    DEFAULT_MODEL.to_owned(),
      base_url: DEFAULT_BASE_URL.to_owned(),
    }
  }
}

#[derive(Clone)]
pub struct OpenAiClient {
  http:   Client,
  config: OpenAiConfig,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
  model:       &'a str,
  messages:    &'a [Turn],
  temperature: f32,
  max_tokens:  u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

impl CompletionResponse {
  fn into_reply(self) -> Result<String> {
    self
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .map(|content| content.trim().to_owned())
      .filter(|content| !content.is_empty())
      .ok_or(Error::NoContent)
  }
}

impl OpenAiClient {
  pub fn new(config: OpenAiConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
      .build()?;
    Ok(Self { http, config })
  }

  fn completions_url(&self) -> String {
    format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
  }

  async fn request(&self, turns: &[Turn]) -> Result<String> {
    let body = CompletionRequest {
      model:       &self.config.model,
      messages:    turns,
      temperature: TEMPERATURE,
      max_tokens:  MAX_TOKENS,
    };

    let resp = self
      .http
      .post(self.completions_url())
      .bearer_auth(&self.config.api_key)
      .json(&body)
      .send()
      .await?;

    if !resp.status().is_success() {
      let status = resp.status().as_u16();
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status, body });
    }

    let completion: CompletionResponse = resp.json().await?;
    let reply = completion.into_reply()?;
    tracing::debug!(model = %self.config.model, chars = reply.chars().count(), "completion received");
    Ok(reply)
  }
}

impl ChatModel for OpenAiClient {
  async fn complete(&self, turns: &[Turn]) -> Result<String, ModelError> {
    Ok(self.request(turns).await?)
  }
}
