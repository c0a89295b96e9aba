use anyhow::{Context, Result, bail};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tally_core::Taxonomy;
use tally_ledger::{Classifier, CompletionBackend};
use tracing::{debug, info};

use crate::auth;
use crate::config::LlmSection;

/// OpenAI-compatible chat completions client used for classification
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MsgOut,
}

#[derive(Debug, Deserialize)]
struct MsgOut {
    content: Option<String>,
}

impl OpenAiBackend {
    pub fn new(cfg: &LlmSection, api_key: impl Into<String>) -> Self {
        Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key: api_key.into(),
            temperature: cfg.temperature,
            timeout: Duration::from_secs(cfg.timeout_secs.max(1)),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        }
    }

    pub fn chat_complete(&self, prompt: &str) -> Result<String> {
        block_on(self.chat_complete_async(prompt))?
    }

    async fn chat_complete_async(&self, prompt: &str) -> Result<String> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("build http client")?;

        let resp = client
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&self.request(prompt))
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openai error: {status} {txt}");
        }

        let out: ChatResponse = resp.json().await.context("parse openai response")?;
        first_choice(out)
    }
}

fn first_choice(out: ChatResponse) -> Result<String> {
    let content = out
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("openai response had no choices")?;
    Ok(content.trim().to_string())
}

impl CompletionBackend for OpenAiBackend {
    fn complete(&self, prompt: &str) -> tally_ledger::Result<String> {
        self.chat_complete(prompt)
            .map_err(|e| tally_ledger::Error::Completion(format!("{e:#}")))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Drive a future to completion from synchronous code.
///
/// `main` runs inside a multi-threaded tokio runtime, where a nested
/// runtime would panic, so reuse the current one when there is one.
fn block_on<F: Future>(fut: F) -> Result<F::Output> {
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        Ok(tokio::task::block_in_place(|| handle.block_on(fut)))
    } else {
        let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
        Ok(rt.block_on(fut))
    }
}

/// Classifier for `taxonomy`, remote when an API key is configured
pub fn build_classifier(cfg: &LlmSection, taxonomy: &'static Taxonomy) -> Result<Classifier> {
    match auth::resolve_api_key()? {
        Some(key) => {
            debug!(model = %cfg.model, base_url = %cfg.base_url, "remote classification enabled");
            Ok(Classifier::new(taxonomy, Box::new(OpenAiBackend::new(cfg, key))))
        }
        None => {
            info!(
                "no {} set; categories come from keyword rules",
                auth::API_KEY_ENV
            );
            Ok(Classifier::offline(taxonomy))
        }
    }
}
