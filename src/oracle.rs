// src/oracle.rs
//! Oracle adapter: provider abstraction over the external text-generation
//! service. The pipeline only ever sees `complete(tier, max_tokens, prompt)`;
//! transport failures come back as `Err` and every caller degrades locally.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ai::AiConfig;

const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Which model carries the call. Fast is for scoring and translation,
/// deep for summaries and the sentiment snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Fast,
    Deep,
}

#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, tier: ModelTier, max_tokens: u32, prompt: &str) -> Result<String>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynOracle = Arc<dyn Oracle>;

/// Factory: build an oracle according to config. Disabled config yields a
/// client whose calls always fail, which the pipeline degrades around.
pub fn build_oracle(cfg: &AiConfig) -> DynOracle {
    if !cfg.enabled {
        return Arc::new(DisabledOracle);
    }
    Arc::new(AnthropicOracle::new(cfg))
}

/// Anthropic messages API client. Requires the resolved api key from
/// `AiConfig` (usually via ANTHROPIC_API_KEY).
pub struct AnthropicOracle {
    http: reqwest::Client,
    api_key: String,
    fast_model: String,
    deep_model: String,
}

impl AnthropicOracle {
    pub fn new(cfg: &AiConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("secintel-digest/0.1")
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: cfg.api_key.clone(),
            fast_model: cfg.fast_model.clone(),
            deep_model: cfg.deep_model.clone(),
        }
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast_model,
            ModelTier::Deep => &self.deep_model,
        }
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl Oracle for AnthropicOracle {
    async fn complete(&self, tier: ModelTier, max_tokens: u32, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("missing api key");
        }

        let req = Req {
            model: self.model_for(tier),
            max_tokens,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .http
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&req)
            .send()
            .await
            .context("sending oracle request")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("oracle returned {status}");
        }

        let body: Resp = resp.json().await.context("decoding oracle response")?;
        let text = body
            .content
            .first()
            .map(|b| b.text.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            bail!("oracle returned empty content");
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

/// Fails every call; used when AI is disabled. The pipeline then runs
/// entirely on degraded defaults.
pub struct DisabledOracle;

#[async_trait]
impl Oracle for DisabledOracle {
    async fn complete(&self, _tier: ModelTier, _max_tokens: u32, _prompt: &str) -> Result<String> {
        bail!("oracle disabled")
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Scripted reply for [`MockOracle`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail,
}

/// Test double: pops scripted replies in order and records every prompt.
/// An exhausted script fails the call, same as a transport error.
#[derive(Default)]
pub struct MockOracle {
    replies: Mutex<VecDeque<MockReply>>,
    pub prompts: Mutex<Vec<String>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripted(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("mock prompts").clone()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn complete(&self, _tier: ModelTier, _max_tokens: u32, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .expect("mock prompts")
            .push(prompt.to_string());
        match self.replies.lock().expect("mock replies").pop_front() {
            Some(MockReply::Text(t)) => Ok(t),
            Some(MockReply::Fail) | None => bail!("mock oracle failure"),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
