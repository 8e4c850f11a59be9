// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

fn default_fast_model() -> String {
    "claude-3-5-haiku-20241022".to_string()
}
fn default_deep_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

/// Oracle config loaded from `config/ai.json`.
///
/// The fast model carries scoring and translation calls; the deep model
/// carries summaries and the sentiment snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    /// "ENV" means: read from ANTHROPIC_API_KEY.
    pub api_key: String,
    #[serde(default = "default_fast_model")]
    pub fast_model: String,
    #[serde(default = "default_deep_model")]
    pub deep_model: String,
}

impl AiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: AiConfig = serde_json::from_str(&data)?;

        // Resolve api key if "ENV"
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = env::var("ANTHROPIC_API_KEY")
                .map_err(|_| anyhow::anyhow!("Missing ANTHROPIC_API_KEY env var"))?;
        }

        Ok(cfg)
    }
}
