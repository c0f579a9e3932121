use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::config::SpeechConfig;
use crate::error::{Result, DubError};
use super::{SpeechSynthesizer, SpeechRate};

/// OpenAI-compatible `/v1/audio/speech` endpoint
pub struct OpenAiSpeechSynthesizer {
    client: Client,
    endpoint: String,
    model: String,
    voice: String,
    api_key: String,
}

impl OpenAiSpeechSynthesizer {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            DubError::Config(format!("API key required: set {}", config.api_key_env))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/audio/speech", config.openai_base_url.trim_end_matches('/')),
            model: config.openai_model.clone(),
            voice: config.voice.clone(),
            api_key,
        })
    }

    pub fn request_body(&self, text: &str, rate: &SpeechRate) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "speed": speed_for(rate),
            "response_format": "mp3",
        })
    }
}

/// The endpoint accepts speeds in 0.25..=4.0
pub fn speed_for(rate: &SpeechRate) -> f64 {
    rate.multiplier().clamp(0.25, 4.0)
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeechSynthesizer {
    async fn synthesize(&self, text: &str, rate: &SpeechRate, output_path: &Path) -> Result<PathBuf> {
        debug!("Sending speech request to: {}", self.endpoint);

        let response = self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(text, rate))
            .send()
            .await
            .map_err(|e| DubError::Speech(format!("Speech request failed: {}", e)))?;

        let status = response.status();
        let bytes = response.bytes().await
            .map_err(|e| DubError::Speech(format!("Failed to read speech response: {}", e)))?;

        if !status.is_success() {
            return Err(DubError::Speech(format!(
                "Speech API error ({}): {}",
                status,
                String::from_utf8_lossy(&bytes)
            )));
        }

        tokio::fs::write(output_path, &bytes).await?;
        Ok(output_path.to_path_buf())
    }
}
