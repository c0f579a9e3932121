use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{info, debug};

use crate::config::TranslateConfig;
use crate::error::{Result, DubError};
use super::Translator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
}

/// Translation through a local Ollama model
pub struct OllamaTranslator {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaTranslator {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.ollama_endpoint.trim_end_matches('/').to_string(),
            model: config.ollama_model.clone(),
        })
    }
}

#[async_trait]
impl Translator for OllamaTranslator {
    /// Check that Ollama is reachable and the model is pulled
    async fn check_availability(&self) -> Result<()> {
        let url = format!("{}/api/show", self.endpoint);

        let response = self.client
            .post(&url)
            .json(&json!({ "name": self.model }))
            .send()
            .await
            .map_err(|e| DubError::Translation(format!("Failed to connect to Ollama: {}", e)))?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", self.model);
            Ok(())
        } else {
            Err(DubError::Translation(format!(
                "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
                self.model, self.model
            )))
        }
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: build_prompt(text, source, target),
            stream: false,
            format: "json".to_string(),
        };

        let url = format!("{}/api/generate", self.endpoint);
        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DubError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DubError::Translation(format!(
                "Ollama API error {}: {}", status, error_text
            )));
        }

        let generated: GenerateResponse = response.json().await
            .map_err(|e| DubError::Translation(format!("Failed to parse response: {}", e)))?;

        extract_translation(&generated.response)
    }
}

fn build_prompt(text: &str, source: &str, target: &str) -> String {
    let source_name = language_name(source);
    let target_name = language_name(target);

    format!(
        "You are a professional translator for video narration.\n\
         \n\
         Translate the text from {} to {} ONLY. The target language code is {}.\n\
         Keep it short enough to be spoken in the same time as the original.\n\
         \n\
         Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.\n\
         Do not include any explanations, alternatives, or text in other languages.\n\
         \n\
         Text to translate: \"{}\"\n",
        source_name, target_name, target, target_name, text
    )
}

/// Pull the translation out of the model's raw reply
pub fn extract_translation(raw: &str) -> Result<String> {
    let raw = raw.trim();
    debug!("Raw Ollama response: {}", raw);

    if raw.is_empty() {
        return Err(DubError::Translation("Empty translation received".to_string()));
    }

    if let Ok(result) = serde_json::from_str::<TranslationResult>(raw) {
        let text = result.text.trim();
        if !text.is_empty() {
            return Ok(text.to_string());
        }
        return Err(DubError::Translation("Empty translation received".to_string()));
    }

    Ok(clean_response(raw))
}

/// First line that looks like a translation rather than commentary
fn clean_response(response: &str) -> String {
    for line in response.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty()
            || trimmed.starts_with("Here ")
            || trimmed.starts_with("Translation:")
            || trimmed.starts_with("- ")
            || trimmed.starts_with("* ")
            || (trimmed.starts_with("**") && trimmed.ends_with("**"))
        {
            continue;
        }

        return trimmed.to_string();
    }

    response.trim().to_string()
}

fn language_name(code: &str) -> String {
    let lang = code.split('-').next().unwrap_or(code).to_lowercase();
    match lang.as_str() {
        "zh" => "Chinese",
        "vi" => "Vietnamese",
        "en" => "English",
        "ja" => "Japanese",
        "ko" => "Korean",
        "fr" => "French",
        "de" => "German",
        "es" => "Spanish",
        "ru" => "Russian",
        "it" => "Italian",
        "pt" => "Portuguese",
        "th" => "Thai",
        "id" => "Indonesian",
        "hi" => "Hindi",
        "ar" => "Arabic",
        _ => return code.to_string(),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_server_fails_availability_check() {
        let config = TranslateConfig {
            ollama_endpoint: "http://127.0.0.1:9/".to_string(),
            timeout_secs: 2,
            ..TranslateConfig::default()
        };
        let translator = OllamaTranslator::new(&config).unwrap();

        let err = translator.check_availability().await.unwrap_err();
        assert!(matches!(err, DubError::Translation(_)));
    }

    #[test]
    fn extracts_json_text() {
        assert_eq!(extract_translation(r#"{"text": " Xin chào "}"#).unwrap(), "Xin chào");
    }

    #[test]
    fn falls_back_to_first_meaningful_line() {
        let raw = "Here is the translation:\n\n**Vietnamese**\nXin chào thế giới\n- alt";
        assert_eq!(extract_translation(raw).unwrap(), "Xin chào thế giới");
    }

    #[test]
    fn empty_reply_is_an_error() {
        assert!(extract_translation("   ").is_err());
        assert!(extract_translation(r#"{"text": ""}"#).is_err());
    }

    #[test]
    fn prompt_names_both_languages() {
        let prompt = build_prompt("你好", "zh-cn", "vi");
        assert!(prompt.contains("from Chinese to Vietnamese"));
        assert!(prompt.contains("\"你好\""));
    }
}
