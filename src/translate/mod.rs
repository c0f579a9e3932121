// Translation engines
//
// - Google: Google Translate web endpoint (default)
// - Ollama: local LLM with a JSON-format prompt

pub mod google;
pub mod ollama;

use async_trait::async_trait;
use tracing::warn;

use crate::config::{TranslateConfig, TranslatorBackend};
use crate::error::Result;

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target` language
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;

    /// Check that the engine can be reached; engines without a check are assumed up
    async fn check_availability(&self) -> Result<()> {
        Ok(())
    }
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    pub fn create_translator(config: &TranslateConfig) -> Result<Box<dyn Translator>> {
        Ok(match config.backend {
            TranslatorBackend::Google => Box::new(google::GoogleTranslator::new(config)?),
            TranslatorBackend::Ollama => Box::new(ollama::OllamaTranslator::new(config)?),
        })
    }
}

/// Translate, falling back to the source text when the engine fails
pub async fn translate_or_original(
    translator: &dyn Translator,
    text: &str,
    source: &str,
    target: &str,
) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    match translator.translate(text, source, target).await {
        Ok(translated) => translated,
        Err(e) => {
            warn!("Translation failed, keeping source text: {}", e);
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DubError;

    #[tokio::test]
    async fn returns_translation_on_success() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .withf(|text, source, target| text == "你好" && source == "zh-cn" && target == "vi")
            .times(1)
            .returning(|_, _, _| Ok("Xin chào".to_string()));

        assert_eq!(translate_or_original(&translator, "你好", "zh-cn", "vi").await, "Xin chào");
    }

    #[tokio::test]
    async fn falls_back_to_source_on_error() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .returning(|_, _, _| Err(DubError::Translation("offline".to_string())));

        assert_eq!(translate_or_original(&translator, "你好", "zh-cn", "vi").await, "你好");
    }

    #[test]
    fn blank_text_skips_the_engine() {
        let mut translator = MockTranslator::new();
        translator.expect_translate().never();

        let result = tokio_test::block_on(translate_or_original(&translator, "  ", "zh-cn", "vi"));
        assert_eq!(result, "  ");
    }
}
