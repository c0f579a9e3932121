// Speech synthesis engines
//
// - EdgeTts: `edge-tts` command line (default)
// - OpenAI: OpenAI-compatible HTTP endpoint

pub mod edge;
pub mod openai;
pub mod rate;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub use rate::{SpeechRate, fit_rate};
use crate::config::{SpeechBackend, SpeechConfig};
use crate::error::Result;

/// Main trait for text-to-speech operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` at `rate` into `output_path`
    async fn synthesize(&self, text: &str, rate: &SpeechRate, output_path: &Path) -> Result<PathBuf>;
}

/// Factory for creating synthesizer instances
pub struct SpeechSynthesizerFactory;

impl SpeechSynthesizerFactory {
    pub fn create_synthesizer(config: &SpeechConfig) -> Result<Box<dyn SpeechSynthesizer>> {
        Ok(match config.backend {
            SpeechBackend::EdgeTts => Box::new(edge::EdgeTtsSynthesizer::new(config)),
            SpeechBackend::Openai => Box::new(openai::OpenAiSpeechSynthesizer::new(config)?),
        })
    }
}

/// Poll every 100 ms until `path` exists or `timeout` elapses
pub async fn wait_for_file(path: &Path, timeout: Duration) -> bool {
    let started = Instant::now();
    loop {
        if path.exists() {
            return true;
        }
        if started.elapsed() >= timeout {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
