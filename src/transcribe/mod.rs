// Transcription engines
//
// - OpenAI: `whisper` python command line (default)
// - WhisperCpp: whisper.cpp `whisper-cli`
//
// Both write JSON that is mapped into the engine-agnostic `Transcription`.

pub mod common;
pub mod openai;
pub mod whisper_cpp;

use async_trait::async_trait;
use std::path::Path;

pub use common::*;
use crate::config::{TranscriberBackend, TranscriberConfig};
use crate::error::Result;

/// Main trait for transcription operations
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe audio file into timed segments
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcription>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create_transcriber(config: TranscriberConfig, ffmpeg_path: &str) -> Box<dyn Transcriber> {
        match config.backend {
            TranscriberBackend::OpenaiWhisper => Box::new(openai::OpenAITranscriber::new(config)),
            TranscriberBackend::WhisperCpp => {
                Box::new(whisper_cpp::WhisperCppTranscriber::new(config, ffmpeg_path))
            }
        }
    }
}
