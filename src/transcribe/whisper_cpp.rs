// whisper.cpp (`whisper-cli`) implementation

use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{Result, DubError};
use crate::media::{MediaCommand, MediaCommandBuilder};
use super::{Transcriber, common::{Transcription, WhisperCppOutput, read_engine_output}};

pub struct WhisperCppTranscriber {
    config: TranscriberConfig,
    /// ffmpeg, used to produce the 16 kHz WAV input whisper.cpp expects
    converter: MediaCommandBuilder,
}

impl WhisperCppTranscriber {
    pub fn new(config: TranscriberConfig, ffmpeg_path: &str) -> Self {
        Self {
            config,
            converter: MediaCommandBuilder::new(ffmpeg_path),
        }
    }

    /// Build the `whisper-cli` invocation writing `<output_base>.json`
    pub fn build_command(
        &self,
        wav_path: &Path,
        output_base: &Path,
        language: Option<&str>,
    ) -> MediaCommand {
        let mut cmd = MediaCommand::new(self.config.binary(), "whisper.cpp transcription")
            .arg("-m").arg(&self.config.model)
            .arg("-f").path(wav_path)
            .arg("-oj")
            .arg("-of").path(output_base)
            .arg("-tp").arg(self.config.temperature.to_string());

        // whisper-cli defaults to English unless told otherwise
        cmd = cmd.arg("-l").arg(language.unwrap_or("auto"));

        cmd
    }
}

#[async_trait]
impl Transcriber for WhisperCppTranscriber {
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcription> {
        info!("Transcribing {} with whisper.cpp model {}", audio_path.display(), self.config.model);

        let temp_dir = tempfile::tempdir()
            .map_err(|e| DubError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let wav_path = temp_dir.path().join("input.wav");
        let output_base = temp_dir.path().join("out");

        self.converter
            .convert_to_wav(audio_path, wav_path.as_path())
            .execute()
            .await
            .map_err(|e| DubError::Transcriber(e.to_string()))?;

        self.build_command(&wav_path, &output_base, language)
            .execute()
            .await
            .map_err(|e| DubError::Transcriber(e.to_string()))?;

        read_engine_output::<WhisperCppOutput>(&output_base.with_extension("json"))
    }
}
