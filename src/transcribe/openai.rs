// OpenAI Whisper python command line

use async_trait::async_trait;
use std::path::Path;
use tracing::{info, debug};

use crate::config::TranscriberConfig;
use crate::error::{Result, DubError};
use crate::media::MediaCommand;
use super::{Transcriber, common::{OpenAIWhisperOutput, Transcription, read_engine_output}};

pub struct OpenAITranscriber {
    config: TranscriberConfig,
}

impl OpenAITranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    /// Build the `whisper` invocation writing JSON into `output_dir`
    pub fn build_command(
        &self,
        audio_path: &Path,
        output_dir: &Path,
        language: Option<&str>,
    ) -> MediaCommand {
        let mut cmd = MediaCommand::new(self.config.binary(), "Whisper transcription")
            .path(audio_path)
            .arg("--model").arg(&self.config.model)
            .arg("--output_dir").path(output_dir)
            .arg("--output_format").arg("json")
            .arg("--temperature").arg(self.config.temperature.to_string());

        if self.config.word_timestamps {
            cmd = cmd.arg("--word_timestamps").arg("True");
        }

        if let Some(lang) = language {
            cmd = cmd.arg("--language").arg(lang);
        }

        cmd
    }
}

#[async_trait]
impl Transcriber for OpenAITranscriber {
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcription> {
        info!("Transcribing {} with whisper model '{}'", audio_path.display(), self.config.model);

        let temp_dir = tempfile::tempdir()
            .map_err(|e| DubError::Transcriber(format!("Failed to create temp directory: {}", e)))?;

        self.build_command(audio_path, temp_dir.path(), language)
            .execute()
            .await
            .map_err(|e| DubError::Transcriber(e.to_string()))?;

        let audio_stem = audio_path.file_stem()
            .ok_or_else(|| DubError::Transcriber("Invalid audio filename".to_string()))?;
        let json_file = temp_dir.path().join(format!("{}.json", audio_stem.to_string_lossy()));
        debug!("Reading whisper output: {}", json_file.display());

        read_engine_output::<OpenAIWhisperOutput>(&json_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_requests_word_timestamps_and_json() {
        let transcriber = OpenAITranscriber::new(TranscriberConfig::default());
        let cmd = transcriber.build_command(Path::new("media/audio.mp3"), Path::new("/tmp/out"), Some("zh"));

        assert_eq!(cmd.binary_path, "whisper");
        assert_eq!(cmd.args[0], "media/audio.mp3");
        assert!(cmd.args.windows(2).any(|w| w == ["--model", "base"]));
        assert!(cmd.args.windows(2).any(|w| w == ["--output_format", "json"]));
        assert!(cmd.args.windows(2).any(|w| w == ["--word_timestamps", "True"]));
        assert!(cmd.args.windows(2).any(|w| w == ["--language", "zh"]));
    }

    #[test]
    fn language_is_optional() {
        let config = TranscriberConfig { word_timestamps: false, ..TranscriberConfig::default() };
        let cmd = OpenAITranscriber::new(config).build_command(Path::new("a.mp3"), Path::new("/tmp"), None);
        assert!(!cmd.args.iter().any(|a| a == "--language"));
        assert!(!cmd.args.iter().any(|a| a == "--word_timestamps"));
    }
}
