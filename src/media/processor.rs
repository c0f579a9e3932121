use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::info;

use crate::config::MediaConfig;
use crate::error::{Result, DubError};
use super::{MediaProcessorTrait, MediaCommandBuilder, MuxOptions, VoiceClip};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn extract_audio(
        &self,
        video_path: &Path,
        audio_path: &Path,
    ) -> Result<()> {
        info!("Extracting audio from {} to {}", video_path.display(), audio_path.display());

        let command = self.command_builder.extract_audio(
            video_path,
            audio_path,
            &self.config.audio_extract_codec,
        );
        command
            .execute()
            .await
            .map_err(|e| DubError::Extraction(e.to_string()))?;

        info!("Audio extraction completed: {}", audio_path.display());
        Ok(())
    }

    async fn mux_voiceover(
        &self,
        video_path: &Path,
        clips: &[VoiceClip],
        output_path: &Path,
    ) -> Result<()> {
        info!("Muxing {} voice clips into {} -> {}",
              clips.len(), video_path.display(), output_path.display());

        let options = MuxOptions {
            original_volume: self.config.original_volume,
            video_codec: &self.config.video_codec,
            audio_codec: &self.config.audio_codec,
            extra_options: &self.config.extra_options,
        };
        let command = self.command_builder.mux_voiceover(video_path, clips, output_path, &options);
        command.execute().await?;

        info!("Voice-over mux completed successfully");
        Ok(())
    }

    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| DubError::Media(format!("Media processor not found: {}", e)))?;

        if output.status.success() {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(DubError::Media("Media processor version check failed".to_string()))
        }
    }
}
