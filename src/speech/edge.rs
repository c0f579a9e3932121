use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::SpeechConfig;
use crate::error::{Result, DubError};
use crate::media::MediaCommand;
use super::{SpeechSynthesizer, SpeechRate};

/// Microsoft Edge neural voices through the `edge-tts` command line
pub struct EdgeTtsSynthesizer {
    binary_path: String,
    voice: String,
}

impl EdgeTtsSynthesizer {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            binary_path: config.binary_path.clone(),
            voice: config.voice.clone(),
        }
    }

    pub fn build_command(&self, text: &str, rate: &SpeechRate, output_path: &Path) -> MediaCommand {
        // `--rate=-10%` keeps a negative rate from being read as a flag
        MediaCommand::new(&self.binary_path, "Speech synthesis")
            .arg("--voice").arg(&self.voice)
            .arg(format!("--rate={}", rate))
            .arg("--text").arg(text)
            .arg("--write-media").path(output_path)
    }
}

#[async_trait]
impl SpeechSynthesizer for EdgeTtsSynthesizer {
    async fn synthesize(&self, text: &str, rate: &SpeechRate, output_path: &Path) -> Result<PathBuf> {
        debug!("Synthesizing {} chars at {} with {}", text.chars().count(), rate, self.voice);

        self.build_command(text, rate, output_path)
            .execute()
            .await
            .map_err(|e| DubError::Speech(e.to_string()))?;

        Ok(output_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_rate_is_attached_to_flag() {
        let synth = EdgeTtsSynthesizer::new(&SpeechConfig::default());
        let cmd = synth.build_command("Xin chào", &SpeechRate::new(-10), Path::new("voice/v.mp3"));

        assert_eq!(cmd.binary_path, "edge-tts");
        assert_eq!(
            cmd.args,
            vec![
                "--voice", "vi-VN-NamMinhNeural",
                "--rate=-10%",
                "--text", "Xin chào",
                "--write-media", "voice/v.mp3",
            ]
        );
    }
}
