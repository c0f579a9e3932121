use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, DubError};

// Defaults for the fitted speech rate
fn default_chars_per_minute() -> f64 {
    165.0
}

fn default_headroom_percent() -> i32 {
    15
}

fn default_min_percent() -> i32 {
    -50
}

fn default_max_percent() -> i32 {
    100
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
    pub speech: SpeechConfig,
    pub media: MediaConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Which transcription engine to run
    pub backend: TranscriberBackend,
    /// Path to transcriber binary; defaults to the backend's usual command name
    pub binary_path: Option<String>,
    /// Model name (e.g. "base") or, for whisper.cpp, a path to a ggml model file
    pub model: String,
    /// Source language hint; auto-detected when unset
    pub language: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Ask the engine for word-level timestamps
    pub word_timestamps: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriberBackend {
    /// OpenAI Whisper python command line
    OpenaiWhisper,
    /// whisper.cpp `whisper-cli`
    WhisperCpp,
}

impl TranscriberBackend {
    pub fn default_binary(&self) -> &'static str {
        match self {
            TranscriberBackend::OpenaiWhisper => "whisper",
            TranscriberBackend::WhisperCpp => "whisper-cli",
        }
    }
}

impl TranscriberConfig {
    /// Configured binary, else the backend default
    pub fn binary(&self) -> &str {
        self.binary_path
            .as_deref()
            .unwrap_or_else(|| self.backend.default_binary())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Which translation engine to call
    pub backend: TranslatorBackend,
    /// Language of the recognized speech
    pub source_language: String,
    /// Language of the voice-over
    pub target_language: String,
    /// Google Translate endpoint
    pub google_endpoint: String,
    /// Ollama endpoint URL
    pub ollama_endpoint: String,
    /// LLM model used by the Ollama backend
    pub ollama_model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranslatorBackend {
    Google,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Which speech engine to use
    pub backend: SpeechBackend,
    /// Path to the edge-tts binary
    pub binary_path: String,
    /// Voice name understood by the backend
    pub voice: String,
    /// How the speaking rate of each segment is chosen
    pub rate: RateStrategy,
    /// Base URL of an OpenAI-compatible speech endpoint
    pub openai_base_url: String,
    /// Model for the OpenAI-compatible backend
    pub openai_model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// How long to wait for a synthesized file to appear
    pub file_wait_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeechBackend {
    EdgeTts,
    Openai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum RateStrategy {
    /// Same rate for every segment, e.g. "+40%"
    Fixed { value: String },
    /// Speed each segment up or down so it fits its time window
    Fit {
        #[serde(default = "default_chars_per_minute")]
        chars_per_minute: f64,
        #[serde(default = "default_headroom_percent")]
        headroom_percent: i32,
        #[serde(default = "default_min_percent")]
        min_percent: i32,
        #[serde(default = "default_max_percent")]
        max_percent: i32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Codec for the intermediate audio file
    pub audio_extract_codec: String,
    /// Volume multiplier applied to the original soundtrack
    pub original_volume: f64,
    /// Video codec of the final file
    pub video_codec: String,
    /// Audio codec of the final file
    pub audio_codec: String,
    /// Additional encoding options for the final mux
    /// Common options: ["-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p"]
    pub extra_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Base directory for relative paths below
    pub work_dir: PathBuf,
    /// Video processed by `dub` when no input is given
    pub input_video: PathBuf,
    /// Where the extracted audio is written
    pub audio_dir: PathBuf,
    /// Where per-segment voice clips are written
    pub voice_dir: PathBuf,
    /// Where final videos are written
    pub output_dir: PathBuf,
    /// Keep voice clips after the run
    pub keep_voice_files: bool,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            backend: TranscriberBackend::OpenaiWhisper,
            binary_path: None,
            model: "base".to_string(),
            language: None,
            temperature: 0.0,
            word_timestamps: true,
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            backend: TranslatorBackend::Google,
            source_language: "zh-cn".to_string(),
            target_language: "vi".to_string(),
            google_endpoint: "https://translate.googleapis.com".to_string(),
            ollama_endpoint: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2:3b".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            backend: SpeechBackend::EdgeTts,
            binary_path: "edge-tts".to_string(),
            voice: "vi-VN-NamMinhNeural".to_string(),
            rate: RateStrategy::default(),
            openai_base_url: "https://api.openai.com".to_string(),
            openai_model: "tts-1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            file_wait_timeout_secs: 10,
        }
    }
}

impl Default for RateStrategy {
    fn default() -> Self {
        RateStrategy::Fixed { value: "+40%".to_string() }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            audio_extract_codec: "libmp3lame".to_string(),
            original_volume: 0.1,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            extra_options: vec![
                // "-preset".to_string(), "medium".to_string(),
                // "-crf".to_string(), "23".to_string(),
            ],
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            input_video: PathBuf::from("media/videoplayback.mp4"),
            audio_dir: PathBuf::from("media"),
            voice_dir: PathBuf::from("voice"),
            output_dir: PathBuf::from("media-output"),
            keep_voice_files: false,
        }
    }
}

impl PathsConfig {
    /// Resolve a configured path against the work directory
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DubError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| DubError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| DubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.media.original_volume) {
            return Err(DubError::Config(format!(
                "media.original_volume must be within 0.0..=1.0, got {}",
                self.media.original_volume
            )));
        }

        if let RateStrategy::Fit { chars_per_minute, min_percent, max_percent, .. } = &self.speech.rate {
            if *chars_per_minute <= 0.0 {
                return Err(DubError::Config("speech.rate.chars_per_minute must be positive".to_string()));
            }
            if min_percent > max_percent {
                return Err(DubError::Config(format!(
                    "speech.rate.min_percent ({}) exceeds max_percent ({})",
                    min_percent, max_percent
                )));
            }
        }

        Ok(())
    }
}
