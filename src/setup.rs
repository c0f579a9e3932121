use std::path::{Path, PathBuf};
use std::fs;
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use reqwest::Client;
use tracing::{info, warn};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{TranscriberBackend, TranscriberConfig};
use crate::error::{Result, DubError};

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// (name, approximate size in MB)
const MODELS: [(&str, f64); 12] = [
    ("tiny", 39.0),
    ("tiny.en", 39.0),
    ("base", 142.0),
    ("base.en", 142.0),
    ("small", 244.0),
    ("small.en", 244.0),
    ("medium", 769.0),
    ("medium.en", 769.0),
    ("large-v1", 1550.0),
    ("large-v2", 1550.0),
    ("large-v3", 1550.0),
    ("large-v3-turbo", 809.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub filename: String,
    pub url: String,
    pub size_mb: f64,
}

/// Local store of whisper.cpp ggml models
pub struct SetupManager {
    client: Client,
    app_dir: PathBuf,
}

impl SetupManager {
    pub fn new<P: AsRef<Path>>(app_dir: P) -> Result<Self> {
        let app_dir = app_dir.as_ref().to_path_buf();
        fs::create_dir_all(app_dir.join("models"))?;

        let client = Client::builder()
            .user_agent(concat!("voicedub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, app_dir })
    }

    pub fn models_dir(&self) -> PathBuf {
        self.app_dir.join("models")
    }

    pub fn get_available_models(&self) -> Vec<ModelInfo> {
        MODELS
            .iter()
            .map(|(name, size_mb)| {
                let filename = format!("ggml-{}.bin", name);
                ModelInfo {
                    name: name.to_string(),
                    url: format!("{}/{}", MODEL_BASE_URL, filename),
                    filename,
                    size_mb: *size_mb,
                }
            })
            .collect()
    }

    pub fn find_model(&self, name: &str) -> Option<ModelInfo> {
        self.get_available_models().into_iter().find(|m| m.name == name)
    }

    pub fn local_path(&self, model: &ModelInfo) -> PathBuf {
        self.models_dir().join(&model.filename)
    }

    pub fn is_downloaded(&self, model: &ModelInfo) -> bool {
        self.local_path(model).exists()
    }

    /// Point a whisper.cpp transcriber at a local model file, downloading it if needed
    pub async fn prepare_transcriber(&self, config: &mut TranscriberConfig) -> Result<()> {
        if config.backend != TranscriberBackend::WhisperCpp {
            return Ok(());
        }

        if is_model_path(&config.model) {
            if !Path::new(&config.model).exists() {
                return Err(DubError::FileNotFound(config.model.clone()));
            }
            return Ok(());
        }

        let model = match self.find_model(&config.model) {
            Some(model) => model,
            None => {
                warn!("Unknown whisper.cpp model '{}', using 'base' instead", config.model);
                self.find_model("base")
                    .ok_or_else(|| DubError::Config("No suitable whisper model found".to_string()))?
            }
        };

        let local_path = self.download_model(&model).await?;
        info!("Using whisper.cpp model {}", local_path.display());
        config.model = local_path.to_string_lossy().to_string();
        Ok(())
    }

    pub async fn download_model(&self, model: &ModelInfo) -> Result<PathBuf> {
        let local_path = self.local_path(model);

        if local_path.exists() {
            info!("Model {} already exists at {}", model.name, local_path.display());
            return Ok(local_path);
        }

        info!("Downloading {} model ({:.1} MB)...", model.name, model.size_mb);

        let mut response = self.client.get(&model.url).send().await?;

        if !response.status().is_success() {
            return Err(DubError::Config(format!(
                "Failed to download model {}: HTTP {}",
                model.name, response.status()
            )));
        }

        let total = response
            .content_length()
            .unwrap_or((model.size_mb * 1_000_000.0) as u64);
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        // Write next to the target and rename once complete
        let temp_path = local_path.with_extension("tmp");
        let mut file = async_fs::File::create(&temp_path).await?;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            pb.inc(chunk.len() as u64);
        }

        file.flush().await?;
        drop(file);

        async_fs::rename(&temp_path, &local_path).await?;

        pb.finish_with_message(format!("Downloaded {}", model.name));
        info!("Successfully downloaded {} to {}", model.name, local_path.display());

        Ok(local_path)
    }
}

/// Whether `model` names a file rather than a catalogue entry
fn is_model_path(model: &str) -> bool {
    model.contains('/') || model.contains('\\') || model.ends_with(".bin")
}
