//! Filesystem layout of a dubbing run.

use chrono::{DateTime, TimeZone};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::PathsConfig;

/// Timestamp format used in output names, e.g. `17-10-2026-09-05`
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y-%H-%M";

#[derive(Debug, Clone)]
pub struct RunLayout {
    audio_dir: PathBuf,
    voice_dir: PathBuf,
    output_dir: PathBuf,
    timestamp: String,
}

impl RunLayout {
    pub fn new<Tz: TimeZone>(paths: &PathsConfig, started_at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            audio_dir: paths.resolve(&paths.audio_dir),
            voice_dir: paths.resolve(&paths.voice_dir),
            output_dir: paths.resolve(&paths.output_dir),
            timestamp: started_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Write final videos somewhere other than the configured output directory
    pub fn with_output_dir<P: AsRef<Path>>(mut self, output_dir: P) -> Self {
        self.output_dir = output_dir.as_ref().to_path_buf();
        self
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn directories(&self) -> [&Path; 3] {
        [self.audio_dir.as_path(), self.voice_dir.as_path(), self.output_dir.as_path()]
    }

    /// `<audio_dir>/audio_<name>.mp3`
    pub fn audio_path(&self, name: &str) -> PathBuf {
        self.audio_dir.join(format!("audio_{}.mp3", name))
    }

    /// `<voice_dir>/voice_<start>_<end>.mp3`, times printed as float literals
    pub fn voice_path(&self, start: f64, end: f64) -> PathBuf {
        self.voice_dir.join(format!("voice_{:?}_{:?}.mp3", start, end))
    }

    /// Final video; `name` distinguishes videos of a batch run
    pub fn output_path(&self, name: Option<&str>) -> PathBuf {
        let name = match name {
            Some(name) => format!("{}_with_voiceover_{}.mp4", name, self.timestamp),
            None => format!("video_with_voiceover_{}.mp4", self.timestamp),
        };
        self.output_dir.join(name)
    }
}

/// File stem of a video, used to name its intermediate audio
pub fn video_stem(video_path: &Path) -> String {
    video_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string())
}

/// Unique names for the videos of a batch, one per entry of `videos`.
///
/// Names are the path below `input_dir` without extension, directories
/// joined with `_`. Remaining clashes (`a.mp4` next to `a.mkv`) get a
/// numeric suffix.
pub fn batch_names(input_dir: &Path, videos: &[PathBuf]) -> Vec<String> {
    let mut used = HashSet::new();

    videos
        .iter()
        .map(|video| {
            let relative = video.strip_prefix(input_dir).unwrap_or(video);
            let mut parts: Vec<String> = relative
                .parent()
                .map(|parent| {
                    parent
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().to_string())
                        .collect()
                })
                .unwrap_or_default();
            parts.push(video_stem(video));
            let base = parts.join("_");

            let mut name = base.clone();
            let mut suffix = 2;
            while !used.insert(name.clone()) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}
