use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, DubError};

/// External command representation (ffmpeg, whisper, edge-tts, ...)
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add a path argument
    pub fn path<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").path(path)
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.path(path)
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Set audio sample rate
    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    /// Set audio channels
    pub fn audio_channels(self, channels: u32) -> Self {
        self.arg("-ac").arg(channels.to_string())
    }

    /// Set a complex filter graph
    pub fn filter_complex<S: Into<String>>(self, graph: S) -> Self {
        self.arg("-filter_complex").arg(graph)
    }

    /// Map a stream or filter label into the output
    pub fn map<S: Into<String>>(self, stream: S) -> Self {
        self.arg("-map").arg(stream)
    }

    /// Execute the command, discarding its output
    pub async fn execute(&self) -> Result<()> {
        self.execute_with_output().await.map(|_| ())
    }

    /// Execute the command and return its stdout
    pub async fn execute_with_output(&self) -> Result<String> {
        debug!("Executing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| DubError::Media(format!(
                "Failed to execute {}: {}",
                self.binary_path, e
            )))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DubError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Audio clip placed on the output timeline
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceClip {
    pub path: PathBuf,
    /// Offset from the start of the video, in seconds
    pub start: f64,
}

/// Build the filter graph that lays voice clips over the attenuated original track.
///
/// Input 0 is the video; inputs 1..=N are the clips in order.
pub fn build_voiceover_filter(original_volume: f64, clips: &[VoiceClip]) -> String {
    let mut graph = vec![format!("[0:a]volume={}[orig]", original_volume)];

    if clips.is_empty() {
        return graph.remove(0).replace("[orig]", "[aout]");
    }

    let mut mix_inputs = String::from("[orig]");
    for (idx, clip) in clips.iter().enumerate() {
        let input = idx + 1;
        let delay_ms = (clip.start.max(0.0) * 1000.0).round() as u64;
        graph.push(format!("[{}:a]adelay={}:all=1[v{}]", input, delay_ms, input));
        mix_inputs.push_str(&format!("[v{}]", input));
    }

    graph.push(format!(
        "{}amix=inputs={}:duration=first:normalize=0[aout]",
        mix_inputs,
        clips.len() + 1
    ));

    graph.join(";")
}

/// Builder for common media processing operations
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build audio extraction command
    pub fn extract_audio<P: AsRef<Path>>(
        &self,
        video_path: P,
        audio_path: P,
        codec: &str,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio extraction")
            .overwrite()
            .input(video_path)
            .no_video()
            .audio_codec(codec)
            .output(audio_path)
    }

    /// Build 16 kHz mono PCM conversion for whisper.cpp
    pub fn convert_to_wav<P: AsRef<Path>>(
        &self,
        audio_path: P,
        wav_path: P,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "WAV conversion")
            .overwrite()
            .input(audio_path)
            .no_video()
            .audio_codec("pcm_s16le")
            .audio_sample_rate(16000)
            .audio_channels(1)
            .output(wav_path)
    }

    /// Build the voice-over mux command
    pub fn mux_voiceover(
        &self,
        video_path: &Path,
        clips: &[VoiceClip],
        output_path: &Path,
        options: &MuxOptions<'_>,
    ) -> MediaCommand {
        let mut cmd = MediaCommand::new(&self.binary_path, "Voice-over mux")
            .overwrite()
            .input(video_path);

        for clip in clips {
            cmd = cmd.input(&clip.path);
        }

        cmd = cmd
            .filter_complex(build_voiceover_filter(options.original_volume, clips))
            .map("0:v")
            .map("[aout]")
            .video_codec(options.video_codec)
            .audio_codec(options.audio_codec)
            .args(options.extra_options.iter().cloned());

        cmd.output(output_path)
    }
}

/// Encoding settings for the final mux
#[derive(Debug, Clone)]
pub struct MuxOptions<'a> {
    pub original_volume: f64,
    pub video_codec: &'a str,
    pub audio_codec: &'a str,
    pub extra_options: &'a [String],
}
