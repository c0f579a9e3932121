use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides shared by the dubbing commands
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct LanguageArgs {
    /// Language spoken in the video (e.g. zh-cn)
    #[arg(long)]
    pub source_lang: Option<String>,

    /// Language of the voice-over (e.g. vi)
    #[arg(long)]
    pub target_lang: Option<String>,

    /// Voice used for synthesis
    #[arg(long)]
    pub voice: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a translated voice-over to a single video
    Dub {
        /// Input video file (defaults to the configured input video)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory for the new video
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        languages: LanguageArgs,
    },

    /// Add a voice-over to every video in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory for the new videos
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        languages: LanguageArgs,
    },

    /// Extract audio from video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Transcribe audio to SRT subtitles
    Transcribe {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output SRT file
        #[arg(short, long)]
        output: PathBuf,

        /// Source language hint
        #[arg(short, long)]
        language: Option<String>,

        /// Also write the raw transcription as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Translate a piece of text
    Translate {
        /// Text to translate
        #[arg(short, long)]
        text: String,

        #[command(flatten)]
        languages: LanguageArgs,
    },

    /// Synthesize speech for a piece of text
    Speak {
        /// Text to speak
        #[arg(short, long)]
        text: String,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,

        /// Speaking rate such as +40% or -10%
        #[arg(short, long, allow_hyphen_values = true)]
        rate: Option<String>,

        /// Voice used for synthesis
        #[arg(long)]
        voice: Option<String>,
    },

    /// List whisper.cpp models and their status
    Models {
        /// Download all missing models
        #[arg(long)]
        download: bool,
    },
}
