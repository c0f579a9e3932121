//! voicedub - Automated Voice-over Workflow
//!
//! Entry point: parses arguments, sets up logging, loads configuration and
//! dispatches to the workflow.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use voicedub::cli::{Args, Commands, LanguageArgs};
use voicedub::config::{Config, TranscriberBackend};
use voicedub::setup::SetupManager;
use voicedub::speech::SpeechRate;
use voicedub::workflow::Workflow;

const APP_DIR: &str = ".voicedub";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting voicedub - Automated Voice-over Workflow");

    let mut config = load_config(args.config.as_deref())?;

    match args.command {
        Commands::Models { download } => {
            let setup_manager = SetupManager::new(APP_DIR)?;
            let models = setup_manager.get_available_models();

            println!("\nAvailable whisper.cpp Models:");
            println!("{:<15} {:<25} {:<10} {:<10}", "Name", "Filename", "Size (MB)", "Status");
            println!("{}", "-".repeat(65));

            for model in &models {
                let status = if setup_manager.is_downloaded(model) { "Downloaded" } else { "Missing" };
                println!("{:<15} {:<25} {:<10.1} {:<10}",
                    model.name, model.filename, model.size_mb, status);
            }

            if download {
                info!("Downloading all missing models...");
                for model in &models {
                    setup_manager.download_model(model).await?;
                }
                info!("All models downloaded successfully");
            }
        }
        Commands::Dub { input, output_dir, languages } => {
            apply_language_overrides(&mut config, &languages);
            let input = input.unwrap_or_else(|| config.paths.resolve(&config.paths.input_video));

            let workflow = build_workflow(config, Stages::DUB).await?;
            let output = workflow.dub_video(&input, output_dir.as_deref()).await
                .with_context(|| format!("Failed to add voice-over to {}", input.display()))?;
            println!("Voice-over complete: {}", output.display());
        }
        Commands::Batch { input_dir, output_dir, languages } => {
            apply_language_overrides(&mut config, &languages);

            let workflow = build_workflow(config, Stages::DUB).await?;
            let summary = workflow.process_directory(&input_dir, output_dir.as_deref()).await?;

            for output in &summary.succeeded {
                println!("OK     {}", output.display());
            }
            for (video, reason) in &summary.failed {
                println!("FAILED {}: {}", video.display(), reason);
            }
            info!("Batch finished: {} succeeded, {} failed",
                  summary.succeeded.len(), summary.failed.len());
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from: {}", input.display());
            let workflow = build_workflow(config, Stages { media: true, ..Stages::NONE }).await?;
            workflow.extract_audio(&input, &output).await?;
        }
        Commands::Transcribe { input, output, language, json } => {
            info!("Transcribing audio: {}", input.display());
            let whisper_cpp = config.transcriber.backend == TranscriberBackend::WhisperCpp;
            let stages = Stages { transcribe: true, media: whisper_cpp, ..Stages::NONE };
            let workflow = build_workflow(config, stages).await?;
            let transcription = workflow
                .transcribe_to_srt(&input, &output, language.as_deref(), json.as_deref())
                .await?;
            info!("Wrote {} segments to {}", transcription.segments.len(), output.display());
        }
        Commands::Translate { text, languages } => {
            apply_language_overrides(&mut config, &languages);
            let source = config.translate.source_language.clone();
            let target = config.translate.target_language.clone();

            let workflow = build_workflow(config, Stages { translate: true, ..Stages::NONE }).await?;
            let translated = workflow.translate_text(&text, &source, &target).await?;
            println!("{}", translated);
        }
        Commands::Speak { text, output, rate, voice } => {
            if let Some(voice) = voice {
                config.speech.voice = voice;
            }
            let rate = rate.map(|r| r.parse::<SpeechRate>()).transpose()?;

            let workflow = build_workflow(config, Stages::NONE).await?;
            let path = workflow.speak(&text, rate, &output).await?;
            println!("Wrote {}", path.display());
        }
    }

    info!("voicedub completed successfully");
    Ok(())
}

/// Config from `--config`, else ./config.toml, else defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };
    Ok(config)
}

fn apply_language_overrides(config: &mut Config, languages: &LanguageArgs) {
    if let Some(source) = &languages.source_lang {
        config.translate.source_language = source.clone();
    }
    if let Some(target) = &languages.target_lang {
        config.translate.target_language = target.clone();
    }
    if let Some(voice) = &languages.voice {
        config.speech.voice = voice.clone();
    }
}

/// External engines a command relies on
#[derive(Debug, Clone, Copy)]
struct Stages {
    media: bool,
    transcribe: bool,
    translate: bool,
}

impl Stages {
    const NONE: Stages = Stages { media: false, transcribe: false, translate: false };
    const DUB: Stages = Stages { media: true, transcribe: true, translate: true };
}

async fn build_workflow(mut config: Config, stages: Stages) -> Result<Workflow> {
    if stages.transcribe {
        let setup_manager = SetupManager::new(APP_DIR)?;
        setup_manager.prepare_transcriber(&mut config.transcriber).await?;
    }

    let workflow = Workflow::new(config)?;

    // Check dependencies
    if stages.media {
        workflow.check_media()?;
    }
    if stages.translate {
        workflow.check_translator().await?;
    }

    Ok(workflow)
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir: PathBuf = std::env::current_dir()?.join(APP_DIR).join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation; the guard must outlive the program
    let file_appender = rolling::daily(&log_dir, "voicedub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("voicedub.log").display());

    Ok(())
}
