//! voicedub - Automated Voice-over Workflow
//!
//! Transcribes a video's speech with whisper, translates each segment,
//! synthesizes localized narration and mixes it over the attenuated original
//! soundtrack with ffmpeg.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod transcribe;
pub mod translate;
pub mod speech;
pub mod subtitle;
pub mod media;
pub mod layout;
pub mod error;
pub mod setup;
