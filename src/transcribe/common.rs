use std::path::Path;
use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;

use crate::error::{Result, DubError};

/// A time-bounded span of recognized speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionSegment {
    pub id: i32,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub segments: Vec<TranscriptionSegment>,
    pub language: String,
}

/// OpenAI Whisper specific JSON output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIWhisperOutput {
    pub text: String,
    pub segments: Vec<OpenAIWhisperSegment>,
    pub language: Option<String>,
}

/// OpenAI Whisper specific segment format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIWhisperSegment {
    pub id: u64,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl From<OpenAIWhisperOutput> for Transcription {
    fn from(output: OpenAIWhisperOutput) -> Self {
        let segments = output.segments
            .into_iter()
            .map(|seg| TranscriptionSegment {
                id: seg.id as i32,
                start: seg.start,
                end: seg.end,
                text: seg.text.trim().to_string(),
            })
            .collect();

        Transcription {
            text: output.text.trim().to_string(),
            segments,
            language: output.language.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

// whisper.cpp `-oj` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOutput {
    pub result: WhisperCppResult,
    pub transcription: Vec<WhisperCppSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppResult {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppSegment {
    pub offsets: WhisperCppOffsets,
    pub text: String,
}

/// Offsets in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOffsets {
    pub from: i64,
    pub to: i64,
}

impl From<WhisperCppOutput> for Transcription {
    fn from(output: WhisperCppOutput) -> Self {
        let text = output.transcription
            .iter()
            .map(|seg| seg.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let segments = output.transcription
            .into_iter()
            .enumerate()
            .map(|(id, seg)| TranscriptionSegment {
                id: id as i32,
                start: seg.offsets.from as f64 / 1000.0,
                end: seg.offsets.to as f64 / 1000.0,
                text: seg.text.trim().to_string(),
            })
            .collect();

        Transcription {
            text,
            segments,
            language: output.result.language,
        }
    }
}

/// Read an engine's JSON file and map it into a `Transcription`
pub fn read_engine_output<T>(json_file: &Path) -> Result<Transcription>
where
    T: DeserializeOwned + Into<Transcription>,
{
    if !json_file.exists() {
        return Err(DubError::Transcriber(format!(
            "Transcription output not found: {}",
            json_file.display()
        )));
    }

    let content = std::fs::read_to_string(json_file)
        .map_err(|e| DubError::Transcriber(format!("Failed to read output: {}", e)))?;

    let output: T = serde_json::from_str(&content)
        .map_err(|e| DubError::Transcriber(format!("Failed to parse transcription JSON: {}", e)))?;

    Ok(output.into())
}
