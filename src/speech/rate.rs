use std::fmt;
use std::str::FromStr;

use crate::config::RateStrategy;
use crate::error::{Result, DubError};

/// Speaking rate relative to the voice's natural speed, in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeechRate {
    pub percent: i32,
}

impl SpeechRate {
    pub const NORMAL: SpeechRate = SpeechRate { percent: 0 };

    pub fn new(percent: i32) -> Self {
        Self { percent }
    }

    /// Playback speed multiplier, e.g. +40% -> 1.4
    pub fn multiplier(&self) -> f64 {
        1.0 + self.percent as f64 / 100.0
    }
}

impl fmt::Display for SpeechRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}%", self.percent)
    }
}

impl FromStr for SpeechRate {
    type Err = DubError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        number
            .parse::<i32>()
            .map(SpeechRate::new)
            .map_err(|_| DubError::Config(format!(
                "Invalid speech rate '{}', expected a signed percentage like +40%", s
            )))
    }
}

/// Rate needed to read `text` inside `[start, end]`.
///
/// The natural reading time is derived from the non-whitespace character
/// count at `chars_per_minute`; `headroom_percent` is added on top and the
/// result is clamped to `[min_percent, max_percent]`.
pub fn fit_rate(
    text: &str,
    start: f64,
    end: f64,
    chars_per_minute: f64,
    headroom_percent: i32,
    min_percent: i32,
    max_percent: i32,
) -> SpeechRate {
    let chars = text.chars().filter(|c| !c.is_whitespace()).count();
    let window = end - start;

    if chars == 0 || !(window > 0.0) || !(chars_per_minute > 0.0) {
        return SpeechRate::NORMAL;
    }

    let natural_secs = chars as f64 / chars_per_minute * 60.0;
    let speed = natural_secs / window;
    let percent = ((speed - 1.0) * 100.0).round() + f64::from(headroom_percent);
    let percent = percent.clamp(f64::from(min_percent), f64::from(max_percent));

    SpeechRate::new(percent as i32)
}

impl RateStrategy {
    /// Rate for one segment's translated text
    pub fn rate_for(&self, text: &str, start: f64, end: f64) -> Result<SpeechRate> {
        match self {
            RateStrategy::Fixed { value } => value.parse(),
            RateStrategy::Fit { chars_per_minute, headroom_percent, min_percent, max_percent } => {
                Ok(fit_rate(
                    text,
                    start,
                    end,
                    *chars_per_minute,
                    *headroom_percent,
                    *min_percent,
                    *max_percent,
                ))
            }
        }
    }
}
