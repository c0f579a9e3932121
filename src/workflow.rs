use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, DubError};
use crate::layout::{RunLayout, batch_names, video_stem};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait, VoiceClip};
use crate::speech::{SpeechRate, SpeechSynthesizer, SpeechSynthesizerFactory, wait_for_file};
use crate::subtitle::generate_srt;
use crate::transcribe::{Transcriber, TranscriberFactory, Transcription, TranscriptionSegment};
use crate::translate::{Translator, TranslatorFactory, translate_or_original};

const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];

/// Voice clips written during one run, removed once the run is over
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    pub fn register(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Remove every registered file, returning how many were deleted
    pub async fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for (index, path) in self.paths.drain(..).enumerate() {
            match fs::remove_file(&path).await {
                Ok(()) => {
                    removed += 1;
                    info!("{}. Removed voice file {}", index, path.display());
                }
                Err(e) => warn!("{}. Failed to remove voice file {}: {}", index, path.display(), e),
            }
        }
        removed
    }
}

/// Outcome of a directory run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

pub struct Workflow {
    config: Config,
    transcriber: Box<dyn Transcriber>,
    translator: Box<dyn Translator>,
    speech: Box<dyn SpeechSynthesizer>,
    media: Box<dyn MediaProcessorTrait>,
    started_at: DateTime<Local>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let transcriber = TranscriberFactory::create_transcriber(
            config.transcriber.clone(),
            &config.media.binary_path,
        );
        let translator = TranslatorFactory::create_translator(&config.translate)?;
        let speech = SpeechSynthesizerFactory::create_synthesizer(&config.speech)?;
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        Ok(Self::with_components(config, transcriber, translator, speech, media, Local::now()))
    }

    /// Assemble a workflow from explicit collaborators
    pub fn with_components(
        config: Config,
        transcriber: Box<dyn Transcriber>,
        translator: Box<dyn Translator>,
        speech: Box<dyn SpeechSynthesizer>,
        media: Box<dyn MediaProcessorTrait>,
        started_at: DateTime<Local>,
    ) -> Self {
        Self {
            config,
            transcriber,
            translator,
            speech,
            media,
            started_at,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fail early when ffmpeg is missing; only commands that touch media need it
    pub fn check_media(&self) -> Result<()> {
        self.media.check_availability()
    }

    /// Fail early when the translation engine cannot be reached
    pub async fn check_translator(&self) -> Result<()> {
        self.translator.check_availability().await
    }

    fn layout(&self, output_dir: Option<&Path>) -> RunLayout {
        let layout = RunLayout::new(&self.config.paths, &self.started_at);
        match output_dir {
            Some(dir) => layout.with_output_dir(dir),
            None => layout,
        }
    }

    /// Add a voice-over to a single video and return the new video's path
    pub async fn dub_video(&self, input_path: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
        info!("Processing single file: {}", input_path.display());
        let layout = self.layout(output_dir);
        self.dub(input_path, &layout, &video_stem(input_path), false).await
    }

    /// Add a voice-over to every video below a directory
    pub async fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: Option<&Path>,
    ) -> Result<BatchSummary> {
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(DubError::Config("Input path is not a directory".to_string()));
        }

        let layout = self.layout(output_dir);
        let video_files = find_videos(input_dir);
        info!("Found {} video files to process", video_files.len());

        let names = batch_names(input_dir, &video_files);

        let mut summary = BatchSummary::default();
        for (video_path, name) in video_files.into_iter().zip(names) {
            match self.dub(&video_path, &layout, &name, true).await {
                Ok(output) => {
                    info!("Successfully processed: {}", video_path.display());
                    summary.succeeded.push(output);
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", video_path.display(), e);
                    summary.failed.push((video_path, e.to_string()));
                }
            }
        }

        Ok(summary)
    }

    /// `name` keys the intermediate audio and, in batch mode, the output video
    async fn dub(
        &self,
        input_path: &Path,
        layout: &RunLayout,
        name: &str,
        batch: bool,
    ) -> Result<PathBuf> {
        if !input_path.exists() {
            return Err(DubError::FileNotFound(input_path.display().to_string()));
        }

        for dir in layout.directories() {
            fs::create_dir_all(dir).await?;
        }

        // Step 1: extract audio
        let audio_path = layout.audio_path(name);
        if let Err(e) = self.media.extract_audio(input_path, &audio_path).await {
            error!("Could not extract audio from video: {}", e);
            return Err(e);
        }

        // Step 2: transcribe
        let transcription = match self.transcribe(&audio_path).await {
            Ok(transcription) => transcription,
            Err(e) => {
                error!("Could not transcribe audio: {}", e);
                return Err(e);
            }
        };

        // Step 3: translate and voice every segment
        let mut temp_files = TempFiles::default();
        let clips = self.voice_segments(&transcription.segments, layout, &mut temp_files).await;

        // Step 4: mux
        let output_path = layout.output_path(batch.then_some(name));
        let muxed = self.media.mux_voiceover(input_path, &clips, &output_path).await;

        if self.config.paths.keep_voice_files {
            info!("Keeping {} voice files", temp_files.paths().len());
        } else {
            temp_files.cleanup().await;
        }

        if let Err(e) = muxed {
            error!("Could not mux voice-over into video: {}", e);
            return Err(e);
        }

        info!("Voice-over complete! New video at: {}", output_path.display());
        Ok(output_path)
    }

    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription> {
        info!("Transcribing audio file: {}", audio_path.display());
        let language = self.config.transcriber.language.as_deref();
        let transcription = self.transcriber.transcribe(audio_path, language).await?;
        info!("Recognized text: {}", transcription.text);
        Ok(transcription)
    }

    /// Translate and synthesize each segment in order.
    ///
    /// Segments whose translation is empty or whose synthesis fails are left
    /// out of the returned clips.
    pub async fn voice_segments(
        &self,
        segments: &[TranscriptionSegment],
        layout: &RunLayout,
        temp_files: &mut TempFiles,
    ) -> Vec<VoiceClip> {
        let translate = &self.config.translate;
        let total = segments.len();
        let mut clips = Vec::with_capacity(total);

        let progress = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments")
        {
            progress.set_style(style.progress_chars("#>-"));
        }

        for (idx, segment) in segments.iter().enumerate() {
            let translated = translate_or_original(
                self.translator.as_ref(),
                &segment.text,
                &translate.source_language,
                &translate.target_language,
            )
            .await;
            let translated = translated.trim();

            if translated.is_empty() {
                warn!("Segment {} ({:.2}s-{:.2}s) has no text, skipping", idx, segment.start, segment.end);
            } else {
                match self.voice_segment(segment, translated, layout).await {
                    Ok(path) => {
                        temp_files.register(path.clone());
                        clips.push(VoiceClip { path, start: segment.start });
                    }
                    Err(e) => warn!(
                        "Segment {} ({:.2}s-{:.2}s) could not be voiced, skipping: {}",
                        idx, segment.start, segment.end, e
                    ),
                }
            }

            progress.inc(1);
            info!("Processed: {}%", progress_percent(idx + 1, total));
        }

        progress.finish_and_clear();
        clips
    }

    async fn voice_segment(
        &self,
        segment: &TranscriptionSegment,
        text: &str,
        layout: &RunLayout,
    ) -> Result<PathBuf> {
        let rate = self.config.speech.rate.rate_for(text, segment.start, segment.end)?;
        let voice_path = layout.voice_path(segment.start, segment.end);
        debug!("Voicing segment at {} -> {}", rate, voice_path.display());

        let path = self.speech.synthesize(text, &rate, &voice_path).await?;

        let timeout = Duration::from_secs(self.config.speech.file_wait_timeout_secs);
        if !wait_for_file(&path, timeout).await {
            return Err(DubError::Speech(format!(
                "Voice file did not appear within {}s: {}",
                timeout.as_secs(),
                path.display()
            )));
        }

        Ok(path)
    }

    /// Extract audio from video file
    pub async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        if !video_path.exists() {
            return Err(DubError::FileNotFound(video_path.display().to_string()));
        }
        if let Some(parent) = audio_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        self.media.extract_audio(video_path, audio_path).await
    }

    /// Transcribe audio to SRT, optionally keeping the transcription as JSON
    pub async fn transcribe_to_srt(
        &self,
        audio_path: &Path,
        srt_path: &Path,
        language: Option<&str>,
        json_path: Option<&Path>,
    ) -> Result<Transcription> {
        if !audio_path.exists() {
            return Err(DubError::FileNotFound(audio_path.display().to_string()));
        }

        let language = language.or(self.config.transcriber.language.as_deref());
        let transcription = self.transcriber.transcribe(audio_path, language).await?;

        generate_srt(&transcription, srt_path).await?;

        if let Some(json_path) = json_path {
            fs::write(json_path, serde_json::to_string_pretty(&transcription)?).await?;
        }

        Ok(transcription)
    }

    /// Translate a single string, surfacing engine errors
    pub async fn translate_text(&self, text: &str, source: &str, target: &str) -> Result<String> {
        self.translator.translate(text, source, target).await
    }

    /// Synthesize a single string
    pub async fn speak(&self, text: &str, rate: Option<SpeechRate>, output_path: &Path) -> Result<PathBuf> {
        let rate = match rate {
            Some(rate) => rate,
            None => self.config.speech.rate.rate_for(text, 0.0, 0.0)?,
        };
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        self.speech.synthesize(text, &rate, output_path).await
    }
}

/// Completed share of `total`, in percent rounded to two decimals
pub fn progress_percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (done as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// Video files below `dir`, skipping outputs of earlier runs
fn find_videos(dir: &Path) -> Vec<PathBuf> {
    let mut video_files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            let is_video = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false);
            let is_output = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().contains("_with_voiceover_"))
                .unwrap_or(false);
            is_video && !is_output
        })
        .collect();

    video_files.sort();
    video_files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::MockSpeechSynthesizer;
    use crate::translate::MockTranslator;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    struct FakeTranscriber {
        segments: Vec<TranscriptionSegment>,
        calls: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, _audio_path: &Path, _language: Option<&str>) -> Result<Transcription> {
            *self.calls.lock().unwrap() += 1;
            Ok(Transcription {
                text: self.segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" "),
                segments: self.segments.clone(),
                language: "zh".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct MediaLog {
        extracted: Vec<PathBuf>,
        muxed: Vec<(PathBuf, Vec<VoiceClip>)>,
        voice_files_present_at_mux: Vec<bool>,
    }

    struct FakeMedia {
        log: Arc<Mutex<MediaLog>>,
        missing: bool,
        fail_extract: bool,
        fail_mux: bool,
    }

    #[async_trait]
    impl MediaProcessorTrait for FakeMedia {
        async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
            if self.fail_extract {
                return Err(DubError::Extraction("no audio stream".to_string()));
            }
            std::fs::write(audio_path, b"audio")?;
            self.log.lock().unwrap().extracted.push(video_path.to_path_buf());
            Ok(())
        }

        async fn mux_voiceover(&self, _video: &Path, clips: &[VoiceClip], output_path: &Path) -> Result<()> {
            let mut log = self.log.lock().unwrap();
            log.voice_files_present_at_mux = clips.iter().map(|c| c.path.exists()).collect();
            log.muxed.push((output_path.to_path_buf(), clips.to_vec()));
            if self.fail_mux {
                return Err(DubError::Media("encoder missing".to_string()));
            }
            std::fs::write(output_path, b"video")?;
            Ok(())
        }

        fn check_availability(&self) -> Result<()> {
            if self.missing {
                return Err(DubError::Media("ffmpeg not found".to_string()));
            }
            Ok(())
        }
    }

    struct Harness {
        dir: tempfile::TempDir,
        config: Config,
        segments: Vec<TranscriptionSegment>,
        transcriber_calls: Arc<Mutex<usize>>,
        media_log: Arc<Mutex<MediaLog>>,
        media_missing: bool,
        fail_extract: bool,
        fail_mux: bool,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut config = Config::default();
            config.paths.work_dir = dir.path().to_path_buf();
            config.speech.file_wait_timeout_secs = 1;

            Self {
                dir,
                config,
                segments: vec![
                    segment(0, 0.0, 2.5, "你好"),
                    segment(1, 2.5, 5.0, "欢迎"),
                ],
                transcriber_calls: Arc::new(Mutex::new(0)),
                media_log: Arc::new(Mutex::new(MediaLog::default())),
                media_missing: false,
                fail_extract: false,
                fail_mux: false,
            }
        }

        fn video(&self, name: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, b"video").unwrap();
            path
        }

        fn workflow(&self, translator: MockTranslator, speech: MockSpeechSynthesizer) -> Workflow {
            let transcriber = FakeTranscriber {
                segments: self.segments.clone(),
                calls: self.transcriber_calls.clone(),
            };
            let media = FakeMedia {
                log: self.media_log.clone(),
                missing: self.media_missing,
                fail_extract: self.fail_extract,
                fail_mux: self.fail_mux,
            };
            Workflow::with_components(
                self.config.clone(),
                Box::new(transcriber),
                Box::new(translator),
                Box::new(speech),
                Box::new(media),
                Local.with_ymd_and_hms(2026, 10, 17, 9, 5, 0).unwrap(),
            )
        }
    }

    fn segment(id: i32, start: f64, end: f64, text: &str) -> TranscriptionSegment {
        TranscriptionSegment { id, start, end, text: text.to_string() }
    }

    fn echo_translator() -> MockTranslator {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .returning(|text, _, _| Ok(format!("vi:{}", text)));
        translator
    }

    fn writing_speech() -> MockSpeechSynthesizer {
        let mut speech = MockSpeechSynthesizer::new();
        speech.expect_synthesize().returning(|text, _, path| {
            std::fs::write(path, text.as_bytes()).unwrap();
            Ok(path.to_path_buf())
        });
        speech
    }

    #[tokio::test]
    async fn dubs_every_segment_and_cleans_up() {
        let harness = Harness::new();
        let input = harness.video("media/videoplayback.mp4");
        let workflow = harness.workflow(echo_translator(), writing_speech());

        let output = workflow.dub_video(&input, None).await.unwrap();

        assert_eq!(
            output,
            harness.dir.path().join("media-output/video_with_voiceover_17-10-2026-09-05.mp4")
        );
        assert!(harness.dir.path().join("media/audio_videoplayback.mp3").exists());

        let log = harness.media_log.lock().unwrap();
        let (_, clips) = &log.muxed[0];
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].start, 0.0);
        assert_eq!(clips[1].start, 2.5);
        assert_eq!(clips[1].path, harness.dir.path().join("voice/voice_2.5_5.0.mp3"));
        assert_eq!(log.voice_files_present_at_mux, vec![true, true]);
        assert!(clips.iter().all(|c| !c.path.exists()));
    }

    #[tokio::test]
    async fn voices_source_text_when_translation_fails() {
        let harness = Harness::new();
        let input = harness.video("in.mp4");

        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .returning(|_, _, _| Err(DubError::Translation("rate limited".to_string())));

        let mut speech = MockSpeechSynthesizer::new();
        speech
            .expect_synthesize()
            .withf(|text, rate, _| (text == "你好" || text == "欢迎") && *rate == SpeechRate::new(40))
            .times(2)
            .returning(|_, _, path| {
                std::fs::write(path, b"mp3").unwrap();
                Ok(path.to_path_buf())
            });

        let workflow = harness.workflow(translator, speech);
        workflow.dub_video(&input, None).await.unwrap();

        assert_eq!(harness.media_log.lock().unwrap().muxed[0].1.len(), 2);
    }

    #[tokio::test]
    async fn failed_segment_is_skipped() {
        let harness = Harness::new();
        let input = harness.video("in.mp4");

        let mut speech = MockSpeechSynthesizer::new();
        speech.expect_synthesize().returning(|text, _, path| {
            if text.contains("你好") {
                return Err(DubError::Speech("voice unavailable".to_string()));
            }
            std::fs::write(path, b"mp3").unwrap();
            Ok(path.to_path_buf())
        });

        let workflow = harness.workflow(echo_translator(), speech);
        workflow.dub_video(&input, None).await.unwrap();

        let log = harness.media_log.lock().unwrap();
        let clips = &log.muxed[0].1;
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].start, 2.5);
    }

    #[tokio::test]
    async fn voice_file_that_never_appears_is_skipped() {
        let harness = Harness::new();
        let input = harness.video("in.mp4");

        let mut speech = MockSpeechSynthesizer::new();
        speech
            .expect_synthesize()
            .returning(|_, _, path| Ok(path.to_path_buf()));

        let workflow = harness.workflow(echo_translator(), speech);
        workflow.dub_video(&input, None).await.unwrap();

        assert!(harness.media_log.lock().unwrap().muxed[0].1.is_empty());
    }

    #[tokio::test]
    async fn empty_transcription_still_produces_a_video() {
        let mut harness = Harness::new();
        harness.segments.clear();
        let input = harness.video("in.mp4");

        let mut translator = MockTranslator::new();
        translator.expect_translate().never();
        let mut speech = MockSpeechSynthesizer::new();
        speech.expect_synthesize().never();

        let output = harness.workflow(translator, speech).dub_video(&input, None).await.unwrap();
        assert!(output.exists());
    }

    #[tokio::test]
    async fn blank_translation_is_not_voiced() {
        let harness = Harness::new();
        let input = harness.video("in.mp4");

        let mut translator = MockTranslator::new();
        translator.expect_translate().returning(|text, _, _| {
            Ok(if text == "你好" { "   ".to_string() } else { "Chào mừng".to_string() })
        });

        let mut speech = MockSpeechSynthesizer::new();
        speech
            .expect_synthesize()
            .withf(|text, _, _| text == "Chào mừng")
            .times(1)
            .returning(|_, _, path| {
                std::fs::write(path, b"mp3").unwrap();
                Ok(path.to_path_buf())
            });

        harness.workflow(translator, speech).dub_video(&input, None).await.unwrap();
    }

    #[tokio::test]
    async fn extraction_failure_aborts_before_transcription() {
        let mut harness = Harness::new();
        harness.fail_extract = true;
        let input = harness.video("in.mp4");

        let err = harness
            .workflow(MockTranslator::new(), MockSpeechSynthesizer::new())
            .dub_video(&input, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DubError::Extraction(_)));
        assert_eq!(*harness.transcriber_calls.lock().unwrap(), 0);
        assert!(harness.media_log.lock().unwrap().muxed.is_empty());
    }

    #[tokio::test]
    async fn missing_input_is_reported() {
        let harness = Harness::new();
        let err = harness
            .workflow(MockTranslator::new(), MockSpeechSynthesizer::new())
            .dub_video(&harness.dir.path().join("nope.mp4"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, DubError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn mux_failure_still_removes_voice_files() {
        let mut harness = Harness::new();
        harness.fail_mux = true;
        let input = harness.video("in.mp4");

        let err = harness
            .workflow(echo_translator(), writing_speech())
            .dub_video(&input, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DubError::Media(_)));
        let log = harness.media_log.lock().unwrap();
        assert!(log.muxed[0].1.iter().all(|c| !c.path.exists()));
    }

    #[tokio::test]
    async fn keep_voice_files_leaves_clips_on_disk() {
        let mut harness = Harness::new();
        harness.config.paths.keep_voice_files = true;
        let input = harness.video("in.mp4");

        harness
            .workflow(echo_translator(), writing_speech())
            .dub_video(&input, None)
            .await
            .unwrap();

        let log = harness.media_log.lock().unwrap();
        assert!(log.muxed[0].1.iter().all(|c| c.path.exists()));
    }

    #[tokio::test]
    async fn fit_strategy_chooses_rate_per_segment() {
        let mut harness = Harness::new();
        harness.config.speech.rate = crate::config::RateStrategy::Fit {
            chars_per_minute: 165.0,
            headroom_percent: 0,
            min_percent: -50,
            max_percent: 100,
        };
        let input = harness.video("in.mp4");

        let mut speech = MockSpeechSynthesizer::new();
        speech
            .expect_synthesize()
            .withf(|_, rate, _| *rate != SpeechRate::new(40))
            .times(2)
            .returning(|_, _, path| {
                std::fs::write(path, b"mp3").unwrap();
                Ok(path.to_path_buf())
            });

        harness.workflow(echo_translator(), speech).dub_video(&input, None).await.unwrap();
    }

    #[tokio::test]
    async fn batch_names_outputs_after_each_video() {
        let harness = Harness::new();
        let input_dir = harness.dir.path().join("batch");
        harness.video("batch/a.mp4");
        harness.video("batch/nested/a.mkv");
        harness.video("batch/nested/b.MKV");
        harness.video("batch/notes.txt");
        harness.video("batch/a_with_voiceover_01-01-2026-00-00.mp4");

        let out = harness.dir.path().join("out");
        let summary = harness
            .workflow(echo_translator(), writing_speech())
            .process_directory(&input_dir, Some(&out))
            .await
            .unwrap();

        assert!(summary.failed.is_empty());
        assert_eq!(
            summary.succeeded,
            vec![
                out.join("a_with_voiceover_17-10-2026-09-05.mp4"),
                out.join("nested_a_with_voiceover_17-10-2026-09-05.mp4"),
                out.join("nested_b_with_voiceover_17-10-2026-09-05.mp4"),
            ]
        );
        assert!(summary.succeeded.iter().all(|path| path.exists()));

        let audio_dir = harness.dir.path().join("media");
        assert!(audio_dir.join("audio_a.mp3").exists());
        assert!(audio_dir.join("audio_nested_a.mp3").exists());
    }

    #[tokio::test]
    async fn transcribe_to_srt_writes_both_formats() {
        let harness = Harness::new();
        let audio = harness.video("audio.mp3");
        let srt = harness.dir.path().join("out.srt");
        let json = harness.dir.path().join("out.json");

        let transcription = harness
            .workflow(MockTranslator::new(), MockSpeechSynthesizer::new())
            .transcribe_to_srt(&audio, &srt, Some("zh"), Some(&json))
            .await
            .unwrap();

        assert_eq!(transcription.segments.len(), 2);
        assert!(std::fs::read_to_string(&srt).unwrap().starts_with("1\n00:00:00,000 --> 00:00:02,500\n你好"));
        let reloaded: Transcription = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(reloaded, transcription);
    }

    #[tokio::test]
    async fn translation_and_speech_work_without_ffmpeg() {
        let mut harness = Harness::new();
        harness.media_missing = true;

        let mut translator = echo_translator();
        translator.expect_check_availability().times(1).returning(|| Ok(()));
        let workflow = harness.workflow(translator, writing_speech());

        assert!(matches!(workflow.check_media(), Err(DubError::Media(_))));
        workflow.check_translator().await.unwrap();
        assert_eq!(workflow.translate_text("你好", "zh-cn", "vi").await.unwrap(), "vi:你好");

        let spoken = harness.dir.path().join("speak/hello.mp3");
        workflow.speak("Xin chào", None, &spoken).await.unwrap();
        assert!(spoken.exists());
    }

    #[tokio::test]
    async fn unreachable_translator_is_reported_by_check() {
        let harness = Harness::new();
        let mut translator = MockTranslator::new();
        translator
            .expect_check_availability()
            .returning(|| Err(DubError::Translation("connection refused".to_string())));

        let err = harness
            .workflow(translator, MockSpeechSynthesizer::new())
            .check_translator()
            .await
            .unwrap_err();
        assert!(matches!(err, DubError::Translation(_)));
    }

    #[test]
    fn progress_is_rounded_to_two_decimals() {
        assert_eq!(progress_percent(1, 3), 33.33);
        assert_eq!(progress_percent(2, 3), 66.67);
        assert_eq!(progress_percent(3, 3), 100.0);
        assert_eq!(progress_percent(0, 0), 100.0);
    }

    #[tokio::test]
    async fn temp_files_cleanup_counts_removed_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.mp3");
        std::fs::write(&present, b"x").unwrap();

        let mut temp = TempFiles::default();
        temp.register(present.clone());
        temp.register(dir.path().join("gone.mp3"));

        assert_eq!(temp.cleanup().await, 1);
        assert!(!present.exists());
        assert!(temp.paths().is_empty());
    }
}
