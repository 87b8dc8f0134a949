use super::aggregate::{finalize, AnalysisReport};
use super::features::{AudioFeatures, FeatureExtractor};
use super::makhraj::score_makhraj;
use super::outcome::AnalysisOutcome;
use super::sifat::score_sifat;
use super::{fallback, parse_letter_id, AnalysisError};
use crate::letters::{LetterPattern, LetterTable};
use crate::server::metrics;
use crate::transcription::{Transcriber, Transcription, TranscriptionError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const DEFAULT_TRANSCRIPTION_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_LANGUAGE: &str = "ar";

/// Runs one recording through extraction, transcription and scoring.
pub struct PronunciationAnalyzer {
    letters: Arc<LetterTable>,
    extractor: Arc<dyn FeatureExtractor>,
    transcriber: Arc<dyn Transcriber>,
    transcription_timeout: Duration,
    language: String,
}

impl PronunciationAnalyzer {
    pub fn new(
        letters: Arc<LetterTable>,
        extractor: Arc<dyn FeatureExtractor>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self {
            letters,
            extractor,
            transcriber,
            transcription_timeout: DEFAULT_TRANSCRIPTION_TIMEOUT,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_transcription_timeout(mut self, timeout: Duration) -> Self {
        self.transcription_timeout = timeout;
        self
    }

    pub fn letters(&self) -> &LetterTable {
        &self.letters
    }

    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    pub fn transcriber_name(&self) -> &'static str {
        self.transcriber.name()
    }

    /// Best-effort transcription. Every failure, including the overall
    /// timeout, yields `None`.
    pub async fn transcribe(&self, audio: &[u8]) -> Option<Transcription> {
        let start = Instant::now();
        let result = tokio::time::timeout(
            self.transcription_timeout,
            self.transcriber.transcribe(audio, &self.language),
        )
        .await
        .unwrap_or(Err(TranscriptionError::Timeout));

        match result {
            Ok(transcription) => {
                metrics::record_transcription("success", start.elapsed());
                debug!(model = %transcription.model, text = %transcription.text, "Transcribed attempt");
                Some(transcription)
            }
            Err(TranscriptionError::Disabled) => None,
            Err(e) => {
                metrics::record_transcription(e.kind(), start.elapsed());
                warn!(
                    transcriber = self.transcriber.name(),
                    error = %e,
                    "Transcription unavailable, continuing without it"
                );
                None
            }
        }
    }

    /// Resolves a string-encoded letter id against the letter table.
    pub fn resolve(&self, letter_id: &str) -> Result<&LetterPattern, AnalysisError> {
        let id = parse_letter_id(letter_id)?;
        self.letters.require(id)
    }

    /// Runs the extractor on the blocking pool. A panic inside the extractor
    /// is resumed on the calling task.
    pub async fn extract(&self, audio: &[u8]) -> AudioFeatures {
        let extractor = self.extractor.clone();
        let audio = audio.to_vec();
        match tokio::task::spawn_blocking(move || extractor.extract(&audio)).await {
            Ok(features) => features.sanitized(),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!(extractor = self.extractor.name(), error = %e, "Feature extraction cancelled");
                AudioFeatures::silent()
            }
        }
    }

    /// Primary scoring path.
    pub async fn score(
        &self,
        letter_id: &str,
        audio: &[u8],
        transcription: Option<Transcription>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let pattern = self.resolve(letter_id)?;

        let features = self.extract(audio).await;
        debug!(
            letter_id = pattern.id,
            extractor = self.extractor.name(),
            duration_ms = features.duration_ms,
            frequency_hz = features.dominant_frequency_hz,
            "Extracted features"
        );

        let makhraj = score_makhraj(&features, pattern);
        let sifat = score_sifat(&features, pattern);
        Ok(finalize(pattern, &features, makhraj, sifat, transcription))
    }

    /// Runs the primary path and degrades to the secondary tier on failure.
    pub async fn run(&self, letter_id: &str, audio: &[u8]) -> AnalysisOutcome {
        let transcription = self.transcribe(audio).await;

        match self.score(letter_id, audio, transcription.clone()).await {
            Ok(report) => {
                info!(
                    letter_id = report.letter.id,
                    overall = report.scores.overall,
                    "Analysis completed"
                );
                AnalysisOutcome::Advanced(Box::new(report))
            }
            Err(e) => {
                warn!(letter_id = %letter_id, error = %e, "Analysis failed, using fallback scores");
                let pattern = parse_letter_id(letter_id)
                    .ok()
                    .and_then(|id| self.letters.get(id));
                AnalysisOutcome::Fallback(fallback::secondary(
                    pattern,
                    transcription.as_ref(),
                    e.to_string(),
                    &mut rand::rng(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::features;
    use crate::analysis::{FixedFeatureExtractor, Tier, WavFeatureExtractor};
    use crate::transcription::{MockTranscriber, NoopTranscriber};
    use async_trait::async_trait;

    fn analyzer_with(transcriber: Arc<dyn Transcriber>) -> PronunciationAnalyzer {
        let mut f = features(300.0, 120.0);
        f.amplitude = 0.8;
        PronunciationAnalyzer::new(
            Arc::new(LetterTable::builtin().unwrap()),
            Arc::new(FixedFeatureExtractor::new(f)),
            transcriber,
        )
    }

    struct SlowTranscriber;

    #[async_trait]
    impl Transcriber for SlowTranscriber {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn transcribe(
            &self,
            _audio: &[u8],
            _language: &str,
        ) -> Result<Transcription, TranscriptionError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Transcription {
                text: "ب".to_string(),
                model: "slow".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn ba_with_matching_features_scores_full_marks() {
        let analyzer = analyzer_with(Arc::new(NoopTranscriber));
        let outcome = analyzer.run("2", b"audio").await;

        assert_eq!(outcome.tier(), Tier::Advanced);
        let report = outcome.report().unwrap();
        assert_eq!(report.scores.overall, 100);
        assert_eq!(report.makhraj.accuracy, 100.0);
        assert_eq!(report.sifat.accuracy, 100.0);
        assert!(report
            .sifat
            .detected_attributes
            .contains(&"Jahr (voiced)".to_string()));
        assert!(report.transcription.is_none());
    }

    #[tokio::test]
    async fn unknown_letter_falls_back() {
        let analyzer = analyzer_with(Arc::new(NoopTranscriber));

        let outcome = analyzer.run("99", b"audio").await;
        assert_eq!(outcome.tier(), Tier::Fallback);
        assert!((30..=98).contains(&outcome.overall()));

        let outcome = analyzer.run("ba", b"audio").await;
        assert_eq!(outcome.tier(), Tier::Fallback);
    }

    #[tokio::test]
    async fn score_reports_typed_errors() {
        let analyzer = analyzer_with(Arc::new(NoopTranscriber));
        assert_eq!(
            analyzer.score("99", b"", None).await.unwrap_err(),
            AnalysisError::PatternNotFound(99)
        );
        assert!(matches!(
            analyzer.score("x", b"", None).await.unwrap_err(),
            AnalysisError::InvalidLetterId(_)
        ));
        assert_eq!(analyzer.resolve("2").unwrap().id, 2);
    }

    #[tokio::test]
    async fn truncated_wav_upload_is_scored_promptly() {
        let analyzer = PronunciationAnalyzer::new(
            Arc::new(LetterTable::builtin().unwrap()),
            Arc::new(WavFeatureExtractor::new()),
            Arc::new(NoopTranscriber),
        );
        // 16-bit mono PCM header claiming a ~4GB data chunk, followed by 64 bytes
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&u32::MAX.to_le_bytes());
        wav.extend_from_slice(b"WAVEfmt ");
        for field in [16u32, 0x0001_0001, 16_000, 32_000, 0x0010_0002] {
            wav.extend_from_slice(&field.to_le_bytes());
        }
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&0xFFFF_FFD0u32.to_le_bytes());
        wav.extend_from_slice(&[0u8; 64]);

        let outcome = tokio::time::timeout(Duration::from_secs(2), analyzer.run("2", &wav))
            .await
            .expect("analysis should not stall on a truncated upload");
        assert_eq!(outcome.tier(), Tier::Advanced);
    }

    struct PanickingExtractor;

    impl FeatureExtractor for PanickingExtractor {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn extract(&self, _audio: &[u8]) -> AudioFeatures {
            panic!("extractor blew up");
        }
    }

    #[tokio::test]
    async fn extractor_panic_reaches_the_caller() {
        use futures::FutureExt;

        let analyzer = PronunciationAnalyzer::new(
            Arc::new(LetterTable::builtin().unwrap()),
            Arc::new(PanickingExtractor),
            Arc::new(NoopTranscriber),
        );
        let result = std::panic::AssertUnwindSafe(analyzer.run("2", b"audio"))
            .catch_unwind()
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn transcription_is_attached_without_changing_scores() {
        let mut mock = MockTranscriber::new();
        mock.expect_name().return_const("mock");
        mock.expect_transcribe().times(1).returning(|_, language| {
            assert_eq!(language, "ar");
            Ok(Transcription {
                text: "ب".to_string(),
                model: "mock-model".to_string(),
            })
        });
        let analyzer = analyzer_with(Arc::new(mock));

        let outcome = analyzer.run("2", b"audio").await;
        let report = outcome.report().unwrap();
        assert_eq!(report.transcription.as_ref().unwrap().model, "mock-model");
        assert_eq!(report.transcription_similarity, Some(100));
        assert_eq!(report.scores.overall, 100);
    }

    #[tokio::test]
    async fn transcription_failures_are_absorbed() {
        let mut mock = MockTranscriber::new();
        mock.expect_name().return_const("mock");
        mock.expect_transcribe()
            .returning(|_, _| Err(TranscriptionError::RateLimited));
        let analyzer = analyzer_with(Arc::new(mock));

        let outcome = analyzer.run("2", b"audio").await;
        assert_eq!(outcome.tier(), Tier::Advanced);
        assert!(outcome.report().unwrap().transcription.is_none());
    }

    #[tokio::test]
    async fn slow_transcription_times_out() {
        let analyzer = analyzer_with(Arc::new(SlowTranscriber))
            .with_transcription_timeout(Duration::from_millis(100));

        assert!(analyzer.transcribe(b"audio").await.is_none());
    }
}
