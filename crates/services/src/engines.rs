//! Contracts for the external audio and speech engines.
//!
//! The coordinator never touches platform audio directly; it drives these
//! traits and awaits their acknowledgments. Both engines share one physical
//! audio device, which is why the coordinator serializes access to them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

use ditto_core::model::{AudioRef, SentenceId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    #[error("engine failed to start: {0}")]
    StartFailed(String),
    #[error("engine failed to stop: {0}")]
    StopFailed(String),
}

/// Reference-audio playback engine.
#[async_trait]
pub trait ReferenceAudio: Send + Sync {
    /// Begin playback of the given asset. Resolves once playback has started.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::StartFailed` if the output stream cannot be
    /// opened; the caller stays in its previous state.
    async fn play(&self, audio_ref: &AudioRef) -> Result<(), EngineError>;

    /// Stop playback. Resolves once the output stream has been released.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::StopFailed` if the engine cannot confirm the
    /// stop.
    async fn stop(&self) -> Result<(), EngineError>;

    fn is_playing(&self) -> bool;
}

/// Speech recognition engine.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Begin recognizing speech in the given locale. Resolves once the input
    /// stream is open.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::StartFailed` if the microphone cannot be opened;
    /// the caller stays in its previous state.
    async fn start(&self, locale: &str) -> Result<(), EngineError>;

    /// Stop recognizing. Resolves once the input stream has been released;
    /// the final transcript may still be pending (`is_loading`).
    ///
    /// # Errors
    ///
    /// Returns `EngineError::StopFailed` if the engine cannot confirm the
    /// stop.
    async fn stop(&self) -> Result<(), EngineError>;

    fn is_recording(&self) -> bool;

    /// True while the engine is finalizing a transcript after `stop`.
    fn is_loading(&self) -> bool;

    /// Latest recognized text, if any.
    fn transcript(&self) -> Option<String>;

    /// Reset the transcript without stopping the engine.
    fn clear(&self);
}

/// Fire-and-forget sink notified the first time a sentence is matched.
///
/// Invoked exactly once per sentence per session (edge-triggered); the UI
/// layer typically maps it to a celebratory effect.
pub trait CompletionSink: Send + Sync {
    fn sentence_passed(&self, sentence_id: SentenceId, index: usize);
}

impl<F> CompletionSink for F
where
    F: Fn(SentenceId, usize) + Send + Sync,
{
    fn sentence_passed(&self, sentence_id: SentenceId, index: usize) {
        self(sentence_id, index);
    }
}

/// Sink that ignores every completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl CompletionSink for NullSink {
    fn sentence_passed(&self, _sentence_id: SentenceId, _index: usize) {}
}

//
// ─── IN-MEMORY ENGINES ─────────────────────────────────────────────────────────
//

#[derive(Debug, Default)]
struct AudioInner {
    playing: Option<AudioRef>,
    fail_next_play: bool,
    play_count: u32,
    stop_count: u32,
}

/// Simple in-memory playback engine for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryAudioEngine {
    inner: Arc<Mutex<AudioInner>>,
}

impl InMemoryAudioEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `play` call fail with `StartFailed`.
    pub fn fail_next_play(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.fail_next_play = true;
        }
    }

    /// Asset currently being played, if any.
    #[must_use]
    pub fn playing(&self) -> Option<AudioRef> {
        self.inner.lock().map(|g| g.playing.clone()).unwrap_or(None)
    }

    #[must_use]
    pub fn play_count(&self) -> u32 {
        self.inner.lock().map(|g| g.play_count).unwrap_or(0)
    }

    #[must_use]
    pub fn stop_count(&self) -> u32 {
        self.inner.lock().map(|g| g.stop_count).unwrap_or(0)
    }
}

#[async_trait]
impl ReferenceAudio for InMemoryAudioEngine {
    async fn play(&self, audio_ref: &AudioRef) -> Result<(), EngineError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| EngineError::StartFailed(e.to_string()))?;
        if guard.fail_next_play {
            guard.fail_next_play = false;
            return Err(EngineError::StartFailed("audio device unavailable".into()));
        }
        guard.playing = Some(audio_ref.clone());
        guard.play_count += 1;
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| EngineError::StopFailed(e.to_string()))?;
        guard.playing = None;
        guard.stop_count += 1;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.inner
            .lock()
            .map(|g| g.playing.is_some())
            .unwrap_or(false)
    }
}

#[derive(Debug, Default)]
struct SpeechInner {
    recording: bool,
    loading: bool,
    transcript: Option<String>,
    queued: VecDeque<String>,
    defer_finalize: bool,
    fail_next_start: bool,
    last_locale: Option<String>,
}

/// Simple in-memory recognition engine for testing and prototyping.
///
/// Transcripts are scripted with `queue_transcript`; `defer_finalization`
/// makes `stop` leave the transcript pending so callers can exercise the
/// loading path via `finish_finalization`.
#[derive(Clone, Default)]
pub struct InMemorySpeechEngine {
    inner: Arc<Mutex<SpeechInner>>,
}

impl InMemorySpeechEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the transcript the next `stop` (or `finish_finalization`)
    /// delivers.
    pub fn queue_transcript(&self, text: impl Into<String>) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.queued.push_back(text.into());
        }
    }

    /// Makes `stop` leave the engine finalizing instead of delivering the
    /// transcript immediately.
    pub fn defer_finalization(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.defer_finalize = true;
        }
    }

    /// Makes the next `start` call fail with `StartFailed`.
    pub fn fail_next_start(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.fail_next_start = true;
        }
    }

    /// Completes a deferred finalization, returning the transcript that
    /// became available (the caller is expected to deliver it as an event).
    pub fn finish_finalization(&self) -> Option<String> {
        let Ok(mut guard) = self.inner.lock() else {
            return None;
        };
        guard.loading = false;
        if let Some(text) = guard.queued.pop_front() {
            guard.transcript = Some(text);
        }
        guard.transcript.clone()
    }

    /// Locale passed to the most recent `start` call.
    #[must_use]
    pub fn last_locale(&self) -> Option<String> {
        self.inner
            .lock()
            .map(|g| g.last_locale.clone())
            .unwrap_or(None)
    }
}

#[async_trait]
impl SpeechRecognizer for InMemorySpeechEngine {
    async fn start(&self, locale: &str) -> Result<(), EngineError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| EngineError::StartFailed(e.to_string()))?;
        if guard.fail_next_start {
            guard.fail_next_start = false;
            return Err(EngineError::StartFailed("microphone unavailable".into()));
        }
        guard.recording = true;
        guard.loading = false;
        guard.last_locale = Some(locale.to_string());
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| EngineError::StopFailed(e.to_string()))?;
        guard.recording = false;
        if guard.defer_finalize {
            guard.defer_finalize = false;
            guard.loading = true;
        } else {
            guard.loading = false;
            if let Some(text) = guard.queued.pop_front() {
                guard.transcript = Some(text);
            }
        }
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.inner.lock().map(|g| g.recording).unwrap_or(false)
    }

    fn is_loading(&self) -> bool {
        self.inner.lock().map(|g| g.loading).unwrap_or(false)
    }

    fn transcript(&self) -> Option<String> {
        self.inner
            .lock()
            .map(|g| g.transcript.clone())
            .unwrap_or(None)
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.transcript = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn audio_engine_tracks_playing_state() {
        let audio = InMemoryAudioEngine::new();
        assert!(!audio.is_playing());

        audio.play(&AudioRef::new("audio/1.m4a")).await.unwrap();
        assert!(audio.is_playing());
        assert_eq!(audio.playing().unwrap().as_str(), "audio/1.m4a");

        audio.stop().await.unwrap();
        assert!(!audio.is_playing());
        assert_eq!(audio.stop_count(), 1);
    }

    #[tokio::test]
    async fn injected_play_failure_fires_once() {
        let audio = InMemoryAudioEngine::new();
        audio.fail_next_play();
        assert!(audio.play(&AudioRef::new("a")).await.is_err());
        assert!(audio.play(&AudioRef::new("a")).await.is_ok());
    }

    #[tokio::test]
    async fn speech_engine_delivers_queued_transcript_on_stop() {
        let speech = InMemorySpeechEngine::new();
        speech.queue_transcript("bonjour");

        speech.start("fr-FR").await.unwrap();
        assert!(speech.is_recording());
        assert_eq!(speech.last_locale().as_deref(), Some("fr-FR"));

        speech.stop().await.unwrap();
        assert!(!speech.is_recording());
        assert!(!speech.is_loading());
        assert_eq!(speech.transcript().as_deref(), Some("bonjour"));

        speech.clear();
        assert!(speech.transcript().is_none());
    }

    #[tokio::test]
    async fn deferred_finalization_goes_through_loading() {
        let speech = InMemorySpeechEngine::new();
        speech.queue_transcript("merci");
        speech.defer_finalization();

        speech.start("fr-FR").await.unwrap();
        speech.stop().await.unwrap();
        assert!(speech.is_loading());
        assert!(speech.transcript().is_none());

        let text = speech.finish_finalization();
        assert_eq!(text.as_deref(), Some("merci"));
        assert!(!speech.is_loading());
    }
}
