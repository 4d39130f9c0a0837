use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use ditto_core::grading::{GradeResult, grade};
use ditto_core::model::{Course, Sentence};
use ditto_core::progress::{PassLedger, ProgressSnapshot};

use crate::engines::{CompletionSink, NullSink, ReferenceAudio, SpeechRecognizer};
use crate::error::SessionError;

//
// ─── ACTIVITY ──────────────────────────────────────────────────────────────────
//

/// Exclusive audio-related state of a session.
///
/// A single enum rather than independent playing/recording booleans: the two
/// engines share one audio device, so at most one variant can ever hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Idle,
    PlayingReference,
    Recording,
    /// The speech engine is finalizing a transcript; playback and recording
    /// requests are rejected until the result arrives.
    Loading,
}

impl Activity {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Activity::Idle)
    }
}

//
// ─── EPOCHS AND EVENTS ─────────────────────────────────────────────────────────
//

/// Tag identifying which navigation/activity generation an in-flight engine
/// operation belongs to. Completions carrying an older epoch are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Epoch(u64);

impl Epoch {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Completion events the platform layer delivers on behalf of the engines.
///
/// Each event must carry the epoch returned when the operation was started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Reference audio reached its natural end.
    PlaybackFinished { epoch: Epoch },
    /// The speech engine produced a partial or final transcript.
    TranscriptReady { epoch: Epoch, transcript: String },
}

/// What became of a delivered event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDisposition {
    /// The event matched the current epoch and was applied; transcripts carry
    /// the grading verdict they produced.
    Applied { grade: Option<GradeResult> },
    /// The event belonged to an earlier epoch (or a closed session) and was
    /// discarded without touching state.
    Stale,
}

/// Result of a playback/recording toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The activity started; completions must be tagged with this epoch.
    Started(Epoch),
    /// The activity stopped.
    Stopped,
    /// Request ignored: a transcript is being finalized.
    Busy,
}

/// Result of a pagination-driven page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChange {
    pub index: usize,
    /// Epoch of the reference playback that was auto-started for the new
    /// sentence, when autoplay is enabled and the engine accepted it.
    pub autoplay: Option<Epoch>,
}

//
// ─── COORDINATOR ───────────────────────────────────────────────────────────────
//

/// Serializes every activity transition of one practice screen.
///
/// Owns the session state (current index, activity, transcript, pass ledger)
/// over a borrowed course, and acts as the mutex around the shared audio
/// device: each transition awaits the engine acknowledgment before the next
/// one can be issued. All transitions take `&mut self`, so concurrent
/// requests are rejected at compile time rather than at runtime.
pub struct SessionCoordinator {
    course: Arc<Course>,
    audio: Arc<dyn ReferenceAudio>,
    speech: Arc<dyn SpeechRecognizer>,
    sink: Arc<dyn CompletionSink>,
    index: usize,
    activity: Activity,
    transcript: Option<String>,
    ledger: PassLedger,
    epoch: Epoch,
    ready: bool,
    autoplay: bool,
    closed: bool,
    started_at: DateTime<Utc>,
}

impl std::fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("index", &self.index)
            .field("activity", &self.activity)
            .field("transcript", &self.transcript)
            .field("epoch", &self.epoch)
            .field("ready", &self.ready)
            .field("autoplay", &self.autoplay)
            .field("closed", &self.closed)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl SessionCoordinator {
    /// Creates a coordinator positioned at the first sentence, idle, with
    /// autoplay enabled and no completion sink.
    #[must_use]
    pub fn new(
        course: Arc<Course>,
        audio: Arc<dyn ReferenceAudio>,
        speech: Arc<dyn SpeechRecognizer>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let ledger = PassLedger::new(course.len());
        Self {
            course,
            audio,
            speech,
            sink: Arc::new(NullSink),
            index: 0,
            activity: Activity::Idle,
            transcript: None,
            ledger,
            epoch: Epoch(0),
            ready: false,
            autoplay: true,
            closed: false,
            started_at,
        }
    }

    /// Installs the sink notified on each first-time sentence match.
    #[must_use]
    pub fn with_completion_sink(mut self, sink: Arc<dyn CompletionSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Enables or disables automatic reference playback after `begin` and
    /// page changes.
    #[must_use]
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    // ─── Read-only accessors ───────────────────────────────────────────────

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn activity(&self) -> Activity {
        self.activity
    }

    #[must_use]
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    /// Epoch in-flight engine completions must match to be applied.
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn current_sentence(&self) -> &Sentence {
        // index stays within bounds: navigation is bounds-checked and the
        // course is never empty.
        &self.course.sentences()[self.index]
    }

    /// Navigation bounds and completion state, recomputed on every call.
    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        ProgressSnapshot::derive(self.index, &self.ledger)
    }

    /// Grades the latest transcript against the current sentence, or `None`
    /// when nothing has been recognized yet (the ungraded rendering mode).
    #[must_use]
    pub fn grade_current(&self) -> Option<GradeResult> {
        self.transcript
            .as_deref()
            .map(|transcript| grade(self.current_sentence().reference_text(), transcript))
    }

    // ─── Transitions ───────────────────────────────────────────────────────

    /// Marks the session ready (the learner pressed Start) and, when autoplay
    /// is enabled, plays the current sentence's reference audio.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` after `close`.
    pub async fn begin(&mut self) -> Result<PageChange, SessionError> {
        self.ensure_open()?;
        self.ready = true;
        self.clear_transcript();
        let autoplay = if self.autoplay {
            self.try_autoplay().await
        } else {
            None
        };
        Ok(PageChange {
            index: self.index,
            autoplay,
        })
    }

    /// Toggles reference-audio playback.
    ///
    /// Starting playback while recording first stops the recording and waits
    /// for the engine's acknowledgment — input and output never overlap on
    /// the shared device — then discards the aborted attempt's transcript.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` after `close`, or
    /// `SessionError::Engine` when an engine call fails; a failed start
    /// leaves the activity `Idle`.
    pub async fn toggle_playback(&mut self) -> Result<ToggleOutcome, SessionError> {
        self.ensure_open()?;
        match self.activity {
            Activity::Loading => Ok(ToggleOutcome::Busy),
            Activity::PlayingReference => {
                self.audio.stop().await?;
                self.epoch = self.epoch.next();
                self.activity = Activity::Idle;
                Ok(ToggleOutcome::Stopped)
            }
            Activity::Recording => {
                self.speech.stop().await?;
                self.epoch = self.epoch.next();
                self.clear_transcript();
                self.start_playback().await
            }
            Activity::Idle => self.start_playback().await,
        }
    }

    /// Toggles speech recognition for the current sentence.
    ///
    /// The transcript is cleared up front so grading always starts clean;
    /// in-flight playback is stopped (and acknowledged) before the
    /// microphone opens. Stopping a recording whose engine is still
    /// finalizing enters `Loading` until the transcript event arrives.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` after `close`, or
    /// `SessionError::Engine` when an engine call fails; a failed start
    /// leaves the activity `Idle`.
    pub async fn toggle_recording(&mut self) -> Result<ToggleOutcome, SessionError> {
        self.ensure_open()?;
        if matches!(self.activity, Activity::Loading) {
            return Ok(ToggleOutcome::Busy);
        }
        self.clear_transcript();
        match self.activity {
            // Guarded above; kept for exhaustiveness.
            Activity::Loading => Ok(ToggleOutcome::Busy),
            Activity::PlayingReference => {
                self.audio.stop().await?;
                self.epoch = self.epoch.next();
                self.start_recording().await
            }
            Activity::Recording => {
                self.speech.stop().await?;
                if self.speech.is_loading() {
                    // The pending finalization still belongs to this epoch.
                    self.activity = Activity::Loading;
                } else {
                    self.activity = Activity::Idle;
                    if let Some(text) = self.speech.transcript() {
                        self.apply_transcript(text);
                    }
                }
                Ok(ToggleOutcome::Stopped)
            }
            Activity::Idle => self.start_recording().await,
        }
    }

    /// Moves the session to another sentence.
    ///
    /// Runs to completion before returning: the epoch is advanced, both
    /// engines are stopped and their acknowledgments awaited, the transcript
    /// is cleared and the activity forced to `Idle` — only then does the
    /// index change. Nothing recorded or played for the previous sentence
    /// can leak into the new one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidNavigation` (state untouched) for an
    /// out-of-range index, `SessionError::Closed` after `close`, or
    /// `SessionError::Engine` if a stop fails (state is already reset).
    pub async fn navigate(&mut self, new_index: usize) -> Result<(), SessionError> {
        self.ensure_open()?;
        if new_index >= self.course.len() {
            return Err(SessionError::InvalidNavigation {
                index: new_index,
                len: self.course.len(),
            });
        }
        self.halt().await?;
        self.index = new_index;
        Ok(())
    }

    /// Reacts to the pagination component reporting a page change:
    /// `navigate` plus, once the session is ready, best-effort autoplay of
    /// the new sentence's reference audio.
    ///
    /// # Errors
    ///
    /// Same as [`SessionCoordinator::navigate`]; an autoplay refusal is not
    /// an error (`autoplay` stays `None` and the activity stays `Idle`).
    pub async fn on_page_change(&mut self, new_index: usize) -> Result<PageChange, SessionError> {
        self.navigate(new_index).await?;
        let autoplay = if self.ready && self.autoplay {
            self.try_autoplay().await
        } else {
            None
        };
        Ok(PageChange {
            index: new_index,
            autoplay,
        })
    }

    /// Advances to the next sentence, or returns `None` at the last one.
    ///
    /// # Errors
    ///
    /// Same as [`SessionCoordinator::on_page_change`].
    pub async fn turn_next(&mut self) -> Result<Option<PageChange>, SessionError> {
        if !self.progress().can_go_forward {
            return Ok(None);
        }
        self.on_page_change(self.index + 1).await.map(Some)
    }

    /// Returns to the previous sentence, or `None` at the first one.
    ///
    /// # Errors
    ///
    /// Same as [`SessionCoordinator::on_page_change`].
    pub async fn turn_previous(&mut self) -> Result<Option<PageChange>, SessionError> {
        if !self.progress().can_go_back {
            return Ok(None);
        }
        self.on_page_change(self.index - 1).await.map(Some)
    }

    /// Ends the session: stops both engines, invalidates in-flight work, and
    /// refuses every later transition. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Engine` if an engine stop fails; the session
    /// is closed regardless.
    pub async fn close(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.epoch = self.epoch.next();
        self.activity = Activity::Idle;
        self.transcript = None;
        self.speech.clear();

        let audio_stopped = self.audio.stop().await;
        let speech_stopped = self.speech.stop().await;
        audio_stopped?;
        speech_stopped?;
        Ok(())
    }

    /// Applies an engine completion, discarding it when its epoch no longer
    /// matches the session state it was issued under.
    ///
    /// Transcripts are accepted while `Recording` (live partial results) and
    /// while `Loading` (final result, which returns the session to `Idle`);
    /// each applied transcript is graded immediately, and the first match per
    /// sentence fires the completion sink.
    pub fn handle_event(&mut self, event: EngineEvent) -> EventDisposition {
        if self.closed {
            return EventDisposition::Stale;
        }
        match event {
            EngineEvent::PlaybackFinished { epoch } => {
                if epoch != self.epoch || self.activity != Activity::PlayingReference {
                    return EventDisposition::Stale;
                }
                self.activity = Activity::Idle;
                EventDisposition::Applied { grade: None }
            }
            EngineEvent::TranscriptReady { epoch, transcript } => {
                if epoch != self.epoch
                    || !matches!(self.activity, Activity::Recording | Activity::Loading)
                {
                    return EventDisposition::Stale;
                }
                if self.activity == Activity::Loading {
                    self.activity = Activity::Idle;
                }
                let result = self.apply_transcript(transcript);
                EventDisposition::Applied {
                    grade: Some(result),
                }
            }
        }
    }

    // ─── Internals ─────────────────────────────────────────────────────────

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        Ok(())
    }

    async fn start_playback(&mut self) -> Result<ToggleOutcome, SessionError> {
        let audio_ref = self.current_sentence().audio_ref().clone();
        let epoch = self.advance_epoch();
        match self.audio.play(&audio_ref).await {
            Ok(()) => {
                self.activity = Activity::PlayingReference;
                Ok(ToggleOutcome::Started(epoch))
            }
            Err(err) => {
                self.activity = Activity::Idle;
                Err(err.into())
            }
        }
    }

    async fn start_recording(&mut self) -> Result<ToggleOutcome, SessionError> {
        let locale = self.course.locale().to_owned();
        let epoch = self.advance_epoch();
        match self.speech.start(&locale).await {
            Ok(()) => {
                self.activity = Activity::Recording;
                Ok(ToggleOutcome::Started(epoch))
            }
            Err(err) => {
                self.activity = Activity::Idle;
                Err(err.into())
            }
        }
    }

    async fn try_autoplay(&mut self) -> Option<Epoch> {
        // Autoplay is a convenience, not a learner request: an engine refusal
        // leaves the session idle and the learner replays by hand.
        match self.start_playback().await {
            Ok(ToggleOutcome::Started(epoch)) => Some(epoch),
            _ => None,
        }
    }

    /// Resets per-sentence state and stops whatever is running. The state
    /// reset happens before the engine calls, so even a failing stop cannot
    /// resurrect the previous activity, and the advanced epoch keeps any
    /// late completion from being applied.
    async fn halt(&mut self) -> Result<(), SessionError> {
        self.epoch = self.epoch.next();
        self.activity = Activity::Idle;
        self.clear_transcript();
        if self.audio.is_playing() {
            self.audio.stop().await?;
        }
        if self.speech.is_recording() || self.speech.is_loading() {
            self.speech.stop().await?;
        }
        Ok(())
    }

    fn apply_transcript(&mut self, transcript: String) -> GradeResult {
        let sentence = self.current_sentence();
        let result = grade(sentence.reference_text(), &transcript);
        let sentence_id = sentence.id();
        self.transcript = Some(transcript);
        if result.is_match() && self.ledger.mark_passed(self.index) {
            self.sink.sentence_passed(sentence_id, self.index);
        }
        result
    }

    fn clear_transcript(&mut self) {
        self.transcript = None;
        self.speech.clear();
    }

    fn advance_epoch(&mut self) -> Epoch {
        self.epoch = self.epoch.next();
        self.epoch
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
