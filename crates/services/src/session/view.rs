use serde::Serialize;

use ditto_core::grading::grade;
use ditto_core::model::Sentence;
use ditto_core::progress::ProgressSnapshot;

use super::coordinator::{Activity, SessionCoordinator};

/// Read-only snapshot of the session for the rendering layer.
///
/// This is intentionally **not** a UI view-model: no pre-formatted strings,
/// no styling decisions. The boolean flags are derived from the single
/// `activity` value, so at most one of them is ever true.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub index: usize,
    pub total: usize,
    pub activity: Activity,
    pub transcript: Option<String>,
    pub is_playing: bool,
    pub is_recording: bool,
    pub is_loading: bool,
    pub is_ready: bool,
    pub progress: ProgressSnapshot,
}

/// How the reference sentence should be presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceVerdict {
    /// No transcript yet: show the reference without correctness coloring.
    Ungraded,
    /// The latest transcript matched word for word.
    Matched,
    /// The latest transcript diverged at these word positions.
    Mismatched { positions: Vec<usize> },
}

/// Display form of the current sentence: the raw reference words (original
/// punctuation and casing intact) plus the grading verdict for the latest
/// transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceView {
    pub words: Vec<String>,
    pub gloss: String,
    pub verdict: SentenceVerdict,
}

impl SentenceView {
    #[must_use]
    pub fn build(sentence: &Sentence, transcript: Option<&str>) -> Self {
        let verdict = match transcript {
            None => SentenceVerdict::Ungraded,
            Some(candidate) => {
                let result = grade(sentence.reference_text(), candidate);
                if result.is_match() {
                    SentenceVerdict::Matched
                } else {
                    SentenceVerdict::Mismatched {
                        positions: result.mismatched_positions().to_vec(),
                    }
                }
            }
        };

        Self {
            words: sentence
                .reference_text()
                .split_whitespace()
                .map(ToOwned::to_owned)
                .collect(),
            gloss: sentence.display_text().to_owned(),
            verdict,
        }
    }
}

impl SessionCoordinator {
    /// Snapshot of the whole session state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let activity = self.activity();
        SessionSnapshot {
            index: self.current_index(),
            total: self.course().len(),
            activity,
            transcript: self.transcript().map(ToOwned::to_owned),
            is_playing: activity == Activity::PlayingReference,
            is_recording: activity == Activity::Recording,
            is_loading: activity == Activity::Loading,
            is_ready: self.is_ready(),
            progress: self.progress(),
        }
    }

    /// Display form of the current sentence under the latest transcript.
    #[must_use]
    pub fn sentence_view(&self) -> SentenceView {
        SentenceView::build(self.current_sentence(), self.transcript())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditto_core::model::{AudioRef, SentenceId};

    fn build_sentence() -> Sentence {
        Sentence::new(
            SentenceId::new(1),
            "Bonjour, tout le monde !",
            "Hello, everyone!",
            AudioRef::new("audio/1.m4a"),
        )
        .unwrap()
    }

    #[test]
    fn missing_transcript_renders_ungraded() {
        let view = SentenceView::build(&build_sentence(), None);
        assert_eq!(view.verdict, SentenceVerdict::Ungraded);
        assert_eq!(view.words, vec!["Bonjour,", "tout", "le", "monde", "!"]);
        assert_eq!(view.gloss, "Hello, everyone!");
    }

    #[test]
    fn matching_transcript_renders_matched() {
        let view = SentenceView::build(&build_sentence(), Some("bonjour tout le monde"));
        assert_eq!(view.verdict, SentenceVerdict::Matched);
    }

    #[test]
    fn diverging_transcript_reports_positions() {
        let view = SentenceView::build(&build_sentence(), Some("bonjour tout la monde"));
        assert_eq!(
            view.verdict,
            SentenceVerdict::Mismatched { positions: vec![2] }
        );
    }
}
