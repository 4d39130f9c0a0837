//! Transcript normalization and positional grading.
//!
//! Everything here is a pure function of its string inputs: no state, no
//! locale data, no failure modes. The session layer decides *when* to grade;
//! this module only decides *whether* two utterances say the same thing.

use serde::Serialize;

/// Characters removed before comparison. Word characters and whitespace are
/// untouched; apostrophes and hyphens survive because they are word-internal
/// in the target languages ("s'il", "peut-être").
const STRIPPED: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '\\', '?', '_',
    '`', '~', '(', ')',
];

/// Canonical form used for grading: punctuation removed, whitespace runs
/// collapsed to single spaces, lowercased.
///
/// This is the full normalization contract. No stemming, no accent folding,
/// no locale-aware collation. Idempotent: `normalize(normalize(s)) ==
/// normalize(s)` for any `s`.
#[must_use]
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for ch in input.chars() {
        if STRIPPED.contains(&ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.extend(ch.to_lowercase());
    }

    out
}

/// Positional comparison of a reference sentence and a candidate transcript.
///
/// Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeResult {
    mismatched_positions: Vec<usize>,
}

impl GradeResult {
    /// Word positions (0-based, over the longer of the two word sequences)
    /// where reference and candidate disagree, in ascending order.
    #[must_use]
    pub fn mismatched_positions(&self) -> &[usize] {
        &self.mismatched_positions
    }

    /// True iff the candidate matched the reference exactly, word for word.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.mismatched_positions.is_empty()
    }

    #[must_use]
    pub fn is_mismatch_at(&self, position: usize) -> bool {
        self.mismatched_positions.binary_search(&position).is_ok()
    }
}

/// Grades `candidate` against `reference`.
///
/// Both strings are normalized, split into words, and compared position by
/// position up to the longer length; a position past the end of either
/// sequence compares as the empty word, so omitted and extra words both count
/// as mismatches. Exact, order-sensitive, length-sensitive. Total: any pair
/// of strings grades, including empty ones.
#[must_use]
pub fn grade(reference: &str, candidate: &str) -> GradeResult {
    let reference = normalize(reference);
    let candidate = normalize(candidate);

    let reference_words: Vec<&str> = reference.split(' ').collect();
    let candidate_words: Vec<&str> = candidate.split(' ').collect();
    let max_len = reference_words.len().max(candidate_words.len());

    let mut mismatched_positions = Vec::new();
    for position in 0..max_len {
        let expected = reference_words.get(position).copied().unwrap_or("");
        let heard = candidate_words.get(position).copied().unwrap_or("");
        if expected != heard {
            mismatched_positions.push(position);
        }
    }

    GradeResult {
        mismatched_positions,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("Hello, World!"), "hello world");
    }

    #[test]
    fn normalize_collapses_whitespace_runs() {
        assert_eq!(normalize("un   café\t s'il  vous\nplaît"), "un café s'il vous plaît");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in [
            "Hello, World!",
            "  leading and trailing  ",
            "déjà-vu (encore)",
            "",
            "?!;:",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn normalize_keeps_word_internal_marks() {
        assert_eq!(normalize("Peut-être qu'il viendra."), "peut-être qu'il viendra");
    }

    #[test]
    fn self_match_holds() {
        let result = grade("Je voudrais un croissant", "Je voudrais un croissant");
        assert!(result.is_match());
        assert!(result.mismatched_positions().is_empty());
    }

    #[test]
    fn match_is_case_and_punctuation_insensitive() {
        assert!(grade("Hello, World!", "hello world").is_match());
    }

    #[test]
    fn omitted_word_mismatches_from_divergence_point() {
        let result = grade("I am a student", "I am student");
        assert!(!result.is_match());
        assert_eq!(result.mismatched_positions(), &[2, 3]);
    }

    #[test]
    fn extra_trailing_word_fails() {
        let result = grade("merci", "merci beaucoup");
        assert!(!result.is_match());
        assert_eq!(result.mismatched_positions(), &[1]);
    }

    #[test]
    fn transposed_words_fail() {
        let result = grade("bien très", "très bien");
        assert!(!result.is_match());
        assert_eq!(result.mismatched_positions(), &[0, 1]);
    }

    #[test]
    fn empty_inputs_grade_as_match() {
        assert!(grade("", "").is_match());
        assert!(grade("?!", "").is_match());
    }

    #[test]
    fn empty_candidate_against_real_reference_fails() {
        let result = grade("bonjour tout le monde", "");
        assert_eq!(result.mismatched_positions(), &[0, 1, 2, 3]);
    }

    #[test]
    fn mismatch_lookup_by_position() {
        let result = grade("un deux trois", "un DEUX quatre");
        assert!(!result.is_mismatch_at(0));
        assert!(!result.is_mismatch_at(1));
        assert!(result.is_mismatch_at(2));
        assert!(!result.is_mismatch_at(3));
    }
}
