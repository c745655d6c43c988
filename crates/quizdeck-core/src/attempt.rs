//! Attempt records: the persisted, display-ready summary of a run.
//!
//! Built once from a completed session plus the analysis output. All time
//! fields are formatted `mm:ss`; [`parse_mmss`] round-trips them so stored
//! records can be re-aggregated for history views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::{clamp_score, compute_metrics, derive_badges, Badge};
use crate::model::{Difficulty, QuestionKind, Selection};
use crate::session::Session;
use crate::traits::Analysis;

/// What the record shows for a question the countdown decided.
pub const SKIPPED_LABEL: &str = "Skipped";

/// Format whole seconds as `mm:ss`. Minutes are not capped at 59.
pub fn format_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Parse a `mm:ss` string back to whole seconds.
///
/// Accepts any minute width (so `format_mmss` output always round-trips)
/// but requires seconds in `00..=59`.
pub fn parse_mmss(s: &str) -> Option<u64> {
    let (minutes, seconds) = s.split_once(':')?;
    if seconds.len() != 2 {
        return None;
    }
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    Some(minutes * 60 + seconds)
}

/// One question's row in the attempt breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question: String,
    pub options: Vec<String>,
    /// Text of the correct option.
    pub correct_answer: String,
    /// Text of the chosen option, or [`SKIPPED_LABEL`] on timeout. An
    /// out-of-range choice shows its raw index.
    pub your_answer: String,
    pub is_correct: bool,
    /// `mm:ss`.
    pub time_taken: String,
}

/// The full, persisted summary of one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub quiz_id: Uuid,
    /// Fresh per attempt; retakes share a quiz_id but never an attempt_id.
    pub attempt_id: Uuid,
    pub topic: String,
    pub difficulty: Difficulty,
    pub kind: QuestionKind,
    pub taken_at: DateTime<Utc>,
    /// Number of correct answers.
    pub score: u32,
    pub question_count: u32,
    pub skipped: u32,
    /// Whole-percent accuracy.
    pub accuracy: u32,
    /// All `mm:ss`.
    pub total_time: String,
    pub average_time: String,
    pub fastest_time: String,
    pub slowest_time: String,
    /// Clamped to `[0, 100]` for display.
    pub speed_score: u32,
    pub consistency_score: u32,
    /// Derived badges first, then any analysis-provided titles.
    pub badges: Vec<Badge>,
    pub strong_topics: Vec<String>,
    pub weak_topics: Vec<String>,
    pub study_materials: Vec<String>,
    pub breakdown: Vec<QuestionOutcome>,
}

impl AttemptRecord {
    /// Build the record for a completed session.
    ///
    /// `analysis` may be `Analysis::default()` when the analyzer failed or
    /// was skipped; the record then carries empty insight lists. Panics if
    /// the session has not completed.
    pub fn build(session: &Session, analysis: &Analysis, taken_at: DateTime<Utc>) -> Self {
        assert!(
            session.is_completed(),
            "attempt record built before session completed"
        );

        let scorecard = session.scorecard();
        let config = session.config();
        let metrics = compute_metrics(scorecard);

        let breakdown: Vec<QuestionOutcome> = session
            .questions()
            .iter()
            .zip(&scorecard.answers)
            .map(|(question, answer)| {
                let answer = answer
                    .as_ref()
                    .expect("completed session has every slot decided");
                let your_answer = match answer.selection {
                    Selection::Answered(choice) => question
                        .options
                        .get(choice)
                        .cloned()
                        .unwrap_or_else(|| choice.to_string()),
                    Selection::Skipped => SKIPPED_LABEL.to_string(),
                };
                QuestionOutcome {
                    question: question.text.clone(),
                    options: question.options.clone(),
                    correct_answer: question.options[question.correct_index].clone(),
                    your_answer,
                    is_correct: answer.is_correct,
                    time_taken: format_mmss(answer.time_taken_secs),
                }
            })
            .collect();

        let skipped = scorecard
            .answers
            .iter()
            .flatten()
            .filter(|a| a.selection.is_skipped())
            .count() as u32;

        let mut badges = derive_badges(&metrics, scorecard.len(), config.difficulty);
        badges.extend(analysis.badges.iter().cloned().map(Badge::from));

        Self {
            quiz_id: session.quiz_id(),
            attempt_id: Uuid::new_v4(),
            topic: config.topic.clone(),
            difficulty: config.difficulty,
            kind: config.kind,
            taken_at,
            score: scorecard.score,
            question_count: scorecard.len() as u32,
            skipped,
            accuracy: metrics.accuracy,
            total_time: format_mmss(scorecard.total_time_secs),
            average_time: format_mmss(metrics.average_time_secs),
            fastest_time: format_mmss(metrics.fastest_secs),
            slowest_time: format_mmss(metrics.slowest_secs),
            speed_score: clamp_score(metrics.speed_score),
            consistency_score: clamp_score(metrics.consistency_score),
            badges,
            strong_topics: analysis.strong_topics.clone(),
            weak_topics: analysis.weak_topics.clone(),
            study_materials: analysis.study_materials.clone(),
            breakdown,
        }
    }

    /// Answered questions that were wrong (timeouts count separately).
    pub fn incorrect(&self) -> u32 {
        self.question_count - self.score - self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, QuizConfig};
    use std::time::Duration;
    use tokio::time;

    fn completed_session() -> Session {
        let config = QuizConfig {
            topic: "Arrays".into(),
            difficulty: Difficulty::Easy,
            kind: QuestionKind::MultipleChoice,
            question_count: 3,
            description: None,
            tags: vec![],
        };
        let questions = vec![
            Question {
                text: "Q0".into(),
                options: vec!["alpha".into(), "beta".into()],
                correct_index: 1,
            },
            Question {
                text: "Q1".into(),
                options: vec!["gamma".into(), "delta".into()],
                correct_index: 0,
            },
            Question {
                text: "Q2".into(),
                options: vec!["epsilon".into(), "zeta".into()],
                correct_index: 0,
            },
        ];
        Session::begin(Uuid::new_v4(), config, questions)
    }

    /// Correct in 5s, timeout (15s charged), wrong in 10s.
    async fn run_mixed(session: &mut Session) {
        time::advance(Duration::from_secs(5)).await;
        session.submit_answer(1);
        session.advance();
        session.expire_current();
        session.advance();
        time::advance(Duration::from_secs(10)).await;
        session.submit_answer(1);
        session.advance();
    }

    #[test]
    fn mmss_formats_and_parses() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(5), "00:05");
        assert_eq!(format_mmss(75), "01:15");
        assert_eq!(format_mmss(3_599), "59:59");
        assert_eq!(format_mmss(3_661), "61:01");

        for secs in [0, 5, 59, 60, 75, 3_599, 3_661, 12_345] {
            assert_eq!(parse_mmss(&format_mmss(secs)), Some(secs));
        }
    }

    #[test]
    fn mmss_rejects_malformed_input() {
        assert_eq!(parse_mmss("75"), None);
        assert_eq!(parse_mmss("01:60"), None);
        assert_eq!(parse_mmss("01:5"), None);
        assert_eq!(parse_mmss("one:05"), None);
        assert_eq!(parse_mmss(""), None);
    }

    #[tokio::test(start_paused = true)]
    async fn build_summarizes_a_mixed_run() {
        let mut session = completed_session();
        run_mixed(&mut session).await;

        let record = AttemptRecord::build(&session, &Analysis::default(), Utc::now());

        assert_eq!(record.score, 1);
        assert_eq!(record.question_count, 3);
        assert_eq!(record.skipped, 1);
        assert_eq!(record.incorrect(), 1);
        assert_eq!(record.accuracy, 33);
        assert_eq!(record.total_time, "00:30");
        assert_eq!(record.average_time, "00:10");
        assert_eq!(record.fastest_time, "00:05");
        assert_eq!(record.slowest_time, "00:15");
        // round(100 * 10 / 45) = 22, already within display range
        assert_eq!(record.speed_score, 22);

        let again = AttemptRecord::build(&session, &Analysis::default(), record.taken_at);
        assert_eq!(again.quiz_id, record.quiz_id);
        assert_ne!(again.attempt_id, record.attempt_id);
    }

    #[tokio::test(start_paused = true)]
    async fn breakdown_shows_answer_text_and_skips() {
        let mut session = completed_session();
        run_mixed(&mut session).await;

        let record = AttemptRecord::build(&session, &Analysis::default(), Utc::now());
        let rows = &record.breakdown;

        assert_eq!(rows[0].your_answer, "beta");
        assert_eq!(rows[0].correct_answer, "beta");
        assert!(rows[0].is_correct);
        assert_eq!(rows[0].time_taken, "00:05");

        assert_eq!(rows[1].your_answer, SKIPPED_LABEL);
        assert_eq!(rows[1].correct_answer, "gamma");
        assert!(!rows[1].is_correct);
        assert_eq!(rows[1].time_taken, "00:15");

        assert_eq!(rows[2].your_answer, "zeta");
        assert!(!rows[2].is_correct);
    }

    #[tokio::test(start_paused = true)]
    async fn analysis_badges_append_after_derived_ones() {
        let mut session = completed_session();
        run_mixed(&mut session).await;

        let analysis = Analysis {
            strong_topics: vec!["indexing".into()],
            weak_topics: vec!["slicing".into()],
            study_materials: vec!["chapter 4".into()],
            badges: vec!["Graph Guru".into()],
        };
        let record = AttemptRecord::build(&session, &analysis, Utc::now());

        assert_eq!(record.badges[0], Badge::Beginner);
        assert_eq!(*record.badges.last().unwrap(), Badge::Insight("Graph Guru".into()));
        assert_eq!(record.strong_topics, vec!["indexing"]);
        assert_eq!(record.study_materials, vec!["chapter 4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn record_serde_round_trips() {
        let mut session = completed_session();
        run_mixed(&mut session).await;

        let record = AttemptRecord::build(&session, &Analysis::default(), Utc::now());
        let json = serde_json::to_string(&record).unwrap();
        let back: AttemptRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "before session completed")]
    async fn build_requires_a_completed_session() {
        let session = completed_session();
        AttemptRecord::build(&session, &Analysis::default(), Utc::now());
    }
}
