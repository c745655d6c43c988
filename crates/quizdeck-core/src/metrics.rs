//! Aggregate performance metrics and badge derivation.
//!
//! Pure functions over a completed [`Scorecard`]. The speed score is
//! measured against a fixed 45-second baseline regardless of difficulty,
//! so speed scores stay comparable across difficulties; display layers
//! clamp it (and the consistency score) to `[0, 100]`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, Scorecard};

/// Baseline seconds-per-question the speed score is measured against.
pub const SPEED_BASELINE_SECS: u64 = 45;

/// Derived performance metrics for one completed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub correct_count: u32,
    /// `round(100 * correct / n)`.
    pub accuracy: u32,
    /// `round(total_time / n)` in whole seconds.
    pub average_time_secs: u64,
    pub fastest_secs: u64,
    pub slowest_secs: u64,
    /// `round(100 * average_time / 45)`, unclamped.
    pub speed_score: u32,
    /// `round(100 * (1 - (slowest - fastest) / slowest))`, 0 when no
    /// question took measurable time.
    pub consistency_score: u32,
}

/// Clamp a raw score into the `[0, 100]` display range.
pub fn clamp_score(score: u32) -> u32 {
    score.min(100)
}

/// Aggregate a completed scorecard into metrics.
pub fn compute_metrics(scorecard: &Scorecard) -> Metrics {
    let n = scorecard.len();
    if n == 0 {
        return Metrics {
            correct_count: 0,
            accuracy: 0,
            average_time_secs: 0,
            fastest_secs: 0,
            slowest_secs: 0,
            speed_score: 0,
            consistency_score: 0,
        };
    }

    let correct_count = scorecard.correct_count();
    let accuracy = (100.0 * f64::from(correct_count) / n as f64).round() as u32;
    let average_time_secs = (scorecard.total_time_secs as f64 / n as f64).round() as u64;

    let fastest_secs = scorecard.question_times.iter().copied().min().unwrap_or(0);
    let slowest_secs = scorecard.question_times.iter().copied().max().unwrap_or(0);

    let speed_score =
        (100.0 * average_time_secs as f64 / SPEED_BASELINE_SECS as f64).round() as u32;
    let consistency_score = if slowest_secs > 0 {
        let spread = (slowest_secs - fastest_secs) as f64 / slowest_secs as f64;
        (100.0 * (1.0 - spread)).round() as u32
    } else {
        0
    };

    Metrics {
        correct_count,
        accuracy,
        average_time_secs,
        fastest_secs,
        slowest_secs,
        speed_score,
        consistency_score,
    }
}

/// A derived, non-exclusive label attached to a completed attempt.
///
/// Serialized as its display string so stored badge lists read naturally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Badge {
    Expert,
    Proficient,
    Intermediate,
    Beginner,
    SpeedDemon,
    PerfectScore,
    Challenger,
    /// A badge supplied by the analysis collaborator, carried unmodified.
    Insight(String),
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Badge::Expert => write!(f, "Expert"),
            Badge::Proficient => write!(f, "Proficient"),
            Badge::Intermediate => write!(f, "Intermediate"),
            Badge::Beginner => write!(f, "Beginner"),
            Badge::SpeedDemon => write!(f, "Speed Demon"),
            Badge::PerfectScore => write!(f, "Perfect Score"),
            Badge::Challenger => write!(f, "Challenger"),
            Badge::Insight(title) => write!(f, "{title}"),
        }
    }
}

impl From<Badge> for String {
    fn from(badge: Badge) -> Self {
        badge.to_string()
    }
}

impl From<String> for Badge {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Expert" => Badge::Expert,
            "Proficient" => Badge::Proficient,
            "Intermediate" => Badge::Intermediate,
            "Beginner" => Badge::Beginner,
            "Speed Demon" => Badge::SpeedDemon,
            "Perfect Score" => Badge::PerfectScore,
            "Challenger" => Badge::Challenger,
            _ => Badge::Insight(s),
        }
    }
}

/// Derive the badge set for a completed attempt.
///
/// Ordered: exactly one tier badge first, then the threshold badges that
/// apply. Analysis-provided badges are appended by the engine afterwards.
pub fn derive_badges(metrics: &Metrics, question_count: usize, difficulty: Difficulty) -> Vec<Badge> {
    let tier = if metrics.accuracy >= 90 {
        Badge::Expert
    } else if metrics.accuracy >= 75 {
        Badge::Proficient
    } else if metrics.accuracy >= 50 {
        Badge::Intermediate
    } else {
        Badge::Beginner
    };

    let mut badges = vec![tier];
    if metrics.average_time_secs < 15 {
        badges.push(Badge::SpeedDemon);
    }
    if question_count > 0 && metrics.correct_count as usize == question_count {
        badges.push(Badge::PerfectScore);
    }
    if difficulty == Difficulty::Hard {
        badges.push(Badge::Challenger);
    }
    badges
}
