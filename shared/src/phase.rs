use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Gameplay phase. Exactly one is active; it decides which input is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// A trivia prompt is showing; shooting is locked.
    #[default]
    QuestionActive,
    /// The current player answered correctly and may take one shot.
    ShotReady,
    /// A shot is in motion; no input until the table settles.
    BallsMoving,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::QuestionActive => "QUESTION_ACTIVE",
            Phase::ShotReady => "SHOT_READY",
            Phase::BallsMoving => "BALLS_MOVING",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the current group pool came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(rename_all = "snake_case")]
pub enum GroupLoadState {
    #[default]
    Pending,
    /// Loaded from the manifest file
    Remote,
    /// Manifest unavailable; built-in groups in use
    Fallback,
    /// Manifest unavailable and no fallback; pool is empty
    Failed,
}
