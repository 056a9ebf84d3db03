//! Turn and phase authority.
//!
//! The controller is the only place that changes the [`Phase`]. Its public
//! operations map one-to-one onto the moments a phase may change:
//! - `unlock_shot`: correct answer, `QUESTION_ACTIVE` -> `SHOT_READY`
//! - `release_shot`: shot released, `SHOT_READY` -> `BALLS_MOVING`
//! - `finish_shot_cycle`: balls settled, `BALLS_MOVING` -> `QUESTION_ACTIVE`
//! - `begin_question`: a fresh question cycle (rack, or after a miss)

use pooltrivia_shared::phase::{GroupLoadState, Phase};
use std::collections::HashMap;

use crate::player::Player;

pub const SHOT_LOCKED_HINT: &str = "Shot locked: answer first.";
pub const SHOT_READY_HINT: &str = "Drag from here to shoot.";

/// Why a shot input was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ShotRejection {
    #[error("Game not started.")]
    NotStarted,
    #[error("NPC turn. Wait.")]
    NpcTurn,
    #[error("Shot locked: answer first.")]
    Locked,
}

/// Result of scoring an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Correct; the shot is now unlocked.
    Unlocked,
    /// Wrong; the turn should pass.
    Missed,
    /// No answer can be taken right now (not started, wrong phase).
    Ignored,
}

#[derive(Debug, Default)]
pub struct TurnController {
    phase: Phase,
    shot_unlocked: bool,
    players: Vec<Player>,
    current_turn: usize,
    game_started: bool,
    score_correct: u32,
    score_total: u32,
    player_correct: HashMap<String, u32>,
}

impl TurnController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat a roster and start the game at the first player.
    pub fn start(&mut self, players: Vec<Player>) {
        self.players = players;
        self.game_started = true;
        self.reset_scores();
    }

    /// Zero all counters and hand the turn back to the first seat.
    pub fn reset_scores(&mut self) {
        self.score_correct = 0;
        self.score_total = 0;
        self.player_correct = self.players.iter().map(|p| (p.id.clone(), 0)).collect();
        self.current_turn = 0;
        self.shot_unlocked = false;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn shot_unlocked(&self) -> bool {
        self.shot_unlocked
    }

    pub fn is_shot_locked(&self) -> bool {
        !self.shot_unlocked
    }

    pub fn game_started(&self) -> bool {
        self.game_started
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_turn)
    }

    pub fn is_active_human_turn(&self) -> bool {
        self.game_started && self.current_player().is_some_and(|p| !p.is_npc)
    }

    pub fn score(&self) -> (u32, u32) {
        (self.score_correct, self.score_total)
    }

    pub fn correct_for(&self, player_id: &str) -> u32 {
        self.player_correct.get(player_id).copied().unwrap_or(0)
    }

    fn set_phase(&mut self, next: Phase) {
        if self.phase != next {
            tracing::debug!("Phase {} -> {}", self.phase, next);
        }
        self.phase = next;
    }

    /// Start a new question cycle: lock the shot and show the prompt.
    pub fn begin_question(&mut self) {
        self.shot_unlocked = false;
        self.set_phase(Phase::QuestionActive);
    }

    /// Score an answer from the current player.
    pub fn record_answer(&mut self, correct: bool) -> AnswerOutcome {
        if !self.game_started || self.phase != Phase::QuestionActive || self.shot_unlocked {
            return AnswerOutcome::Ignored;
        }
        let Some(player_id) = self.current_player().map(|p| p.id.clone()) else {
            return AnswerOutcome::Ignored;
        };
        self.score_total += 1;
        if !correct {
            return AnswerOutcome::Missed;
        }
        self.score_correct += 1;
        *self.player_correct.entry(player_id).or_insert(0) += 1;
        self.unlock_shot();
        AnswerOutcome::Unlocked
    }

    /// Unlock the shot after a correct answer. Only valid once per question.
    fn unlock_shot(&mut self) -> bool {
        if self.phase != Phase::QuestionActive || self.shot_unlocked {
            return false;
        }
        self.shot_unlocked = true;
        self.set_phase(Phase::ShotReady);
        true
    }

    /// Gate for human shot input. Leaves all state untouched.
    pub fn check_shot(&self) -> Result<(), ShotRejection> {
        if !self.game_started {
            return Err(ShotRejection::NotStarted);
        }
        match self.current_player() {
            None => Err(ShotRejection::NotStarted),
            Some(p) if p.is_npc => Err(ShotRejection::NpcTurn),
            Some(_) if self.phase != Phase::ShotReady || self.is_shot_locked() => {
                Err(ShotRejection::Locked)
            }
            Some(_) => Ok(()),
        }
    }

    /// Consume the unlock as the cue ball leaves. Returns false if no shot was unlocked.
    pub fn release_shot(&mut self) -> bool {
        if self.phase != Phase::ShotReady || !self.shot_unlocked {
            return false;
        }
        self.shot_unlocked = false;
        self.set_phase(Phase::BallsMoving);
        true
    }

    /// Balls have settled: back to the question phase and pass the turn.
    pub fn finish_shot_cycle(&mut self) -> bool {
        if self.phase != Phase::BallsMoving {
            return false;
        }
        self.set_phase(Phase::QuestionActive);
        self.switch_turn()
    }

    /// Advance to the next seat. Refused while a shot is in motion.
    pub fn switch_turn(&mut self) -> bool {
        if self.players.is_empty() || self.phase == Phase::BallsMoving {
            return false;
        }
        self.current_turn = (self.current_turn + 1) % self.players.len();
        self.shot_unlocked = false;
        true
    }

    /// Status banner detail line.
    pub fn status_detail(&self) -> String {
        match self.current_player() {
            Some(p) if self.game_started => {
                let shot_state = if self.is_shot_locked() {
                    "Shot locked"
                } else {
                    "Shot unlocked"
                };
                format!("{} turn | {} | {}", p.label, shot_state, self.phase)
            }
            _ => "Player setup pending | Shot locked".to_string(),
        }
    }

    /// Score line with per-player counts and a group-source note.
    pub fn score_label(&self, load_state: GroupLoadState) -> String {
        let Some(p) = self.current_player().filter(|_| self.game_started) else {
            return "Set players to begin.".to_string();
        };
        let parts: Vec<String> = self
            .players
            .iter()
            .map(|player| format!("{}:{}", player.label, self.correct_for(&player.id)))
            .collect();
        let mut label = format!(
            "{} turn | Team {}/{} | {}",
            p.label,
            self.score_correct,
            self.score_total,
            parts.join(" | ")
        );
        match load_state {
            GroupLoadState::Fallback => label.push_str(" | Using local fallback prompts"),
            GroupLoadState::Failed => label.push_str(" | Group data failed to load"),
            GroupLoadState::Pending | GroupLoadState::Remote => {}
        }
        label
    }

    /// Text drawn beside the cue ball, only on a human turn.
    pub fn cue_hint(&self) -> Option<&'static str> {
        if !self.is_active_human_turn() {
            return None;
        }
        Some(if self.is_shot_locked() {
            SHOT_LOCKED_HINT
        } else {
            SHOT_READY_HINT
        })
    }
}
