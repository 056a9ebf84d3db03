//! NPC players.
//!
//! NPCs are driven by delayed actions, the same way a human would pause
//! before clicking:
//! - answer the question after a short "thinking" delay
//! - on a correct answer, take the shot a moment later
//! - on a miss, ask for the next question after the turn passes
//!
//! Each action remembers which NPC scheduled it so a stale action (the turn
//! moved on, the table was re-racked) can be recognised and dropped.

use pooltrivia_shared::vec2::{self, Vec2};
use rand::Rng;

/// Shot direction spread around +x (radians)
const SHOT_ANGLE_SPREAD: f64 = 0.5;
const SHOT_POWER_MIN: f64 = 8.0;
const SHOT_POWER_MAX: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcAction {
    Answer,
    Shoot,
    RedrawQuestion,
}

#[derive(Debug, Clone)]
struct PendingAction {
    action: NpcAction,
    player_id: String,
    /// Time remaining before firing
    delay: f64,
}

/// A fired action together with the NPC that scheduled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyAction {
    pub action: NpcAction,
    pub player_id: String,
}

/// Roll an NPC answer.
pub fn roll_answer(chance: f64, rng: &mut impl Rng) -> bool {
    rng.gen::<f64>() < chance
}

/// Cue velocity for an NPC shot: roughly toward the rack with random power.
pub fn shot_velocity(rng: &mut impl Rng) -> Vec2 {
    let angle = rng.gen_range(-SHOT_ANGLE_SPREAD..SHOT_ANGLE_SPREAD);
    let power = rng.gen_range(SHOT_POWER_MIN..SHOT_POWER_MAX);
    vec2::scale(vec2::from_angle(angle), power)
}

/// Queue of delayed NPC actions.
#[derive(Debug, Default)]
pub struct NpcScheduler {
    pending: Vec<PendingAction>,
}

impl NpcScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, action: NpcAction, player_id: &str, delay: f64) {
        tracing::debug!("NPC {} scheduled {:?} in {:.2}s", player_id, action, delay);
        self.pending.push(PendingAction {
            action,
            player_id: player_id.to_string(),
            delay,
        });
    }

    /// Drop everything queued (new game or re-rack).
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Advance timers. Returns due actions in the order they were scheduled.
    pub fn tick(&mut self, dt: f64) -> Vec<ReadyAction> {
        for pending in &mut self.pending {
            pending.delay -= dt;
        }
        let mut ready = Vec::new();
        self.pending.retain(|p| {
            if p.delay <= 0.0 {
                ready.push(ReadyAction {
                    action: p.action,
                    player_id: p.player_id.clone(),
                });
                false
            } else {
                true
            }
        });
        ready
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
