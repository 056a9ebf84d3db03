//! Wire types live in the shared crate; this module adds the conversions
//! from server-side game types.

pub use pooltrivia_shared::protocol::*;
use pooltrivia_shared::vec2::Vec2;

use crate::player::Player;
use crate::question::{Question, QUESTION_ALT};
use crate::table::Ball;

pub fn player_wire(player: &Player, correct: u32) -> PlayerWire {
    PlayerWire {
        id: player.id.clone(),
        label: player.label.clone(),
        is_npc: player.is_npc,
        correct,
    }
}

pub fn ball_wire(ball: &Ball) -> BallWire {
    BallWire {
        id: ball.id,
        pos: ball.pos.to_wire(),
        is_cue: ball.is_cue,
        color: ball.color.to_string(),
    }
}

pub fn question_wire(question: &Question, choices_enabled: bool) -> QuestionWire {
    QuestionWire {
        image: question.group.image.clone(),
        alt: QUESTION_ALT.to_string(),
        choices: question.choices.clone(),
        choices_enabled,
    }
}

/// Aim line from the cue ball to the pointer.
pub fn aim_wire(cue: Vec2, pointer: Vec2) -> AimWire {
    AimWire {
        from: cue.to_wire(),
        to: pointer.to_wire(),
    }
}
