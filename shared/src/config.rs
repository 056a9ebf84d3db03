/// Pool table geometry and per-frame physics constants.
/// Velocities are canvas units per frame; the server steps once per tick.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Inset of the wooden rail from the canvas edge
    pub margin: f64,
    pub cushion: f64,
    pub pocket_radius: f64,
    pub ball_radius: f64,
    /// Velocity multiplier applied every frame
    pub friction: f64,
    /// Speed below which a ball snaps to rest
    pub rest_speed: f64,
    /// Consecutive still frames before the table counts as settled
    pub rest_frames_required: u32,
    pub ball_restitution: f64,
    pub cushion_restitution: f64,
    pub max_shot_power: f64,
    /// Drag length is divided by this to get shot power
    pub power_divisor: f64,
    /// Drags shorter than this are ignored
    pub min_drag: f64,
    /// Extra grab distance around the cue ball
    pub grab_slop: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            canvas_width: 960.0,
            canvas_height: 540.0,
            margin: 36.0,
            cushion: 24.0,
            pocket_radius: 24.0,
            ball_radius: 12.0,
            friction: 0.991,
            rest_speed: 0.01,
            rest_frames_required: 85,
            ball_restitution: 0.95,
            cushion_restitution: 0.96,
            max_shot_power: 18.0,
            power_divisor: 8.0,
            min_drag: 8.0,
            grab_slop: 18.0,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.canvas_width.is_finite() || !self.canvas_height.is_finite() {
            return Err("canvas dimensions must be finite".to_string());
        }
        let play_w = self.canvas_width - 2.0 * (self.margin + self.cushion);
        let play_h = self.canvas_height - 2.0 * (self.margin + self.cushion);
        if play_w <= 10.0 * self.ball_radius || play_h <= 10.0 * self.ball_radius {
            return Err("playfield too small for the rack".to_string());
        }
        if !self.ball_radius.is_finite() || self.ball_radius <= 0.0 {
            return Err("ball_radius must be finite and > 0".to_string());
        }
        if self.pocket_radius <= self.ball_radius {
            return Err("pocket_radius must be > ball_radius".to_string());
        }
        if !(0.0..1.0).contains(&self.friction) {
            return Err("friction must be in [0, 1)".to_string());
        }
        if !(0.0..=1.0).contains(&self.ball_restitution)
            || !(0.0..=1.0).contains(&self.cushion_restitution)
        {
            return Err("restitution must be in [0, 1]".to_string());
        }
        if self.rest_frames_required == 0 {
            return Err("rest_frames_required must be > 0".to_string());
        }
        if self.power_divisor <= 0.0 || self.max_shot_power <= 0.0 {
            return Err("power_divisor and max_shot_power must be > 0".to_string());
        }
        Ok(())
    }
}

/// Turn rules: roster limits and NPC timing.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(rename_all = "camelCase")]
pub struct RulesConfig {
    pub max_humans: u32,
    pub max_npcs: u32,
    /// Probability that an NPC answers correctly
    pub npc_correct_chance: f64,
    /// Seconds an NPC "thinks" before answering
    pub npc_answer_delay: f64,
    /// Seconds between an NPC's correct answer and its shot
    pub npc_shot_delay: f64,
    /// Seconds between an NPC's miss and the next question
    pub npc_miss_redraw_delay: f64,
    pub max_distractors: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_humans: 8,
            max_npcs: 8,
            npc_correct_chance: 0.58,
            npc_answer_delay: 0.8,
            npc_shot_delay: 0.7,
            npc_miss_redraw_delay: 0.5,
            max_distractors: 3,
        }
    }
}

impl RulesConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_humans == 0 {
            return Err("max_humans must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.npc_correct_chance) {
            return Err("npc_correct_chance must be in [0, 1]".to_string());
        }
        for (name, delay) in [
            ("npc_answer_delay", self.npc_answer_delay),
            ("npc_shot_delay", self.npc_shot_delay),
            ("npc_miss_redraw_delay", self.npc_miss_redraw_delay),
        ] {
            if !delay.is_finite() || delay < 0.0 {
                return Err(format!("{name} must be finite and >= 0"));
            }
        }
        Ok(())
    }
}
