use pooltrivia_shared::config::TableConfig;
use pooltrivia_shared::vec2::{self, vec2, Vec2};
use rand::Rng;

/// Cue spot as a fraction of rail width
const CUE_SPOT_X: f64 = 0.23;
/// Apex of the rack as a fraction of rail width
const RACK_SPOT_X: f64 = 0.72;
const RACK_ROWS: usize = 5;
/// Row spacing as a fraction of ball diameter (tight triangle)
const RACK_ROW_SPACING: f64 = 0.88;
/// Random offset applied to object balls so the break is never identical
const RACK_JITTER: f64 = 0.8;
/// Pocket capture is slightly tighter than the drawn pocket
const POCKET_CAPTURE_INSET: f64 = 2.0;

const CUE_COLOR: &str = "#ffffff";
const ROW_COLORS: [&str; 5] = ["#f0c43a", "#3da6ff", "#de4a3c", "#8f5ce5", "#44b977"];

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f64,
    pub is_cue: bool,
    /// False once an object ball drops into a pocket
    pub active: bool,
    pub color: &'static str,
}

impl Ball {
    fn new(id: u32, pos: Vec2, radius: f64, color: &'static str, is_cue: bool) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            is_cue,
            active: true,
            color,
        }
    }

    pub fn speed(&self) -> f64 {
        vec2::length(self.vel)
    }
}

/// Playfield edges (inside the cushions).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Result of one physics frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepOutcome {
    /// Balls still moving after this frame
    pub moving: usize,
    /// True on the single frame the table first reaches rest after a shot
    pub settled_now: bool,
    /// Object balls pocketed this frame
    pub pocketed: usize,
}

/// The pool table: balls plus rest tracking.
pub struct Table {
    config: TableConfig,
    balls: Vec<Ball>,
    settle_frames: u32,
    has_settled: bool,
}

impl Table {
    pub fn new(config: TableConfig) -> Self {
        Self {
            config,
            balls: Vec::new(),
            settle_frames: 0,
            has_settled: false,
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    fn rail_width(&self) -> f64 {
        self.config.canvas_width - 2.0 * self.config.margin
    }

    fn rail_height(&self) -> f64 {
        self.config.canvas_height - 2.0 * self.config.margin
    }

    pub fn bounds(&self) -> Bounds {
        let c = &self.config;
        Bounds {
            left: c.margin + c.cushion,
            right: c.margin + self.rail_width() - c.cushion,
            top: c.margin + c.cushion,
            bottom: c.margin + self.rail_height() - c.cushion,
        }
    }

    /// Corner and side pockets, in drawing order.
    pub fn pockets(&self) -> [Vec2; 6] {
        let b = self.bounds();
        let mid = (b.left + b.right) / 2.0;
        [
            vec2(b.left, b.top),
            vec2(mid, b.top),
            vec2(b.right, b.top),
            vec2(b.left, b.bottom),
            vec2(mid, b.bottom),
            vec2(b.right, b.bottom),
        ]
    }

    pub fn cue_spot(&self) -> Vec2 {
        vec2(
            self.config.margin + self.rail_width() * CUE_SPOT_X,
            self.config.margin + self.rail_height() / 2.0,
        )
    }

    /// Clear the table and set up the cue ball plus a 15-ball triangle.
    pub fn rack(&mut self, rng: &mut impl Rng) {
        let r = self.config.ball_radius;
        let diameter = r * 2.0;
        self.balls.clear();
        self.balls
            .push(Ball::new(0, self.cue_spot(), r, CUE_COLOR, true));

        let apex = vec2(
            self.config.margin + self.rail_width() * RACK_SPOT_X,
            self.config.margin + self.rail_height() / 2.0,
        );
        let mut count: u32 = 1;
        for row in 0..RACK_ROWS {
            for col in 0..=row {
                let pos = vec2(
                    apex.x + row as f64 * diameter * RACK_ROW_SPACING,
                    apex.y - row as f64 * r + col as f64 * diameter,
                );
                let jitter = vec2(
                    rng.gen_range(-RACK_JITTER..RACK_JITTER),
                    rng.gen_range(-RACK_JITTER..RACK_JITTER),
                );
                let color = ROW_COLORS[count as usize % ROW_COLORS.len()];
                self.balls
                    .push(Ball::new(count, vec2::add(pos, jitter), r, color, false));
                count += 1;
            }
        }
        self.reset_run_state();
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Active cue ball, if racked.
    pub fn cue(&self) -> Option<&Ball> {
        self.balls.iter().find(|b| b.is_cue && b.active)
    }

    pub fn active_count(&self) -> usize {
        self.balls.iter().filter(|b| b.active).count()
    }

    /// Give the cue ball a velocity. Returns false when there is no cue ball.
    pub fn strike_cue(&mut self, velocity: Vec2) -> bool {
        let Some(cue) = self.balls.iter_mut().find(|b| b.is_cue && b.active) else {
            return false;
        };
        cue.vel = velocity;
        self.reset_run_state();
        true
    }

    /// Restart rest tracking; the next settle will be reported again.
    pub fn reset_run_state(&mut self) {
        self.settle_frames = 0;
        self.has_settled = false;
    }

    pub fn is_moving(&self) -> bool {
        self.balls.iter().any(|b| b.active && b.speed() > 0.0)
    }

    /// Advance the simulation by one frame.
    pub fn step(&mut self) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        let bounds = self.bounds();
        let pockets = self.pockets();
        let cue_spot = self.cue_spot();
        let capture = self.config.pocket_radius - POCKET_CAPTURE_INSET;

        for ball in self.balls.iter_mut().filter(|b| b.active) {
            ball.pos = vec2::add(ball.pos, ball.vel);
            ball.vel = vec2::scale(ball.vel, self.config.friction);
            if ball.speed() < self.config.rest_speed {
                ball.vel = Vec2::ZERO;
            } else {
                outcome.moving += 1;
            }
            bounce_off_cushions(ball, &bounds, self.config.cushion_restitution);
            if pockets
                .iter()
                .any(|p| vec2::distance(ball.pos, *p) <= capture)
            {
                if ball.is_cue {
                    ball.pos = cue_spot;
                    ball.vel = Vec2::ZERO;
                } else {
                    ball.active = false;
                    outcome.pocketed += 1;
                }
            }
        }

        for i in 0..self.balls.len() {
            let (head, tail) = self.balls.split_at_mut(i + 1);
            let a = &mut head[i];
            if !a.active {
                continue;
            }
            for b in tail.iter_mut().filter(|b| b.active) {
                resolve_ball_collision(a, b, self.config.ball_restitution);
            }
        }

        if outcome.moving == 0 {
            self.settle_frames += 1;
        } else {
            self.settle_frames = 0;
        }
        if !self.has_settled && self.settle_frames >= self.config.rest_frames_required {
            self.has_settled = true;
            outcome.settled_now = true;
        }
        outcome
    }
}

fn bounce_off_cushions(ball: &mut Ball, bounds: &Bounds, restitution: f64) {
    if ball.pos.x - ball.radius < bounds.left {
        ball.pos.x = bounds.left + ball.radius;
        ball.vel.x *= -restitution;
    }
    if ball.pos.x + ball.radius > bounds.right {
        ball.pos.x = bounds.right - ball.radius;
        ball.vel.x *= -restitution;
    }
    if ball.pos.y - ball.radius < bounds.top {
        ball.pos.y = bounds.top + ball.radius;
        ball.vel.y *= -restitution;
    }
    if ball.pos.y + ball.radius > bounds.bottom {
        ball.pos.y = bounds.bottom - ball.radius;
        ball.vel.y *= -restitution;
    }
}

/// Separate two overlapping balls and exchange momentum along the contact normal.
/// Balls have equal mass.
pub fn resolve_ball_collision(a: &mut Ball, b: &mut Ball, restitution: f64) {
    let delta = vec2::sub(b.pos, a.pos);
    let dist = vec2::length(delta);
    let min_dist = a.radius + b.radius;
    if dist == 0.0 || dist >= min_dist {
        return;
    }

    let n = vec2::scale(delta, 1.0 / dist);
    let half_overlap = (min_dist - dist) * 0.5;
    a.pos = vec2::sub(a.pos, vec2::scale(n, half_overlap));
    b.pos = vec2::add(b.pos, vec2::scale(n, half_overlap));

    let sep_vel = vec2::dot(vec2::sub(b.vel, a.vel), n);
    if sep_vel > 0.0 {
        return;
    }
    let impulse = -(1.0 + restitution) * sep_vel / 2.0;
    a.vel = vec2::sub(a.vel, vec2::scale(n, impulse));
    b.vel = vec2::add(b.vel, vec2::scale(n, impulse));
}
