use pooltrivia_shared::config::RulesConfig;
use pooltrivia_shared::phase::{GroupLoadState, Phase};
use pooltrivia_shared::protocol::{ClientMsg, SnapshotMsg};
use pooltrivia_shared::vec2::vec2;
use rand_chacha::ChaCha8Rng;

use crate::bot::{self, NpcAction, NpcScheduler, ReadyAction};
use crate::config::ServerConfig;
use crate::controller::{AnswerOutcome, ShotRejection, TurnController, SHOT_LOCKED_HINT};
use crate::groups::{FunctionalGroup, GroupLoad};
use crate::input::{drag_velocity, Drag, PointerOwner, PointerTracker};
use crate::onboarding::OnboardingStore;
use crate::player::Setup;
use crate::protocol;
use crate::question::Question;
use crate::table::Table;

const INITIAL_ANSWER_TEXT: &str = "Choose players and press Start Game.";
const NO_GROUPS_TEXT: &str = "No functional group data loaded.";

/// Central game state owned by the game loop task.
pub struct GameState {
    pub table: Table,
    pub controller: TurnController,
    pub pointer: PointerTracker,
    pub npcs: NpcScheduler,
    rules: RulesConfig,
    rng: ChaCha8Rng,
    onboarding: OnboardingStore,
    onboarding_seen: bool,
    group_pool: Vec<FunctionalGroup>,
    group_load_state: GroupLoadState,
    group_load_message: Option<String>,
    question: Option<Question>,
    choices_enabled: bool,
    answer_text: String,
    setup_visible: bool,
    onboarding_visible: bool,
}

impl GameState {
    pub fn new(config: &ServerConfig) -> Self {
        use rand::SeedableRng;
        // Read once at startup; dismissals update the cached flag.
        let onboarding = OnboardingStore::new(config.onboarding_path.clone());
        let onboarding_seen = onboarding.has_seen();
        Self {
            table: Table::new(config.table),
            controller: TurnController::new(),
            pointer: PointerTracker::new(),
            npcs: NpcScheduler::new(),
            rules: config.rules,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            onboarding,
            onboarding_seen,
            group_pool: Vec::new(),
            group_load_state: GroupLoadState::Pending,
            group_load_message: None,
            question: None,
            choices_enabled: false,
            answer_text: INITIAL_ANSWER_TEXT.to_string(),
            setup_visible: true,
            onboarding_visible: false,
        }
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    pub fn group_load_state(&self) -> GroupLoadState {
        self.group_load_state
    }

    pub fn setup_visible(&self) -> bool {
        self.setup_visible
    }

    pub fn onboarding_visible(&self) -> bool {
        self.onboarding_visible
    }

    /// Route one client message to its handler.
    pub fn handle_input(&mut self, connection_id: u32, msg: ClientMsg) {
        match msg {
            ClientMsg::StartGame {
                human_count,
                npc_count,
            } => self.start_game_from_setup(human_count, npc_count),
            ClientMsg::Answer { choice } => self.handle_choice_answer(&choice),
            ClientMsg::PointerDown { pointer_id, x, y } => self.pointer_down(
                PointerOwner {
                    connection_id,
                    pointer_id,
                },
                x,
                y,
            ),
            ClientMsg::PointerMove { pointer_id, x, y } => {
                let owner = PointerOwner {
                    connection_id,
                    pointer_id,
                };
                self.pointer.update(owner, vec2(x, y));
            }
            ClientMsg::PointerUp { pointer_id } => self.pointer_up(PointerOwner {
                connection_id,
                pointer_id,
            }),
            ClientMsg::PointerCancel { pointer_id }
            | ClientMsg::LostPointerCapture { pointer_id } => {
                self.pointer.cancel(PointerOwner {
                    connection_id,
                    pointer_id,
                });
            }
            ClientMsg::Rack => self.rack_balls(),
            ClientMsg::NextGroup => self.draw_new_group(),
            ClientMsg::DismissOnboarding => self.dismiss_onboarding(),
        }
    }

    /// Seat players from the setup modal and rack the first game.
    pub fn start_game_from_setup(&mut self, human_count: Option<i64>, npc_count: Option<i64>) {
        let setup = Setup::from_counts(human_count, npc_count, &self.rules);
        self.controller.start(setup.roster());
        self.setup_visible = false;
        tracing::info!(
            "Game started with {} human(s) and {} NPC(s)",
            setup.humans,
            setup.npcs
        );
        self.rack_balls();
        self.announce_fallback();
        self.maybe_show_onboarding();
    }

    /// Fresh rack: new ball layout, zeroed scores, first seat, new question.
    pub fn rack_balls(&mut self) {
        if !self.controller.game_started() {
            return;
        }
        self.table.rack(&mut self.rng);
        self.controller.reset_scores();
        self.pointer.clear();
        self.npcs.clear();
        self.question = None;
        self.controller.begin_question();
        self.draw_new_group();
    }

    /// Show a new prompt to the current player.
    pub fn draw_new_group(&mut self) {
        if self.controller.phase() == Phase::BallsMoving {
            self.answer_text = "Wait for the balls to settle.".to_string();
            return;
        }
        if self.group_pool.is_empty() || self.controller.players().is_empty() {
            self.answer_text = self
                .group_load_message
                .clone()
                .unwrap_or_else(|| NO_GROUPS_TEXT.to_string());
            return;
        }
        self.question = Question::draw(&self.group_pool, self.rules.max_distractors, &mut self.rng);
        self.controller.begin_question();
        self.pointer.clear();
        self.npcs.clear();

        let Some(player) = self.controller.current_player().cloned() else {
            return;
        };
        if player.is_npc {
            self.answer_text = format!("{} is answering...", player.label);
            self.choices_enabled = false;
            self.npcs
                .schedule(NpcAction::Answer, &player.id, self.rules.npc_answer_delay);
        } else {
            self.answer_text = format!("{}: identify this group to unlock your shot.", player.label);
            self.choices_enabled = true;
        }
    }

    /// A human clicked an answer button.
    pub fn handle_choice_answer(&mut self, choice: &str) {
        if !self.controller.game_started() {
            return;
        }
        let Some(player) = self.controller.current_player().cloned().filter(|p| !p.is_npc) else {
            self.answer_text = "Wait for NPC turn to resolve.".to_string();
            return;
        };
        let Some(question) = &self.question else {
            self.answer_text = "Shoot and settle or press Next Group first.".to_string();
            return;
        };
        if !self.choices_enabled || self.controller.phase() != Phase::QuestionActive {
            return;
        }
        let correct = question.is_correct(choice);
        let display_name = question.group.display_name.clone();

        match self.controller.record_answer(correct) {
            AnswerOutcome::Unlocked => {
                self.answer_text = format!("Correct. {} shot unlocked.", player.label);
                self.choices_enabled = false;
            }
            AnswerOutcome::Missed => {
                self.controller.switch_turn();
                self.draw_new_group();
                self.answer_text = format!(
                    "Not quite. This is {}. Turn passes. {}",
                    display_name, self.answer_text
                );
            }
            AnswerOutcome::Ignored => {}
        }
    }

    fn pointer_down(&mut self, owner: PointerOwner, x: f64, y: f64) {
        let Some(cue_pos) = self.table.cue().map(|c| c.pos) else {
            return;
        };
        match self.controller.check_shot() {
            Err(ShotRejection::Locked) => {
                self.answer_text = SHOT_LOCKED_HINT.to_string();
            }
            Err(ShotRejection::NotStarted | ShotRejection::NpcTurn) => {}
            Ok(()) => {
                let config = self.table.config();
                let grab_radius = config.ball_radius + config.grab_slop;
                self.pointer.try_capture(owner, vec2(x, y), cue_pos, grab_radius);
            }
        }
    }

    fn pointer_up(&mut self, owner: PointerOwner) {
        if let Some(drag) = self.pointer.release(owner) {
            self.shoot_from_drag(&drag);
        }
    }

    /// Turn a released drag into a shot, if the current player may shoot.
    pub fn shoot_from_drag(&mut self, drag: &Drag) {
        let Some(player) = self.controller.current_player().cloned() else {
            return;
        };
        if player.is_npc {
            self.answer_text = "NPC turn. Wait.".to_string();
            return;
        }
        if self.table.cue().is_none() {
            return;
        }
        if self.controller.check_shot().is_err() {
            self.answer_text = format!("Shot locked. {} must answer correctly first.", player.label);
            return;
        }
        let Some(velocity) = drag_velocity(drag, self.table.config()) else {
            return;
        };
        if self.controller.release_shot() && self.table.strike_cue(velocity) {
            tracing::debug!("{} shot at ({:.2}, {:.2})", player.id, velocity.x, velocity.y);
            self.answer_text = format!("{} shot in motion...", player.label);
        }
    }

    fn npc_try_answer(&mut self, player_id: &str) {
        let Some(player) = self.controller.current_player().cloned() else {
            return;
        };
        if player.id != player_id || !player.is_npc || self.question.is_none() {
            return;
        }
        let correct = bot::roll_answer(self.rules.npc_correct_chance, &mut self.rng);
        match self.controller.record_answer(correct) {
            AnswerOutcome::Unlocked => {
                self.answer_text = format!("{} answered correctly. Shot unlocked.", player.label);
                self.npcs
                    .schedule(NpcAction::Shoot, &player.id, self.rules.npc_shot_delay);
            }
            AnswerOutcome::Missed => {
                self.answer_text = format!("{} missed. Turn passes.", player.label);
                self.controller.switch_turn();
                self.npcs.schedule(
                    NpcAction::RedrawQuestion,
                    &player.id,
                    self.rules.npc_miss_redraw_delay,
                );
            }
            AnswerOutcome::Ignored => {}
        }
    }

    fn npc_shoot(&mut self, player_id: &str) {
        let Some(player) = self.controller.current_player().cloned() else {
            return;
        };
        if player.id != player_id || !self.controller.shot_unlocked() || self.table.cue().is_none() {
            return;
        }
        let velocity = bot::shot_velocity(&mut self.rng);
        if self.controller.release_shot() && self.table.strike_cue(velocity) {
            self.answer_text = format!("{} takes the shot.", player.label);
        }
    }

    fn run_npc_action(&mut self, ready: ReadyAction) {
        match ready.action {
            NpcAction::Answer => self.npc_try_answer(&ready.player_id),
            NpcAction::Shoot => self.npc_shoot(&ready.player_id),
            NpcAction::RedrawQuestion => {
                if self.controller.phase() == Phase::QuestionActive {
                    self.draw_new_group();
                }
            }
        }
    }

    fn maybe_show_onboarding(&mut self) {
        if !self.onboarding_seen {
            self.onboarding_visible = true;
        }
    }

    pub fn dismiss_onboarding(&mut self) {
        self.onboarding_seen = true;
        self.onboarding.mark_seen();
        self.onboarding_visible = false;
    }

    /// Install the result of the (asynchronous) group load.
    pub fn apply_group_load(&mut self, load: GroupLoad) {
        self.group_pool = load.pool;
        self.group_load_state = load.state;
        self.group_load_message = load.message;

        if !self.controller.game_started() {
            return;
        }
        if self.question.is_none() && !self.group_pool.is_empty() {
            self.draw_new_group();
        } else if let Some(message) = &self.group_load_message {
            if self.group_pool.is_empty() {
                self.answer_text = message.clone();
            }
        }
        self.announce_fallback();
    }

    /// Put the fallback notice in front of the current prompt.
    fn announce_fallback(&mut self) {
        if self.group_load_state != GroupLoadState::Fallback || !self.controller.game_started() {
            return;
        }
        if let Some(message) = &self.group_load_message {
            if !self.answer_text.starts_with(message.as_str()) {
                self.answer_text = format!("{} {}", message, self.answer_text);
            }
        }
    }

    /// A connection closed; release any pointer it was holding.
    pub fn connection_left(&mut self, connection_id: u32) {
        if self.pointer.release_connection(connection_id) {
            tracing::debug!("Released pointer capture held by connection {}", connection_id);
        }
    }

    /// Advance physics one frame and fire due NPC actions.
    /// Returns true when something the UI shows changed beyond ball positions.
    pub fn tick(&mut self, dt: f64) -> bool {
        let mut changed = false;
        if self.controller.game_started() {
            let outcome = self.table.step();
            if outcome.pocketed > 0 {
                changed = true;
            }
            if outcome.settled_now && self.controller.finish_shot_cycle() {
                self.draw_new_group();
                changed = true;
            }
        }
        for ready in self.npcs.tick(dt) {
            self.run_npc_action(ready);
            changed = true;
        }
        changed
    }

    /// Full UI state for broadcasting.
    pub fn snapshot(&self) -> SnapshotMsg {
        let (score_correct, score_total) = self.controller.score();
        let cue = self.table.cue();
        SnapshotMsg {
            phase: self.controller.phase(),
            shot_unlocked: self.controller.shot_unlocked(),
            game_started: self.controller.game_started(),
            setup_visible: self.setup_visible,
            onboarding_visible: self.onboarding_visible,
            current_player_id: self.controller.current_player().map(|p| p.id.clone()),
            players: self
                .controller
                .players()
                .iter()
                .map(|p| protocol::player_wire(p, self.controller.correct_for(&p.id)))
                .collect(),
            balls: self
                .table
                .balls()
                .iter()
                .filter(|b| b.active)
                .map(protocol::ball_wire)
                .collect(),
            question: self
                .question
                .as_ref()
                .map(|q| protocol::question_wire(q, self.choices_enabled)),
            answer_text: self.answer_text.clone(),
            answer_meta: self.controller.score_label(self.group_load_state),
            status_detail: self.controller.status_detail(),
            cue_hint: cue
                .and(self.controller.cue_hint())
                .map(str::to_string),
            aim: match (self.pointer.drag(), cue) {
                (Some(drag), Some(cue)) => Some(protocol::aim_wire(cue.pos, drag.now)),
                _ => None,
            },
            group_load_state: self.group_load_state,
            score_correct,
            score_total,
        }
    }
}
