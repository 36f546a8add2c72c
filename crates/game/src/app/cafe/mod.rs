use engine::{
    Canvas, InputAction, InputSnapshot, Rect, Scene, SceneCommand, SceneContext, SceneError,
    SoundHandle, TextInput, TextureHandle, TrackHandle, Vec2,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

mod barista;
mod customer;
mod dialogue;
mod hud;
mod motion;
mod order;
mod player;

use self::barista::{BaristaNpc, ConversationState};
use self::customer::Customer;
use self::dialogue::DialoguePanel;
use self::hud::Hud;
use self::order::validate_order;
use self::player::Player;
use crate::app::assets::{
    AMBIENCE_TRACK, BARISTA_SPRITE, CAFE_BACKGROUND, CUSTOMER_SPRITE, PLAYER_SPRITE, STEP_SOUND,
    UI_CLICK_SOUND,
};
use crate::app::config::CafeConfig;
use crate::app::flow;
use crate::app::report::OrderReport;
use crate::app::ui::UiAssets;

pub(crate) const SCENE_NAME: &str = "cafe";
pub(crate) const PENALTY_HINT: &str = "Take your time! Queue is waiting...";
pub(crate) const TIP_COMPLETE: &str = "Consider approaching from the left aisle for a shorter path.";
pub(crate) const TIP_INCOMPLETE: &str = "Make sure to fill in every field before confirming.";

const START_CLICK_VOLUME: f32 = 50.0;
const ACCEPT_CLICK_VOLUME: f32 = 45.0;
const PENALTY_CUE_VOLUME: f32 = 30.0;
const STEP_VOLUME: f32 = 35.0;
const AMBIENCE_VOLUME: f32 = 35.0;

const PLAYER_START: Vec2 = Vec2::new(360.0, 540.0);
const BARISTA_POSITION: Vec2 = Vec2::new(640.0, 260.0);
const CUSTOMER_DOOR_X: f32 = 1100.0;
const CUSTOMER_DOOR_Y: f32 = 710.0;
const CUSTOMER_SPACING: f32 = 40.0;
const QUEUE_SLOTS: [Vec2; 3] = [
    Vec2::new(720.0, 420.0),
    Vec2::new(780.0, 470.0),
    Vec2::new(840.0, 520.0),
];
const COUNTER: Rect = Rect::new(0.0, 180.0, 1280.0, 130.0);
const TABLES: [Rect; 3] = [
    Rect::new(120.0, 360.0, 240.0, 120.0),
    Rect::new(420.0, 380.0, 160.0, 120.0),
    Rect::new(980.0, 360.0, 200.0, 140.0),
];

const COUNTER_COLOR: [u8; 4] = [96, 64, 44, 235];
const TABLE_COLOR: [u8; 4] = [132, 94, 62, 235];
const COLLIDER_EDGE_COLOR: [u8; 4] = [40, 26, 18, 255];

/// Bookkeeping for the conversation in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Session {
    elapsed_seconds: f32,
    idle_seconds: f32,
    penalty_applied: bool,
    penalty_seconds: f32,
    distance_baseline: f32,
    steps_baseline: u32,
}

#[derive(Debug, Clone, Copy)]
struct CafeAssets {
    ui: UiAssets,
    background: TextureHandle,
    step: SoundHandle,
    click: SoundHandle,
    ambience: TrackHandle,
}

/// The playable cafe: walk to the counter, place an order, get a report.
pub(crate) struct CafeScene {
    config: CafeConfig,
    assets: CafeAssets,
    rng: StdRng,
    player: Player,
    barista: BaristaNpc,
    customers: Vec<Customer>,
    colliders: Vec<Rect>,
    dialogue: DialoguePanel,
    hud: Hud,
    clock_seconds: f32,
    session: Session,
    name_buffer: String,
}

impl CafeScene {
    pub(crate) fn new(ctx: &mut SceneContext<'_>, config: CafeConfig) -> Result<Self, SceneError> {
        let registry = ctx.assets;
        let assets = CafeAssets {
            ui: UiAssets::resolve(registry)?,
            background: registry.texture(CAFE_BACKGROUND)?,
            step: registry.sound(STEP_SOUND)?,
            click: registry.sound(UI_CLICK_SOUND)?,
            ambience: registry.track(AMBIENCE_TRACK)?,
        };
        let player_sprite = registry.texture(PLAYER_SPRITE)?;
        let barista_sprite = registry.texture(BARISTA_SPRITE)?;
        let customer_sprite = registry.texture(CUSTOMER_SPRITE)?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let customers = QUEUE_SLOTS
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                let start = Vec2::new(
                    CUSTOMER_DOOR_X + CUSTOMER_SPACING * index as f32,
                    CUSTOMER_DOOR_Y,
                );
                let aisle = Vec2::new(start.x - 80.0, 600.0);
                Customer::new(
                    start,
                    vec![aisle, *slot],
                    customer_sprite,
                    &config.customers,
                    &mut rng,
                )
            })
            .collect();

        let mut colliders = vec![COUNTER];
        colliders.extend(TABLES);

        Ok(Self {
            player: Player::new(PLAYER_START, player_sprite, config.player),
            barista: BaristaNpc::new(BARISTA_POSITION, barista_sprite, config.menu.clone()),
            customers,
            colliders,
            dialogue: DialoguePanel::default(),
            hud: Hud::default(),
            clock_seconds: 0.0,
            session: Session::default(),
            name_buffer: String::new(),
            assets,
            rng,
            config,
        })
    }

    fn conversing(&self) -> bool {
        self.barista.conversation.is_conversation_active()
    }

    fn in_name_mode(&self) -> bool {
        self.conversing() && self.barista.conversation.requires_input()
    }

    fn player_in_range(&self) -> bool {
        self.player.position().distance(self.barista.position()) <= self.player.interaction_radius()
    }

    fn start_conversation(&mut self, ctx: &mut SceneContext<'_>) {
        self.barista.conversation.start();
        self.session = Session {
            distance_baseline: self.player.distance_travelled(),
            steps_baseline: self.player.steps(),
            ..Session::default()
        };
        self.name_buffer.clear();
        self.hud.clear_hint();
        self.dialogue.show(self.barista.conversation.prompt());
        ctx.audio.play_sound_at(self.assets.click, START_CLICK_VOLUME);
        info!(
            distance_baseline = self.session.distance_baseline,
            steps_baseline = self.session.steps_baseline,
            "conversation_started"
        );
    }

    fn handle_name_input(&mut self, input: &InputSnapshot, ctx: &mut SceneContext<'_>) {
        for entry in input.text() {
            match entry {
                TextInput::Char(ch) => {
                    if self.name_buffer.chars().count() < self.config.name_max_len {
                        self.name_buffer.push(*ch);
                    }
                }
                TextInput::Backspace => {
                    self.name_buffer.pop();
                }
            }
        }
        self.dialogue.set_name_buffer(&self.name_buffer);

        if input.was_pressed(InputAction::Confirm)
            && self.barista.conversation.submit_name(&self.name_buffer)
        {
            self.name_buffer.clear();
            self.accept_step(ctx);
        }
    }

    fn handle_choice_input(
        &mut self,
        input: &InputSnapshot,
        ctx: &mut SceneContext<'_>,
    ) -> SceneCommand {
        let state = self.barista.conversation.state();
        let index = InputAction::OPTIONS
            .iter()
            .find(|action| input.was_pressed(**action))
            .and_then(|action| action.option_index())
            .or_else(|| {
                (state == ConversationState::Confirm && input.was_pressed(InputAction::Confirm))
                    .then_some(0)
            });
        let Some(index) = index else {
            return SceneCommand::None;
        };

        if let Err(error) = self.barista.conversation.select_option(index) {
            debug!(error = %error, "option_rejected");
            return SceneCommand::None;
        }
        self.accept_step(ctx);

        if state == ConversationState::Confirm
            && self.barista.conversation.state() == ConversationState::Complete
        {
            return self.finish_order();
        }
        SceneCommand::None
    }

    fn accept_step(&mut self, ctx: &mut SceneContext<'_>) {
        self.session.idle_seconds = 0.0;
        self.dialogue.show(self.barista.conversation.prompt());
        ctx.audio.play_sound_at(self.assets.click, ACCEPT_CLICK_VOLUME);
    }

    fn apply_idle_penalty(&mut self, ctx: &mut SceneContext<'_>) {
        if self.session.penalty_applied
            || self.session.idle_seconds <= self.config.penalty.idle_threshold_seconds
            || self.customers.is_empty()
        {
            return;
        }
        self.session.penalty_applied = true;
        self.session.penalty_seconds += self.config.penalty.penalty_seconds;
        self.hud.set_hint(PENALTY_HINT);
        ctx.audio.play_sound_at(self.assets.click, PENALTY_CUE_VOLUME);
        info!(
            idle_seconds = self.session.idle_seconds,
            penalty_seconds = self.config.penalty.penalty_seconds,
            "idle_penalty_applied"
        );
    }

    fn finish_order(&mut self) -> SceneCommand {
        let validation = validate_order(self.barista.conversation.order());
        let tip = if validation.complete {
            TIP_COMPLETE
        } else {
            TIP_INCOMPLETE
        };
        let report = OrderReport {
            elapsed_seconds: self.session.elapsed_seconds + self.session.penalty_seconds,
            path_distance: (self.player.distance_travelled() - self.session.distance_baseline)
                .max(0.0),
            steps: self
                .player
                .steps()
                .saturating_sub(self.session.steps_baseline),
            complete: validation.complete,
            missing_fields: validation.missing_fields,
            tip: tip.to_string(),
        };
        info!(
            elapsed_seconds = report.elapsed_seconds,
            path_distance = report.path_distance,
            steps = report.steps,
            complete = report.complete,
            "order_report_created"
        );

        self.barista.conversation.reset();
        self.dialogue.hide();
        self.hud.clear_hint();
        flow::show_report(report, self.config.clone())
    }

    fn draw_actors(&self, canvas: &mut Canvas<'_>) {
        for customer in &self.customers {
            canvas.draw_texture(customer.body.sprite, customer.body.bounds());
        }
        canvas.draw_texture(self.barista.body.sprite, self.barista.body.bounds());
        canvas.draw_texture(self.player.body.sprite, self.player.body.bounds());
    }
}

impl Scene for CafeScene {
    fn name(&self) -> &'static str {
        SCENE_NAME
    }

    fn on_enter(&mut self, ctx: &mut SceneContext<'_>) {
        ctx.audio.play_music_at(self.assets.ambience, true, AMBIENCE_VOLUME);
        info!(
            customers = self.customers.len(),
            colliders = self.colliders.len(),
            seed = self.config.seed,
            "cafe_ready"
        );
    }

    fn on_exit(&mut self, ctx: &mut SceneContext<'_>) {
        ctx.audio.stop_music();
    }

    fn handle_input(&mut self, input: &InputSnapshot, ctx: &mut SceneContext<'_>) -> SceneCommand {
        if !self.conversing() {
            if input.was_pressed(InputAction::Interact) && self.player_in_range() {
                self.start_conversation(ctx);
            }
            return SceneCommand::None;
        }

        if self.in_name_mode() {
            self.handle_name_input(input, ctx);
            return SceneCommand::None;
        }
        if self.dialogue.is_visible()
            && !self.dialogue.is_revealed()
            && input.was_pressed(InputAction::Continue)
        {
            self.dialogue.skip_reveal();
        }
        self.handle_choice_input(input, ctx)
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut SceneContext<'_>,
    ) -> SceneCommand {
        self.clock_seconds += fixed_dt_seconds;

        let velocity = self.player.velocity_for(input);
        let tick = self.player.step(fixed_dt_seconds, velocity);
        let bounds = self.player.body.bounds();
        if self
            .colliders
            .iter()
            .any(|collider| collider.intersects(&bounds))
        {
            self.player.revert_position(tick.previous_position);
        } else if tick.stepped {
            ctx.audio.play_sound_at(self.assets.step, STEP_VOLUME);
        }

        for customer in &mut self.customers {
            customer.update(fixed_dt_seconds, &mut self.rng);
        }
        self.barista.update(fixed_dt_seconds);

        let conversing = self.conversing();
        if conversing {
            self.session.elapsed_seconds += fixed_dt_seconds;
            self.session.idle_seconds += fixed_dt_seconds;
            self.apply_idle_penalty(ctx);
        }

        self.dialogue.update(fixed_dt_seconds);
        self.hud.update(
            self.clock_seconds,
            self.barista.conversation.order(),
            conversing,
        );
        SceneCommand::None
    }

    fn draw(&self, canvas: &mut Canvas<'_>) {
        let frame = Rect::new(0.0, 0.0, canvas.width() as f32, canvas.height() as f32);
        canvas.draw_texture(self.assets.background, frame);
        for (index, collider) in self.colliders.iter().enumerate() {
            let color = if index == 0 {
                COUNTER_COLOR
            } else {
                TABLE_COLOR
            };
            canvas.fill_rect(*collider, color);
            canvas.outline_rect(*collider, COLLIDER_EDGE_COLOR);
        }
        self.draw_actors(canvas);
        self.hud.draw(canvas, self.assets.ui);
        self.dialogue.draw(canvas, self.assets.ui);
    }

    fn debug_title(&self) -> Option<String> {
        let queued = self
            .customers
            .iter()
            .filter(|customer| customer.has_arrived())
            .count();
        Some(format!(
            "Barista Simulator | {} | queue {queued}/{}",
            self.barista.conversation.state().as_str(),
            self.customers.len()
        ))
    }
}
