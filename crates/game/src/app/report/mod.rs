use engine::{
    Canvas, InputAction, InputSnapshot, Rect, Scene, SceneCommand, SceneContext, SceneError,
    SoundHandle,
};
use tracing::info;

use crate::app::assets::DING_SOUND;
use crate::app::config::CafeConfig;
use crate::app::flow;
use crate::app::ui::{wrap_text, UiAssets};

pub(crate) const SCENE_NAME: &str = "report";
pub(crate) const TITLE: &str = "Order Summary";
pub(crate) const DEFAULT_TIP: &str = "Great work! Keep refining your flow.";
pub(crate) const CONTROLS: &str = "Enter/Space: Replay   Esc: Quit";
const DING_VOLUME: f32 = 60.0;

const BACKDROP: Rect = Rect::new(240.0, 150.0, 800.0, 420.0);
const BACKDROP_COLOR: [u8; 4] = [20, 20, 30, 240];
const OUTLINE_COLOR: [u8; 4] = [255, 255, 255, 80];
const TITLE_COLOR: [u8; 4] = [255, 255, 255, 255];
const STATS_COLOR: [u8; 4] = [220, 220, 220, 255];
const TIP_COLOR: [u8; 4] = [180, 220, 255, 255];
const CONTROLS_COLOR: [u8; 4] = [200, 200, 200, 255];
const TEXT_LEFT: i32 = 280;
const TIP_COLUMNS: usize = 58;

/// Summary of one completed conversation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderReport {
    pub(crate) elapsed_seconds: f32,
    pub(crate) path_distance: f32,
    pub(crate) steps: u32,
    pub(crate) complete: bool,
    pub(crate) missing_fields: Vec<String>,
    pub(crate) tip: String,
}

impl OrderReport {
    pub(crate) fn stat_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Time to order: {:.1}s", self.elapsed_seconds),
            format!("Path distance: {:.1} px", self.path_distance),
            format!("Steps taken: {}", self.steps),
            format!(
                "Order complete: {}",
                if self.complete { "Yes" } else { "No" }
            ),
        ];
        if !self.missing_fields.is_empty() {
            lines.push(format!("Missing: {}", self.missing_fields.join(", ")));
        }
        lines
    }

    pub(crate) fn tip_line(&self) -> String {
        let tip = if self.tip.is_empty() {
            DEFAULT_TIP
        } else {
            self.tip.as_str()
        };
        format!("Tip: {tip}")
    }
}

/// Static results screen. Replays the cafe or quits.
pub(crate) struct ReportScene {
    report: OrderReport,
    config: CafeConfig,
    ui: UiAssets,
    ding: SoundHandle,
}

impl ReportScene {
    pub(crate) fn new(
        ctx: &mut SceneContext<'_>,
        report: OrderReport,
        config: CafeConfig,
    ) -> Result<Self, SceneError> {
        Ok(Self {
            ui: UiAssets::resolve(ctx.assets)?,
            ding: ctx.assets.sound(DING_SOUND)?,
            report,
            config,
        })
    }
}

impl Scene for ReportScene {
    fn name(&self) -> &'static str {
        SCENE_NAME
    }

    fn on_enter(&mut self, ctx: &mut SceneContext<'_>) {
        ctx.audio.play_sound_at(self.ding, DING_VOLUME);
        info!(
            elapsed_seconds = self.report.elapsed_seconds,
            complete = self.report.complete,
            "report_shown"
        );
    }

    fn handle_input(&mut self, input: &InputSnapshot, _ctx: &mut SceneContext<'_>) -> SceneCommand {
        if input.was_pressed(InputAction::Confirm) || input.was_pressed(InputAction::Continue) {
            return flow::restart_simulation(self.config.clone());
        }
        if input.was_pressed(InputAction::Quit) {
            return SceneCommand::Quit;
        }
        SceneCommand::None
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        _input: &InputSnapshot,
        _ctx: &mut SceneContext<'_>,
    ) -> SceneCommand {
        SceneCommand::None
    }

    fn draw(&self, canvas: &mut Canvas<'_>) {
        let font = self.ui.font;
        canvas.fill_rect(BACKDROP, BACKDROP_COLOR);
        canvas.outline_rect(BACKDROP, OUTLINE_COLOR);

        let mut y = BACKDROP.top as i32 + 30;
        canvas.draw_text(font, TITLE, TEXT_LEFT, y, 5, TITLE_COLOR);
        y += canvas.line_height(font, 5) as i32 + 20;

        let line = canvas.line_height(font, 3) as i32;
        for stat in self.report.stat_lines() {
            canvas.draw_text(font, &stat, TEXT_LEFT, y, 3, STATS_COLOR);
            y += line;
        }

        y += 20;
        for tip in wrap_text(&self.report.tip_line(), TIP_COLUMNS) {
            canvas.draw_text(font, &tip, TEXT_LEFT, y, 3, TIP_COLOR);
            y += line;
        }

        let controls_y = BACKDROP.bottom() as i32 - 40;
        canvas.draw_text(font, CONTROLS, TEXT_LEFT, controls_y, 2, CONTROLS_COLOR);
    }

    fn debug_title(&self) -> Option<String> {
        Some(format!(
            "Barista Simulator | {TITLE} | {}",
            self.report.stat_lines().join(" | ")
        ))
    }
}
