use engine::Canvas;

use super::order::Order;
use crate::app::ui::UiAssets;

const MOVE_PROMPT: &str = "WASD to move, E to interact";
const INTERACT_HINT: &str = "E to interact";
const SELECT_HINT: &str = "1-4 to select - Enter to confirm";

const LEFT: i32 = 24;
const RIGHT_COLUMN: i32 = 980;
const SCALE: u32 = 3;

const CLOCK_COLOR: [u8; 4] = [255, 255, 255, 255];
const PROMPT_COLOR: [u8; 4] = [255, 214, 153, 255];
const CHECKLIST_COLOR: [u8; 4] = [200, 220, 255, 255];
const HINT_COLOR: [u8; 4] = [200, 200, 200, 255];

/// Clock, movement prompt, order checklist and a contextual hint.
#[derive(Debug, Clone)]
pub(crate) struct Hud {
    clock: String,
    prompt: String,
    checklist: Vec<String>,
    hint: String,
    custom_hint: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            clock: format_clock(0.0),
            prompt: MOVE_PROMPT.to_string(),
            checklist: build_checklist(&Order::default()),
            hint: INTERACT_HINT.to_string(),
            custom_hint: false,
        }
    }
}

impl Hud {
    #[cfg(test)]
    pub(crate) fn clock(&self) -> &str {
        &self.clock
    }

    pub(crate) fn hint(&self) -> &str {
        &self.hint
    }

    #[cfg(test)]
    pub(crate) fn checklist(&self) -> &[String] {
        &self.checklist
    }

    pub(crate) fn update(&mut self, elapsed_seconds: f32, order: &Order, interacting: bool) {
        self.clock = format_clock(elapsed_seconds);
        self.checklist = build_checklist(order);
        if !self.custom_hint {
            let hint = if interacting {
                SELECT_HINT
            } else {
                INTERACT_HINT
            };
            self.hint.clear();
            self.hint.push_str(hint);
        }
    }

    /// Pins `hint` until [`Hud::clear_hint`].
    pub(crate) fn set_hint(&mut self, hint: &str) {
        self.hint = hint.to_string();
        self.custom_hint = true;
    }

    pub(crate) fn clear_hint(&mut self) {
        self.custom_hint = false;
        self.hint.clear();
    }

    pub(crate) fn draw(&self, canvas: &mut Canvas<'_>, ui: UiAssets) {
        let line = canvas.line_height(ui.font, SCALE) as i32;
        canvas.draw_text(ui.font, &self.clock, LEFT, 20, SCALE, CLOCK_COLOR);
        canvas.draw_text(ui.font, &self.prompt, LEFT, 20 + line + 8, SCALE, PROMPT_COLOR);

        let mut y = 20;
        for entry in &self.checklist {
            canvas.draw_text(ui.font, entry, RIGHT_COLUMN, y, SCALE, CHECKLIST_COLOR);
            y += line;
        }
        canvas.draw_text(ui.font, &self.hint, RIGHT_COLUMN, y + 12, SCALE, HINT_COLOR);
    }
}

fn format_clock(elapsed_seconds: f32) -> String {
    format!("Time: {elapsed_seconds:.1}s")
}

fn build_checklist(order: &Order) -> Vec<String> {
    [
        ("Drink", &order.drink),
        ("Size", &order.size),
        ("Milk", &order.milk),
        ("Name", &order.customer_name),
    ]
    .into_iter()
    .map(|(label, value)| {
        let mark = if value.is_empty() { ' ' } else { 'x' };
        format!("[{mark}] {label}")
    })
    .collect()
}
