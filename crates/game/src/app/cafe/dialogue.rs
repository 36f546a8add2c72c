use engine::{Canvas, Rect};

use super::barista::Prompt;
use crate::app::ui::{wrap_text, UiAssets};

pub(crate) const REVEAL_CHARS_PER_SECOND: f32 = 45.0;
pub(crate) const SPEAKER: &str = "Barista";
const NAME_HINT: &str = "Type name, Enter to confirm";
const CHOICE_HINT: &str = "Press number keys to choose";

const PANEL: Rect = Rect {
    left: 40.0,
    top: 510.0,
    width: 1200.0,
    height: 200.0,
};
const PADDING: i32 = 24;
const TEXT_SCALE: u32 = 3;
const SMALL_SCALE: u32 = 2;
const WRAP_COLUMNS: usize = 88;

const OUTLINE_COLOR: [u8; 4] = [255, 255, 255, 60];
const SPEAKER_COLOR: [u8; 4] = [255, 214, 153, 255];
const TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];
const OPTION_COLOR: [u8; 4] = [180, 180, 180, 255];
const HINT_COLOR: [u8; 4] = [200, 200, 200, 255];

/// Speech panel at the bottom of the screen with a typewriter reveal.
#[derive(Debug, Clone, Default)]
pub(crate) struct DialoguePanel {
    visible: bool,
    message: String,
    options: Vec<String>,
    requires_input: bool,
    name_buffer: String,
    reveal_timer: f32,
}

impl DialoguePanel {
    pub(crate) fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn show(&mut self, prompt: &Prompt) {
        self.visible = true;
        self.message = prompt.text.clone();
        self.options = prompt
            .options
            .iter()
            .enumerate()
            .map(|(index, option)| format!("{}. {option}", index + 1))
            .collect();
        self.requires_input = prompt.requires_input;
        self.name_buffer.clear();
        self.reveal_timer = 0.0;
    }

    pub(crate) fn hide(&mut self) {
        self.visible = false;
    }

    pub(crate) fn set_name_buffer(&mut self, text: &str) {
        self.name_buffer.clear();
        self.name_buffer.push_str(text);
    }

    pub(crate) fn update(&mut self, dt: f32) {
        if self.visible && !self.is_revealed() {
            self.reveal_timer += dt;
        }
    }

    pub(crate) fn skip_reveal(&mut self) {
        self.reveal_timer = (self.message.chars().count() as f32 + 0.5) / REVEAL_CHARS_PER_SECOND;
    }

    pub(crate) fn revealed_chars(&self) -> usize {
        let total = self.message.chars().count();
        ((self.reveal_timer * REVEAL_CHARS_PER_SECOND) as usize).min(total)
    }

    pub(crate) fn is_revealed(&self) -> bool {
        self.revealed_chars() >= self.message.chars().count()
    }

    pub(crate) fn revealed_text(&self) -> String {
        self.message.chars().take(self.revealed_chars()).collect()
    }

    pub(crate) fn name_line(&self) -> Option<String> {
        self.requires_input
            .then(|| format!("Name: {}_", self.name_buffer))
    }

    pub(crate) fn hint(&self) -> &'static str {
        if self.requires_input {
            NAME_HINT
        } else {
            CHOICE_HINT
        }
    }

    pub(crate) fn draw(&self, canvas: &mut Canvas<'_>, ui: UiAssets) {
        if !self.visible {
            return;
        }
        canvas.draw_texture(ui.panel, PANEL);
        canvas.outline_rect(PANEL, OUTLINE_COLOR);

        let left = PANEL.left as i32 + PADDING;
        let mut y = PANEL.top as i32 + 16;
        canvas.draw_text(ui.font, SPEAKER, left, y, SMALL_SCALE, SPEAKER_COLOR);
        y += canvas.line_height(ui.font, SMALL_SCALE) as i32 + 8;

        let text_line = canvas.line_height(ui.font, TEXT_SCALE) as i32;
        for line in wrap_text(&self.revealed_text(), WRAP_COLUMNS) {
            canvas.draw_text(ui.font, &line, left, y, TEXT_SCALE, TEXT_COLOR);
            y += text_line;
        }

        y += 8;
        for option in &self.options {
            canvas.draw_text(ui.font, option, left, y, TEXT_SCALE, OPTION_COLOR);
            y += text_line;
        }
        if let Some(name_line) = self.name_line() {
            canvas.draw_text(ui.font, &name_line, left, y, TEXT_SCALE, TEXT_COLOR);
        }

        let hint = self.hint();
        let hint_x =
            (PANEL.right() as i32 - PADDING) - canvas.text_width(ui.font, hint, SMALL_SCALE) as i32;
        let hint_y = PANEL.bottom() as i32 - PADDING;
        canvas.draw_text(ui.font, hint, hint_x, hint_y, SMALL_SCALE, HINT_COLOR);
    }
}
