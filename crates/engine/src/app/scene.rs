use std::fmt;

use thiserror::Error;
use tracing::info;

use super::input::{ActionStates, InputAction, TextInput};
use super::rendering::Canvas;
use crate::assets::{AssetError, AssetRegistry};
use crate::audio::AudioBus;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to resolve scene assets: {0}")]
    Assets(#[from] AssetError),
    #[error("failed to build scene '{scene}': {reason}")]
    Build { scene: &'static str, reason: String },
}

/// Builds the next scene. Runs at the top of a frame, after the outgoing
/// scene has been exited.
pub type SceneFactory =
    Box<dyn FnOnce(&mut SceneContext<'_>) -> Result<Box<dyn Scene>, SceneError>>;

pub enum SceneCommand {
    None,
    SwitchTo(SceneFactory),
    Quit,
}

impl SceneCommand {
    pub fn switch_to<F>(factory: F) -> Self
    where
        F: FnOnce(&mut SceneContext<'_>) -> Result<Box<dyn Scene>, SceneError> + 'static,
    {
        SceneCommand::SwitchTo(Box::new(factory))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SceneCommand::None)
    }
}

impl fmt::Debug for SceneCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneCommand::None => f.write_str("None"),
            SceneCommand::SwitchTo(_) => f.write_str("SwitchTo(<factory>)"),
            SceneCommand::Quit => f.write_str("Quit"),
        }
    }
}

/// Shared services lent to a scene for the duration of one call.
pub struct SceneContext<'a> {
    pub assets: &'a AssetRegistry,
    pub audio: &'a mut AudioBus,
}

impl<'a> SceneContext<'a> {
    pub fn new(assets: &'a AssetRegistry, audio: &'a mut AudioBus) -> Self {
        Self { assets, audio }
    }
}

/// Input state for one frame: held actions, actions newly pressed since the
/// previous snapshot, and typed text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    quit_requested: bool,
    down: ActionStates,
    pressed: ActionStates,
    text: Vec<TextInput>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        down: ActionStates,
        pressed: ActionStates,
        text: Vec<TextInput>,
    ) -> Self {
        Self {
            quit_requested,
            down,
            pressed,
            text,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.down.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn text(&self) -> &[TextInput] {
        &self.text
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.down.set(action, is_down);
        self
    }

    /// Marks `action` as pressed this frame (and therefore held).
    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.down.set(action, true);
        self.pressed.set(action, true);
        self
    }

    pub fn with_text_input(mut self, input: TextInput) -> Self {
        self.text.push(input);
        self
    }

    pub fn with_typed(mut self, typed: &str) -> Self {
        self.text
            .extend(typed.chars().filter_map(TextInput::printable));
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }
}

pub trait Scene {
    fn name(&self) -> &'static str;
    fn on_enter(&mut self, _ctx: &mut SceneContext<'_>) {}
    fn on_exit(&mut self, _ctx: &mut SceneContext<'_>) {}
    /// Called once per frame, before the fixed updates.
    fn handle_input(&mut self, input: &InputSnapshot, ctx: &mut SceneContext<'_>)
        -> SceneCommand;
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut SceneContext<'_>,
    ) -> SceneCommand;
    fn draw(&self, canvas: &mut Canvas<'_>);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

enum PendingScene {
    SwitchTo(SceneFactory),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneTransition {
    Unchanged,
    Switched {
        from: Option<&'static str>,
        to: &'static str,
    },
    Quit {
        from: Option<&'static str>,
    },
}

/// Owns the single active scene and at most one pending request.
#[derive(Default)]
pub struct SceneMachine {
    active: Option<Box<dyn Scene>>,
    pending: Option<PendingScene>,
}

impl SceneMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn active_name(&self) -> Option<&'static str> {
        self.active.as_ref().map(|scene| scene.name())
    }

    /// Stores a scene command. Later requests replace earlier ones; `None`
    /// leaves the slot alone.
    pub fn request(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::None => {}
            SceneCommand::SwitchTo(factory) => {
                self.pending = Some(PendingScene::SwitchTo(factory));
            }
            SceneCommand::Quit => self.pending = Some(PendingScene::Quit),
        }
    }

    /// Applies the pending request, if any. On a factory error the outgoing
    /// scene has already been exited and no scene remains active.
    pub fn apply_pending(
        &mut self,
        ctx: &mut SceneContext<'_>,
    ) -> Result<SceneTransition, SceneError> {
        let Some(pending) = self.pending.take() else {
            return Ok(SceneTransition::Unchanged);
        };

        let from = self.exit_active(ctx);
        match pending {
            PendingScene::Quit => {
                info!(from = from.unwrap_or("none"), "scene_quit");
                Ok(SceneTransition::Quit { from })
            }
            PendingScene::SwitchTo(factory) => {
                let mut next = factory(ctx)?;
                next.on_enter(ctx);
                let to = next.name();
                self.active = Some(next);
                info!(from = from.unwrap_or("none"), to, "scene_entered");
                Ok(SceneTransition::Switched { from, to })
            }
        }
    }

    /// Routes the frame's input, applies the resulting request (or one left
    /// by the previous frame's updates), then runs `ticks` fixed updates on
    /// whichever scene is active afterwards.
    pub fn run_frame(
        &mut self,
        input: &InputSnapshot,
        ticks: u32,
        fixed_dt_seconds: f32,
        ctx: &mut SceneContext<'_>,
    ) -> Result<SceneTransition, SceneError> {
        self.handle_input(input, ctx);
        let transition = self.apply_pending(ctx)?;
        for _ in 0..ticks {
            self.update_active(fixed_dt_seconds, input, ctx);
        }
        Ok(transition)
    }

    pub fn handle_input(&mut self, input: &InputSnapshot, ctx: &mut SceneContext<'_>) {
        let Some(scene) = self.active.as_mut() else {
            return;
        };
        let command = scene.handle_input(input, ctx);
        self.request(command);
    }

    pub fn update_active(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut SceneContext<'_>,
    ) {
        let Some(scene) = self.active.as_mut() else {
            return;
        };
        let command = scene.update(fixed_dt_seconds, input, ctx);
        self.request(command);
    }

    pub fn draw_active(&self, canvas: &mut Canvas<'_>) {
        if let Some(scene) = self.active.as_ref() {
            scene.draw(canvas);
        }
    }

    pub fn debug_title_active(&self) -> Option<String> {
        self.active.as_ref().and_then(|scene| scene.debug_title())
    }

    /// Exits the active scene and discards any pending request.
    pub fn shutdown(&mut self, ctx: &mut SceneContext<'_>) {
        self.pending = None;
        if let Some(name) = self.exit_active(ctx) {
            info!(scene = name, "scene_shutdown");
        }
    }

    fn exit_active(&mut self, ctx: &mut SceneContext<'_>) -> Option<&'static str> {
        let mut scene = self.active.take()?;
        scene.on_exit(ctx);
        Some(scene.name())
    }
}
