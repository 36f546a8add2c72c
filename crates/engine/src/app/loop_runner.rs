use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::assets::AssetRegistry;
use crate::audio::{AudioBackend, AudioBus};

use super::input::{ActionStates, TextInput};
use super::metrics::MetricsAccumulator;
use super::scene::{SceneCommand, SceneContext, SceneError, SceneFactory, SceneMachine};
use super::{InputAction, InputSnapshot, Renderer};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Barista Simulator".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            // A clamped 250 ms frame yields 15 ticks at 60 TPS.
            max_ticks_per_frame: 16,
            metrics_log_interval: Duration::from_secs(5),
            max_render_fps: Some(60),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("renderer failed: {0}")]
    Render(#[source] PixelsError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Runs the window loop until the window closes, Escape is pressed, or no
/// scene remains. The initial scene is built before the window opens so its
/// errors surface immediately.
pub fn run_app(
    config: LoopConfig,
    assets: AssetRegistry,
    mut audio_backend: Box<dyn AudioBackend>,
    initial_scene: SceneFactory,
) -> Result<(), AppError> {
    let mut audio = AudioBus::default();
    let mut scenes = SceneMachine::new();
    scenes.request(SceneCommand::SwitchTo(initial_scene));
    scenes.apply_pending(&mut SceneContext::new(&assets, &mut audio))?;

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(
        Arc::clone(&window),
        config.window_width,
        config.window_height,
    )
    .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(5));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, Instant::now());
    let mut last_applied_title: Option<String> = None;
    let mut fatal_error: Option<AppError> = None;
    let fatal_slot = &mut fatal_error;

    let run_result = event_loop.run(move |event, window_target| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => {
                input_collector.mark_quit_requested();
                info!(reason = "window_close", "shutdown_requested");
            }
            WindowEvent::Resized(new_size) => {
                if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                    warn!(error = %error, "renderer_resize_failed");
                    *fatal_slot = Some(AppError::Render(error));
                    window_target.exit();
                }
            }
            WindowEvent::Focused(false) => input_collector.release_all(),
            WindowEvent::KeyboardInput { event, .. } => {
                input_collector.handle_keyboard_input(&event);
            }
            WindowEvent::RedrawRequested => {
                if input_collector.quit_requested() {
                    window_target.exit();
                    return;
                }

                let now = Instant::now();
                let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                last_frame_instant = now;
                accumulator =
                    accumulator.saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));

                let input_snapshot = input_collector.snapshot_for_frame();
                let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                {
                    let mut ctx = SceneContext::new(&assets, &mut audio);
                    if let Err(error) = scenes.run_frame(
                        &input_snapshot,
                        step_plan.ticks_to_run,
                        fixed_dt_seconds,
                        &mut ctx,
                    ) {
                        error!(error = %error, "scene_factory_failed");
                        *fatal_slot = Some(AppError::Scene(error));
                        window_target.exit();
                        return;
                    }
                }
                audio.drain_into(audio_backend.as_mut(), &assets);
                if !scenes.has_active() {
                    info!(reason = "no_active_scene", "shutdown_requested");
                    window_target.exit();
                    return;
                }
                accumulator = step_plan.remaining_accumulator;
                metrics_accumulator.record_ticks(step_plan.ticks_to_run);

                if step_plan.dropped_backlog > Duration::ZERO {
                    warn!(
                        dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                        max_ticks_per_frame, "sim_clamp_triggered"
                    );
                }

                let elapsed_since_last_present =
                    Instant::now().saturating_duration_since(last_present_instant);
                let cap_sleep = compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                if cap_sleep > Duration::ZERO {
                    thread::sleep(cap_sleep);
                }

                if let Err(error) = renderer.render(&scenes, &assets) {
                    warn!(error = %error, "renderer_draw_failed");
                    *fatal_slot = Some(AppError::Render(error));
                    window_target.exit();
                    return;
                }
                last_present_instant = Instant::now();

                let next_title = scenes.debug_title_active();
                if next_title != last_applied_title {
                    match &next_title {
                        Some(title) => window.set_title(title),
                        None => window.set_title(&config.window_title),
                    }
                    last_applied_title = next_title;
                }

                metrics_accumulator.record_frame(raw_frame_dt);
                if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                    info!(
                        fps = snapshot.fps,
                        tps = snapshot.tps,
                        frame_time_ms = snapshot.frame_time_ms,
                        scene = scenes.active_name().unwrap_or("none"),
                        "loop_metrics"
                    );
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            window.request_redraw();
        }
        Event::LoopExiting => {
            scenes.shutdown(&mut SceneContext::new(&assets, &mut audio));
            audio.drain_into(audio_backend.as_mut(), &assets);
            info!("shutdown");
        }
        _ => {}
    });

    run_result.map_err(AppError::EventLoopRun)?;
    match fatal_error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// Accumulates keyboard state between frames. Pressed edges and typed text
/// are handed out once by [`InputCollector::snapshot_for_frame`].
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    down: ActionStates,
    pressed: ActionStates,
    text: Vec<TextInput>,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        if let Some(action) = action_for_key(key_event.physical_key) {
            self.set_action_state(action, is_pressed);
        }
        if is_pressed {
            self.collect_text(key_event.physical_key, key_event.text.as_deref());
        }
    }

    fn set_action_state(&mut self, action: InputAction, is_pressed: bool) {
        if is_pressed && !self.down.is_down(action) {
            self.pressed.set(action, true);
            if action == InputAction::Quit {
                info!(reason = "escape_key", "shutdown_requested");
                self.mark_quit_requested();
            }
        }
        self.down.set(action, is_pressed);
    }

    fn collect_text(&mut self, key: PhysicalKey, text: Option<&str>) {
        if key == PhysicalKey::Code(KeyCode::Backspace) {
            self.text.push(TextInput::Backspace);
            return;
        }
        if let Some(text) = text {
            self.text
                .extend(text.chars().filter_map(TextInput::printable));
        }
    }

    fn release_all(&mut self) {
        self.down = ActionStates::default();
    }

    fn snapshot_for_frame(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.down,
            self.pressed,
            std::mem::take(&mut self.text),
        );
        self.pressed = ActionStates::default();
        snapshot
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let action = match code {
        KeyCode::KeyW | KeyCode::ArrowUp => InputAction::MoveUp,
        KeyCode::KeyS | KeyCode::ArrowDown => InputAction::MoveDown,
        KeyCode::KeyA | KeyCode::ArrowLeft => InputAction::MoveLeft,
        KeyCode::KeyD | KeyCode::ArrowRight => InputAction::MoveRight,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => InputAction::Sprint,
        KeyCode::KeyE => InputAction::Interact,
        KeyCode::Enter | KeyCode::NumpadEnter => InputAction::Confirm,
        KeyCode::Space => InputAction::Continue,
        KeyCode::Digit1 | KeyCode::Numpad1 => InputAction::Option1,
        KeyCode::Digit2 | KeyCode::Numpad2 => InputAction::Option2,
        KeyCode::Digit3 | KeyCode::Numpad3 => InputAction::Option3,
        KeyCode::Digit4 | KeyCode::Numpad4 => InputAction::Option4,
        KeyCode::Digit5 | KeyCode::Numpad5 => InputAction::Option5,
        KeyCode::Digit6 | KeyCode::Numpad6 => InputAction::Option6,
        KeyCode::Digit7 | KeyCode::Numpad7 => InputAction::Option7,
        KeyCode::Digit8 | KeyCode::Numpad8 => InputAction::Option8,
        KeyCode::Digit9 | KeyCode::Numpad9 => InputAction::Option9,
        KeyCode::Escape => InputAction::Quit,
        _ => return None,
    };
    Some(action)
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}
