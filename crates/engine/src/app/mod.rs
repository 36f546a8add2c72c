mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputAction, TextInput};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{Canvas, Renderer};
pub use scene::{
    InputSnapshot, Scene, SceneCommand, SceneContext, SceneError, SceneFactory, SceneMachine,
    SceneTransition,
};
