use std::process::ExitCode;

use engine::{run_app, AudioBackend, RodioAudioBackend, TracingAudioBackend};
use tracing::{error, info, warn};

use super::bootstrap::{build_app, AppWiring};
use super::flow;

pub(crate) fn run() -> ExitCode {
    match build_app() {
        Ok(app) => run_wired(app),
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}

fn run_wired(app: AppWiring) -> ExitCode {
    let initial_scene = flow::initial_scene(app.cafe_config);
    if let Err(err) = run_app(
        app.loop_config,
        app.assets,
        audio_backend(),
        initial_scene,
    ) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Speakers when an output device opens, otherwise cues are only logged.
fn audio_backend() -> Box<dyn AudioBackend> {
    match RodioAudioBackend::try_default() {
        Ok(backend) => {
            info!("audio_output_ready");
            Box::new(backend)
        }
        Err(err) => {
            warn!(error = %err, "audio_output_unavailable");
            Box::new(TracingAudioBackend::default())
        }
    }
}
