use engine::{Scene, SceneCommand, SceneContext, SceneError, SceneFactory};

use super::cafe::CafeScene;
use super::config::CafeConfig;
use super::report::{OrderReport, ReportScene};

/// Builds the first scene of a run.
pub(crate) fn initial_scene(config: CafeConfig) -> SceneFactory {
    Box::new(
        move |ctx: &mut SceneContext<'_>| -> Result<Box<dyn Scene>, SceneError> {
            Ok(Box::new(CafeScene::new(ctx, config)?))
        },
    )
}

pub(crate) fn show_report(report: OrderReport, config: CafeConfig) -> SceneCommand {
    SceneCommand::switch_to(move |ctx| {
        Ok(Box::new(ReportScene::new(ctx, report, config)?) as Box<dyn Scene>)
    })
}

/// A fresh cafe with the same tuning.
pub(crate) fn restart_simulation(config: CafeConfig) -> SceneCommand {
    SceneCommand::SwitchTo(initial_scene(config))
}

#[cfg(test)]
mod tests {
    use engine::{AudioBus, SceneMachine, SceneTransition};

    use super::*;
    use crate::app::assets::test_support::test_assets;

    #[test]
    fn report_then_restart_swaps_scenes_through_machine() {
        let assets = test_assets();
        let mut audio = AudioBus::default();
        let mut ctx = SceneContext::new(&assets, &mut audio);
        let mut machine = SceneMachine::new();

        machine.request(SceneCommand::SwitchTo(initial_scene(CafeConfig::default())));
        let transition = machine.apply_pending(&mut ctx).expect("cafe");
        assert_eq!(
            transition,
            SceneTransition::Switched {
                from: None,
                to: "cafe"
            }
        );

        let report = OrderReport {
            elapsed_seconds: 1.0,
            path_distance: 0.0,
            steps: 0,
            complete: false,
            missing_fields: vec!["drink".to_string()],
            tip: String::new(),
        };
        machine.request(show_report(report, CafeConfig::default()));
        machine.apply_pending(&mut ctx).expect("report");
        assert_eq!(machine.active_name(), Some("report"));

        machine.request(restart_simulation(CafeConfig::default()));
        machine.apply_pending(&mut ctx).expect("restart");
        assert_eq!(machine.active_name(), Some("cafe"));
    }

    #[test]
    fn missing_assets_fail_scene_construction() {
        let assets = engine::AssetRegistry::default();
        let mut audio = AudioBus::default();
        let mut ctx = SceneContext::new(&assets, &mut audio);
        let mut machine = SceneMachine::new();

        machine.request(SceneCommand::SwitchTo(initial_scene(CafeConfig::default())));
        assert!(machine.apply_pending(&mut ctx).is_err());
        assert!(!machine.has_active());
    }
}
