use engine::{InputAction, InputSnapshot, TextureHandle, Vec2};

use super::motion::Body;
use crate::app::config::PlayerConfig;

pub(crate) const STEP_INTERVAL_SECONDS: f32 = 0.35;
/// Timer value while standing still, so the first step lands shortly after
/// movement starts.
pub(crate) const STEP_PREARM_SECONDS: f32 = 0.3;
pub(crate) const PLAYER_HALF_EXTENTS: Vec2 = Vec2::new(24.0, 40.0);

/// Outcome of one movement tick, needed to undo it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlayerTick {
    pub(crate) previous_position: Vec2,
    pub(crate) moved: f32,
    pub(crate) stepped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Player {
    pub(crate) body: Body,
    tuning: PlayerConfig,
    distance_travelled: f32,
    steps: u32,
    step_timer: f32,
    last_tick: Option<(PlayerTick, f32)>,
}

impl Player {
    pub(crate) fn new(position: Vec2, sprite: TextureHandle, tuning: PlayerConfig) -> Self {
        Self {
            body: Body::new(position, PLAYER_HALF_EXTENTS, sprite),
            tuning,
            distance_travelled: 0.0,
            steps: 0,
            step_timer: STEP_PREARM_SECONDS,
            last_tick: None,
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.body.position
    }

    pub(crate) fn distance_travelled(&self) -> f32 {
        self.distance_travelled
    }

    pub(crate) fn steps(&self) -> u32 {
        self.steps
    }

    pub(crate) fn interaction_radius(&self) -> f32 {
        self.tuning.interaction_radius
    }

    pub(crate) fn velocity_for(&self, input: &InputSnapshot) -> Vec2 {
        velocity_from_input(input, &self.tuning)
    }

    /// Applies `velocity` for one tick and updates distance and step telemetry.
    pub(crate) fn step(&mut self, dt: f32, velocity: Vec2) -> PlayerTick {
        let previous_position = self.body.position;
        let previous_step_timer = self.step_timer;
        self.body.velocity = velocity;
        let moved = self.body.integrate(dt).length();
        self.distance_travelled += moved;

        let mut stepped = false;
        if moved > 0.0 {
            self.step_timer += dt;
            if self.step_timer >= STEP_INTERVAL_SECONDS {
                self.steps += 1;
                self.step_timer = 0.0;
                stepped = true;
            }
        } else {
            self.step_timer = STEP_PREARM_SECONDS;
        }

        let tick = PlayerTick {
            previous_position,
            moved,
            stepped,
        };
        self.last_tick = Some((tick, previous_step_timer));
        tick
    }

    /// Undoes the most recent tick: position, distance credit, and any step
    /// it registered.
    pub(crate) fn revert_position(&mut self, previous_position: Vec2) {
        self.body.position = previous_position;
        self.body.velocity = Vec2::ZERO;
        let Some((tick, previous_step_timer)) = self.last_tick.take() else {
            return;
        };
        self.distance_travelled = (self.distance_travelled - tick.moved).max(0.0);
        if tick.stepped {
            self.steps = self.steps.saturating_sub(1);
        }
        self.step_timer = previous_step_timer;
    }

}

/// Held directions as a unit vector times base speed, boosted while sprinting.
pub(crate) fn velocity_from_input(input: &InputSnapshot, tuning: &PlayerConfig) -> Vec2 {
    let mut direction = Vec2::ZERO;
    if input.is_down(InputAction::MoveUp) {
        direction.y -= 1.0;
    }
    if input.is_down(InputAction::MoveDown) {
        direction.y += 1.0;
    }
    if input.is_down(InputAction::MoveLeft) {
        direction.x -= 1.0;
    }
    if input.is_down(InputAction::MoveRight) {
        direction.x += 1.0;
    }
    if direction.is_zero() {
        return Vec2::ZERO;
    }

    let mut speed = tuning.base_speed;
    if input.is_down(InputAction::Sprint) {
        speed *= tuning.sprint_multiplier;
    }
    direction.normalize() * speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{AssetRegistry, Texture};

    const DT: f32 = 1.0 / 60.0;

    fn snapshot_from_actions(actions: &[InputAction]) -> InputSnapshot {
        let mut snapshot = InputSnapshot::empty();
        for action in actions {
            snapshot = snapshot.with_action_down(*action, true);
        }
        snapshot
    }

    fn test_player() -> Player {
        let sprite =
            AssetRegistry::default().insert_texture("player", Texture::solid(1, 1, [0, 0, 0, 255]));
        Player::new(Vec2::new(360.0, 540.0), sprite, PlayerConfig::default())
    }

    fn walk(player: &mut Player, actions: &[InputAction], ticks: u32) {
        let input = snapshot_from_actions(actions);
        for _ in 0..ticks {
            let velocity = player.velocity_for(&input);
            player.step(DT, velocity);
        }
    }

    #[test]
    fn velocity_magnitude_is_base_speed_for_any_direction_set() {
        let tuning = PlayerConfig::default();
        let direction_sets: &[&[InputAction]] = &[
            &[InputAction::MoveUp],
            &[InputAction::MoveRight],
            &[InputAction::MoveUp, InputAction::MoveLeft],
            &[InputAction::MoveDown, InputAction::MoveRight],
            &[
                InputAction::MoveUp,
                InputAction::MoveDown,
                InputAction::MoveRight,
            ],
        ];
        for actions in direction_sets {
            let velocity = velocity_from_input(&snapshot_from_actions(actions), &tuning);
            assert!(
                (velocity.length() - tuning.base_speed).abs() < 0.001,
                "{actions:?} gave {velocity:?}"
            );

            let mut sprinting = actions.to_vec();
            sprinting.push(InputAction::Sprint);
            let velocity = velocity_from_input(&snapshot_from_actions(&sprinting), &tuning);
            assert!(
                (velocity.length() - tuning.base_speed * tuning.sprint_multiplier).abs() < 0.001
            );
        }
    }

    #[test]
    fn no_direction_or_cancelling_directions_give_zero_velocity() {
        let tuning = PlayerConfig::default();
        assert_eq!(
            velocity_from_input(&InputSnapshot::empty(), &tuning),
            Vec2::ZERO
        );
        assert_eq!(
            velocity_from_input(&snapshot_from_actions(&[InputAction::Sprint]), &tuning),
            Vec2::ZERO
        );
        assert_eq!(
            velocity_from_input(
                &snapshot_from_actions(&[InputAction::MoveLeft, InputAction::MoveRight]),
                &tuning
            ),
            Vec2::ZERO
        );
    }

    #[test]
    fn distance_accumulates_displacement() {
        let mut player = test_player();
        walk(&mut player, &[InputAction::MoveRight], 60);

        assert!((player.distance_travelled() - 180.0).abs() < 0.01);
        assert!((player.position().x - 540.0).abs() < 0.01);
    }

    #[test]
    fn first_step_lands_after_prearm_then_every_interval() {
        let mut player = test_player();
        // 0.3 s pre-arm: a step lands on the third or fourth moving tick.
        walk(&mut player, &[InputAction::MoveRight], 2);
        assert_eq!(player.steps(), 0);
        walk(&mut player, &[InputAction::MoveRight], 2);
        assert_eq!(player.steps(), 1);

        // Then roughly one step per 21 ticks (0.35 s at 60 TPS).
        walk(&mut player, &[InputAction::MoveRight], 22);
        assert_eq!(player.steps(), 2);
    }

    #[test]
    fn standing_still_rearms_step_timer() {
        let mut player = test_player();
        walk(&mut player, &[InputAction::MoveRight], 10);
        let steps = player.steps();
        walk(&mut player, &[], 5);
        assert_eq!(player.steps(), steps);

        walk(&mut player, &[InputAction::MoveLeft], 4);
        assert_eq!(player.steps(), steps + 1);
    }

    #[test]
    fn revert_restores_exact_position_and_distance() {
        let mut player = test_player();
        walk(&mut player, &[InputAction::MoveDown], 7);
        let position_before = player.position();
        let distance_before = player.distance_travelled();

        let velocity = player.velocity_for(&snapshot_from_actions(&[InputAction::MoveDown]));
        let tick = player.step(DT, velocity);
        assert_ne!(player.position(), position_before);
        player.revert_position(tick.previous_position);

        assert_eq!(player.position(), position_before);
        assert!((player.distance_travelled() - distance_before).abs() < 0.001);
    }

    #[test]
    fn revert_retracts_step_registered_in_same_tick() {
        let mut player = test_player();
        let velocity = player.velocity_for(&snapshot_from_actions(&[InputAction::MoveRight]));
        let mut distance_before = 0.0;
        let mut tick = player.step(DT, velocity);
        while !tick.stepped {
            distance_before = player.distance_travelled();
            tick = player.step(DT, velocity);
        }
        assert_eq!(player.steps(), 1);

        player.revert_position(tick.previous_position);
        assert_eq!(player.steps(), 0);

        // Pushing into a wall never produces steps.
        for _ in 0..100 {
            let tick = player.step(DT, velocity);
            player.revert_position(tick.previous_position);
        }
        assert_eq!(player.steps(), 0);
        assert!((player.distance_travelled() - distance_before).abs() < 0.001);
    }
}
