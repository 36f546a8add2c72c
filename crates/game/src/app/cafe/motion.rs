use engine::{Rect, TextureHandle, Vec2};
use rand::rngs::StdRng;
use rand::Rng;

/// A follower is at a waypoint once closer than this.
pub(crate) const ARRIVAL_RADIUS: f32 = 4.0;
pub(crate) const SWAY_AMPLITUDE: f32 = 4.0;
pub(crate) const SWAY_SPEED: f32 = 2.0;
const JITTER_X: f32 = 2.0;
const JITTER_Y: f32 = 1.0;

/// Placement shared by every actor. Bounds are derived on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Body {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) half_extents: Vec2,
    pub(crate) sprite: TextureHandle,
}

impl Body {
    pub(crate) fn new(position: Vec2, half_extents: Vec2, sprite: TextureHandle) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            half_extents,
            sprite,
        }
    }

    pub(crate) fn bounds(&self) -> Rect {
        Rect::from_center(self.position, self.half_extents)
    }

    /// Euler step. Returns the displacement applied.
    pub(crate) fn integrate(&mut self, dt: f32) -> Vec2 {
        let displacement = self.velocity * dt;
        self.position += displacement;
        displacement
    }
}

/// Walks a position through waypoints in order at a fixed speed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PathFollower {
    waypoints: Vec<Vec2>,
    current: usize,
    speed: f32,
}

impl PathFollower {
    pub(crate) fn new(waypoints: Vec<Vec2>, speed: f32) -> Self {
        Self {
            waypoints,
            current: 0,
            speed,
        }
    }

    #[cfg(test)]
    pub(crate) fn current_index(&self) -> usize {
        self.current
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.current >= self.waypoints.len()
    }

    #[cfg(test)]
    pub(crate) fn reset(&mut self) {
        self.current = 0;
    }

    /// Moves `position` toward the current waypoint, or advances to the next
    /// one when inside the arrival radius. Never overshoots a waypoint.
    pub(crate) fn advance(&mut self, position: &mut Vec2, dt: f32) {
        let Some(target) = self.waypoints.get(self.current).copied() else {
            return;
        };
        let to_target = target - *position;
        let distance = to_target.length();
        if distance < ARRIVAL_RADIUS {
            self.current = (self.current + 1).min(self.waypoints.len());
            return;
        }

        let step = self.speed * dt;
        if step >= distance {
            *position = target;
        } else {
            *position += to_target.normalize() * step;
        }
    }
}

/// Vertical sinusoidal bob around a fixed base position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct IdleSway {
    base: Vec2,
    amplitude: f32,
    speed: f32,
    time: f32,
}

impl IdleSway {
    pub(crate) fn new(base: Vec2) -> Self {
        Self {
            base,
            amplitude: SWAY_AMPLITUDE,
            speed: SWAY_SPEED,
            time: 0.0,
        }
    }

    pub(crate) fn update(&mut self, dt: f32) -> Vec2 {
        self.time += dt;
        Vec2::new(
            self.base.x,
            self.base.y + (self.time * self.speed).sin() * self.amplitude,
        )
    }
}

/// Small random nudges at random intervals. Independent of path progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Jitter {
    timer: f32,
    min_interval: f32,
    max_interval: f32,
}

impl Jitter {
    pub(crate) fn new(rng: &mut StdRng, min_interval: f32, max_interval: f32) -> Self {
        let mut jitter = Self {
            timer: 0.0,
            min_interval,
            max_interval,
        };
        jitter.rearm(rng);
        jitter
    }

    #[cfg(test)]
    pub(crate) fn timer(&self) -> f32 {
        self.timer
    }

    /// Returns true when a nudge was applied this tick.
    pub(crate) fn update(&mut self, dt: f32, position: &mut Vec2, rng: &mut StdRng) -> bool {
        self.timer -= dt;
        if self.timer > 0.0 {
            return false;
        }
        position.x += rng.gen_range(-JITTER_X..=JITTER_X);
        position.y += rng.gen_range(-JITTER_Y..=JITTER_Y);
        self.rearm(rng);
        true
    }

    fn rearm(&mut self, rng: &mut StdRng) {
        self.timer = if self.max_interval > self.min_interval {
            rng.gen_range(self.min_interval..=self.max_interval)
        } else {
            self.min_interval
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{AssetRegistry, Texture};
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn sprite() -> TextureHandle {
        AssetRegistry::default().insert_texture("pixel", Texture::solid(1, 1, [0, 0, 0, 255]))
    }

    #[test]
    fn bounds_follow_position() {
        let mut body = Body::new(Vec2::new(100.0, 50.0), Vec2::new(10.0, 20.0), sprite());
        assert_eq!(body.bounds(), Rect::new(90.0, 30.0, 20.0, 40.0));

        body.velocity = Vec2::new(60.0, 0.0);
        let displacement = body.integrate(0.5);
        assert_eq!(displacement, Vec2::new(30.0, 0.0));
        assert_eq!(body.bounds().left, 120.0);
    }

    #[test]
    fn follower_finishes_within_arrival_radius_of_last_waypoint() {
        let last = Vec2::new(720.0, 420.0);
        let mut follower = PathFollower::new(vec![Vec2::new(1000.0, 600.0), last], 80.0);
        let mut position = Vec2::new(1100.0, 710.0);

        let mut ticks = 0;
        while !follower.is_finished() {
            follower.advance(&mut position, DT);
            ticks += 1;
            assert!(ticks < 60 * 60, "follower never finished");
        }

        assert!(position.distance(last) < ARRIVAL_RADIUS);
        assert_eq!(follower.current_index(), 2);
    }

    #[test]
    fn finished_follower_is_inert_and_index_stays_clamped() {
        let mut follower = PathFollower::new(vec![Vec2::new(0.0, 0.0)], 80.0);
        let mut position = Vec2::new(1.0, 0.0);
        follower.advance(&mut position, DT);
        assert!(follower.is_finished());

        for _ in 0..10 {
            follower.advance(&mut position, DT);
        }
        assert_eq!(follower.current_index(), 1);
        assert_eq!(position, Vec2::new(1.0, 0.0));

        follower.reset();
        assert_eq!(follower.current_index(), 0);
    }

    #[test]
    fn follower_moves_at_fixed_speed() {
        let mut follower = PathFollower::new(vec![Vec2::new(100.0, 0.0)], 60.0);
        let mut position = Vec2::ZERO;
        follower.advance(&mut position, 0.5);
        assert!((position.x - 30.0).abs() < 0.0001);
        assert_eq!(position.y, 0.0);
    }

    #[test]
    fn fast_follower_lands_on_waypoint_instead_of_overshooting() {
        let mut follower = PathFollower::new(vec![Vec2::new(10.0, 0.0)], 10_000.0);
        let mut position = Vec2::ZERO;
        follower.advance(&mut position, DT);
        assert_eq!(position, Vec2::new(10.0, 0.0));
        follower.advance(&mut position, DT);
        assert!(follower.is_finished());
    }

    #[test]
    fn empty_path_is_finished() {
        let mut follower = PathFollower::new(Vec::new(), 80.0);
        let mut position = Vec2::new(3.0, 4.0);
        follower.advance(&mut position, DT);
        assert!(follower.is_finished());
        assert_eq!(position, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn sway_stays_within_amplitude_of_base() {
        let base = Vec2::new(640.0, 260.0);
        let mut sway = IdleSway::new(base);
        for _ in 0..600 {
            let position = sway.update(DT);
            assert_eq!(position.x, base.x);
            assert!((position.y - base.y).abs() <= SWAY_AMPLITUDE + 0.0001);
        }
        let quarter_period = std::f32::consts::FRAC_PI_2 / SWAY_SPEED;
        let mut sway = IdleSway::new(base);
        let peak = sway.update(quarter_period);
        assert!((peak.y - (base.y + SWAY_AMPLITUDE)).abs() < 0.001);
    }

    #[test]
    fn jitter_rearms_within_range_and_nudges_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut jitter = Jitter::new(&mut rng, 2.0, 4.0);
        assert!((2.0..=4.0).contains(&jitter.timer()));

        let origin = Vec2::new(500.0, 500.0);
        let mut position = origin;
        let mut nudges = 0;
        for _ in 0..(60 * 20) {
            if jitter.update(DT, &mut position, &mut rng) {
                nudges += 1;
                assert!((2.0..=4.0).contains(&jitter.timer()));
            }
        }

        assert!((4..=10).contains(&nudges), "nudges: {nudges}");
        assert!((position.x - origin.x).abs() <= JITTER_X * nudges as f32);
        assert!((position.y - origin.y).abs() <= JITTER_Y * nudges as f32);
    }

    #[test]
    fn same_seed_gives_same_jitter() {
        let run = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut jitter = Jitter::new(&mut rng, 2.0, 4.0);
            let mut position = Vec2::ZERO;
            for _ in 0..600 {
                jitter.update(DT, &mut position, &mut rng);
            }
            position
        };
        assert_eq!(run(5), run(5));
    }
}
