use engine::{TextureHandle, Vec2};
use rand::rngs::StdRng;

use super::motion::{Body, Jitter, PathFollower};
use crate::app::config::CustomerConfig;

pub(crate) const CUSTOMER_HALF_EXTENTS: Vec2 = Vec2::new(16.0, 32.0);

/// A queueing customer: walks its path and fidgets on its own clock.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Customer {
    pub(crate) body: Body,
    path: PathFollower,
    jitter: Jitter,
}

impl Customer {
    pub(crate) fn new(
        start: Vec2,
        waypoints: Vec<Vec2>,
        sprite: TextureHandle,
        tuning: &CustomerConfig,
        rng: &mut StdRng,
    ) -> Self {
        Self {
            body: Body::new(start, CUSTOMER_HALF_EXTENTS, sprite),
            path: PathFollower::new(waypoints, tuning.speed),
            jitter: Jitter::new(rng, tuning.jitter_min_seconds, tuning.jitter_max_seconds),
        }
    }

    pub(crate) fn has_arrived(&self) -> bool {
        self.path.is_finished()
    }

    pub(crate) fn update(&mut self, dt: f32, rng: &mut StdRng) {
        self.path.advance(&mut self.body.position, dt);
        self.jitter.update(dt, &mut self.body.position, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{AssetRegistry, Texture};
    use rand::SeedableRng;

    #[test]
    fn customer_reaches_queue_slot_despite_jitter() {
        let mut rng = StdRng::seed_from_u64(3);
        let sprite =
            AssetRegistry::default().insert_texture("customer", Texture::solid(1, 1, [0; 4]));
        let slot = Vec2::new(720.0, 420.0);
        let mut customer = Customer::new(
            Vec2::new(1100.0, 710.0),
            vec![Vec2::new(1000.0, 600.0), slot],
            sprite,
            &CustomerConfig::default(),
            &mut rng,
        );

        for _ in 0..(60 * 30) {
            customer.update(1.0 / 60.0, &mut rng);
        }

        assert!(customer.has_arrived());
        // Jitter keeps nudging after arrival, a few pixels at most per nudge.
        assert!(customer.body.position.distance(slot) < 40.0);
    }
}
