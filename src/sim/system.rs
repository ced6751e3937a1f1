use glam::Vec2;
use tracing::debug;

use super::firework::Firework;
use super::rng::RandomSource;
use crate::canvas::Canvas;

pub const CANVAS_WIDTH: f32 = 640.0;
pub const CANVAS_HEIGHT: f32 = 480.0;
pub const GRAVITY: Vec2 = Vec2::new(0.0, 0.1);

/// Owns every firework in flight and advances them once per frame.
pub struct AnimationSystem<R: RandomSource = fastrand::Rng> {
    fireworks: Vec<Firework>,
    gravity: Vec2,
    width: f32,
    height: f32,
    rng: R,
}

impl AnimationSystem<fastrand::Rng> {
    /// System on the default 640x480 canvas. `seed` pins the random source.
    pub fn with_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self::new(CANVAS_WIDTH, CANVAS_HEIGHT, rng)
    }
}

impl<R: RandomSource> AnimationSystem<R> {
    pub fn new(width: f32, height: f32, rng: R) -> Self {
        Self {
            fireworks: Vec::new(),
            gravity: GRAVITY,
            width,
            height,
            rng,
        }
    }

    /// Launch one new firework from a random point along the bottom edge.
    pub fn on_trigger_signal(&mut self) {
        let x = self.rng.range(0.0, self.width);
        self.fireworks.push(Firework::new(x, self.height, &mut self.rng));
        debug!(x, active = self.fireworks.len(), "firework launched");
    }

    /// Drop everything in flight, bursts included.
    pub fn on_reset_signal(&mut self) {
        if !self.fireworks.is_empty() {
            debug!(cleared = self.fireworks.len(), "fireworks reset");
        }
        self.fireworks.clear();
    }

    /// Step, draw and cull every firework.
    ///
    /// Walks the list back to front so removing the current index never
    /// skips the next firework.
    pub fn advance_frame(&mut self, canvas: &mut impl Canvas) {
        for i in (0..self.fireworks.len()).rev() {
            let firework = &mut self.fireworks[i];
            firework.step(self.gravity, &mut self.rng);
            firework.render(canvas);
            if firework.is_done() {
                self.fireworks.remove(i);
            }
        }
    }

    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn firework_count(&self) -> usize {
        self.fireworks.len()
    }

    /// Live particles across all fireworks, one per unexploded launch.
    pub fn particle_count(&self) -> usize {
        self.fireworks
            .iter()
            .map(|fw| if fw.exploded() { fw.burst_particles().len() } else { 1 })
            .sum()
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}
