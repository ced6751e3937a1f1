use glam::Vec2;

use super::particle::{Particle, ParticleKind};
use super::rng::RandomSource;
use crate::canvas::Canvas;

pub const BURST_SIZE: usize = 100;

/// A single shell: one launch particle that rises until it starts falling,
/// then a burst of debris.
///
/// Explosion is one-way. Once `exploded` is set the launch particle is no
/// longer stepped or drawn.
#[derive(Clone, Debug)]
pub struct Firework {
    launch: Particle,
    exploded: bool,
    burst: Vec<Particle>,
}

impl Firework {
    pub fn new(x: f32, y: f32, rng: &mut impl RandomSource) -> Self {
        Self {
            launch: Particle::new(Vec2::new(x, y), ParticleKind::Launch, rng),
            exploded: false,
            burst: Vec::new(),
        }
    }

    pub fn step(&mut self, gravity: Vec2, rng: &mut impl RandomSource) {
        if !self.exploded {
            self.launch.apply_force(gravity);
            self.launch.step();
            // Apex detection lags the true apex by up to one step.
            if self.launch.velocity.y >= 0.0 {
                self.explode(rng);
            }
        }

        // Debris created by an explosion this step moves on the same step.
        for particle in &mut self.burst {
            particle.apply_force(gravity);
            particle.step();
        }
        self.burst.retain(|p| !p.is_done());
    }

    fn explode(&mut self, rng: &mut impl RandomSource) {
        self.exploded = true;

        let origin = self.launch.position;
        self.burst.reserve(BURST_SIZE);
        for _ in 0..BURST_SIZE {
            self.burst.push(Particle::new(origin, ParticleKind::Burst, rng));
        }
    }

    pub fn render(&self, canvas: &mut impl Canvas) {
        if !self.exploded {
            self.launch.render(canvas);
        } else {
            for particle in &self.burst {
                particle.render(canvas);
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.exploded && self.burst.is_empty()
    }

    pub fn exploded(&self) -> bool {
        self.exploded
    }

    pub fn launch_particle(&self) -> &Particle {
        &self.launch
    }

    pub fn burst_particles(&self) -> &[Particle] {
        &self.burst
    }
}
