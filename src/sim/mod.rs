//! Particle firework simulation.
//!
//! [`AnimationSystem`] owns the [`Firework`]s in flight, each of which owns
//! its [`Particle`]s. Nothing here touches the terminal: drawing goes
//! through [`Canvas`](crate::canvas::Canvas) and randomness through
//! [`RandomSource`].

pub mod firework;
pub mod particle;
pub mod rng;
pub mod system;

pub use firework::Firework;
pub use particle::{Particle, ParticleKind};
pub use rng::RandomSource;
pub use system::AnimationSystem;
