/// Uniform random samples for spawn positions and particle velocities.
///
/// Everything random in the simulation goes through this trait so tests can
/// hand in a seeded generator.
pub trait RandomSource {
    /// Sample uniformly from `[low, high)`.
    fn range(&mut self, low: f32, high: f32) -> f32;
}

impl RandomSource for fastrand::Rng {
    fn range(&mut self, low: f32, high: f32) -> f32 {
        low + self.f32() * (high - low)
    }
}
