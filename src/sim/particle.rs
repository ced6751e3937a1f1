use glam::Vec2;

use super::rng::RandomSource;
use crate::canvas::Canvas;

pub const INITIAL_LIFETIME: i32 = 255;
pub const PARTICLE_DIAMETER: f32 = 5.0;

const LAUNCH_DECAY: i32 = 4;
const BURST_DECAY: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    /// The rising shell, before detonation
    Launch,
    /// Debris thrown out at detonation
    Burst,
}

impl ParticleKind {
    fn decay(self) -> i32 {
        match self {
            ParticleKind::Launch => LAUNCH_DECAY,
            ParticleKind::Burst => BURST_DECAY,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    acceleration: Vec2,
    lifetime: i32,
    kind: ParticleKind,
}

impl Particle {
    /// Launch particles shoot straight up; burst particles scatter in any
    /// direction.
    pub fn new(position: Vec2, kind: ParticleKind, rng: &mut impl RandomSource) -> Self {
        let velocity = match kind {
            ParticleKind::Launch => Vec2::new(0.0, rng.range(-12.0, -8.0)),
            ParticleKind::Burst => Vec2::new(rng.range(-3.0, 3.0), rng.range(-3.0, 3.0)),
        };

        Self {
            position,
            velocity,
            acceleration: Vec2::ZERO,
            lifetime: INITIAL_LIFETIME,
            kind,
        }
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// One integration step. Forces only last for the step they were
    /// applied in.
    pub fn step(&mut self) {
        self.velocity += self.acceleration;
        self.position += self.velocity;
        self.acceleration = Vec2::ZERO;
        self.lifetime -= self.kind.decay();
    }

    pub fn render(&self, canvas: &mut impl Canvas) {
        canvas.fill_circle(self.position, PARTICLE_DIAMETER, self.lifetime);
    }

    pub fn is_done(&self) -> bool {
        self.lifetime < 0
    }

    pub fn lifetime(&self) -> i32 {
        self.lifetime
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn is_launch(&self) -> bool {
        self.kind == ParticleKind::Launch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::tests::RecordingCanvas;

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(0xF1_2E)
    }

    #[test]
    fn test_launch_velocity_points_up() {
        let mut rng = rng();
        for _ in 0..500 {
            let p = Particle::new(Vec2::new(10.0, 480.0), ParticleKind::Launch, &mut rng);
            assert_eq!(p.velocity.x, 0.0);
            assert!(p.velocity.y >= -12.0 && p.velocity.y < -8.0);
            assert!(p.is_launch());
        }
    }

    #[test]
    fn test_burst_velocity_is_symmetric_range() {
        let mut rng = rng();
        for _ in 0..500 {
            let p = Particle::new(Vec2::ZERO, ParticleKind::Burst, &mut rng);
            assert!(p.velocity.x >= -3.0 && p.velocity.x < 3.0);
            assert!(p.velocity.y >= -3.0 && p.velocity.y < 3.0);
            assert!(!p.is_launch());
        }
    }

    #[test]
    fn test_lifetime_decays_by_kind() {
        let mut rng = rng();
        let mut launch = Particle::new(Vec2::ZERO, ParticleKind::Launch, &mut rng);
        let mut burst = Particle::new(Vec2::ZERO, ParticleKind::Burst, &mut rng);

        for _ in 0..200 {
            let (l, b) = (launch.lifetime(), burst.lifetime());
            launch.step();
            burst.step();
            assert_eq!(launch.lifetime(), l - 4);
            assert_eq!(burst.lifetime(), b - 2);
        }
    }

    #[test]
    fn test_step_integrates_and_clears_acceleration() {
        let mut rng = rng();
        let mut p = Particle::new(Vec2::new(100.0, 100.0), ParticleKind::Burst, &mut rng);
        p.velocity = Vec2::new(1.0, -2.0);

        p.apply_force(Vec2::new(0.0, 0.1));
        p.apply_force(Vec2::new(0.5, 0.0));
        p.step();
        assert!(p.velocity.abs_diff_eq(Vec2::new(1.5, -1.9), 1e-5));
        assert!(p.position.abs_diff_eq(Vec2::new(101.5, 98.1), 1e-4));

        // No force this time: velocity must be unchanged.
        let before = p.velocity;
        p.step();
        assert_eq!(p.velocity, before);
    }

    #[test]
    fn test_done_only_below_zero() {
        let mut rng = rng();
        let mut p = Particle::new(Vec2::ZERO, ParticleKind::Burst, &mut rng);
        for _ in 0..127 {
            p.step();
        }
        assert_eq!(p.lifetime(), 1);
        assert!(!p.is_done());
        p.step();
        assert_eq!(p.lifetime(), -1);
        assert!(p.is_done());
    }

    #[test]
    fn test_render_uses_lifetime_as_alpha() {
        let mut rng = rng();
        let mut p = Particle::new(Vec2::new(3.0, 4.0), ParticleKind::Launch, &mut rng);
        p.step();
        let mut canvas = RecordingCanvas::default();
        p.render(&mut canvas);
        assert_eq!(canvas.circles.len(), 1);
        let (center, diameter, alpha) = canvas.circles[0];
        assert_eq!(center, p.position);
        assert_eq!(diameter, 5.0);
        assert_eq!(alpha, 251);
    }
}
