use crossterm::event::Event;
use std::io::Write;

pub mod fireworks;

/// Something the main loop can tick, draw and feed input to.
pub trait Effect {
    /// Advance by one fixed timestep.
    fn update(&mut self, dt: f32);
    fn render<W: Write>(&mut self, out: &mut W) -> std::io::Result<()>;
    /// Terminal size changed, in half-block pixels.
    fn resize(&mut self, width: usize, height: usize);
    fn handle_event(&mut self, _event: &Event) {}
}
