use super::Effect;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEventKind};
use glam::Vec2;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

use crate::audio::{self, AudioPlayer};
use crate::camera::{HandPose, SyntheticCamera, VideoFrameSource};
use crate::canvas::{Overlay, PixelCanvas, Rgb};
use crate::classifier::{Label, LatestLabel};
use crate::config::Settings;
use crate::sim::AnimationSystem;
use crate::sim::system::{CANVAS_HEIGHT, CANVAS_WIDTH};

const INSTRUCTIONS: [&str; 2] = [
    "clap your hand to let firework appear",
    "put your hand out of camera to stop firework",
];
const BUTTON_IDLE: &str = "[ Start Music ]";
const BUTTON_PLAYING: &str = "[ Music On ]";
const TEXT_COLOR: Rgb = (255, 255, 255);

// How much of the camera image shows through the background
const VIDEO_LEVEL: f32 = 0.45;

/// Fireworks over a mirrored camera image, launched and cleared by the
/// classifier's latest label.
pub struct FireworksEffect {
    width: usize,
    height: usize,
    canvas: PixelCanvas,
    system: AnimationSystem,
    label: LatestLabel,
    status: String,
    camera: Arc<SyntheticCamera>,
    player: Box<dyn AudioPlayer>,
    bg_color: Rgb,
    show_video: bool,
}

impl FireworksEffect {
    pub fn new(
        width: usize,
        height: usize,
        settings: &Settings,
        camera: Arc<SyntheticCamera>,
        label: LatestLabel,
        player: Box<dyn AudioPlayer>,
    ) -> Self {
        Self {
            width,
            height,
            canvas: PixelCanvas::new(width, height, Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT)),
            system: AnimationSystem::with_seed(settings.seed),
            label,
            status: String::new(),
            camera,
            player,
            bg_color: settings.bg_color,
            show_video: settings.show_video,
        }
    }

    /// React to whatever the classifier said last. A held clap keeps
    /// launching one firework per frame.
    fn apply_label(&mut self) {
        match self.label.latest() {
            Some(Label::ClapHands) => {
                self.status = "Congratulations!".to_string();
                self.system.on_trigger_signal();
            }
            Some(Label::Still) => {
                self.status = "Still".to_string();
                if self.system.firework_count() > 0 {
                    info!(
                        fireworks = self.system.firework_count(),
                        particles = self.system.particle_count(),
                        "clearing fireworks"
                    );
                }
                self.system.on_reset_signal();
            }
            Some(Label::Other(_)) | None => {}
        }
    }

    fn draw_video(&mut self) {
        let (frame_w, frame_h) = self.camera.size();
        let frame = self.camera.frame();
        let bg = self.bg_color;

        for y in 0..self.height {
            for x in 0..self.width {
                let p = self.canvas.to_logical(x, y);
                let fx = ((p.x / CANVAS_WIDTH) * frame_w as f32) as u32;
                let fy = ((p.y / CANVAS_HEIGHT) * frame_h as f32) as u32;
                // Mirror horizontally so it behaves like a mirror for the user
                let c = frame.pixel(frame_w - 1 - fx.min(frame_w - 1), fy);

                self.canvas.set_pixel(
                    x,
                    y,
                    (
                        (bg.0 as f32 * (1.0 - VIDEO_LEVEL) + c.0 as f32 * VIDEO_LEVEL) as u8,
                        (bg.1 as f32 * (1.0 - VIDEO_LEVEL) + c.1 as f32 * VIDEO_LEVEL) as u8,
                        (bg.2 as f32 * (1.0 - VIDEO_LEVEL) + c.2 as f32 * VIDEO_LEVEL) as u8,
                    ),
                );
            }
        }
    }

    fn rows(&self) -> usize {
        self.height.div_ceil(2)
    }

    fn button_text(&self) -> &'static str {
        if self.player.is_playing() { BUTTON_PLAYING } else { BUTTON_IDLE }
    }

    /// Terminal row and column range covered by the music button.
    fn button_span(&self) -> (usize, std::ops::Range<usize>) {
        let len = self.button_text().chars().count();
        let start = self.width.saturating_sub(len);
        (self.rows().saturating_sub(1), start..start + len)
    }

    fn overlays(&self) -> Vec<Overlay> {
        let line = |row, col, s: &str| Overlay {
            row,
            col,
            text: s.to_string(),
            fg: TEXT_COLOR,
            bg: self.bg_color,
        };

        let mut overlays: Vec<Overlay> = INSTRUCTIONS
            .iter()
            .enumerate()
            .map(|(row, s)| line(row, 0, *s))
            .collect();

        let bottom = self.rows().saturating_sub(1);
        if !self.status.is_empty() {
            overlays.push(line(bottom, 0, &self.status));
        }
        let (row, cols) = self.button_span();
        overlays.push(line(row, cols.start, self.button_text()));
        overlays
    }

    fn play_music(&mut self) {
        let was_playing = self.player.is_playing();
        audio::play_music(self.player.as_mut());
        if !was_playing && !self.player.is_playing() {
            info!("start music pressed but no track is loaded");
        }
    }

    fn set_pose(&self, pose: HandPose) {
        if self.camera.pose() != pose {
            info!(?pose, "camera pose changed");
            self.camera.set_pose(pose);
        }
    }
}

impl Effect for FireworksEffect {
    fn update(&mut self, dt: f32) {
        self.camera.advance(dt);

        self.canvas.clear(self.bg_color);
        if self.show_video {
            self.draw_video();
        }

        self.apply_label();
        self.system.advance_frame(&mut self.canvas);
    }

    fn render<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        let overlays = self.overlays();
        self.canvas.present(out, &overlays)
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.canvas.resize(width, height);
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(KeyEvent {
                code: KeyCode::Char(c),
                kind: KeyEventKind::Press,
                ..
            }) => match c.to_ascii_lowercase() {
                'c' => self.set_pose(HandPose::Clapping),
                'h' => self.set_pose(HandPose::Raised),
                'o' | ' ' => self.set_pose(HandPose::Out),
                'm' => self.play_music(),
                _ => {}
            },
            Event::Mouse(mouse_event) => {
                if let MouseEventKind::Down(MouseButton::Left) = mouse_event.kind {
                    let (row, cols) = self.button_span();
                    if mouse_event.row as usize == row && cols.contains(&(mouse_event.column as usize)) {
                        self.play_music();
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crossterm::event::{KeyEventState, KeyModifiers, MouseEvent};
    use std::path::Path;

    #[derive(Default)]
    struct FakePlayer {
        loaded: bool,
        playing: bool,
    }

    impl AudioPlayer for FakePlayer {
        fn load_track(&mut self, _path: &Path) -> Result<()> {
            self.loaded = true;
            Ok(())
        }

        fn is_playing(&self) -> bool {
            self.playing
        }

        fn loop_playback(&mut self) {
            if self.loaded {
                self.playing = true;
            }
        }
    }

    fn effect_with(player: FakePlayer, show_video: bool) -> (FireworksEffect, LatestLabel) {
        let label = LatestLabel::new();
        let settings = Settings {
            seed: Some(21),
            show_video,
            ..Settings::default()
        };
        let effect = FireworksEffect::new(
            160,
            120,
            &settings,
            Arc::new(SyntheticCamera::new(21)),
            label.clone(),
            Box::new(player),
        );
        (effect, label)
    }

    fn effect() -> (FireworksEffect, LatestLabel) {
        effect_with(FakePlayer::default(), false)
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_no_label_yet_does_nothing() {
        let (mut fx, _) = effect();
        fx.update(1.0 / 60.0);
        assert_eq!(fx.system.firework_count(), 0);
        assert!(fx.status.is_empty());
    }

    #[test]
    fn test_held_clap_launches_every_frame() {
        let (mut fx, label) = effect();
        label.publish(Label::ClapHands);
        fx.update(1.0 / 60.0);
        fx.update(1.0 / 60.0);
        fx.update(1.0 / 60.0);
        assert_eq!(fx.system.firework_count(), 3);
        assert_eq!(fx.status, "Congratulations!");
    }

    #[test]
    fn test_still_clears_and_other_labels_are_ignored() {
        let (mut fx, label) = effect();
        label.publish(Label::ClapHands);
        fx.update(1.0 / 60.0);
        fx.update(1.0 / 60.0);

        label.publish(Label::from("hands"));
        fx.update(1.0 / 60.0);
        assert_eq!(fx.system.firework_count(), 2);
        assert_eq!(fx.status, "Congratulations!");

        label.publish(Label::Still);
        fx.update(1.0 / 60.0);
        assert_eq!(fx.system.firework_count(), 0);
        assert_eq!(fx.status, "Still");
    }

    #[test]
    fn test_keys_drive_the_camera() {
        let (mut fx, _) = effect();
        fx.handle_event(&key('c'));
        assert_eq!(fx.camera.pose(), HandPose::Clapping);
        fx.handle_event(&key('H'));
        assert_eq!(fx.camera.pose(), HandPose::Raised);
        fx.handle_event(&key(' '));
        assert_eq!(fx.camera.pose(), HandPose::Out);
    }

    #[test]
    fn test_music_needs_a_loaded_track() {
        let (mut fx, _) = effect();
        fx.handle_event(&key('m'));
        assert!(!fx.player.is_playing());

        let (mut fx, _) = effect_with(FakePlayer { loaded: true, playing: false }, false);
        assert_eq!(fx.button_text(), BUTTON_IDLE);
        fx.handle_event(&key('m'));
        assert!(fx.player.is_playing());
        assert_eq!(fx.button_text(), BUTTON_PLAYING);
    }

    #[test]
    fn test_clicking_the_button_starts_music() {
        let (mut fx, _) = effect_with(FakePlayer { loaded: true, playing: false }, false);
        let (row, cols) = fx.button_span();
        assert_eq!(row, 59);

        fx.handle_event(&click(0, row as u16));
        assert!(!fx.player.is_playing());

        fx.handle_event(&click(cols.start as u16 + 1, row as u16));
        assert!(fx.player.is_playing());
    }

    #[test]
    fn test_video_is_mirrored() {
        let (mut fx, _) = effect_with(FakePlayer::default(), true);
        fx.camera.set_pose(HandPose::Raised);
        fx.update(0.0);

        // The raised hand sits on the camera's right (x ~ 500), so it shows
        // up on the left of the screen. 4 logical units per pixel.
        let (r, _, b) = fx.canvas.pixel(140 / 4, 190 / 4);
        assert!(r > b, "hand missing from mirrored side");
        let (r, _, b) = fx.canvas.pixel(500 / 4, 190 / 4);
        assert!(r < b, "hand drawn unmirrored");
    }

    #[test]
    fn test_render_includes_overlays() {
        let (mut fx, label) = effect();
        label.publish(Label::Still);
        fx.update(1.0 / 60.0);

        let mut out = Vec::new();
        fx.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(INSTRUCTIONS[0]));
        assert!(text.contains(INSTRUCTIONS[1]));
        assert!(text.contains("Still"));
        assert!(text.contains(BUTTON_IDLE));
    }

    #[test]
    fn test_resize_keeps_fireworks_in_flight() {
        let (mut fx, label) = effect();
        label.publish(Label::ClapHands);
        fx.update(1.0 / 60.0);
        fx.resize(80, 40);
        assert_eq!(fx.system.firework_count(), 1);
        assert_eq!(fx.canvas.width(), 80);
        assert_eq!(fx.button_span().0, 19);
    }
}
