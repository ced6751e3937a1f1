//! Video frames for the classifier and the mirrored background.
//!
//! There is no real capture device here. [`SyntheticCamera`] paints a dim
//! noisy room and, depending on the current [`HandPose`], one or two hands.
//! The pose is driven from the keyboard.

use noise::{NoiseFn, Perlin};
use std::sync::Mutex;

use crate::canvas::Rgb;

pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 480;

const SKIN: Rgb = (224, 172, 140);

/// A continuously updated camera image.
pub trait VideoFrameSource: Send + Sync {
    fn size(&self) -> (u32, u32);

    /// Snapshot of the current frame.
    fn frame(&self) -> Box<dyn FrameView + '_>;
}

pub trait FrameView {
    /// Pixel at `(x, y)`; out-of-range coordinates are clamped to the edge.
    fn pixel(&self, x: u32, y: u32) -> Rgb;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HandPose {
    /// Nobody in frame
    #[default]
    Out,
    /// One hand held up at the side
    Raised,
    /// Both palms together in the middle of the frame
    Clapping,
}

#[derive(Clone, Copy, Debug)]
struct CameraState {
    time: f32,
    pose: HandPose,
}

/// Ellipse in frame coordinates.
#[derive(Clone, Copy, Debug)]
struct Hand {
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
}

impl Hand {
    fn contains(&self, x: f32, y: f32) -> Option<f32> {
        let nx = (x - self.cx) / self.rx;
        let ny = (y - self.cy) / self.ry;
        let d = nx * nx + ny * ny;
        (d <= 1.0).then_some(d)
    }
}

pub struct SyntheticCamera {
    width: u32,
    height: u32,
    /// Static room luminance, generated once
    room: Vec<u8>,
    state: Mutex<CameraState>,
}

impl SyntheticCamera {
    pub fn new(seed: u32) -> Self {
        let (width, height) = (FRAME_WIDTH, FRAME_HEIGHT);
        let perlin = Perlin::new(seed);
        let detail = Perlin::new(seed.wrapping_add(1));

        let mut room = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let (fx, fy) = (x as f64, y as f64);
                let base = perlin.get([fx * 0.006, fy * 0.006]);
                let grain = detail.get([fx * 0.05, fy * 0.05]);
                // Darker towards the floor
                let falloff = 1.0 - fy / height as f64 * 0.4;
                let v = (0.5 + base * 0.35 + grain * 0.08) * falloff;
                room.push((30.0 + v.clamp(0.0, 1.0) * 60.0) as u8);
            }
        }

        Self {
            width,
            height,
            room,
            state: Mutex::new(CameraState { time: 0.0, pose: HandPose::Out }),
        }
    }

    fn state(&self) -> CameraState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn advance(&self, dt: f32) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.time += dt;
        if state.time > 10000.0 {
            state.time -= 10000.0;
        }
    }

    pub fn set_pose(&self, pose: HandPose) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).pose = pose;
    }

    pub fn pose(&self) -> HandPose {
        self.state().pose
    }
}

impl VideoFrameSource for SyntheticCamera {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame(&self) -> Box<dyn FrameView + '_> {
        let state = self.state();
        let t = state.time;
        let sway = (t * 1.7).sin() * 6.0;

        let hands = match state.pose {
            HandPose::Out => Vec::new(),
            HandPose::Raised => vec![Hand { cx: 500.0 + sway, cy: 190.0, rx: 45.0, ry: 70.0 }],
            HandPose::Clapping => vec![
                Hand { cx: 292.0 + sway, cy: 250.0, rx: 70.0, ry: 110.0 },
                Hand { cx: 348.0 + sway, cy: 250.0, rx: 70.0, ry: 110.0 },
            ],
        };

        Box::new(SyntheticFrame {
            camera: self,
            pan: (t * 0.4).sin() * 12.0,
            flicker: 1.0 + (t * 3.1).sin() * 0.04,
            hands,
        })
    }
}

struct SyntheticFrame<'a> {
    camera: &'a SyntheticCamera,
    pan: f32,
    flicker: f32,
    hands: Vec<Hand>,
}

impl FrameView for SyntheticFrame<'_> {
    fn pixel(&self, x: u32, y: u32) -> Rgb {
        let cam = self.camera;
        let x = x.min(cam.width - 1);
        let y = y.min(cam.height - 1);

        for hand in &self.hands {
            if let Some(d) = hand.contains(x as f32, y as f32) {
                // Slightly darker at the rim
                let shade = 1.0 - d * 0.15;
                return (
                    (SKIN.0 as f32 * shade) as u8,
                    (SKIN.1 as f32 * shade) as u8,
                    (SKIN.2 as f32 * shade) as u8,
                );
            }
        }

        let sx = (x as f32 + self.pan).clamp(0.0, (cam.width - 1) as f32) as u32;
        let v = (cam.room[(y * cam.width + sx) as usize] as f32 * self.flicker).min(255.0);
        ((v * 0.6) as u8, (v * 0.7) as u8, v as u8)
    }
}
