//! Drawing surface shared by the simulation and the terminal renderer.

use glam::Vec2;
use std::io::Write;

pub type Rgb = (u8, u8, u8);

/// Anything particles can be drawn onto.
///
/// Coordinates are logical canvas units (640x480 by default), not terminal
/// cells. `alpha` is passed through unclamped; the surface decides what
/// out-of-range values mean.
pub trait Canvas {
    fn fill_circle(&mut self, center: Vec2, diameter: f32, alpha: i32);
}

/// Text drawn over the pixels after the frame is composed.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    /// 0-based terminal row
    pub row: usize,
    /// 0-based terminal column
    pub col: usize,
    pub text: String,
    pub fg: Rgb,
    pub bg: Rgb,
}

/// A software framebuffer sized to the terminal, two pixels per cell
/// (upper and lower half block).
pub struct PixelCanvas {
    width: usize,
    height: usize,
    logical: Vec2,
    pixels: Vec<Rgb>,
    output_buf: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize, logical: Vec2) -> Self {
        Self {
            width,
            height,
            logical,
            pixels: vec![(0, 0, 0); width * height],
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![(0, 0, 0); width * height];
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Map a terminal pixel back to the logical coordinate at its centre.
    pub fn to_logical(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) * self.logical.x / self.width.max(1) as f32,
            (y as f32 + 0.5) * self.logical.y / self.height.max(1) as f32,
        )
    }

    fn scale(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 / self.logical.x,
            self.height as f32 / self.logical.y,
        )
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        let base = self.pixels[idx];
        self.pixels[idx] = (
            (base.0 as f32 * (1.0 - alpha) + color.0 as f32 * alpha) as u8,
            (base.1 as f32 * (1.0 - alpha) + color.1 as f32 * alpha) as u8,
            (base.2 as f32 * (1.0 - alpha) + color.2 as f32 * alpha) as u8,
        );
    }

    /// Write the frame as half-block cells, then the overlays on top.
    pub fn present<W: Write>(&mut self, out: &mut W, overlays: &[Overlay]) -> std::io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top: Rgb = (255, 255, 255);
        let mut prev_bot: Rgb = (255, 255, 255);

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top = self.pixels[y * self.width + x];
                let bot = if y + 1 < self.height {
                    self.pixels[(y + 1) * self.width + x]
                } else {
                    top
                };

                if top != prev_top {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = top;
                }
                if bot != prev_bot {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = bot;
                }
                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top = (255, 255, 255);
            prev_bot = (255, 255, 255);
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        for overlay in overlays {
            let (fg, bg) = (overlay.fg, overlay.bg);
            write!(
                self.output_buf,
                "\x1b[{};{}H\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{}\x1b[0m",
                overlay.row + 1,
                overlay.col + 1,
                fg.0, fg.1, fg.2,
                bg.0, bg.1, bg.2,
                overlay.text
            )?;
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }
}

impl Canvas for PixelCanvas {
    /// White dot, alpha clamped to 0..=255. Dots smaller than a terminal
    /// pixel still cover one pixel.
    fn fill_circle(&mut self, center: Vec2, diameter: f32, alpha: i32) {
        let alpha = alpha.clamp(0, 255);
        if alpha == 0 {
            return;
        }
        let alpha = alpha as f32 / 255.0;

        let scale = self.scale();
        let c = center * scale;
        let r = Vec2::splat(diameter * 0.5) * scale;
        let (cx, cy) = (c.x.floor() as i32, c.y.floor() as i32);

        if r.x < 1.0 && r.y < 1.0 {
            self.blend(cx, cy, (255, 255, 255), alpha);
            return;
        }

        let (rx, ry) = (r.x.ceil() as i32, r.y.ceil() as i32);
        for dy in -ry..=ry {
            for dx in -rx..=rx {
                let px = cx + dx;
                let py = cy + dy;
                let nx = (px as f32 + 0.5 - c.x) / r.x.max(0.5);
                let ny = (py as f32 + 0.5 - c.y) / r.y.max(0.5);
                if nx * nx + ny * ny <= 1.0 {
                    self.blend(px, py, (255, 255, 255), alpha);
                }
            }
        }
    }
}
