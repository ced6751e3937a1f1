use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::canvas::Rgb;
use crate::error::Error;

#[derive(Parser, Debug)]
#[command(name = "clapworks")]
#[command(about = "Clap at the camera to launch fireworks in your terminal", long_about = None)]
#[command(after_help = "Keys: c = clap, h = raise one hand, o/space = hands out of frame, \
m = start music, q/Esc/Ctrl+C = quit")]
pub struct Cli {
    /// Background color as hex (e.g. --bg-color 1a1b26)
    #[arg(long, value_name = "RRGGBB", value_parser = parse_hex_color)]
    pub bg_color: Option<Rgb>,

    /// Background music, looped once "Start Music" is pressed
    #[arg(long, default_value = "bgmusic.mp3")]
    pub track: PathBuf,

    /// Milliseconds between classifier runs
    #[arg(long, default_value_t = 100)]
    pub classify_interval_ms: u64,

    /// Seed for particle velocities and the camera scene
    #[arg(long)]
    pub seed: Option<u64>,

    /// Don't draw the camera image behind the fireworks
    #[arg(long)]
    pub hide_video: bool,

    /// Log file (the terminal is busy drawing)
    #[arg(long, default_value = "clapworks.log")]
    pub log_file: PathBuf,

    /// Log per-firework events
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything the effect needs from the command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub bg_color: Rgb,
    pub show_video: bool,
    pub seed: Option<u64>,
    pub classify_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bg_color: (0, 0, 0),
            show_video: true,
            seed: None,
            classify_interval: Duration::from_millis(100),
        }
    }
}

impl From<&Cli> for Settings {
    fn from(cli: &Cli) -> Self {
        Self {
            bg_color: cli.bg_color.unwrap_or((0, 0, 0)),
            show_video: !cli.hide_video,
            seed: cli.seed,
            classify_interval: Duration::from_millis(cli.classify_interval_ms.max(1)),
        }
    }
}

pub fn parse_hex_color(hex: &str) -> Result<Rgb, Error> {
    let invalid = || Error::InvalidColor(hex.to_string());
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).map_err(|_| invalid());
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
