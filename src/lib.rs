//! Gesture-triggered fireworks for the terminal.
//!
//! A camera feeds a classifier running on its own thread. Its latest label
//! launches fireworks (`claphands`) or clears them (`still`), and
//! [`effects::fireworks::FireworksEffect`] draws everything with half-block
//! characters.

pub mod audio;
pub mod camera;
pub mod canvas;
pub mod classifier;
pub mod config;
pub mod effects;
pub mod error;
pub mod sim;
