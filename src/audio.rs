//! Background music.
//!
//! Playback is user-initiated only: nothing loops until `play_music` is
//! called from the "Start Music" button. A track that failed to load turns
//! the button into a no-op.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::error::{Error, Result};

pub trait AudioPlayer {
    fn load_track(&mut self, path: &Path) -> Result<()>;
    fn is_playing(&self) -> bool;
    fn loop_playback(&mut self);
}

/// Start looping playback if a track is loaded and it isn't already
/// playing.
pub fn play_music(player: &mut dyn AudioPlayer) {
    if !player.is_playing() {
        player.loop_playback();
    }
}

struct LoadedTrack {
    path: PathBuf,
    data: Vec<u8>,
}

/// Holds the track in memory and keeps the looping state.
///
/// Decoding and output belong to the host audio stack; this keeps the
/// bookkeeping the rest of the app relies on.
#[derive(Default)]
pub struct LoopingTrack {
    track: Option<LoadedTrack>,
    started: Option<Instant>,
}

impl LoopingTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, logging instead of failing. The player stays usable
    /// either way.
    pub fn open(path: &Path) -> Self {
        let mut player = Self::new();
        if let Err(e) = player.load_track(path) {
            warn!(error = %e, "background music disabled");
        }
        player
    }

    pub fn is_loaded(&self) -> bool {
        self.track.is_some()
    }

    /// Seconds since looping started.
    pub fn elapsed_secs(&self) -> Option<f32> {
        self.started.map(|t| t.elapsed().as_secs_f32())
    }
}

impl AudioPlayer for LoopingTrack {
    fn load_track(&mut self, path: &Path) -> Result<()> {
        let data = fs::read(path).map_err(|source| Error::TrackLoad {
            path: path.to_path_buf(),
            source,
        })?;
        if data.is_empty() {
            return Err(Error::EmptyTrack(path.to_path_buf()));
        }

        info!(path = %path.display(), bytes = data.len(), "track loaded");
        self.track = Some(LoadedTrack {
            path: path.to_path_buf(),
            data,
        });
        self.started = None;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.started.is_some()
    }

    fn loop_playback(&mut self) {
        let Some(track) = &self.track else {
            return;
        };
        if self.started.is_none() {
            info!(path = %track.path.display(), bytes = track.data.len(), "looping playback started");
            self.started = Some(Instant::now());
        }
    }
}
