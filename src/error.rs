use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not load track {path}: {source}")]
    TrackLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("track {0} is empty")]
    EmptyTrack(PathBuf),

    #[error("invalid hex color {0:?}, expected RRGGBB (e.g. 1a1b26)")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, Error>;
