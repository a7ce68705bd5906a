use std::path::PathBuf;

/// Error types for the gaze pipeline.
///
/// None of these are fatal: the pipeline drops the update, or stops
/// recording, and keeps running.
#[derive(Debug, thiserror::Error)]
pub enum GazeError {
    #[error("Malformed gaze packet: {0}")]
    MalformedPacket(String),

    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create session directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session log {path} is malformed: {reason}")]
    MalformedLog { path: PathBuf, reason: String },

    #[error("Failed to bind gaze socket on {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Scene error: {0}")]
    Scene(String),
}

impl GazeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GazeError>;
