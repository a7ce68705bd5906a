use std::path::PathBuf;

/// Error types for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {}", problems.join("; "))]
    Invalid { problems: Vec<String> },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
