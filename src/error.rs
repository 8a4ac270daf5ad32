use thiserror::Error;

/// Errors raised while setting up a sort animation.
///
/// Nothing inside a running animation fails: out-of-range events are
/// ignored and a busy device simply skips a transmit. These errors only
/// guard construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Another engine is still alive on this thread.
    #[error("a sort animation is already active on this thread")]
    RunAlreadyActive,

    /// The device length cannot back a working buffer.
    #[error("strip length {len} is invalid (must be 1..={max})")]
    InvalidLength { len: usize, max: usize },
}

/// Errors while reading or writing show configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors while rendering access cues to a WAV file.
#[derive(Debug, Error)]
pub enum CueError {
    #[error("wav output failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("sample rate must be positive")]
    ZeroSampleRate,
}
