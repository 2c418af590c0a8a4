use thiserror::Error;

/// Errors raised at the boundaries of the tuner: parameter validation,
/// capture setup and the hand-over between execution contexts.
///
/// The numeric pipeline itself never fails; degenerate blocks surface as
/// sentinel scores and the fallback period instead.
#[derive(Error, Debug)]
pub enum TunerError {
    /// A fixed analysis parameter is out of range.
    #[error("invalid analysis parameter `{name}`: {reason}")]
    InvalidParams {
        name: &'static str,
        reason: &'static str,
    },

    /// A raw block did not have the configured `N + M` length.
    #[error("raw block has {actual} samples, expected {expected}")]
    BlockLength { expected: usize, actual: usize },

    /// No audio input device found.
    #[error("no audio input device available")]
    NoInputDevice,

    /// The input device cannot stream at the required sample rate.
    #[error("no f32 input configuration supports {0} Hz")]
    UnsupportedConfig(u32),

    /// Failure reported by the audio backend.
    #[error("audio backend error: {0}")]
    Audio(String),

    /// Both capture regions are leased; a block must be released first.
    #[error("no free capture region")]
    NoFreeRegion,

    /// The capture side stopped producing blocks.
    #[error("capture source closed")]
    SourceClosed,

    /// The other end of a channel was dropped.
    #[error("channel disconnected")]
    Disconnected,

    /// An indicator sink could not be written.
    #[error("output error: {0}")]
    Output(String),

    /// A worker thread panicked.
    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),

    /// A worker thread could not be started.
    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TunerError>;
