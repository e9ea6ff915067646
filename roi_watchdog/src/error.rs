//! Error types for the watchdog library.

/// Errors raised while building frames or configuring the detector.
#[derive(Debug, thiserror::Error)]
pub enum WatchdogError {
    #[error("frame buffer holds {actual} bytes, expected {expected} for a {width}x{height} RGB frame")]
    FrameBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

/// Result type alias using WatchdogError.
pub type WatchdogResult<T> = Result<T, WatchdogError>;

impl WatchdogError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
