//! Error taxonomy for preparing and rendering kernels.
//!
//! Render-side errors are `Copy` and carry only scalars, so reporting one
//! from the audio thread never allocates.

use thiserror::Error;

/// Configuration errors raised while preparing a kernel. Rendering never
/// starts after one of these.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum PrepareError {
    #[error("unsupported channel layout: {input} in, {output} out")]
    UnsupportedChannelLayout { input: u32, output: u32 },

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("invalid maximum frames to render: {0}")]
    InvalidMaximumFrames(u32),
}

impl PrepareError {
    pub fn status_code(&self) -> i32 {
        match self {
            PrepareError::UnsupportedChannelLayout { .. } => -10,
            PrepareError::InvalidSampleRate(_) => -11,
            PrepareError::InvalidMaximumFrames(_) => -12,
        }
    }
}

/// What a host pull callback can report.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullError {
    #[error("host reported status {0}")]
    Host(i32),

    #[error("no input is connected")]
    Unavailable,
}

/// Failure of a single render call. Kernel state is unchanged when one of
/// these is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    #[error("render called before prepare")]
    NotPrepared,

    #[error("{requested} frames requested, maximum is {maximum}")]
    TooManyFrames { requested: u32, maximum: u32 },

    #[error("output has {actual} channels, expected {expected}")]
    OutputChannelMismatch { expected: u32, actual: u32 },

    #[error("output holds {actual} frames, {required} required")]
    OutputTooShort { required: u32, actual: u32 },

    #[error("pulling input failed: {0}")]
    Pull(#[from] PullError),

    #[error("host delivered {delivered} of {requested} input frames")]
    InsufficientFrames { requested: u32, delivered: u32 },
}

impl RenderError {
    pub fn status_code(&self) -> i32 {
        match self {
            RenderError::NotPrepared => -20,
            RenderError::TooManyFrames { .. } => -21,
            RenderError::OutputChannelMismatch { .. } => -22,
            RenderError::OutputTooShort { .. } => -23,
            RenderError::Pull(_) => -24,
            RenderError::InsufficientFrames { .. } => -25,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    #[error("unknown parameter address {0}")]
    UnknownParameter(u64),
}

impl ParameterError {
    pub fn status_code(&self) -> i32 {
        match self {
            ParameterError::UnknownParameter(_) => -30,
        }
    }
}
