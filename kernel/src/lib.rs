#![warn(nonstandard_style, rust_2018_idioms, future_incompatible)]
pub mod audio_format;
pub mod bridge;
pub mod conformer;
pub mod driver;
pub mod error;
pub mod event;
pub mod parameter;
pub mod render;

pub use crate::audio_format::AudioFormat;
pub use crate::bridge::ParameterBridge;
pub use crate::error::{ParameterError, PrepareError, PullError, RenderError};
pub use crate::render::RenderState;
pub use fission_deinterleaved::AudioBuffer;
pub use fission_deinterleaved::AudioBufferMut;

pub struct KernelInfo {
    pub params: Vec<parameter::Info>,
    pub bypass_param: Option<u64>,
    pub formats: Vec<audio_format::AllowedFormat>,
}

/// A signal processor driven from the render thread.
///
/// `new` is the only place a kernel may allocate. Everything else runs on
/// the render thread (or between render calls) and must not allocate, lock
/// or block.
pub trait Kernel {
    fn info() -> &'static KernelInfo;
    fn new(format: audio_format::AudioFormat) -> Self;

    fn set_parameter(&mut self, address: u64, value: f64);
    fn get_parameter(&self, address: u64) -> f64;

    fn get_latency(&self) -> u64 {
        0
    }

    /// Renders `output.len()` frames from `input` with the parameters as they
    /// stand. `input` has one channel per output channel.
    fn process(
        &mut self,
        input: AudioBuffer<'_, '_>,
        output: AudioBufferMut<'_, '_>,
    ) -> Result<(), RenderError>;

    fn reset(&mut self);
}
