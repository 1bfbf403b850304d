#![warn(nonstandard_style, rust_2018_idioms, future_incompatible)]
//! Stereo delay kernel.
//!
//! A single signed delay time of up to 50 ms, applied per channel through
//! linearly interpolated circular delay lines, with a transparent bypass.
//! The `routing` parameter picks whether every channel is delayed or only
//! the side selected by the sign of the delay time.

#[macro_use]
extern crate enum_primitive;

use enum_primitive::FromPrimitive;
use fission_kernel::audio_format::AllowedFormat;
use fission_kernel::*;
use lazy_static::lazy_static;
use log::debug;

pub mod config;
pub mod params;
pub mod state;

pub use crate::config::Routing;
pub use crate::params::Param;

pub struct DelayKernel {
    format: AudioFormat,
    param_set: [f64; params::COUNT],
    config: config::Config,
    state: state::State,
}

lazy_static! {
    static ref KERNEL_INFO: KernelInfo = KernelInfo {
        params: params::params(),
        bypass_param: Some(Param::Bypass as u64),
        formats: vec![
            AllowedFormat::exactly(1, 1),
            AllowedFormat::exactly(1, 2),
            AllowedFormat::exactly(2, 2),
        ],
    };
}

impl DelayKernel {
    pub fn config(&self) -> &config::Config {
        &self.config
    }
}

impl Kernel for DelayKernel {
    fn info() -> &'static KernelInfo {
        &KERNEL_INFO
    }

    fn new(format: AudioFormat) -> DelayKernel {
        let param_set = params::defaults();
        let config = config::from_params(format, &param_set);
        let state = state::State::new(&format);
        debug!(
            "allocated {} delay lines of {} samples",
            state.lines.len(),
            state::line_length(&format)
        );
        DelayKernel {
            format,
            param_set,
            config,
            state,
        }
    }

    fn set_parameter(&mut self, address: u64, value: f64) {
        if let Some(param) = Param::from_u64(address) {
            self.param_set[param as usize] = value;
            self.config = config::from_params(self.format, &self.param_set);
        }
    }

    fn get_parameter(&self, address: u64) -> f64 {
        Param::from_u64(address).map_or(0., |param| self.param_set[param as usize])
    }

    fn process(
        &mut self,
        input: AudioBuffer<'_, '_>,
        mut output: AudioBufferMut<'_, '_>,
    ) -> Result<(), RenderError> {
        let frames = output.len();
        let maximum = self.format.maximum_frames_to_render;
        if frames > maximum as usize {
            return Err(RenderError::TooManyFrames {
                requested: frames as u32,
                maximum,
            });
        }
        let last_input = match input.num_channels().checked_sub(1) {
            Some(last) => last,
            None => {
                output.fill(0.);
                return Ok(());
            }
        };

        let config = self.config;
        for (chan, out) in (&mut output).into_iter().enumerate() {
            let source = &input[chan.min(last_input)][..frames];
            let line = match self.state.lines.get_mut(chan) {
                Some(line) => line,
                None => {
                    out.copy_from_slice(source);
                    continue;
                }
            };
            let delay = config.delay_for_channel(chan);
            let dry = config.bypass || delay.is_none();
            let delay = delay.unwrap_or(0.);
            // The line is fed even when its output is unused, so toggling
            // bypass or routing never replays stale audio.
            for (o, &x) in out.iter_mut().zip(source) {
                let delayed = line.process(x, delay);
                *o = if dry { x } else { delayed };
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state.clear();
    }
}
