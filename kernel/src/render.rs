//! Owns one kernel instance across its prepare / render / release lifecycle.
//!
//! `prepare` and `release` allocate and free, and must never overlap a
//! render call; the host serializes them. `render` never allocates, locks
//! or logs. The control thread talks to a `RenderState` only through the
//! shared [`ParameterBridge`].

use crate::bridge::ParameterBridge;
use crate::conformer::{InputConformer, PullInput};
use crate::driver::{self, EventOrAudio};
use crate::error::{ParameterError, PrepareError, RenderError};
use crate::event::{self, Event};
use crate::{audio_format, AudioFormat, Kernel};
use fission_deinterleaved::{AudioBuffer, AudioBufferMut};
use log::{info, warn};
use std::sync::Arc;

struct Prepared<K> {
    format: AudioFormat,
    kernel: K,
}

pub struct RenderState<K: Kernel> {
    bridge: Arc<ParameterBridge>,
    conformer: InputConformer,
    prepared: Option<Prepared<K>>,
}

impl<K: Kernel> Default for RenderState<K> {
    fn default() -> Self {
        RenderState::new()
    }
}

/// Highest sample rate a kernel can be prepared at.
pub const MAX_SAMPLE_RATE: f64 = 1_000_000.;

fn validate(formats: &[audio_format::AllowedFormat], format: &AudioFormat) -> Result<(), PrepareError> {
    if !(format.sample_rate > 0. && format.sample_rate <= MAX_SAMPLE_RATE) {
        return Err(PrepareError::InvalidSampleRate(format.sample_rate));
    }
    if format.maximum_frames_to_render == 0 {
        return Err(PrepareError::InvalidMaximumFrames(0));
    }
    if !audio_format::is_supported(formats, format) {
        return Err(PrepareError::UnsupportedChannelLayout {
            input: format.input_channel_count,
            output: format.output_channel_count,
        });
    }
    Ok(())
}

fn handle_event<K: Kernel>(kernel: &mut K, bridge: &ParameterBridge, data: event::Data) {
    match data {
        event::Data::ParameterChange { address, value }
        | event::Data::RampedParameterChange { address, value, .. } => {
            if let Ok(info) = bridge.info(address) {
                kernel.set_parameter(address, info.clamp(value));
            }
        }
    }
}

fn publish_all<K: Kernel>(kernel: &K, bridge: &ParameterBridge) {
    for address in bridge.addresses() {
        bridge.publish(address, kernel.get_parameter(address));
    }
}

impl<K: Kernel> RenderState<K> {
    pub fn new() -> RenderState<K> {
        RenderState {
            bridge: Arc::new(ParameterBridge::new(&K::info().params)),
            conformer: InputConformer::new(),
            prepared: None,
        }
    }

    /// The control thread's handle on this instance's parameters.
    pub fn bridge(&self) -> Arc<ParameterBridge> {
        Arc::clone(&self.bridge)
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    pub fn latency(&self) -> u64 {
        self.prepared
            .as_ref()
            .map_or(0, |prepared| prepared.kernel.get_latency())
    }

    /// Allocates everything rendering at `format` needs. A previous
    /// preparation is released first.
    pub fn prepare(&mut self, format: AudioFormat) -> Result<(), PrepareError> {
        if let Err(err) = validate(&K::info().formats, &format) {
            warn!("refusing to prepare: {}", err);
            return Err(err);
        }
        self.release();

        let mut kernel = K::new(format);
        for address in self.bridge.addresses() {
            if let Ok(value) = self.bridge.read(address) {
                kernel.set_parameter(address, value);
            }
        }
        self.bridge
            .drain_requests(|address, value| kernel.set_parameter(address, value));
        publish_all(&kernel, &self.bridge);

        self.conformer.allocate(&format);
        info!(
            "prepared {} in / {} out at {} Hz, up to {} frames per call",
            format.input_channel_count,
            format.output_channel_count,
            format.sample_rate,
            format.maximum_frames_to_render
        );
        self.prepared = Some(Prepared { format, kernel });
        Ok(())
    }

    /// Frees render resources. Committed parameter values stay visible
    /// through the bridge and seed the next `prepare`.
    pub fn release(&mut self) {
        if let Some(prepared) = self.prepared.take() {
            publish_all(&prepared.kernel, &self.bridge);
            self.conformer.deallocate();
            info!("released render resources");
        }
    }

    /// Clears signal history without reallocating.
    pub fn reset(&mut self) {
        if let Some(prepared) = self.prepared.as_mut() {
            prepared.kernel.reset();
        }
    }

    /// Maps the host's bypass switch onto the kernel's bypass parameter.
    pub fn set_bypass(&self, bypassed: bool) -> Result<(), ParameterError> {
        self.bridge.write_bypass(K::info().bypass_param, bypassed)
    }

    /// Renders `frame_count` frames into `output`, pulling input from
    /// `input` and applying `events` at their offsets.
    ///
    /// On failure the first `frame_count` frames of `output` (or all of it,
    /// if shorter) hold silence and the kernel is untouched.
    pub fn render<P, I>(
        &mut self,
        frame_count: usize,
        input: &mut P,
        mut output: AudioBufferMut<'_, '_>,
        events: I,
    ) -> Result<(), RenderError>
    where
        P: PullInput,
        I: IntoIterator<Item = Event>,
    {
        let result = self.try_render(frame_count, input, &mut output, events);
        if result.is_err() {
            let frames = frame_count.min(output.len());
            AudioBufferMut::from(&mut output.slice(0..frames)).fill(0.);
        }
        result
    }

    fn try_render<P, I>(
        &mut self,
        frame_count: usize,
        input: &mut P,
        output: &mut AudioBufferMut<'_, '_>,
        events: I,
    ) -> Result<(), RenderError>
    where
        P: PullInput,
        I: IntoIterator<Item = Event>,
    {
        let prepared = self.prepared.as_mut().ok_or(RenderError::NotPrepared)?;
        let maximum = prepared.format.maximum_frames_to_render;
        if frame_count > maximum as usize {
            return Err(RenderError::TooManyFrames {
                requested: frame_count as u32,
                maximum,
            });
        }
        let expected = prepared.format.output_channel_count;
        if output.num_channels() != expected as usize {
            return Err(RenderError::OutputChannelMismatch {
                expected,
                actual: output.num_channels() as u32,
            });
        }
        if output.len() < frame_count {
            return Err(RenderError::OutputTooShort {
                required: frame_count as u32,
                actual: output.len() as u32,
            });
        }

        self.conformer.pull(input, frame_count)?;

        let kernel = &mut prepared.kernel;
        let bridge = &*self.bridge;
        bridge.drain_requests(|address, value| kernel.set_parameter(address, value));

        let input = self.conformer.conformed(frame_count);
        let input = AudioBuffer::from(&input);
        let mut output = output.slice(0..frame_count);
        let mut output = AudioBufferMut::from(&mut output);
        driver::run_split_at_events(frame_count, events, |item| match item {
            EventOrAudio::Event(ev) => {
                handle_event(kernel, bridge, ev.data);
                Ok(())
            }
            EventOrAudio::Audio(range) => {
                let sub_input = input.slice(range.clone());
                let mut sub_output = output.slice(range);
                kernel.process((&sub_input).into(), (&mut sub_output).into())
            }
        })?;

        publish_all(kernel, bridge);
        Ok(())
    }
}
