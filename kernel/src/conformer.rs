//! Adapts the host's input bus to the channel layout a kernel renders.
//!
//! Input is pulled once per render call into storage allocated at prepare
//! time. When the host supplies fewer input channels than the kernel
//! produces, the last input channel is exposed again for the remaining
//! output channels by reference, so a mono bus feeds both sides of a stereo
//! kernel without copying.

use crate::error::{PullError, RenderError};
use crate::AudioFormat;
use fission_deinterleaved::{AudioBuffer, AudioBufferMut, SubBuffer};
use smallvec::SmallVec;

/// The host's pull mechanism for input audio.
pub trait PullInput {
    /// Fills `destination` with the next `destination.len()` input frames and
    /// returns how many frames were actually delivered.
    fn pull(&mut self, destination: AudioBufferMut<'_, '_>) -> Result<usize, PullError>;
}

/// Serves input from buffers the host already handed over.
pub struct BufferInput<'c, 'a: 'c> {
    source: AudioBuffer<'c, 'a>,
    position: usize,
}

impl<'c, 'a: 'c> BufferInput<'c, 'a> {
    pub fn new(source: AudioBuffer<'c, 'a>) -> BufferInput<'c, 'a> {
        BufferInput {
            source,
            position: 0,
        }
    }
}

impl<'c, 'a: 'c> PullInput for BufferInput<'c, 'a> {
    fn pull(&mut self, mut destination: AudioBufferMut<'_, '_>) -> Result<usize, PullError> {
        if self.source.num_channels() != destination.num_channels() {
            return Err(PullError::Unavailable);
        }
        let available = self.source.len() - self.position;
        let frames = destination.len().min(available);
        let end = self.position + frames;
        let source = self.source.slice(self.position..end);
        let mut target = destination.slice(0..frames);
        AudioBufferMut::from(&mut target).copy_from(&AudioBuffer::from(&source));
        self.position = end;
        Ok(frames)
    }
}

#[derive(Default)]
pub struct InputConformer {
    storage: Vec<Vec<f32>>,
    output_channels: usize,
}

impl InputConformer {
    pub fn new() -> InputConformer {
        InputConformer::default()
    }

    /// Sizes storage for `format`. Must not run while a render is in flight.
    pub fn allocate(&mut self, format: &AudioFormat) {
        let frames = format.maximum_frames_to_render as usize;
        self.storage = (0..format.input_channel_count)
            .map(|_| vec![0.; frames])
            .collect();
        self.output_channels = format.output_channel_count as usize;
    }

    pub fn deallocate(&mut self) {
        self.storage = Vec::new();
        self.output_channels = 0;
    }

    pub fn capacity(&self) -> usize {
        self.storage.first().map_or(0, |chan| chan.len())
    }

    /// Pulls `frames` frames from `source`. Fails without side effects on
    /// anything but this conformer's scratch storage.
    pub fn pull<P: PullInput>(&mut self, source: &mut P, frames: usize) -> Result<(), RenderError> {
        if frames > self.capacity() {
            return Err(RenderError::TooManyFrames {
                requested: frames as u32,
                maximum: self.capacity() as u32,
            });
        }
        let mut channels: SmallVec<[&mut [f32]; 8]> = self
            .storage
            .iter_mut()
            .map(|chan| &mut chan[..frames])
            .collect();
        let delivered = source.pull((&mut channels).into())?;
        if delivered < frames {
            return Err(RenderError::InsufficientFrames {
                requested: frames as u32,
                delivered: delivered as u32,
            });
        }
        Ok(())
    }

    /// The first `frames` pulled frames, one entry per output channel.
    pub fn conformed(&self, frames: usize) -> SubBuffer<'_> {
        let last = match self.storage.len().checked_sub(1) {
            Some(last) => last,
            None => return SubBuffer::new(),
        };
        (0..self.output_channels.max(self.storage.len()))
            .map(|chan| &self.storage[chan.min(last)][..frames])
            .collect()
    }
}
