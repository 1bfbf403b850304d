#![allow(dead_code)]

use fission_delay::DelayKernel;
use fission_kernel::conformer::BufferInput;
use fission_kernel::event::Event;
use fission_kernel::*;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn prepared(input: u32, output: u32, sample_rate: f64, max_frames: u32) -> RenderState<DelayKernel> {
    init();
    let mut state = RenderState::new();
    state
        .prepare(AudioFormat {
            input_channel_count: input,
            output_channel_count: output,
            sample_rate,
            maximum_frames_to_render: max_frames,
        })
        .unwrap();
    state
}

pub fn render(
    state: &mut RenderState<DelayKernel>,
    inputs: &[Vec<f32>],
    outputs: usize,
    events: &[Event],
) -> Result<Vec<Vec<f32>>, RenderError> {
    let frames = inputs[0].len();
    let chans: Vec<&[f32]> = inputs.iter().map(|chan| &chan[..]).collect();
    let mut outs = vec![vec![0.; frames]; outputs];
    {
        let mut out_refs: Vec<&mut [f32]> = outs.iter_mut().map(|chan| &mut chan[..]).collect();
        state.render(
            frames,
            &mut BufferInput::new(AudioBuffer::new(&chans)),
            AudioBufferMut::new(&mut out_refs),
            events.iter().copied(),
        )?;
    }
    Ok(outs)
}

pub fn impulse(frames: usize) -> Vec<f32> {
    let mut signal = vec![0.; frames];
    signal[0] = 1.;
    signal
}

/// Deterministic white noise in [-1, 1].
pub fn noise(seed: &mut u32, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|_| {
            *seed ^= *seed << 13;
            *seed ^= *seed >> 17;
            *seed ^= *seed << 5;
            (*seed as f64 / u32::MAX as f64 * 2. - 1.) as f32
        })
        .collect()
}
