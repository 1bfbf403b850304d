use super::config::ms_to_samples;
use super::params::MAX_DELAY_MS;
use fission_kernel::AudioFormat;
use smallvec::SmallVec;

/// Circular buffer holding the most recent input of one channel.
///
/// Every `process` call writes one sample and then reads behind it, so a
/// delay of zero returns the sample just written. The buffer starts zeroed,
/// which means a read never sees memory that was not written.
pub struct DelayLine {
    buffer: Vec<f32>,
    // Slot holding the newest sample.
    write: usize,
}

impl DelayLine {
    pub fn new(length: usize) -> DelayLine {
        DelayLine {
            buffer: vec![0.; length.max(2)],
            write: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Longest delay this line can produce, leaving room for the
    /// interpolation partner.
    pub fn max_delay(&self) -> f32 {
        (self.buffer.len() - 2) as f32
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0.);
        self.write = 0;
    }

    #[inline]
    pub fn process(&mut self, input: f32, delay: f32) -> f32 {
        let len = self.buffer.len();
        self.write += 1;
        if self.write == len {
            self.write = 0;
        }
        self.buffer[self.write] = input;
        self.tap(delay)
    }

    #[inline]
    fn tap(&self, delay: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay.max(0.).min(self.max_delay());
        let whole = delay.floor();
        let frac = delay - whole;
        let whole = whole as usize;

        let newer = if self.write >= whole {
            self.write - whole
        } else {
            self.write + len - whole
        };
        let a = self.buffer[newer];
        if frac == 0. {
            return a;
        }
        let older = if newer == 0 { len - 1 } else { newer - 1 };
        let b = self.buffer[older];
        a + (b - a) * frac
    }
}

/// Length of the delay lines for `format`: the longest delay, one block of
/// headroom, and a spare slot for interpolation.
pub fn line_length(format: &AudioFormat) -> usize {
    let max_delay = ms_to_samples(MAX_DELAY_MS, format.sample_rate).ceil() as usize;
    max_delay + format.maximum_frames_to_render as usize + 2
}

pub struct State {
    pub lines: SmallVec<[DelayLine; 2]>,
}

impl State {
    pub fn new(format: &AudioFormat) -> State {
        let channels = format.input_channel_count.max(format.output_channel_count);
        let length = line_length(format);
        State {
            lines: (0..channels).map(|_| DelayLine::new(length)).collect(),
        }
    }

    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }
}
