use super::params::{self, Param};
use fission_kernel::AudioFormat;

/// Below this magnitude a signed delay counts as centred.
const CENTRE_MS: f64 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Routing {
    /// Every channel is delayed by the magnitude of the delay time.
    Both,
    /// Positive times delay the right channel, negative times the left; the
    /// other side stays dry.
    Signed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    pub delay_ms: f64,
    pub delay_samples: f32,
    pub routing: Routing,
    pub bypass: bool,
}

impl Config {
    /// Delay applied to output `channel`, or `None` if it stays dry.
    pub fn delay_for_channel(&self, channel: usize) -> Option<f32> {
        match self.routing {
            Routing::Both => Some(self.delay_samples),
            Routing::Signed => {
                let delayed = if self.delay_ms > CENTRE_MS {
                    1
                } else if self.delay_ms < -CENTRE_MS {
                    0
                } else {
                    return None;
                };
                if channel == delayed {
                    Some(self.delay_samples)
                } else {
                    None
                }
            }
        }
    }
}

pub fn ms_to_samples(ms: f64, sample_rate: f64) -> f64 {
    ms * sample_rate / 1000.
}

pub fn from_params(format: AudioFormat, param_set: &[f64; params::COUNT]) -> Config {
    let delay_ms = param_set[Param::DelayTime as usize];
    let routing = if param_set[Param::Routing as usize].round() >= 1. {
        Routing::Signed
    } else {
        Routing::Both
    };
    Config {
        delay_ms,
        delay_samples: ms_to_samples(delay_ms.abs(), format.sample_rate) as f32,
        routing,
        bypass: param_set[Param::Bypass as usize] >= 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format() -> AudioFormat {
        AudioFormat {
            input_channel_count: 1,
            output_channel_count: 2,
            sample_rate: 44100.,
            maximum_frames_to_render: 512,
        }
    }

    fn config(delay_ms: f64, bypass: f64, routing: f64) -> Config {
        from_params(format(), &[delay_ms, bypass, routing])
    }

    #[test]
    fn converts_milliseconds() {
        assert_eq!(config(50., 0., 0.).delay_samples, 2205.);
        assert_eq!(config(-10., 0., 0.).delay_samples, 441.);
    }

    #[test]
    fn both_routing_ignores_sign() {
        let config = config(-10., 0., 0.);
        assert_eq!(config.delay_for_channel(0), Some(441.));
        assert_eq!(config.delay_for_channel(1), Some(441.));
    }

    #[test]
    fn signed_routing_picks_a_side() {
        let right = config(10., 0., 1.);
        assert_eq!(right.delay_for_channel(0), None);
        assert_eq!(right.delay_for_channel(1), Some(441.));
        let left = config(-10., 0., 1.);
        assert_eq!(left.delay_for_channel(0), Some(441.));
        assert_eq!(left.delay_for_channel(1), None);
        let centre = config(0.0005, 0., 1.);
        assert_eq!(centre.delay_for_channel(0), None);
        assert_eq!(centre.delay_for_channel(1), None);
    }

    #[test]
    fn bypass_threshold() {
        assert!(!config(0., 0.49, 0.).bypass);
        assert!(config(0., 0.5, 0.).bypass);
    }
}
