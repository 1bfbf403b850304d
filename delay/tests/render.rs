mod common;

use common::*;
use fission_delay::Param;
use fission_kernel::event::{Data, Event};
use fission_kernel::RenderError;

const DELAY: u64 = Param::DelayTime as u64;
const BYPASS: u64 = Param::Bypass as u64;
const ROUTING: u64 = Param::Routing as u64;

#[test]
fn fifty_ms_impulse_on_both_channels() {
    let mut state = prepared(1, 2, 44100., 4410);
    state.bridge().write(DELAY, 50.).unwrap();
    let out = render(&mut state, &[impulse(4410)], 2, &[]).unwrap();
    for chan in &out {
        assert_eq!(chan[0], 0.);
        assert_eq!(chan[2205], 1.);
        let stray: f32 = chan
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != 2205)
            .map(|(_, x)| x.abs())
            .sum();
        assert_eq!(stray, 0.);
    }
}

#[test]
fn fractional_delay_spreads_between_neighbours() {
    // 10.01 ms at 44.1 kHz is 441.441 samples.
    let mut state = prepared(1, 1, 44100., 1024);
    state.bridge().write(DELAY, 10.01).unwrap();
    let out = render(&mut state, &[impulse(1024)], 1, &[]).unwrap();
    let out = &out[0];
    assert!((out[441] - 0.559).abs() < 1e-3, "{}", out[441]);
    assert!((out[442] - 0.441).abs() < 1e-3, "{}", out[442]);
    assert!((out[441] + out[442] - 1.).abs() < 1e-6);
    let elsewhere: f32 = out
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != 441 && i != 442)
        .map(|(_, x)| x.abs())
        .sum();
    assert_eq!(elsewhere, 0.);
}

#[test]
fn bypass_is_transparent_for_every_layout() {
    for &(input, output) in &[(1, 1), (1, 2), (2, 2)] {
        let mut state = prepared(input, output, 48000., 256);
        let bridge = state.bridge();
        bridge.write(DELAY, -23.).unwrap();
        bridge.write(BYPASS, 1.).unwrap();
        let mut seed = 7;
        let inputs: Vec<Vec<f32>> = (0..input).map(|_| noise(&mut seed, 256)).collect();
        let out = render(&mut state, &inputs, output as usize, &[]).unwrap();
        for (chan, samples) in out.iter().enumerate() {
            let source = &inputs[chan.min(inputs.len() - 1)];
            assert_eq!(samples, source, "{} -> {} channel {}", input, output, chan);
        }
    }
}

#[test]
fn host_bypass_switch() {
    let mut state = prepared(2, 2, 48000., 64);
    state.bridge().write(DELAY, 1.).unwrap();
    state.set_bypass(true).unwrap();
    let mut seed = 3;
    let inputs = vec![noise(&mut seed, 64), noise(&mut seed, 64)];
    let out = render(&mut state, &inputs, 2, &[]).unwrap();
    assert_eq!(out, inputs);
    assert_eq!(state.bridge().read(BYPASS), Ok(1.));
}

#[test]
fn automation_is_sample_accurate() {
    // At 1 kHz one millisecond is one sample.
    let mut state = prepared(1, 1, 1000., 64);
    state.bridge().write(DELAY, 2.).unwrap();
    let ramp: Vec<f32> = (1..=64).map(|i| i as f32).collect();
    let out = render(&mut state, &[ramp], 1, &[Event::parameter(20, DELAY, 5.)]).unwrap();
    let out = &out[0];
    for n in 0..20 {
        let expected = if n >= 2 { (n - 1) as f32 } else { 0. };
        assert_eq!(out[n], expected, "frame {}", n);
    }
    for n in 20..64 {
        assert_eq!(out[n], (n - 4) as f32, "frame {}", n);
    }
    assert_eq!(state.bridge().read(DELAY), Ok(5.));
}

#[test]
fn event_at_zero_applies_before_audio() {
    let mut state = prepared(1, 1, 1000., 16);
    let out = render(
        &mut state,
        &[impulse(16)],
        1,
        &[Event::parameter(0, DELAY, 3.)],
    )
    .unwrap();
    assert_eq!(out[0][0], 0.);
    assert_eq!(out[0][3], 1.);
}

#[test]
fn last_event_at_an_offset_wins() {
    let mut state = prepared(1, 1, 1000., 16);
    let out = render(
        &mut state,
        &[impulse(16)],
        1,
        &[Event::parameter(0, DELAY, 3.), Event::parameter(0, DELAY, 6.)],
    )
    .unwrap();
    assert_eq!(out[0][3], 0.);
    assert_eq!(out[0][6], 1.);
}

#[test]
fn host_events_are_clamped() {
    let mut state = prepared(1, 1, 1000., 16);
    render(
        &mut state,
        &[impulse(16)],
        1,
        &[Event::parameter(0, DELAY, -400.)],
    )
    .unwrap();
    assert_eq!(state.bridge().read(DELAY), Ok(-50.));
}

#[test]
fn parameter_round_trip() {
    let mut state = prepared(1, 2, 44100., 512);
    let bridge = state.bridge();
    assert_eq!(bridge.write(DELAY, 75.), Ok(50.));
    render(&mut state, &[vec![0.; 512]], 2, &[]).unwrap();
    assert_eq!(bridge.read(DELAY), Ok(50.));
    assert_eq!(bridge.string_from_value(DELAY, 12.4).unwrap(), "12");
    assert_eq!(bridge.string_from_value(ROUTING, 1.).unwrap(), "Signed");
}

#[test]
fn signed_routing_delays_one_side() {
    let mut state = prepared(2, 2, 1000., 16);
    let bridge = state.bridge();
    bridge.write(ROUTING, 1.).unwrap();
    bridge.write(DELAY, 3.).unwrap();
    let out = render(&mut state, &[impulse(16), impulse(16)], 2, &[]).unwrap();
    assert_eq!(out[0][0], 1.);
    assert_eq!(out[1][0], 0.);
    assert_eq!(out[1][3], 1.);

    bridge.write(DELAY, -3.).unwrap();
    let out = render(&mut state, &[impulse(16), impulse(16)], 2, &[]).unwrap();
    assert_eq!(out[0][0], 0.);
    assert_eq!(out[0][3], 1.);
    assert_eq!(out[1][0], 1.);
}

#[test]
fn signed_routing_on_mono_uses_the_left_side() {
    let mut state = prepared(1, 1, 1000., 16);
    let bridge = state.bridge();
    bridge.write(ROUTING, 1.).unwrap();
    bridge.write(DELAY, 4.).unwrap();
    let out = render(&mut state, &[impulse(16)], 1, &[]).unwrap();
    assert_eq!(out[0][0], 1.);

    bridge.write(DELAY, -4.).unwrap();
    let out = render(&mut state, &[impulse(16)], 1, &[]).unwrap();
    assert_eq!(out[0][0], 0.);
    assert_eq!(out[0][4], 1.);
}

#[test]
fn wraps_many_times_over() {
    // 20 ms at 44.1 kHz is exactly 882 samples.
    let mut state = prepared(1, 1, 44100., 512);
    state.bridge().write(DELAY, 20.).unwrap();
    let mut seed = 0x1234_5678;
    let mut history: Vec<f32> = vec![0.; 882];
    for _ in 0..80 {
        let block = noise(&mut seed, 512);
        let out = render(&mut state, &[block.clone()], 1, &[]).unwrap();
        history.extend_from_slice(&block);
        let start = history.len() - 512 - 882;
        assert_eq!(&out[0][..], &history[start..start + 512]);
        assert!(out[0].iter().all(|x| x.is_finite() && x.abs() <= 1. + 1e-6));
    }
}

#[test]
fn changing_delay_on_noise_stays_bounded() {
    let mut state = prepared(1, 2, 48000., 128);
    let bridge = state.bridge();
    let mut seed = 99;
    for block in 0..300 {
        bridge.write(DELAY, (block % 101) as f64 - 50.3).unwrap();
        let events = [Event::parameter(64, DELAY, (block % 37) as f64 * 1.37)];
        let out = render(&mut state, &[noise(&mut seed, 128)], 2, &events).unwrap();
        for chan in &out {
            assert!(chan.iter().all(|x| x.is_finite() && x.abs() <= 1. + 1e-6));
        }
    }
}

#[test]
fn failed_call_keeps_kernel_state() {
    let mut state = prepared(1, 1, 1000., 16);
    state.bridge().write(DELAY, 20.).unwrap();
    let out = render(&mut state, &[impulse(16)], 1, &[]).unwrap();
    assert!(out[0].iter().all(|&x| x == 0.));

    // Too many output channels: rejected before anything is consumed.
    let err = render(&mut state, &[impulse(16)], 2, &[]).unwrap_err();
    assert_eq!(
        err,
        RenderError::OutputChannelMismatch {
            expected: 1,
            actual: 2
        }
    );

    // The impulse from the first call is still in flight and lands 20
    // frames after it was written, with nothing from the failed call.
    let out = render(&mut state, &[vec![0.; 16]], 1, &[]).unwrap();
    assert_eq!(out[0][4], 1.);
    assert_eq!(out[0].iter().map(|x| x.abs()).sum::<f32>(), 1.);
}

#[test]
fn rendering_after_release_fails() {
    let mut state = prepared(1, 1, 1000., 16);
    state.release();
    assert_eq!(
        render(&mut state, &[impulse(16)], 1, &[]),
        Err(RenderError::NotPrepared)
    );
}

#[test]
fn ramped_change_lands_at_its_offset() {
    // Ramps are not interpolated: 3 ms takes effect whole at frame 4.
    let mut state = prepared(1, 1, 1000., 16);
    let ramp: Vec<f32> = (1..=16).map(|i| i as f32).collect();
    let out = render(
        &mut state,
        &[ramp],
        1,
        &[Event {
            time: 4,
            data: Data::RampedParameterChange {
                address: DELAY,
                value: 3.,
                ramp_time: 8,
            },
        }],
    )
    .unwrap();
    let out = &out[0];
    assert_eq!(&out[..4], &[1., 2., 3., 4.]);
    for n in 4..16 {
        assert_eq!(out[n], (n - 2) as f32, "frame {}", n);
    }
    assert_eq!(state.bridge().read(DELAY), Ok(3.));
}

#[test]
fn reset_drops_pending_echoes() {
    let mut state = prepared(1, 1, 1000., 8);
    state.bridge().write(DELAY, 10.).unwrap();
    let out = render(&mut state, &[impulse(8)], 1, &[]).unwrap();
    assert!(out[0].iter().all(|&x| x == 0.));

    // The echo is due at frame 2 of the next call.
    state.reset();
    let out = render(&mut state, &[vec![0.; 8]], 1, &[]).unwrap();
    assert!(out[0].iter().all(|&x| x == 0.));
    let out = render(&mut state, &[vec![0.; 8]], 1, &[]).unwrap();
    assert!(out[0].iter().all(|&x| x == 0.));

    // Parameters survive a reset.
    assert_eq!(state.bridge().read(DELAY), Ok(10.));
    let _ = render(&mut state, &[impulse(8)], 1, &[]).unwrap();
    let out = render(&mut state, &[vec![0.; 8]], 1, &[]).unwrap();
    assert_eq!(out[0][2], 1.);
}
