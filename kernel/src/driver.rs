use super::event;
use std::ops::Range;

pub enum EventOrAudio {
    Event(event::Event),
    /// A non-empty run of frames with no event inside it.
    Audio(Range<usize>),
}

/// Splits a render call of `frame_count` frames at every event offset.
///
/// `f` sees each event at the moment it takes effect and each stretch of
/// audio between events, in time order, so every stretch is rendered with
/// constant parameters. Events stamped before the current position (or
/// before zero) are handled immediately; events at or past the end are
/// handled after the last audio. The first error from `f` stops the walk.
pub fn run_split_at_events<I, F, E>(frame_count: usize, events: I, mut f: F) -> Result<(), E>
where
    I: IntoIterator<Item = event::Event>,
    F: FnMut(EventOrAudio) -> Result<(), E>,
{
    let mut curr_slice_start: usize = 0;
    for ev in events {
        // If the current event time is before or at our "current time",
        // we just handle it and move on.
        if ev.time <= curr_slice_start as i64 {
            f(EventOrAudio::Event(ev))?;
            continue;
        }

        let time = (ev.time as u64).min(frame_count as u64) as usize;
        if time > curr_slice_start {
            f(EventOrAudio::Audio(curr_slice_start..time))?;
            curr_slice_start = time;
        }

        f(EventOrAudio::Event(ev))?;
    }

    // Now handle any remaining audio
    if curr_slice_start < frame_count {
        f(EventOrAudio::Audio(curr_slice_start..frame_count))?;
    }
    Ok(())
}
