//! Wait-free parameter hand-off between the control thread and the render
//! thread.
//!
//! Each parameter owns one slot. The control thread stores the latest
//! requested value and bumps a generation counter; the render thread picks
//! up any slot whose generation moved since it last looked. Only the newest
//! write matters, so there is no queue. After each render call the render
//! thread publishes the committed value back into the slot for display.
//!
//! Values are `f64` bit patterns in `AtomicU64`s, so a reader can never
//! observe half of a write.

use crate::error::ParameterError;
use crate::parameter::Info;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

struct Slot {
    info: Info,
    requested: AtomicU64,
    generation: AtomicU64,
    // Touched only by the render thread.
    consumed: AtomicU64,
    rendered: AtomicU64,
    editing: AtomicBool,
}

impl Slot {
    fn new(info: Info) -> Slot {
        let default = info.default_value().to_bits();
        Slot {
            info,
            requested: AtomicU64::new(default),
            generation: AtomicU64::new(0),
            consumed: AtomicU64::new(0),
            rendered: AtomicU64::new(default),
            editing: AtomicBool::new(false),
        }
    }
}

pub struct ParameterBridge {
    slots: Vec<Slot>,
}

impl ParameterBridge {
    pub fn new(params: &[Info]) -> ParameterBridge {
        ParameterBridge {
            slots: params.iter().cloned().map(Slot::new).collect(),
        }
    }

    fn slot(&self, address: u64) -> Result<&Slot, ParameterError> {
        self.slots
            .iter()
            .find(|slot| slot.info.address == address)
            .ok_or(ParameterError::UnknownParameter(address))
    }

    pub fn info(&self, address: u64) -> Result<&Info, ParameterError> {
        self.slot(address).map(|slot| &slot.info)
    }

    pub fn addresses(&self) -> impl Iterator<Item = u64> + '_ {
        self.slots.iter().map(|slot| slot.info.address)
    }

    /// Requests `value` for the parameter at `address`, clamped into its
    /// domain. Returns the value that will be rendered.
    pub fn write(&self, address: u64, value: f64) -> Result<f64, ParameterError> {
        let slot = self.slot(address)?;
        let clamped = slot.info.clamp(value);
        slot.requested.store(clamped.to_bits(), Ordering::Relaxed);
        // Publishes the store above to whoever acquires the new generation.
        slot.generation.fetch_add(1, Ordering::Release);
        Ok(clamped)
    }

    /// The last value the render thread committed, or the default if nothing
    /// has rendered yet.
    pub fn read(&self, address: u64) -> Result<f64, ParameterError> {
        let slot = self.slot(address)?;
        Ok(f64::from_bits(slot.rendered.load(Ordering::Acquire)))
    }

    /// Maps a host bypass switch onto the kernel's bypass parameter. Kernels
    /// without one ignore it.
    pub fn write_bypass(&self, bypass_param: Option<u64>, bypassed: bool) -> Result<(), ParameterError> {
        match bypass_param {
            Some(address) => self.write(address, if bypassed { 1. } else { 0. }).map(|_| ()),
            None => Ok(()),
        }
    }

    pub fn begin_edit(&self, address: u64) -> Result<(), ParameterError> {
        self.slot(address)?.editing.store(true, Ordering::Relaxed);
        Ok(())
    }

    pub fn end_edit(&self, address: u64) -> Result<(), ParameterError> {
        self.slot(address)?.editing.store(false, Ordering::Relaxed);
        Ok(())
    }

    /// True between `begin_edit` and `end_edit`, so the control thread can
    /// coalesce display updates during a gesture.
    pub fn is_editing(&self, address: u64) -> Result<bool, ParameterError> {
        Ok(self.slot(address)?.editing.load(Ordering::Relaxed))
    }

    pub fn string_from_value(&self, address: u64, value: f64) -> Result<String, ParameterError> {
        Ok(self.slot(address)?.info.string_from_value(value))
    }

    /// Render thread: hands every write not yet seen to `apply`, oldest slot
    /// first. Each slot is reported at most once per call.
    pub fn drain_requests<F>(&self, mut apply: F)
    where
        F: FnMut(u64, f64),
    {
        for slot in &self.slots {
            let generation = slot.generation.load(Ordering::Acquire);
            if generation == slot.consumed.load(Ordering::Relaxed) {
                continue;
            }
            let value = f64::from_bits(slot.requested.load(Ordering::Relaxed));
            slot.consumed.store(generation, Ordering::Relaxed);
            apply(slot.info.address, value);
        }
    }

    /// Render thread: records the value that was actually rendered.
    pub fn publish(&self, address: u64, value: f64) {
        if let Ok(slot) = self.slot(address) {
            slot.rendered.store(value.to_bits(), Ordering::Release);
        }
    }
}
