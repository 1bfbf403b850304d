#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Data {
    ParameterChange {
        address: u64,
        value: f64,
    },
    /// Hosts may ask for a ramp; kernels here apply the target value at the
    /// event's offset.
    RampedParameterChange {
        address: u64,
        value: f64,
        ramp_time: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    // time is represented as samples from the buffer start.
    pub time: i64,
    pub data: Data,
}

impl Event {
    pub fn parameter(time: i64, address: u64, value: f64) -> Event {
        Event {
            time,
            data: Data::ParameterChange { address, value },
        }
    }
}
