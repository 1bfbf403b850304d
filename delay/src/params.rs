use fission_kernel::parameter::*;

enum_from_primitive! {
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    DelayTime = 0,
    Bypass = 1,
    Routing = 2,
}
}

pub const COUNT: usize = 3;

pub const MAX_DELAY_MS: f64 = 50.;

pub const ROUTING_NAMES: [&str; 2] = ["Both", "Signed"];

pub fn params() -> Vec<Info> {
    let flags = Flags {
        writable: true,
        readable: true,
        scale: DisplayScale::Linear,
    };

    vec![
        Info {
            id: "delayTime".to_string(),
            address: Param::DelayTime as u64,
            name: "Delay".to_string(),
            details: Details::Numeric {
                min: -MAX_DELAY_MS,
                max: MAX_DELAY_MS,
                unit: Unit::Milliseconds,
                default: 0.,
            },
            flags: flags.clone(),
            dependent_parameters: vec![],
        },
        Info {
            id: "bypass".to_string(),
            address: Param::Bypass as u64,
            name: "Bypass".to_string(),
            details: Details::Numeric {
                min: 0.,
                max: 1.,
                unit: Unit::Boolean,
                default: 0.,
            },
            flags: flags.clone(),
            dependent_parameters: vec![],
        },
        Info {
            id: "routing".to_string(),
            address: Param::Routing as u64,
            name: "Routing".to_string(),
            details: Details::Indexed {
                names: ROUTING_NAMES.iter().map(|name| name.to_string()).collect(),
                default: 0,
            },
            flags,
            dependent_parameters: vec![],
        },
    ]
}

/// Default value of every parameter, indexed by address.
pub fn defaults() -> [f64; COUNT] {
    let mut values = [0.; COUNT];
    for info in params() {
        values[info.address as usize] = info.default_value();
    }
    values
}
