use fission_kernel::audio_format::AllowedChannels;
use fission_kernel::conformer::PullInput;
use fission_kernel::event;
use fission_kernel::parameter::*;
use fission_kernel::{AudioBufferMut, AudioFormat, Kernel, ParameterBridge, PullError, RenderState};
use libc::c_char;
use libc::c_void;
use log::debug;
use smallvec::SmallVec;
use std::ffi::CString;
use std::sync::Arc;

pub const STATUS_OK: i32 = 0;
pub const STATUS_NULL_POINTER: i32 = -1;

fn convert_unit(unit: &Unit) -> u64 {
    match unit {
        Unit::Generic => 0,
        Unit::Boolean => 2,
        Unit::Percent => 3,
        Unit::Second => 4,
        Unit::SampleFrames => 5,
        Unit::Milliseconds => 24,
        Unit::Custom(..) => 26,
    }
}

fn convert_flags(readable: bool, writable: bool, scale: &DisplayScale) -> u64 {
    (if readable { 1 << 30 } else { 0 })
        | (if writable { 1 << 31 } else { 0 })
        | (match scale {
            DisplayScale::Linear => 0,
            DisplayScale::Logarithmic => 1 << 22,
        })
}

fn vec_as_ptr<T>(v: &[T]) -> *const T {
    if !v.is_empty() {
        &v[0] as *const T
    } else {
        std::ptr::null()
    }
}

fn c_string(s: &str) -> CString {
    CString::new(s.replace('\0', "")).unwrap_or_default()
}

fn status<E>(result: Result<(), E>, code: impl Fn(&E) -> i32) -> i32 {
    match result {
        Ok(()) => STATUS_OK,
        Err(err) => code(&err),
    }
}

pub fn get_kernel_allowed_channel_formats<K: Kernel>(
    add_format_ctx: *mut c_void,
    add_format: extern "C" fn(ctx: *mut c_void, input: i32, output: i32),
) {
    let formats = &K::info().formats;
    let serialize = |channels: AllowedChannels| -> i32 {
        match channels {
            AllowedChannels::AnyChannelCountAllowed => -1,
            AllowedChannels::ChannelCountAllowed(x) => x as i32,
        }
    };
    for format in formats {
        add_format(
            add_format_ctx,
            serialize(format.input_channels),
            serialize(format.output_channels),
        );
    }
}

pub fn get_has_bypass_param<K: Kernel>() -> u64 {
    match K::info().bypass_param {
        None => 0,
        Some(..) => 1,
    }
}

pub fn get_bypass_param<K: Kernel>() -> u64 {
    match K::info().bypass_param {
        None => 0,
        Some(n) => n,
    }
}

pub type NumericParamFn = extern "C" fn(
    ctx: *mut c_void,
    id: *const c_char,
    address: u64,
    name: *const c_char,
    flags: u64,
    min: f64,
    max: f64,
    unit_num: u64,
    unit_custom_name: *const c_char,
    default: f64,
    first_dep_param: *const u64,
    num_dep_params: u64,
);

pub type IndexedParamFn = extern "C" fn(
    ctx: *mut c_void,
    id: *const c_char,
    address: u64,
    name: *const c_char,
    flags: u64,
    value_strings: *const *const c_char,
    num_value_strings: u64,
    default: u64,
    first_dep_param: *const u64,
    num_dep_params: u64,
);

pub fn get_params<K: Kernel>(
    num_ctx: *mut c_void,
    numeric_param: NumericParamFn,
    indexed_ctx: *mut c_void,
    indexed_param: IndexedParamFn,
) {
    let params = &K::info().params;
    for param in params {
        let c_id = c_string(&param.id);
        let c_name = c_string(&param.name);
        let flags = convert_flags(
            param.flags.readable,
            param.flags.writable,
            &param.flags.scale,
        );
        match &param.details {
            Details::Numeric {
                min,
                max,
                unit,
                default,
            } => {
                let c_unit_name = match unit {
                    Unit::Custom(unit_custom) => Some(c_string(unit_custom)),
                    _ => None,
                };
                numeric_param(
                    num_ctx,
                    c_id.as_ptr(),
                    param.address,
                    c_name.as_ptr(),
                    flags,
                    *min,
                    *max,
                    convert_unit(unit),
                    c_unit_name
                        .as_ref()
                        .map_or(std::ptr::null(), |name| name.as_ptr()),
                    *default,
                    vec_as_ptr(&param.dependent_parameters),
                    param.dependent_parameters.len() as u64,
                );
            }
            Details::Indexed { names, default } => {
                let c_names: Vec<_> = names.iter().map(|name| c_string(name)).collect();
                let c_ptr_names: Vec<*const c_char> =
                    c_names.iter().map(|c_name| c_name.as_ptr()).collect();

                indexed_param(
                    indexed_ctx,
                    c_id.as_ptr(),
                    param.address,
                    c_name.as_ptr(),
                    flags,
                    vec_as_ptr(&c_ptr_names),
                    c_ptr_names.len() as u64,
                    *default as u64,
                    vec_as_ptr(&param.dependent_parameters),
                    param.dependent_parameters.len() as u64,
                );
            }
        }
    }
}

pub fn create_render_state<K: Kernel>() -> *mut RenderState<K> {
    debug!("creating render state");
    Box::into_raw(Box::new(RenderState::<K>::new()))
}

/// # Safety
/// `s` must come from `create_render_state` and not be used afterwards.
pub unsafe fn delete_render_state<K: Kernel>(s: *mut RenderState<K>) {
    if !s.is_null() {
        drop(Box::from_raw(s));
        debug!("deleted render state");
    }
}

/// # Safety
/// `s` must be a live render state with no render call in flight.
pub unsafe fn prepare_render_state<K: Kernel>(
    s: *mut RenderState<K>,
    input_count: u32,
    output_count: u32,
    sample_rate: f64,
    maximum_frames_to_render: u32,
) -> i32 {
    let state = match s.as_mut() {
        Some(state) => state,
        None => return STATUS_NULL_POINTER,
    };
    let result = state.prepare(AudioFormat {
        input_channel_count: input_count,
        output_channel_count: output_count,
        sample_rate,
        maximum_frames_to_render,
    });
    status(result, |err| err.status_code())
}

/// # Safety
/// `s` must be a live render state with no render call in flight.
pub unsafe fn release_render_state<K: Kernel>(s: *mut RenderState<K>) {
    if let Some(state) = s.as_mut() {
        state.release();
    }
}

/// # Safety
/// `s` must be a live render state with no render call in flight.
pub unsafe fn reset_render_state<K: Kernel>(s: *mut RenderState<K>) {
    if let Some(state) = s.as_mut() {
        state.reset();
    }
}

/// # Safety
/// `s` must be a live render state.
pub unsafe fn get_kernel_latency<K: Kernel>(s: *const RenderState<K>) -> u64 {
    s.as_ref().map_or(0, |state| state.latency())
}

/// Writes the kernel's bypass parameter, if it declares one.
///
/// # Safety
/// `b` must come from `get_parameter_bridge`.
pub unsafe fn set_kernel_bypass<K: Kernel>(b: *const ParameterBridge, bypassed: bool) -> i32 {
    let bridge = match b.as_ref() {
        Some(bridge) => bridge,
        None => return STATUS_NULL_POINTER,
    };
    status(
        bridge.write_bypass(K::info().bypass_param, bypassed),
        |err| err.status_code(),
    )
}

/// Hands the control thread its own reference to the parameter bridge. Free
/// it with `release_parameter_bridge`.
///
/// # Safety
/// `s` must be a live render state.
pub unsafe fn get_parameter_bridge<K: Kernel>(s: *const RenderState<K>) -> *const ParameterBridge {
    match s.as_ref() {
        Some(state) => Arc::into_raw(state.bridge()),
        None => std::ptr::null(),
    }
}

/// # Safety
/// `b` must come from `get_parameter_bridge` and not be used afterwards.
pub unsafe fn release_parameter_bridge(b: *const ParameterBridge) {
    if !b.is_null() {
        drop(Arc::from_raw(b));
    }
}

/// # Safety
/// `b` must come from `get_parameter_bridge`.
pub unsafe fn set_kernel_parameter(b: *const ParameterBridge, address: u64, value: f64) -> i32 {
    match b.as_ref() {
        Some(bridge) => status(bridge.write(address, value).map(|_| ()), |err| {
            debug!("{}", err);
            err.status_code()
        }),
        None => STATUS_NULL_POINTER,
    }
}

/// # Safety
/// `b` must come from `get_parameter_bridge`.
pub unsafe fn get_kernel_parameter(b: *const ParameterBridge, address: u64) -> f64 {
    b.as_ref()
        .and_then(|bridge| bridge.read(address).ok())
        .unwrap_or(0.)
}

/// # Safety
/// `b` must come from `get_parameter_bridge`.
pub unsafe fn begin_parameter_edit(b: *const ParameterBridge, address: u64) -> i32 {
    match b.as_ref() {
        Some(bridge) => status(bridge.begin_edit(address), |err| err.status_code()),
        None => STATUS_NULL_POINTER,
    }
}

/// # Safety
/// `b` must come from `get_parameter_bridge`.
pub unsafe fn end_parameter_edit(b: *const ParameterBridge, address: u64) -> i32 {
    match b.as_ref() {
        Some(bridge) => status(bridge.end_edit(address), |err| err.status_code()),
        None => STATUS_NULL_POINTER,
    }
}

/// Writes the display string for `value` into `out`, truncated to fit and
/// always NUL terminated. Returns the string length written, or a negative
/// status.
///
/// # Safety
/// `b` must come from `get_parameter_bridge`; `out` must point to `capacity`
/// writable bytes.
pub unsafe fn get_parameter_string(
    b: *const ParameterBridge,
    address: u64,
    value: f64,
    out: *mut c_char,
    capacity: usize,
) -> i32 {
    let bridge = match b.as_ref() {
        Some(bridge) => bridge,
        None => return STATUS_NULL_POINTER,
    };
    if out.is_null() || capacity == 0 {
        return STATUS_NULL_POINTER;
    }
    let text = match bridge.string_from_value(address, value) {
        Ok(text) => text,
        Err(err) => return err.status_code(),
    };
    let len = text.len().min(capacity - 1);
    std::ptr::copy_nonoverlapping(text.as_ptr() as *const c_char, out, len);
    *out.add(len) = 0;
    len as i32
}

#[repr(C)]
pub struct GlueEvent {
    pub time: i64,
    pub ty: u64,

    pub param_addr: u64,
    pub param_value: f64,
    pub param_ramp_time: u32,
}

pub type EventsFn = extern "C" fn(ctx: *mut c_void) -> *const GlueEvent;

struct GlueEventStream {
    events_ctx: *mut c_void,
    events_fn: Option<EventsFn>,
}

impl Iterator for GlueEventStream {
    type Item = event::Event;
    fn next(&mut self) -> Option<Self::Item> {
        let events_fn = self.events_fn?;
        loop {
            let gp = events_fn(self.events_ctx);
            if gp.is_null() {
                return None;
            }
            let ge = unsafe { &*gp };
            let data = match ge.ty {
                0 => event::Data::ParameterChange {
                    address: ge.param_addr,
                    value: ge.param_value,
                },
                1 => event::Data::RampedParameterChange {
                    address: ge.param_addr,
                    value: ge.param_value,
                    ramp_time: ge.param_ramp_time,
                },
                // Anything else (MIDI, sysex) is not ours to handle.
                _ => continue,
            };
            return Some(event::Event {
                time: ge.time,
                data,
            });
        }
    }
}

/// Host pull callback: fills `chans` channel pointers with `frames` frames,
/// returning 0 on success or a host status.
pub type PullFn =
    extern "C" fn(ctx: *mut c_void, frames: u32, data: *mut *mut f32, chans: u32) -> i32;

struct GluePull {
    pull_ctx: *mut c_void,
    pull_fn: Option<PullFn>,
}

impl PullInput for GluePull {
    fn pull(&mut self, mut destination: AudioBufferMut<'_, '_>) -> Result<usize, PullError> {
        let pull_fn = self.pull_fn.ok_or(PullError::Unavailable)?;
        let frames = destination.len();
        let mut ptrs: SmallVec<[*mut f32; 8]> = (&mut destination)
            .into_iter()
            .map(|chan| chan.as_mut_ptr())
            .collect();
        match pull_fn(
            self.pull_ctx,
            frames as u32,
            ptrs.as_mut_ptr(),
            ptrs.len() as u32,
        ) {
            0 => Ok(frames),
            err => Err(PullError::Host(err)),
        }
    }
}

/// # Safety
/// `s` must be a live, prepared render state used by no other thread for
/// the duration of the call. `data` must hold `chans` pointers to at least
/// `samples` writable floats each.
#[allow(clippy::too_many_arguments)]
pub unsafe fn render_kernel<K: Kernel>(
    s: *mut RenderState<K>,
    data: *mut *mut f32,
    chans: u64,
    samples: u64,
    pull_ctx: *mut c_void,
    pull_fn: Option<PullFn>,
    events_ctx: *mut c_void,
    events_fn: Option<EventsFn>,
) -> i32 {
    let state = match s.as_mut() {
        Some(state) => state,
        None => return STATUS_NULL_POINTER,
    };
    if data.is_null() {
        return STATUS_NULL_POINTER;
    }
    let mut chan_vec: SmallVec<[&mut [f32]; 8]> = (0..chans)
        .map(|chan| {
            let slice_ptr = *data.offset(chan as isize);
            std::slice::from_raw_parts_mut(slice_ptr, samples as usize)
        })
        .collect();
    let mut input = GluePull { pull_ctx, pull_fn };
    let events = GlueEventStream {
        events_ctx,
        events_fn,
    };
    let result = state.render(samples as usize, &mut input, (&mut chan_vec).into(), events);
    status(result, |err| err.status_code())
}

#[macro_export]
macro_rules! generate_glue {
    ($K:ty) => {
        use $crate::detail::{EventsFn, IndexedParamFn, NumericParamFn, PullFn};
        use $crate::fission_kernel::{ParameterBridge, RenderState};
        use $crate::libc::c_char;
        use $crate::libc::c_void;

        #[no_mangle]
        pub extern "C" fn get_kernel_allowed_channel_formats(
            add_format_ctx: *mut c_void,
            add_format: extern "C" fn(ctx: *mut c_void, input: i32, output: i32),
        ) {
            $crate::detail::get_kernel_allowed_channel_formats::<$K>(add_format_ctx, add_format);
        }

        #[no_mangle]
        pub extern "C" fn get_has_bypass_param() -> u64 {
            $crate::detail::get_has_bypass_param::<$K>()
        }

        #[no_mangle]
        pub extern "C" fn get_bypass_param() -> u64 {
            $crate::detail::get_bypass_param::<$K>()
        }

        #[no_mangle]
        pub extern "C" fn get_params(
            num_ctx: *mut c_void,
            numeric_param: NumericParamFn,
            indexed_ctx: *mut c_void,
            indexed_param: IndexedParamFn,
        ) {
            $crate::detail::get_params::<$K>(num_ctx, numeric_param, indexed_ctx, indexed_param);
        }

        #[no_mangle]
        pub extern "C" fn create_render_state() -> *mut RenderState<$K> {
            $crate::detail::create_render_state::<$K>()
        }

        #[no_mangle]
        pub unsafe extern "C" fn delete_render_state(s: *mut RenderState<$K>) {
            $crate::detail::delete_render_state(s)
        }

        #[no_mangle]
        pub unsafe extern "C" fn prepare_render_state(
            s: *mut RenderState<$K>,
            input_count: u32,
            output_count: u32,
            sample_rate: f64,
            maximum_frames_to_render: u32,
        ) -> i32 {
            $crate::detail::prepare_render_state(
                s,
                input_count,
                output_count,
                sample_rate,
                maximum_frames_to_render,
            )
        }

        #[no_mangle]
        pub unsafe extern "C" fn release_render_state(s: *mut RenderState<$K>) {
            $crate::detail::release_render_state(s)
        }

        #[no_mangle]
        pub unsafe extern "C" fn reset_render_state(s: *mut RenderState<$K>) {
            $crate::detail::reset_render_state(s)
        }

        #[no_mangle]
        pub unsafe extern "C" fn get_kernel_latency(s: *const RenderState<$K>) -> u64 {
            $crate::detail::get_kernel_latency(s)
        }

        #[no_mangle]
        pub unsafe extern "C" fn set_kernel_bypass(b: *const ParameterBridge, bypassed: bool) -> i32 {
            $crate::detail::set_kernel_bypass::<$K>(b, bypassed)
        }

        #[no_mangle]
        pub unsafe extern "C" fn get_parameter_bridge(
            s: *const RenderState<$K>,
        ) -> *const ParameterBridge {
            $crate::detail::get_parameter_bridge(s)
        }

        #[no_mangle]
        pub unsafe extern "C" fn release_parameter_bridge(b: *const ParameterBridge) {
            $crate::detail::release_parameter_bridge(b)
        }

        #[no_mangle]
        pub unsafe extern "C" fn set_kernel_parameter(
            b: *const ParameterBridge,
            address: u64,
            value: f64,
        ) -> i32 {
            $crate::detail::set_kernel_parameter(b, address, value)
        }

        #[no_mangle]
        pub unsafe extern "C" fn get_kernel_parameter(b: *const ParameterBridge, address: u64) -> f64 {
            $crate::detail::get_kernel_parameter(b, address)
        }

        #[no_mangle]
        pub unsafe extern "C" fn begin_parameter_edit(b: *const ParameterBridge, address: u64) -> i32 {
            $crate::detail::begin_parameter_edit(b, address)
        }

        #[no_mangle]
        pub unsafe extern "C" fn end_parameter_edit(b: *const ParameterBridge, address: u64) -> i32 {
            $crate::detail::end_parameter_edit(b, address)
        }

        #[no_mangle]
        pub unsafe extern "C" fn get_parameter_string(
            b: *const ParameterBridge,
            address: u64,
            value: f64,
            out: *mut c_char,
            capacity: usize,
        ) -> i32 {
            $crate::detail::get_parameter_string(b, address, value, out, capacity)
        }

        #[no_mangle]
        pub unsafe extern "C" fn render_kernel(
            s: *mut RenderState<$K>,
            data: *mut *mut f32,
            chans: u64,
            samples: u64,
            pull_ctx: *mut c_void,
            pull_fn: Option<PullFn>,
            events_ctx: *mut c_void,
            events_fn: Option<EventsFn>,
        ) -> i32 {
            $crate::detail::render_kernel(
                s, data, chans, samples, pull_ctx, pull_fn, events_ctx, events_fn,
            )
        }
    };
}
