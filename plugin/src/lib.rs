//! The stereo delay, exported over the C surface the host shim links against.
fission_glue::generate_glue!(fission_delay::DelayKernel);
