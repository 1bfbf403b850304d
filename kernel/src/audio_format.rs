/// The topology a kernel is prepared for. Fixed between a prepare and a
/// release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioFormat {
    pub input_channel_count: u32,
    pub output_channel_count: u32,
    pub sample_rate: f64,
    pub maximum_frames_to_render: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllowedChannels {
    AnyChannelCountAllowed,
    ChannelCountAllowed(u32),
}

impl AllowedChannels {
    pub fn allows(self, count: u32) -> bool {
        match self {
            AllowedChannels::AnyChannelCountAllowed => count > 0,
            AllowedChannels::ChannelCountAllowed(n) => n == count,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllowedFormat {
    pub input_channels: AllowedChannels,
    pub output_channels: AllowedChannels,
}

impl AllowedFormat {
    pub const fn exactly(input: u32, output: u32) -> AllowedFormat {
        AllowedFormat {
            input_channels: AllowedChannels::ChannelCountAllowed(input),
            output_channels: AllowedChannels::ChannelCountAllowed(output),
        }
    }

    pub fn allows(&self, format: &AudioFormat) -> bool {
        self.input_channels.allows(format.input_channel_count)
            && self.output_channels.allows(format.output_channel_count)
    }
}

/// Returns true if any of the advertised capability pairs accepts `format`.
pub fn is_supported(formats: &[AllowedFormat], format: &AudioFormat) -> bool {
    formats.iter().any(|allowed| allowed.allows(format))
}
