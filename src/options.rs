/// Default sanity limit on either screen dimension (2^24, per spec).
pub const DEFAULT_MAX_DIMENSION: u32 = 1 << 24;

/// Decode-time options.
///
/// Replaces the process-wide/thread-local flip flag and failure-reason
/// pointer of the distilled spec's C heritage with an explicit struct
/// threaded through the call, and an explicit `Result` for the outcome.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// 0 or 4 means "return RGBA"; 1, 2, or 3 request a post-decode
    /// channel conversion (see `convert::to_channels`).
    pub requested_channels: u8,

    /// When set, each output frame is vertically flipped in place after
    /// decode (and after channel conversion). Flips per frame, never
    /// across the whole stacked output buffer.
    pub flip_vertical: bool,

    /// Either logical-screen dimension exceeding this fails with
    /// `DecodeError::TooLarge`.
    pub max_dimension: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            requested_channels: 4,
            flip_vertical: false,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_requested_channels(mut self, channels: u8) -> Self {
        self.requested_channels = channels;
        self
    }

    pub fn with_flip_vertical(mut self, flip: bool) -> Self {
        self.flip_vertical = flip;
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }
}
