//! ## Constants
//!
//! Various constants used throughout the project.
//!

pub mod misc {
    /// The fixed per-session timeout applied at open, in milliseconds
    pub const DEFAULT_TIMEOUT_MS: u32 = 200;
    /// Maximum number of bytes accepted by a single read
    pub const READ_BUFFER_SIZE: usize = 8000;
    /// Standard identity query issued after a successful connect
    pub const IDENTITY_QUERY: &str = "*IDN?";
}

pub mod si {
    /// Exponents that correspond to a metric prefix. The decoder snaps
    /// every reply exponent into this set.
    pub const VALID_EXPONENTS: [i32; 17] = [
        -24, -21, -18, -15, -12, -9, -6, -3, 0, 3, 6, 9, 12, 15, 18, 21, 24,
    ];
}

pub mod status {
    use crate::provider::Status;

    /// Threshold for provider status codes. Values below this indicate failure.
    pub const SUCCESS: Status = 0;
}
