//! Serial wire protocol: envelope constants, checksum, framing and command encoding.
//!
//! Both directions share one envelope:
//!
//! ```text
//! byte 0-1 : marker     0xAA 0x55
//! byte 2   : length L   payload byte count, 0-255
//! byte 3.. : payload    L bytes, payload[0] = message code
//! byte 3+L : checksum   (L + sum(payload)) mod 256
//! ```

pub mod checksum;
pub mod command;
pub mod framer;

pub use command::{ResponseTime, START_STREAMING, encode_response_time_setting};
pub use framer::{FramerStats, PacketFramer};

/// Two-byte sequence opening every frame.
pub const FRAME_MARKER: [u8; 2] = [0xAA, 0x55];

/// Marker, length byte and checksum: the size of a frame with an empty payload.
pub const FRAME_OVERHEAD: usize = 4;

/// Message code of inbound vital-signs telemetry.
pub const CODE_TELEMETRY: u8 = 21;

/// Message code of outbound setting commands.
pub const CODE_SETTING: u8 = 6;
