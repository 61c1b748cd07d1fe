//! Core types for oximeter telemetry.
//!
//! - [`Frame`] is a checksum-valid protocol unit, inbound or outbound
//! - [`Reading`] is an SpO2 or pulse-rate value with an explicit unknown state
//! - [`WaveformSample`] is a smoothed plethysmograph value with its arrival time
//! - [`UpdateRate`] controls how often notification streams yield
//!
//! ## Usage Example
//!
//! ```rust
//! use oxiwave::types::{Frame, Reading};
//!
//! let frame = Frame::with_code(0x06, &[0x41]).unwrap();
//! assert_eq!(frame.to_bytes(), vec![0xAA, 0x55, 0x02, 0x06, 0x41, 0x49]);
//!
//! assert_eq!(Reading::Unknown.as_i32(), -1);
//! ```

mod frame;
mod reading;
mod sample;
mod update_rate;

pub use frame::Frame;
pub use reading::Reading;
pub use sample::WaveformSample;
pub use update_rate::UpdateRate;
