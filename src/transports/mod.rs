//! Transport implementations

pub mod channel;
pub mod replay;

pub use channel::{ChannelFeeder, ChannelTransport};
pub use replay::ReplayTransport;
