//! Stream combinators for notification subscribers

mod throttle;

pub use throttle::{Throttle, ThrottleExt};
