//! A monitor bound to a running driver

use std::ops::Deref;
use std::path::Path;
use tracing::{debug, info};

use crate::config::MonitorConfig;
use crate::driver::{Driver, DriverHandle, DriverOptions};
use crate::monitor::Monitor;
use crate::transport::Transport;
use crate::transports::ReplayTransport;
use crate::Result;

/// Live or replayed sensor session.
///
/// Dereferences to the [`Monitor`] for queries and subscriptions. Dropping the
/// connection stops the driver task.
#[derive(Debug)]
pub struct Connection {
    monitor: Monitor,
    driver: DriverHandle,
    config: MonitorConfig,
}

impl Connection {
    /// Start a session over `transport`. Must be called within a Tokio runtime.
    pub fn attach<T: Transport>(transport: T, config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        info!("Attaching monitor to {}", transport.describe());
        let monitor = Monitor::new(config.clone());
        let driver = Driver::spawn(transport, monitor.clone(), DriverOptions::from(&config));
        Ok(Self { monitor, driver, config })
    }

    /// Replay a raw byte capture as if it arrived from the serial port.
    pub async fn replay<P: AsRef<Path>>(path: P, config: MonitorConfig) -> Result<Self> {
        let transport = ReplayTransport::open(path)?;
        Self::attach(transport, config)
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn driver(&self) -> &DriverHandle {
        &self.driver
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Send the response-time setting (4, 8 or 16 seconds) to the device.
    pub async fn set_response_time(&self, seconds: u32) -> Result<()> {
        self.driver.set_response_time(seconds).await
    }
}

impl Deref for Connection {
    type Target = Monitor;

    fn deref(&self) -> &Monitor {
        &self.monitor
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!("Dropping connection");
        self.driver.cancel();
    }
}
