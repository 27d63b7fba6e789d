//! Background scan acquisition for URG scanning rangefinders.
//!
//! A [`Device`] owns a [`Transport`] and, while scanning, a worker thread that
//! fetches scans as fast as the sensor delivers them. The foreground calls
//! [`Device::update`] once per tick to publish the latest complete scan.

mod acquisition;
mod constants;
mod device;
mod error;
mod geometry;
mod sim;
mod state;
#[cfg(test)]
mod testing;
mod time;
mod transport;

pub use crate::acquisition::AcquisitionStats;
pub use crate::device::{Device, DeviceOptions};
pub use crate::error::{Result, UrgError};
pub use crate::geometry::{degrees_to_radians, radians_to_degrees, StepTable};
pub use crate::sim::SimulatedTransport;
pub use crate::state::DeviceState;
pub use crate::transport::{ScanCount, Transport};
pub use urg_data::{ConnectionConfig, DeviceInfo, Scan, ScanMode, SensorParameters};
