#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identity strings reported by the sensor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceInfo {
    pub product_type: String,
    pub firmware_version: String,
    pub serial_id: String,
    pub status: String,
    pub state: String,
}

/// Measurement capabilities reported by the sensor.
/// All zero until a connection has been opened.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorParameters {
    /// First measurable step.
    pub min_step: i32,
    /// Last measurable step.
    pub max_step: i32,
    /// Step pointing straight ahead (angle zero).
    pub front_step: i32,
    /// Number of steps in a full revolution.
    pub area_resolution: i32,
    /// Minimum valid distance in mm.
    pub min_distance: i64,
    /// Maximum valid distance in mm.
    pub max_distance: i64,
    /// Duration of one sweep in microseconds.
    pub scan_usec: i64,
    /// Largest number of steps a scan may contain.
    pub max_data_size: usize,
    /// Largest number of echoes per step.
    pub max_echo_size: usize,
}
