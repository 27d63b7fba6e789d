use crate::error::{Result, UrgError};
use urg_data::{ConnectionConfig, DeviceInfo, ScanMode, SensorParameters};

/// Number of scans requested by `start_measurement`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanCount {
    Finite(u32),
    Infinite,
}

/// Low-level binding to a physical sensor.
///
/// Implementations own the serial or network link and the request/response
/// protocol. Every method is called with the transport lock held, so an
/// implementation never sees concurrent calls. The `fetch_*` methods are
/// handed cleared buffers and push one sample per step (per echo in the
/// multi-echo variants), returning the sensor timestamp of the sweep.
pub trait Transport: Send {
    fn open(&mut self, config: &ConnectionConfig) -> Result<()>;

    fn close(&mut self);

    fn is_open(&self) -> bool;

    fn set_scanning_parameter(&mut self, min_step: i32, max_step: i32, skip: u32) -> Result<()>;

    /// Aligns the sensor clock with the host clock, given in milliseconds.
    fn set_sensor_timestamp(&mut self, host_ms: u64) -> Result<()>;

    fn start_measurement(&mut self, mode: ScanMode, count: ScanCount, skip: u32) -> Result<()>;

    fn stop_measurement(&mut self) -> Result<()>;

    fn fetch_distance(&mut self, distances: &mut Vec<i64>) -> Result<u64>;

    fn fetch_distance_intensity(
        &mut self,
        distances: &mut Vec<i64>,
        intensities: &mut Vec<u16>,
    ) -> Result<u64>;

    fn fetch_multiecho(&mut self, _distances: &mut Vec<i64>) -> Result<u64> {
        Err(UrgError::Unsupported(ScanMode::MultiEcho))
    }

    fn fetch_multiecho_intensity(
        &mut self,
        _distances: &mut Vec<i64>,
        _intensities: &mut Vec<u16>,
    ) -> Result<u64> {
        Err(UrgError::Unsupported(ScanMode::MultiEchoIntensity))
    }

    fn device_info(&mut self) -> Result<DeviceInfo>;

    fn parameters(&mut self) -> Result<SensorParameters>;
}
