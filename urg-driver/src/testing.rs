use crate::error::{Result, UrgError};
use crate::time::sleep_ms;
use crate::transport::{ScanCount, Transport};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::thread::ThreadId;
use urg_data::{ConnectionConfig, DeviceInfo, Scan, ScanMode, SensorParameters};

/// Result of one queued fetch.
pub(crate) enum FetchStep {
    Scan(Scan),
    Fail(String),
}

impl FetchStep {
    pub(crate) fn scan(distances: Vec<i64>, intensities: Vec<u16>, timestamp: u64) -> FetchStep {
        FetchStep::Scan(Scan {
            distances,
            intensities,
            timestamp,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Open(ConnectionConfig),
    Close,
    SetScanningParameter(i32, i32, u32),
    SetSensorTimestamp,
    StartMeasurement(ScanMode, ScanCount, u32),
    StopMeasurement,
    Fetch,
}

struct ScriptState {
    open: bool,
    calls: Vec<Call>,
    steps: VecDeque<FetchStep>,
    fetch_threads: HashSet<ThreadId>,
    open_error: Option<String>,
    start_error: Option<String>,
}

/// Transport replaying queued fetch results and recording every call.
/// Clones share the same script, so a test keeps one to inspect the other.
#[derive(Clone)]
pub(crate) struct ScriptedTransport {
    inner: Arc<Mutex<ScriptState>>,
}

pub(crate) fn test_parameters() -> SensorParameters {
    SensorParameters {
        min_step: 0,
        max_step: 4,
        front_step: 2,
        area_resolution: 8,
        min_distance: 20,
        max_distance: 5600,
        scan_usec: 100000,
        max_data_size: 5,
        max_echo_size: 1,
    }
}

impl ScriptedTransport {
    pub(crate) fn new() -> ScriptedTransport {
        ScriptedTransport {
            inner: Arc::new(Mutex::new(ScriptState {
                open: false,
                calls: Vec::new(),
                steps: VecDeque::new(),
                fetch_threads: HashSet::new(),
                open_error: None,
                start_error: None,
            })),
        }
    }

    pub(crate) fn push(&self, step: FetchStep) {
        self.inner.lock().steps.push_back(step);
    }

    pub(crate) fn fail_open(&self, message: &str) {
        self.inner.lock().open_error = Some(message.to_string());
    }

    pub(crate) fn fail_start(&self, message: &str) {
        self.inner.lock().start_error = Some(message.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.inner.lock().calls.clone()
    }

    pub(crate) fn fetch_count(&self) -> usize {
        let inner = self.inner.lock();
        inner.calls.iter().filter(|c| **c == Call::Fetch).count()
    }

    pub(crate) fn fetch_thread_count(&self) -> usize {
        self.inner.lock().fetch_threads.len()
    }

    fn record(&self, call: Call) {
        self.inner.lock().calls.push(call);
    }

    fn next_step(&self) -> Result<Scan> {
        let step = {
            let mut inner = self.inner.lock();
            inner.calls.push(Call::Fetch);
            inner.fetch_threads.insert(std::thread::current().id());
            inner.steps.pop_front()
        };
        match step {
            Some(FetchStep::Scan(scan)) => Ok(scan),
            Some(FetchStep::Fail(message)) => Err(UrgError::Transport(message)),
            None => {
                // Stands in for the sensor round trip.
                sleep_ms(1);
                Err(UrgError::FetchFailed("no scan queued".to_string()))
            }
        }
    }
}

impl Transport for ScriptedTransport {
    fn open(&mut self, config: &ConnectionConfig) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::Open(config.clone()));
        if let Some(message) = inner.open_error.clone() {
            return Err(UrgError::Transport(message));
        }
        inner.open = true;
        Ok(())
    }

    fn close(&mut self) {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::Close);
        inner.open = false;
    }

    fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    fn set_scanning_parameter(&mut self, min_step: i32, max_step: i32, skip: u32) -> Result<()> {
        self.record(Call::SetScanningParameter(min_step, max_step, skip));
        Ok(())
    }

    fn set_sensor_timestamp(&mut self, _host_ms: u64) -> Result<()> {
        self.record(Call::SetSensorTimestamp);
        Ok(())
    }

    fn start_measurement(&mut self, mode: ScanMode, count: ScanCount, skip: u32) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::StartMeasurement(mode, count, skip));
        match inner.start_error.clone() {
            Some(message) => Err(UrgError::Transport(message)),
            None => Ok(()),
        }
    }

    fn stop_measurement(&mut self) -> Result<()> {
        self.record(Call::StopMeasurement);
        Ok(())
    }

    fn fetch_distance(&mut self, distances: &mut Vec<i64>) -> Result<u64> {
        let scan = self.next_step()?;
        distances.extend(scan.distances);
        Ok(scan.timestamp)
    }

    fn fetch_distance_intensity(
        &mut self,
        distances: &mut Vec<i64>,
        intensities: &mut Vec<u16>,
    ) -> Result<u64> {
        let scan = self.next_step()?;
        distances.extend(scan.distances);
        intensities.extend(scan.intensities);
        Ok(scan.timestamp)
    }

    fn device_info(&mut self) -> Result<DeviceInfo> {
        Ok(DeviceInfo {
            product_type: "UTM-30LX".to_string(),
            firmware_version: "1.1.0".to_string(),
            serial_id: "H0000001".to_string(),
            status: "Sensor works well.".to_string(),
            state: "Idle".to_string(),
        })
    }

    fn parameters(&mut self) -> Result<SensorParameters> {
        Ok(test_parameters())
    }
}

/// Polls `condition` every millisecond for up to one second.
pub(crate) fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..1000 {
        if condition() {
            return true;
        }
        sleep_ms(1);
    }
    condition()
}
