use crate::acquisition::{
    AcquisitionContext, AcquisitionStats, AcquisitionThread, Counters, SharedTransport,
    StagedBuffer,
};
use crate::constants::DEFAULT_ERROR_CHANNEL_CAPACITY;
use crate::error::{Result, UrgError};
use crate::geometry::StepTable;
use crate::state::DeviceState;
use crate::transport::{ScanCount, Transport};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use urg_data::{ConnectionConfig, DeviceInfo, Scan, ScanMode, SensorParameters};

/// Tunables that are not part of the connection itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceOptions {
    /// Number of scans the sensor skips between two transmitted scans.
    pub skip_scans: u32,
    /// Fetch errors kept for [`Device::errors`] before new ones are dropped.
    pub error_capacity: usize,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        DeviceOptions {
            skip_scans: 0,
            error_capacity: DEFAULT_ERROR_CHANNEL_CAPACITY,
        }
    }
}

/// A rangefinder polled by a background acquisition thread.
///
/// The acquisition thread stages every successfully fetched scan. The
/// foreground calls [`Device::update`] once per tick to publish the staged scan
/// and reads it back through [`Device::data`] and [`Device::intensity`].
pub struct Device {
    transport: SharedTransport,
    config: ConnectionConfig,
    options: DeviceOptions,
    state: DeviceState,
    mode: ScanMode,
    info: DeviceInfo,
    parameters: SensorParameters,
    step_table: Option<StepTable>,
    staged: Arc<Mutex<StagedBuffer>>,
    published: Scan,
    frame_new: bool,
    acquisition: Option<AcquisitionThread>,
    counters: Arc<Counters>,
    error_tx: Sender<UrgError>,
    error_rx: Receiver<UrgError>,
    created_at: Instant,
}

impl Device {
    pub fn new<T: Transport + 'static>(transport: T, config: ConnectionConfig) -> Device {
        Device::with_options(transport, config, DeviceOptions::default())
    }

    pub fn with_options<T: Transport + 'static>(
        transport: T,
        config: ConnectionConfig,
        options: DeviceOptions,
    ) -> Device {
        let (error_tx, error_rx) = bounded(options.error_capacity);
        Device {
            transport: Arc::new(Mutex::new(Box::new(transport) as Box<dyn Transport>)),
            config,
            options,
            state: DeviceState::Closed,
            mode: ScanMode::default(),
            info: DeviceInfo::default(),
            parameters: SensorParameters::default(),
            step_table: None,
            staged: Arc::new(Mutex::new(StagedBuffer::default())),
            published: Scan::new(),
            frame_new: false,
            acquisition: None,
            counters: Arc::new(Counters::default()),
            error_tx,
            error_rx,
            created_at: Instant::now(),
        }
    }

    /// Connects over a serial line. An empty `path` selects the default device.
    pub fn setup_serial(&mut self, path: &str, baud_rate: u32) -> Result<()> {
        self.reconfigure(ConnectionConfig::serial(path, baud_rate))?;
        self.open()
    }

    pub fn setup_network(&mut self, host: &str, port: u16) -> Result<()> {
        self.reconfigure(ConnectionConfig::network(host, port))?;
        self.open()
    }

    fn reconfigure(&mut self, config: ConnectionConfig) -> Result<()> {
        if self.state != DeviceState::Closed {
            return Err(self.invalid_state("change the connection"));
        }
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Mode of the current or most recent scanning session.
    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    fn invalid_state(&self, operation: &'static str) -> UrgError {
        UrgError::InvalidState {
            operation,
            state: self.state,
        }
    }

    /// Opens the connection and reads the sensor identity and parameters.
    ///
    /// On an already open device this only re-applies the scanning range.
    pub fn open(&mut self) -> Result<()> {
        match self.state {
            DeviceState::Closed => (),
            DeviceState::Open => return self.apply_scanning_parameters(),
            DeviceState::Scanning | DeviceState::Stopped => {
                return Err(self.invalid_state("open"));
            }
        }

        let connected = self.connect();
        if let Err(e) = connected {
            self.disconnect();
            log::error!("Connection to {} failed: {}", self.config, e);
            return Err(UrgError::ConnectFailed(e.to_string()));
        }

        self.state = DeviceState::Open;
        log::info!(
            "Connected to {} ({}, firmware {})",
            self.config,
            self.info.product_type,
            self.info.firmware_version
        );
        Ok(())
    }

    fn connect(&mut self) -> Result<()> {
        let (info, parameters) = {
            let mut transport = self.transport.lock();
            transport.open(&self.config)?;
            (transport.device_info()?, transport.parameters()?)
        };
        let step_table = StepTable::new(&parameters).ok_or_else(|| {
            UrgError::Transport(format!("invalid sensor parameters {parameters:?}"))
        })?;

        self.info = info;
        self.parameters = parameters;
        self.step_table = Some(step_table);
        self.apply_scanning_parameters()
    }

    fn apply_scanning_parameters(&mut self) -> Result<()> {
        let host_ms = self.created_at.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
        let mut transport = self.transport.lock();
        transport.set_scanning_parameter(
            self.parameters.min_step,
            self.parameters.max_step,
            self.options.skip_scans,
        )?;
        transport.set_sensor_timestamp(host_ms)?;
        Ok(())
    }

    /// Starts measurement in `mode` and spawns the acquisition thread.
    pub fn start(&mut self, mode: ScanMode) -> Result<()> {
        match self.state {
            DeviceState::Open | DeviceState::Stopped => (),
            DeviceState::Scanning => return Err(UrgError::AlreadyScanning),
            DeviceState::Closed => return Err(self.invalid_state("start")),
        }

        {
            let mut transport = self.transport.lock();
            if let Err(e) = transport.stop_measurement() {
                log::debug!("Ignoring failed measurement reset: {e}");
            }
            transport
                .start_measurement(mode, ScanCount::Infinite, self.options.skip_scans)
                .map_err(|e| UrgError::StartFailed(e.to_string()))?;
        }

        let context = AcquisitionContext {
            transport: Arc::clone(&self.transport),
            mode,
            staged: Arc::clone(&self.staged),
            counters: Arc::clone(&self.counters),
            error_tx: self.error_tx.clone(),
        };
        let acquisition = match AcquisitionThread::spawn(context) {
            Ok(acquisition) => acquisition,
            Err(e) => {
                if let Err(stop_error) = self.transport.lock().stop_measurement() {
                    log::warn!("{stop_error}");
                }
                return Err(e);
            }
        };

        self.acquisition = Some(acquisition);
        self.mode = mode;
        self.state = DeviceState::Scanning;
        log::info!("Started scanning {} in {:?} mode", self.config, mode);
        Ok(())
    }

    /// Stops the acquisition thread and waits for it to exit.
    /// Does nothing unless the device is scanning.
    pub fn stop(&mut self) -> Result<()> {
        if self.state != DeviceState::Scanning {
            return Ok(());
        }

        let joined = match self.acquisition.take() {
            Some(mut acquisition) => acquisition.join(),
            None => Ok(()),
        };
        self.state = DeviceState::Stopped;
        let stopped = self.transport.lock().stop_measurement();
        log::info!("Stopped scanning {}", self.config);
        joined.and(stopped)
    }

    /// Stops scanning if needed and closes the connection.
    pub fn close(&mut self) -> Result<()> {
        if self.state == DeviceState::Closed {
            return Ok(());
        }
        let stopped = self.stop();
        self.disconnect();
        self.state = DeviceState::Closed;
        log::info!("Closed connection to {}", self.config);
        stopped
    }

    fn disconnect(&mut self) {
        {
            let mut transport = self.transport.lock();
            if transport.is_open() {
                transport.close();
            }
        }
        self.info = DeviceInfo::default();
        self.parameters = SensorParameters::default();
        self.step_table = None;
    }

    /// Publishes the staged scan if its samples differ from the published ones.
    ///
    /// Call once per foreground tick; [`Device::is_frame_new`] reports the outcome.
    pub fn update(&mut self) {
        let mut staged = self.staged.lock();
        if !staged.dirty {
            self.frame_new = false;
            return;
        }
        staged.dirty = false;
        self.frame_new = !staged.scan.same_samples(&self.published);
        if self.frame_new {
            self.published.copy_from(&staged.scan);
            log::trace!("Published scan of {} samples", self.published.len());
        }
    }

    /// True when the last [`Device::update`] published a changed scan.
    pub fn is_frame_new(&self) -> bool {
        self.frame_new
    }

    pub fn scan(&self) -> &Scan {
        &self.published
    }

    pub fn data(&self) -> &[i64] {
        &self.published.distances
    }

    pub fn intensity(&self) -> &[u16] {
        &self.published.intensities
    }

    pub fn timestamp(&self) -> u64 {
        self.published.timestamp
    }

    pub fn distance_at(&self, index: usize) -> Result<i64> {
        let data = self.data();
        data.get(index).copied().ok_or(UrgError::OutOfRange {
            index,
            len: data.len(),
        })
    }

    pub fn intensity_at(&self, index: usize) -> Result<u16> {
        let intensity = self.intensity();
        intensity.get(index).copied().ok_or(UrgError::OutOfRange {
            index,
            len: intensity.len(),
        })
    }

    /// Receiver of fetch failures reported by the acquisition thread.
    pub fn errors(&self) -> Receiver<UrgError> {
        self.error_rx.clone()
    }

    pub fn stats(&self) -> AcquisitionStats {
        self.counters.snapshot()
    }

    pub fn step_table(&self) -> Result<&StepTable> {
        self.step_table
            .as_ref()
            .ok_or(UrgError::InvalidState {
                operation: "convert steps",
                state: self.state,
            })
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn parameters(&self) -> &SensorParameters {
        &self.parameters
    }

    pub fn product_type(&self) -> &str {
        &self.info.product_type
    }

    pub fn firmware_version(&self) -> &str {
        &self.info.firmware_version
    }

    pub fn serial_id(&self) -> &str {
        &self.info.serial_id
    }

    pub fn status(&self) -> &str {
        &self.info.status
    }

    pub fn sensor_state(&self) -> &str {
        &self.info.state
    }

    pub fn min_step(&self) -> i32 {
        self.parameters.min_step
    }

    pub fn max_step(&self) -> i32 {
        self.parameters.max_step
    }

    pub fn min_distance(&self) -> i64 {
        self.parameters.min_distance
    }

    pub fn max_distance(&self) -> i64 {
        self.parameters.max_distance
    }

    pub fn scan_usec(&self) -> i64 {
        self.parameters.scan_usec
    }

    pub fn max_data_size(&self) -> usize {
        self.parameters.max_data_size
    }

    pub fn max_echo_size(&self) -> usize {
        self.parameters.max_echo_size
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("{e}");
        }
    }
}
