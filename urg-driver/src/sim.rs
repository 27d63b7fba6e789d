//! Synthetic sensor for demos and hardware-free runs.
//!
//! The sensor stands in the middle of a rectangular room. A pillar orbits it,
//! so consecutive scans differ.

use crate::error::{Result, UrgError};
use crate::geometry::StepTable;
use crate::time::sleep_ms;
use crate::transport::{ScanCount, Transport};
use urg_data::{ConnectionConfig, DeviceInfo, ScanMode, SensorParameters};

const ROOM_HALF_WIDTH_MM: f64 = 3000.;
const ROOM_HALF_DEPTH_MM: f64 = 2000.;
const PILLAR_ORBIT_MM: f64 = 1200.;
const PILLAR_RADIUS_MM: f64 = 150.;
const PILLAR_STEP_RADIAN: f64 = 0.05;

fn utm_30lx_parameters() -> SensorParameters {
    SensorParameters {
        min_step: 0,
        max_step: 1080,
        front_step: 540,
        area_resolution: 1440,
        min_distance: 23,
        max_distance: 60000,
        scan_usec: 25000,
        max_data_size: 1081,
        max_echo_size: 3,
    }
}

/// Transport producing a deterministic synthetic scene.
pub struct SimulatedTransport {
    parameters: SensorParameters,
    open: bool,
    measuring: Option<(ScanMode, ScanCount)>,
    first_step: i32,
    last_step: i32,
    frame: u64,
    clock_offset_usec: u64,
    latency_ms: u64,
    fail_every: Option<u64>,
}

impl SimulatedTransport {
    pub fn new() -> SimulatedTransport {
        let parameters = utm_30lx_parameters();
        SimulatedTransport {
            first_step: parameters.min_step,
            last_step: parameters.max_step,
            parameters,
            open: false,
            measuring: None,
            frame: 0,
            clock_offset_usec: 0,
            latency_ms: 25,
            fail_every: None,
        }
    }

    /// Blocks every fetch for `latency_ms`, like a real sweep would.
    pub fn with_latency(mut self, latency_ms: u64) -> SimulatedTransport {
        self.latency_ms = latency_ms;
        self
    }

    /// Makes every `n`-th fetch fail. `0` disables failures.
    pub fn with_failure_every(mut self, n: u64) -> SimulatedTransport {
        self.fail_every = if n == 0 { None } else { Some(n) };
        self
    }

    fn ensure_measuring(&self, mode: ScanMode) -> Result<()> {
        if !self.open {
            return Err(UrgError::FetchFailed("not connected".to_string()));
        }
        match self.measuring {
            Some((measuring, _)) if measuring == mode => Ok(()),
            Some((measuring, _)) => Err(UrgError::FetchFailed(format!(
                "measuring {measuring:?}, requested {mode:?}"
            ))),
            None => Err(UrgError::FetchFailed("measurement not started".to_string())),
        }
    }

    fn next_frame(&mut self) -> Result<u64> {
        sleep_ms(self.latency_ms);
        self.frame += 1;
        if let Some((_, ScanCount::Finite(n))) = self.measuring {
            if self.frame > u64::from(n) {
                return Err(UrgError::FetchFailed("requested scans exhausted".to_string()));
            }
        }
        if let Some(n) = self.fail_every {
            if self.frame % n == 0 {
                return Err(UrgError::FetchFailed("simulated read timeout".to_string()));
            }
        }
        let elapsed = self.frame * (self.parameters.scan_usec.max(0) as u64);
        Ok(self.clock_offset_usec + elapsed)
    }

    fn range_at(&self, angle: f64) -> i64 {
        let (sin, cos) = angle.sin_cos();
        let wall_x = if cos.abs() > 1e-9 {
            ROOM_HALF_DEPTH_MM / cos.abs()
        } else {
            f64::INFINITY
        };
        let wall_y = if sin.abs() > 1e-9 {
            ROOM_HALF_WIDTH_MM / sin.abs()
        } else {
            f64::INFINITY
        };
        let mut distance = wall_x.min(wall_y);

        let pillar_angle = (self.frame as f64) * PILLAR_STEP_RADIAN;
        let delta = (angle - pillar_angle).sin().abs() * PILLAR_ORBIT_MM;
        if delta < PILLAR_RADIUS_MM && (angle - pillar_angle).cos() > 0. {
            distance = distance.min(PILLAR_ORBIT_MM - PILLAR_RADIUS_MM);
        }
        (distance as i64).clamp(self.parameters.min_distance, self.parameters.max_distance)
    }

    fn push_distances(&self, distances: &mut Vec<i64>, echoes: usize) -> Result<()> {
        let table = StepTable::new(&self.parameters)
            .ok_or_else(|| UrgError::Transport("invalid parameters".to_string()))?;
        for step in self.first_step..=self.last_step {
            distances.push(self.range_at(table.step_to_angle(step)));
            // Only one echo comes back from solid walls.
            distances.extend(std::iter::repeat(0).take(echoes.saturating_sub(1)));
        }
        Ok(())
    }

    fn push_intensities(distances: &[i64], intensities: &mut Vec<u16>) {
        intensities.extend(distances.iter().map(|d| {
            if *d == 0 {
                0
            } else {
                (12000 - (*d).min(6000) * 2) as u16
            }
        }));
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        SimulatedTransport::new()
    }
}

impl Transport for SimulatedTransport {
    fn open(&mut self, config: &ConnectionConfig) -> Result<()> {
        log::debug!("Simulated sensor answering on {config}");
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
        self.measuring = None;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn set_scanning_parameter(&mut self, min_step: i32, max_step: i32, _skip: u32) -> Result<()> {
        if min_step < self.parameters.min_step
            || max_step > self.parameters.max_step
            || min_step > max_step
        {
            return Err(UrgError::Transport(format!(
                "invalid scanning range {min_step}..={max_step}"
            )));
        }
        self.first_step = min_step;
        self.last_step = max_step;
        Ok(())
    }

    fn set_sensor_timestamp(&mut self, host_ms: u64) -> Result<()> {
        self.clock_offset_usec = host_ms.saturating_mul(1000);
        Ok(())
    }

    fn start_measurement(&mut self, mode: ScanMode, count: ScanCount, _skip: u32) -> Result<()> {
        if !self.open {
            return Err(UrgError::Transport("not connected".to_string()));
        }
        self.measuring = Some((mode, count));
        self.frame = 0;
        Ok(())
    }

    fn stop_measurement(&mut self) -> Result<()> {
        self.measuring = None;
        Ok(())
    }

    fn fetch_distance(&mut self, distances: &mut Vec<i64>) -> Result<u64> {
        self.ensure_measuring(ScanMode::Distance)?;
        let timestamp = self.next_frame()?;
        self.push_distances(distances, 1)?;
        Ok(timestamp)
    }

    fn fetch_distance_intensity(
        &mut self,
        distances: &mut Vec<i64>,
        intensities: &mut Vec<u16>,
    ) -> Result<u64> {
        self.ensure_measuring(ScanMode::DistanceIntensity)?;
        let timestamp = self.next_frame()?;
        self.push_distances(distances, 1)?;
        Self::push_intensities(distances, intensities);
        Ok(timestamp)
    }

    fn fetch_multiecho(&mut self, distances: &mut Vec<i64>) -> Result<u64> {
        self.ensure_measuring(ScanMode::MultiEcho)?;
        let timestamp = self.next_frame()?;
        self.push_distances(distances, self.parameters.max_echo_size)?;
        Ok(timestamp)
    }

    fn fetch_multiecho_intensity(
        &mut self,
        distances: &mut Vec<i64>,
        intensities: &mut Vec<u16>,
    ) -> Result<u64> {
        self.ensure_measuring(ScanMode::MultiEchoIntensity)?;
        let timestamp = self.next_frame()?;
        self.push_distances(distances, self.parameters.max_echo_size)?;
        Self::push_intensities(distances, intensities);
        Ok(timestamp)
    }

    fn device_info(&mut self) -> Result<DeviceInfo> {
        Ok(DeviceInfo {
            product_type: "Simulated UTM-30LX".to_string(),
            firmware_version: "0.0.0".to_string(),
            serial_id: "SIM00001".to_string(),
            status: "Sensor works well.".to_string(),
            state: if self.measuring.is_some() {
                "Measuring".to_string()
            } else {
                "Idle".to_string()
            },
        })
    }

    fn parameters(&mut self) -> Result<SensorParameters> {
        Ok(self.parameters.clone())
    }
}
