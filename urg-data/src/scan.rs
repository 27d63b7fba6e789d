#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Struct to hold one sweep of rangefinder data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scan {
    /// Distance to an object in mm, index-aligned to the sensor step order.
    pub distances: Vec<i64>,
    /// Return strength per distance sample. Empty when the mode has no intensity.
    pub intensities: Vec<u16>,
    /// Sensor clock timestamp of the sweep.
    pub timestamp: u64,
}

impl Scan {
    pub fn new() -> Scan {
        Scan::default()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Compares the samples of two scans, ignoring the timestamp.
    pub fn same_samples(&self, other: &Scan) -> bool {
        self.distances == other.distances && self.intensities == other.intensities
    }

    /// Overwrites `self` with `other` while keeping the existing allocations.
    pub fn copy_from(&mut self, other: &Scan) {
        self.distances.clone_from(&other.distances);
        self.intensities.clone_from(&other.intensities);
        self.timestamp = other.timestamp;
    }
}
