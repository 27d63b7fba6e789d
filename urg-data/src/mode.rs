#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Measurement kind requested from the sensor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScanMode {
    /// One distance per step.
    Distance,
    /// One distance and one intensity per step.
    #[default]
    DistanceIntensity,
    /// Up to `max_echo_size` distances per step, interleaved.
    MultiEcho,
    /// Interleaved multi-echo distances with matching intensities.
    MultiEchoIntensity,
}

impl ScanMode {
    pub fn requires_intensity(self) -> bool {
        matches!(self, ScanMode::DistanceIntensity | ScanMode::MultiEchoIntensity)
    }

    pub fn is_multiecho(self) -> bool {
        matches!(self, ScanMode::MultiEcho | ScanMode::MultiEchoIntensity)
    }
}
