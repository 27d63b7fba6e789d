use std::fmt;

/// Lifecycle state of a [`crate::Device`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceState {
    Closed,
    Open,
    Scanning,
    Stopped,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            DeviceState::Closed => "closed",
            DeviceState::Open => "open",
            DeviceState::Scanning => "scanning",
            DeviceState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
