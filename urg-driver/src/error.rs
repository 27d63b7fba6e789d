use crate::state::DeviceState;
use std::io;
use urg_data::ScanMode;

pub type Result<T> = std::result::Result<T, UrgError>;

#[derive(Debug, thiserror::Error)]
pub enum UrgError {
    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    #[error("Sensor refused to start scanning: {0}")]
    StartFailed(String),

    #[error("Device is already scanning")]
    AlreadyScanning,

    #[error("Cannot {operation} while the device is {state}")]
    InvalidState {
        operation: &'static str,
        state: DeviceState,
    },

    #[error("Failed to fetch a scan: {0}")]
    FetchFailed(String),

    #[error("Index {index} is out of range for a scan of {len} samples")]
    OutOfRange { index: usize, len: usize },

    #[error("Scan mode {0:?} is not supported by this transport")]
    Unsupported(ScanMode),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Acquisition thread panicked")]
    ThreadPanic,
}

impl UrgError {
    /// Wraps a transport failure raised while fetching, keeping `FetchFailed` as is.
    pub(crate) fn into_fetch_failed(self) -> UrgError {
        match self {
            UrgError::FetchFailed(_) => self,
            e => UrgError::FetchFailed(e.to_string()),
        }
    }
}
