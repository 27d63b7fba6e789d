#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_HOST: &str = "192.168.0.10";
pub const DEFAULT_PORT: u16 = 10940;
pub const DEFAULT_SERIAL_PATH: &str = "/dev/tty.usbmodemfa131";
pub const DEFAULT_BAUD_RATE: u32 = 115200;

/// Where the sensor is reached. Fixed for the lifetime of an open connection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConnectionConfig {
    Serial { path: String, baud_rate: u32 },
    Network { host: String, port: u16 },
}

impl ConnectionConfig {
    /// Serial connection. An empty path falls back to the default device path.
    pub fn serial(path: &str, baud_rate: u32) -> ConnectionConfig {
        let path = if path.is_empty() {
            DEFAULT_SERIAL_PATH
        } else {
            path
        };
        ConnectionConfig::Serial {
            path: path.to_string(),
            baud_rate,
        }
    }

    pub fn network(host: &str, port: u16) -> ConnectionConfig {
        ConnectionConfig::Network {
            host: host.to_string(),
            port,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig::network(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConnectionConfig::Serial { path, baud_rate } => write!(f, "{}@{}", path, baud_rate),
            ConnectionConfig::Network { host, port } => write!(f, "{}:{}", host, port),
        }
    }
}
