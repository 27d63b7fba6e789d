pub mod connection;
pub mod device_info;
pub mod mode;
pub mod scan;

pub use connection::ConnectionConfig;
pub use device_info::{DeviceInfo, SensorParameters};
pub use mode::ScanMode;
pub use scan::Scan;
