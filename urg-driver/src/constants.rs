pub(crate) const ACQUISITION_THREAD_NAME: &str = "urg-acquisition";
pub(crate) const DEFAULT_ERROR_CHANNEL_CAPACITY: usize = 64;
pub(crate) const STATS_LOG_INTERVAL: u64 = 1000;
