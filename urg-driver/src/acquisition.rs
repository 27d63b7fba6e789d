use crate::constants::{ACQUISITION_THREAD_NAME, STATS_LOG_INTERVAL};
use crate::error::{Result, UrgError};
use crate::transport::Transport;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use urg_data::{Scan, ScanMode};

pub(crate) type SharedTransport = Arc<Mutex<Box<dyn Transport>>>;

/// Latest fetched scan, written by the acquisition thread and read by `update`.
#[derive(Debug, Default)]
pub(crate) struct StagedBuffer {
    pub(crate) scan: Scan,
    pub(crate) dirty: bool,
}

/// Counters shared between the acquisition thread and the device.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    scans: AtomicU64,
    errors: AtomicU64,
}

impl Counters {
    pub(crate) fn snapshot(&self) -> AcquisitionStats {
        AcquisitionStats {
            scans: self.scans.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Number of scans staged and fetches failed since the device was created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AcquisitionStats {
    pub scans: u64,
    pub errors: u64,
}

/// Everything the acquisition thread needs, moved into it on spawn.
pub(crate) struct AcquisitionContext {
    pub(crate) transport: SharedTransport,
    pub(crate) mode: ScanMode,
    pub(crate) staged: Arc<Mutex<StagedBuffer>>,
    pub(crate) counters: Arc<Counters>,
    pub(crate) error_tx: Sender<UrgError>,
}

/// Handle to the running acquisition thread.
/// The thread is signalled and joined when the handle is dropped.
pub(crate) struct AcquisitionThread {
    terminator_tx: Sender<bool>,
    thread: Option<JoinHandle<()>>,
}

impl AcquisitionThread {
    pub(crate) fn spawn(context: AcquisitionContext) -> Result<AcquisitionThread> {
        let (terminator_tx, terminator_rx) = bounded(1);
        let thread = std::thread::Builder::new()
            .name(ACQUISITION_THREAD_NAME.to_string())
            .spawn(move || acquire_scans(context, terminator_rx))?;
        Ok(AcquisitionThread {
            terminator_tx,
            thread: Some(thread),
        })
    }

    /// Signals the thread and blocks until it has left its loop.
    pub(crate) fn join(&mut self) -> Result<()> {
        // A full channel already carries a termination request.
        let _ = self.terminator_tx.try_send(true);
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| UrgError::ThreadPanic),
            None => Ok(()),
        }
    }
}

impl Drop for AcquisitionThread {
    fn drop(&mut self) {
        if let Err(e) = self.join() {
            log::error!("{e}");
        }
    }
}

fn acquire_scans(context: AcquisitionContext, terminator_rx: Receiver<bool>) {
    let AcquisitionContext {
        transport,
        mode,
        staged,
        counters,
        error_tx,
    } = context;

    log::debug!("Acquisition started in {mode:?} mode");
    let mut scratch = Scan::new();
    while !do_terminate(&terminator_rx) {
        let fetched = {
            let mut transport = transport.lock();
            fetch_scan(&mut **transport, mode, &mut scratch)
        };

        match fetched {
            Ok(()) => {
                {
                    let mut staged = staged.lock();
                    std::mem::swap(&mut staged.scan, &mut scratch);
                    staged.dirty = true;
                }
                let count = counters.scans.fetch_add(1, Ordering::Relaxed) + 1;
                log::trace!("Staged scan #{count}");
                if count % STATS_LOG_INTERVAL == 0 {
                    let errors = counters.errors.load(Ordering::Relaxed);
                    log::info!("Acquisition stats: {count} scans, {errors} failed fetches");
                }
            }
            Err(e) => {
                counters.errors.fetch_add(1, Ordering::Relaxed);
                log::warn!("{e}");
                // Nobody is draining the channel; the log line above is enough.
                let _ = error_tx.try_send(e);
            }
        }
    }
    log::debug!("Acquisition thread exiting");
}

/// Requests one scan for `mode` into `scan`.
/// On error the contents of `scan` are unspecified.
pub(crate) fn fetch_scan(transport: &mut dyn Transport, mode: ScanMode, scan: &mut Scan) -> Result<()> {
    scan.distances.clear();
    scan.intensities.clear();

    let fetched = match mode {
        ScanMode::Distance => transport.fetch_distance(&mut scan.distances),
        ScanMode::DistanceIntensity => {
            transport.fetch_distance_intensity(&mut scan.distances, &mut scan.intensities)
        }
        ScanMode::MultiEcho => transport.fetch_multiecho(&mut scan.distances),
        ScanMode::MultiEchoIntensity => {
            transport.fetch_multiecho_intensity(&mut scan.distances, &mut scan.intensities)
        }
    };
    scan.timestamp = fetched.map_err(UrgError::into_fetch_failed)?;

    if mode.requires_intensity() && scan.intensities.len() != scan.distances.len() {
        return Err(UrgError::FetchFailed(format!(
            "received {} intensities for {} distances",
            scan.intensities.len(),
            scan.distances.len()
        )));
    }
    if !mode.requires_intensity() {
        scan.intensities.clear();
    }
    Ok(())
}

/// True once a termination request arrived or the device side hung up.
pub(crate) fn do_terminate(terminator_rx: &Receiver<bool>) -> bool {
    !matches!(terminator_rx.try_recv(), Err(TryRecvError::Empty))
}
