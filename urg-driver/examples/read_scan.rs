use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::time::Duration;
use urg_driver::{ConnectionConfig, Device, ScanMode, SimulatedTransport};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Distance,
    DistanceIntensity,
    MultiEcho,
    MultiEchoIntensity,
}

impl From<Mode> for ScanMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Distance => ScanMode::Distance,
            Mode::DistanceIntensity => ScanMode::DistanceIntensity,
            Mode::MultiEcho => ScanMode::MultiEcho,
            Mode::MultiEchoIntensity => ScanMode::MultiEchoIntensity,
        }
    }
}

/// Polls a simulated rangefinder and prints every new frame as JSON.
#[derive(Parser, Debug)]
#[command(about = "Reads scans from a simulated URG sensor.")]
struct Args {
    /// Serial device path. Connects over the network when omitted.
    #[arg(long)]
    serial: Option<String>,
    #[arg(long, default_value_t = 115200)]
    baud_rate: u32,
    #[arg(long, default_value = "192.168.0.10")]
    host: String,
    #[arg(long, default_value_t = 10940)]
    port: u16,
    #[arg(long, value_enum, default_value_t = Mode::DistanceIntensity)]
    mode: Mode,
    /// Foreground ticks per second.
    #[arg(long, default_value_t = 60)]
    rate: u64,
    /// Number of ticks to run.
    #[arg(long, default_value_t = 120)]
    ticks: u64,
    /// Make every n-th simulated fetch fail.
    #[arg(long, default_value_t = 0)]
    fail_every: u64,
}

#[derive(Serialize)]
struct Frame<'a> {
    tick: u64,
    timestamp: u64,
    front_distance: Option<i64>,
    scan: &'a urg_driver::Scan,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.serial {
        Some(path) => ConnectionConfig::serial(path, args.baud_rate),
        None => ConnectionConfig::network(&args.host, args.port),
    };
    let transport = SimulatedTransport::new().with_failure_every(args.fail_every);
    let mut device = Device::new(transport, config);
    device.open()?;

    log::info!("Product: {}", device.product_type());
    log::info!("Serial: {}", device.serial_id());
    log::info!("Status: {}", device.status());
    log::info!("State: {}", device.sensor_state());
    log::info!("Firmware version: {}", device.firmware_version());

    let mode: ScanMode = args.mode.into();
    device.start(mode)?;
    // Multi-echo scans interleave every echo of a step.
    let echoes = if mode.is_multiecho() {
        device.max_echo_size()
    } else {
        1
    };
    let front_index = device.step_table()?.angle_to_index(0.) * echoes;
    let tick = Duration::from_millis(1000 / args.rate.max(1));

    for n in 0..args.ticks {
        device.update();
        if device.is_frame_new() {
            let frame = Frame {
                tick: n,
                timestamp: device.timestamp(),
                front_distance: device.distance_at(front_index).ok(),
                scan: device.scan(),
            };
            println!("{}", serde_json::to_string(&frame)?);
        }
        std::thread::sleep(tick);
    }

    device.stop()?;
    let stats = device.stats();
    log::info!("{} scans, {} failed fetches", stats.scans, stats.errors);
    Ok(())
}
