use std::io::Write as _;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use fanflow_control::{stream, DeviceAddress, DeviceClient, StreamConfig};
use fanflow_core::{FanBuild, ImageProvider, PacingClock, SampleMap, SolidColor, StillImage};

mod logging_setup;

#[derive(Parser, Debug)]
#[command(name = "fanflow", version, about = "Art-Net streaming client for LED fan displays")]
struct Cli {
    /// Device IP address.
    #[arg(long, default_value = "192.168.4.1", global = true)]
    ip: IpAddr,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream an image to the fan.
    Stream(StreamArgs),
    /// Actively observe the device log.
    ObserveLog(ObserveLogArgs),
    /// Estimate LED count and power draw for a fan build.
    Estimate(EstimateArgs),
}

#[derive(Parser, Debug)]
struct StreamArgs {
    /// Output endpoint to stream to.
    #[arg(long, value_enum, default_value_t = Endpoint::Concentric)]
    endpoint: Endpoint,

    /// Target frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Image file to stream.
    #[arg(long, conflicts_with = "color")]
    image: Option<PathBuf>,

    /// Solid color to stream instead of an image (hex RRGGBB).
    #[arg(long)]
    color: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Endpoint {
    Concentric,
    Cartesian,
}

impl Endpoint {
    fn name(self) -> &'static str {
        match self {
            Endpoint::Concentric => "concentric",
            Endpoint::Cartesian => "cartesian",
        }
    }
}

#[derive(Parser, Debug)]
struct ObserveLogArgs {
    /// Poll interval in seconds.
    #[arg(long, default_value_t = 1.0)]
    interval: f64,
}

#[derive(Parser, Debug)]
struct EstimateArgs {
    /// Number of blades carrying LED strips.
    #[arg(long)]
    blades: u32,

    /// LED strip density, LEDs per meter.
    #[arg(long)]
    leds_per_m: u32,

    /// Rotation speed.
    #[arg(long)]
    rpm: f64,

    /// Fan radius in cm.
    #[arg(long)]
    radius: u32,

    /// LEDs mirrored on both blade halves.
    #[arg(long)]
    mirror: bool,
}

fn main() -> Result<()> {
    logging_setup::init()?;

    let cli = Cli::parse();
    match cli.cmd {
        Command::Stream(args) => run_stream(cli.ip, args),
        Command::ObserveLog(args) => observe_log(cli.ip, args),
        Command::Estimate(args) => {
            print_estimate(&args);
            Ok(())
        }
    }
}

fn run_stream(ip: IpAddr, args: StreamArgs) -> Result<()> {
    let provider = make_provider(&args)?;

    info!("Getting server info from {ip}");
    let client = DeviceClient::new(&ip.to_string())?;
    let endpoint = client
        .endpoint_info(args.endpoint.name())
        .context("failed to fetch device topology")?;
    let sample_map = endpoint.sample_map()?;

    match &sample_map {
        SampleMap::Concentric { coords } => info!("Sampled pixels: {}", coords.len()),
        SampleMap::Cartesian { width, height } => info!("Screen size: {width}x{height}"),
    }

    stream(
        StreamConfig {
            device_ip: ip,
            address: DeviceAddress::new(endpoint.net, 0, 0),
            sample_map,
            frames_per_second: args.fps,
        },
        provider,
    )
    .context("stream loop failed")
}

fn make_provider(args: &StreamArgs) -> Result<Box<dyn ImageProvider>> {
    if let Some(path) = &args.image {
        let provider = StillImage::open(path)
            .with_context(|| format!("failed to load image {}", path.display()))?;
        return Ok(Box::new(provider));
    }
    if let Some(color) = &args.color {
        return Ok(Box::new(SolidColor::new(64, 64, parse_color(color)?)));
    }
    bail!("either --image or --color is required");
}

fn parse_color(hex: &str) -> Result<[u8; 3]> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        bail!("color must be RRGGBB, got {hex:?}");
    }
    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .with_context(|| format!("color must be RRGGBB, got {hex:?}"))?;
    }
    Ok(rgb)
}

fn observe_log(ip: IpAddr, args: ObserveLogArgs) -> Result<()> {
    let client = DeviceClient::new(&ip.to_string())?;
    let interval = Duration::from_secs_f64(args.interval.max(0.0));

    let mut clock = PacingClock::new("observe-log");
    clock.mark();

    let mut seen = 0usize;
    loop {
        let log = client.log().context("failed to fetch device log")?;

        // A shrinking log means the device restarted or rolled its buffer.
        if log.len() < seen {
            seen = 0;
            println!("--- device log restarted ---");
        }

        match log.get(seen..) {
            Some(tail) => {
                if !tail.is_empty() {
                    print!("{tail}");
                    std::io::stdout().flush()?;
                }
            }
            None => print!("{log}"),
        }
        seen = log.len();

        clock.elapse(interval);
    }
}

fn print_estimate(args: &EstimateArgs) {
    let build = FanBuild {
        blades: args.blades,
        leds_per_m: args.leds_per_m,
        rpm: args.rpm,
        radius_cm: args.radius,
        mirror: args.mirror,
    };
    let estimate = build.estimate();

    println!("Total LEDs: {}", estimate.total_leds);
    println!(
        "Total Power Needed: {:.1}W = {:.2}A x 5v",
        estimate.total_watts, estimate.total_ampere
    );
    println!("Pixel Lightness: {}", estimate.pixel_density);
    println!();
    println!("Rings: {}", estimate.rings);
    println!("Ring Distance: {:.4}cm", estimate.ring_distance_cm);
    println!("Pixel Passes: {:.3} / s", estimate.pixel_passes_per_s);
    println!("Any Pixel Passes: {:.3} / s", estimate.any_pixel_passes_per_s);
    println!();
    println!("Outside Speed: {:.3} m/s", estimate.outside_speed_m_s);
    println!(
        "Outside Motion: {:.4} cm/tick",
        estimate.outside_motion_cm_per_tick
    );
    println!(
        "Outside Pixel Lightness: {:.3} l/m",
        estimate.outside_pixel_lightness
    );
}
