//! The capture → encode → transmit pipeline
//!
//! Three stages, two bounded handoff buffers:
//! - Frame source thread: samples the image provider as fast as it can
//! - Packet encoder thread: drains pixel frames into Art-Net batches
//! - Transmit loop: paced UDP emission on the calling thread
//!
//! Only the transmit loop is rate-paced; the worker threads free-run and
//! rely on the buffers' drop-oldest overflow to shed excess frames. A
//! slow encoder or network therefore costs frames, never memory.

use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use fanflow_core::{HandoffBuffer, ImageProvider, PacingClock, PixelBuffer, SampleMap};

use crate::artnet::{ArtNetEncoder, DeviceAddress, PacketBatch, ART_NET_PORT};
use crate::Result;

/// Capacity of each inter-stage handoff buffer.
const STAGE_CAPACITY: usize = 2;

/// How long a drained stage waits before re-checking the running flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Batches between sequence wraps, for the wrap diagnostic only. The true
/// count depends on how many batches were dropped in the handoff buffers,
/// so the FPS figure is an approximation.
const BATCHES_PER_WRAP: f64 = 256.0;

/// Parameters of one streaming run.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Controller IP address.
    pub device_ip: IpAddr,
    /// Art-Net address of the output endpoint.
    pub address: DeviceAddress,
    /// Sampling topology fetched from the device.
    pub sample_map: SampleMap,
    /// Transmit pacing target.
    pub frames_per_second: u32,
}

/// Handle to the running capture and encode worker threads.
///
/// Owns both handoff buffers; the downstream end is drained with
/// [`next_batch`](Self::next_batch). Workers stop cooperatively on
/// [`stop`](Self::stop) or drop.
pub struct StreamPipeline {
    running: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
    batches: Arc<HandoffBuffer<PacketBatch>>,
}

impl StreamPipeline {
    /// Spawn the frame source and packet encoder threads.
    pub fn start(
        mut provider: Box<dyn ImageProvider>,
        sample_map: SampleMap,
        address: DeviceAddress,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let frames: Arc<HandoffBuffer<PixelBuffer>> = Arc::new(HandoffBuffer::new(STAGE_CAPACITY));
        let batches: Arc<HandoffBuffer<PacketBatch>> = Arc::new(HandoffBuffer::new(STAGE_CAPACITY));

        let mut workers = Vec::with_capacity(2);

        {
            let running = running.clone();
            let frames = frames.clone();
            let worker = thread::Builder::new()
                .name("frame-source".to_string())
                .spawn(move || {
                    info!("Frame source started");
                    while running.load(Ordering::Relaxed) {
                        let frame = provider
                            .next_image()
                            .and_then(|image| sample_map.sample(&image));
                        match frame {
                            Ok(frame) => frames.push(frame),
                            Err(e) => {
                                error!("Frame source failed: {e}");
                                break;
                            }
                        }
                    }
                    info!("Frame source stopped");
                })
                .expect("Failed to spawn frame-source thread");
            workers.push(worker);
        }

        {
            let running = running.clone();
            let batches = batches.clone();
            let worker = thread::Builder::new()
                .name("packet-encoder".to_string())
                .spawn(move || {
                    info!("Packet encoder started");
                    let mut encoder = ArtNetEncoder::new(address);
                    while running.load(Ordering::Relaxed) {
                        if let Some(frame) = frames.pop_timeout(POLL_INTERVAL) {
                            batches.push(encoder.encode(&frame));
                        }
                    }
                    info!("Packet encoder stopped");
                })
                .expect("Failed to spawn packet-encoder thread");
            workers.push(worker);
        }

        Self {
            running,
            workers,
            batches,
        }
    }

    /// Pop the oldest encoded batch, waiting up to `timeout`.
    pub fn next_batch(&self, timeout: Duration) -> Option<PacketBatch> {
        self.batches.pop_timeout(timeout)
    }

    /// Stop both workers and join them.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("Pipeline worker panicked");
            }
        }
    }
}

impl Drop for StreamPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Paced UDP emitter for encoded packet batches.
pub struct TransmitLoop {
    socket: UdpSocket,
    target: SocketAddr,
    period: Duration,
    clock: PacingClock,
    last_mark: Instant,
    wrap_mark: Instant,
}

impl TransmitLoop {
    /// Emitter sending to `target`, paced to `frames_per_second`.
    pub fn new(target: SocketAddr, frames_per_second: u32) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        let mut clock = PacingClock::new("transmit");
        let start = clock.mark();

        Ok(Self {
            socket,
            target,
            period: Duration::from_secs_f64(1.0 / frames_per_second as f64),
            clock,
            last_mark: start,
            wrap_mark: start,
        })
    }

    /// Emitter for the device at `ip` on the default Art-Net port.
    pub fn connect(ip: IpAddr, frames_per_second: u32) -> Result<Self> {
        Self::new(SocketAddr::new(ip, ART_NET_PORT), frames_per_second)
    }

    /// Emit one batch as one datagram per packet, fire-and-forget, then
    /// sleep out the rest of the frame period.
    ///
    /// When the batch's sequence counter has just wrapped, logs the
    /// throughput since the previous wrap. A socket error is fatal; no
    /// packet of the batch is retried.
    pub fn send_batch(&mut self, batch: &PacketBatch) -> Result<()> {
        for packet in &batch.packets {
            self.socket.send_to(packet, self.target)?;
        }

        if batch.sequence == 0 {
            let elapsed = self.last_mark.duration_since(self.wrap_mark).as_secs_f64();
            info!(
                "Sequence pushed: {:.1} kB, {} packets p.f., {:.1} FPS",
                batch.wire_len() as f64 / 1000.0,
                batch.packets.len(),
                BATCHES_PER_WRAP / elapsed,
            );
            self.wrap_mark = self.last_mark;
        }

        self.last_mark = self.clock.elapse(self.period);
        Ok(())
    }
}

/// Run the full pipeline against a device until an error terminates it.
///
/// Blocks the calling thread. Worker failure surfaces as a stalled
/// transmit loop; a socket error returns.
pub fn stream(config: StreamConfig, provider: Box<dyn ImageProvider>) -> Result<()> {
    let StreamConfig {
        device_ip,
        address,
        sample_map,
        frames_per_second,
    } = config;

    info!("Sending Art-Net data to {device_ip}:{ART_NET_PORT} ({address})");

    let pipeline = StreamPipeline::start(provider, sample_map, address);
    let mut transmit = TransmitLoop::connect(device_ip, frames_per_second)?;

    loop {
        if let Some(batch) = pipeline.next_batch(POLL_INTERVAL) {
            transmit.send_batch(&batch)?;
        }
    }
}
