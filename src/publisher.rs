//! Publisher: lifecycle controller and the single-consumer publishing loop.
//!
//! Producers push pre-encoded video packets into the bounded queue; one
//! dedicated thread pops them, pairs each with a freshly produced audio
//! packet, normalizes both into sink time-base units and writes them out,
//! video first, audio second, per tick.

use log::{error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::audio::AudioStage;
use crate::error::Error;
use crate::normalize;
use crate::packet::{Packet, TimeBase};
use crate::queue::PacketQueue;
use crate::sink::{CodecParameters, MediaSink, StreamDescriptor};
use crate::state::PipelineState;

/// Nominal video frame rate; packets without timestamps are treated as one
/// frame per tick at this rate.
pub const FRAME_RATE: i32 = 25;

/// Time base incoming video packets are expressed in.
pub const VIDEO_TIME_BASE: TimeBase = TimeBase::new(1, FRAME_RATE);

/// Resources touched exclusively by the publishing thread while running.
///
/// Moved into the thread on `start()` and handed back through the join
/// handle on `stop()`, so single-threaded ownership holds by construction
/// and no locks are needed around the sink or the encoder.
struct PipelineCore {
    sink: Box<dyn MediaSink>,
    audio: AudioStage,
    video_stream: StreamDescriptor,
    audio_stream: StreamDescriptor,
}

/// Collaborators held between construction and a successful `initialize`.
struct Parts {
    sink: Box<dyn MediaSink>,
    audio: AudioStage,
}

/// Live A/V publisher.
///
/// Owns the handoff queue, the pipeline state machine and the publishing
/// thread. See the crate docs for the full lifecycle.
pub struct Publisher {
    state: PipelineState,
    queue: Arc<PacketQueue>,
    running: Arc<AtomicBool>,
    parts: Option<Parts>,
    core: Option<PipelineCore>,
    handle: Option<JoinHandle<PipelineCore>>,
}

impl Publisher {
    /// Create a publisher with a queue holding at most `queue_capacity`
    /// packets. The sink and the audio stage stay unopened until
    /// [`initialize`](Publisher::initialize).
    pub fn new(queue_capacity: usize, sink: Box<dyn MediaSink>, audio: AudioStage) -> Self {
        Self {
            state: PipelineState::Uninitialized,
            queue: Arc::new(PacketQueue::bounded(queue_capacity)),
            running: Arc::new(AtomicBool::new(false)),
            parts: Some(Parts { sink, audio }),
            core: None,
            handle: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Open the sink, register the video stream from `video_params` and the
    /// audio stream from the stage's encoder, and write the header.
    ///
    /// Fails atomically: on any error everything acquired so far is
    /// released and the state stays `Uninitialized`, so `initialize` may be
    /// retried. Calling it again once `Initialized` is a no-op.
    pub fn initialize(&mut self, target: &str, video_params: &CodecParameters) -> Result<(), Error> {
        match self.state {
            PipelineState::Initialized => return Ok(()),
            PipelineState::Uninitialized => {}
            from => {
                return Err(Error::InvalidTransition {
                    from,
                    to: PipelineState::Initialized,
                });
            }
        }

        let Parts { mut sink, audio } = self
            .parts
            .take()
            .expect("uninitialized publisher holds its collaborators");

        match open_streams(sink.as_mut(), &audio, target, video_params) {
            Ok((video_stream, audio_stream)) => {
                info!(
                    "publisher initialized: target={target}, video stream {} @ {}, audio stream {} @ {}",
                    video_stream.index,
                    video_stream.time_base,
                    audio_stream.index,
                    audio_stream.time_base
                );
                self.core = Some(PipelineCore {
                    sink,
                    audio,
                    video_stream,
                    audio_stream,
                });
                self.state = PipelineState::Initialized;
                Ok(())
            }
            Err(e) => {
                error!("publisher initialization failed: {e}");
                sink.close();
                self.parts = Some(Parts { sink, audio });
                Err(Error::Init(e))
            }
        }
    }

    /// Spawn the publishing thread. Redundant calls warn and do nothing.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.state.is_running() {
            warn!("publisher is already started");
            return Ok(());
        }
        if !self.state.can_transition_to(&PipelineState::Running) {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: PipelineState::Running,
            });
        }

        let core = self
            .core
            .take()
            .expect("initialized publisher holds its pipeline core");
        let queue = Arc::clone(&self.queue);
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);

        let handle = thread::Builder::new()
            .name("publisher".into())
            .spawn(move || publish_loop(core, queue, running))
            .expect("failed to spawn publishing thread");

        self.handle = Some(handle);
        self.state = PipelineState::Running;
        Ok(())
    }

    /// Signal the publishing thread to exit and join it.
    ///
    /// Callable from any thread holding the publisher. After this returns,
    /// no further sink writes occur. Calling it when not running warns and
    /// does nothing.
    pub fn stop(&mut self) -> Result<(), Error> {
        if !self.state.is_running() {
            warn!("publisher has not been started");
            return Ok(());
        }

        self.running.store(false, Ordering::SeqCst);
        // Wake the consumer even when no packet will ever arrive again
        self.queue.close();

        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(core) => self.core = Some(core),
                Err(_) => error!("publishing thread panicked"),
            }
        }

        self.state = PipelineState::Stopped;
        Ok(())
    }

    /// Hand a pre-encoded video packet to the pipeline without blocking.
    ///
    /// A full queue is reported as [`Error::QueueFull`] with the packet
    /// handed back; pushing after `stop()` or teardown is a logic bug and
    /// fails loudly.
    pub fn push_packet(&self, packet: Packet) -> Result<(), Error> {
        if self.state == PipelineState::TornDown {
            return Err(Error::PushedAfterTeardown);
        }
        if self.state == PipelineState::Stopped {
            warn!("publisher is stopped");
            return Err(Error::PushedAfterStop);
        }

        match self.queue.try_push(packet) {
            Ok(()) => Ok(()),
            Err(packet) => {
                warn!("publisher queue is full");
                Err(Error::QueueFull { packet })
            }
        }
    }

    /// Number of packets currently waiting in the queue.
    pub fn queued_packets(&self) -> usize {
        self.queue.len()
    }

    fn teardown(&mut self) {
        if self.state == PipelineState::TornDown {
            return;
        }
        if self.state.is_running()
            && let Err(e) = self.stop()
        {
            error!("forced stop during teardown failed: {e}");
        }

        // Reverse acquisition order: trailer, then the sink itself. If the
        // pipeline never initialized there is nothing to release.
        if let Some(mut core) = self.core.take() {
            if let Err(e) = core.sink.write_trailer() {
                error!("failed to write sink trailer: {e}");
            }
            core.sink.close();
        }
        self.parts = None;
        self.state = PipelineState::TornDown;
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn open_streams(
    sink: &mut dyn MediaSink,
    audio: &AudioStage,
    target: &str,
    video_params: &CodecParameters,
) -> Result<(StreamDescriptor, StreamDescriptor), crate::error::SinkError> {
    sink.open(target)?;
    let video_stream = sink.add_stream(video_params, VIDEO_TIME_BASE)?;
    let audio_time_base = TimeBase::new(1, audio.sample_rate() as i32);
    let audio_stream = sink.add_stream(&audio.codec_parameters(), audio_time_base)?;
    sink.write_header()?;
    Ok((video_stream, audio_stream))
}

/// The publishing loop body, run on the dedicated consumer thread.
///
/// Returns the pipeline core to the controller through the join handle so
/// teardown can write the trailer.
fn publish_loop(
    mut core: PipelineCore,
    queue: Arc<PacketQueue>,
    running: Arc<AtomicBool>,
) -> PipelineCore {
    info!("publishing thread has started");
    let mut frame_index: i64 = 0;

    while running.load(Ordering::SeqCst) {
        let Some(mut packet) = queue.wait_and_pop() else {
            // Queue closed: stop was requested
            break;
        };

        normalize::assign_video_ts(&mut packet, frame_index);
        frame_index += 1;

        match normalize::rescale_to_stream(&mut packet, VIDEO_TIME_BASE, &core.video_stream) {
            Ok(()) => {
                if let Err(e) = core.sink.write_interleaved(&packet) {
                    error!("error muxing video packet: {e}");
                }
            }
            Err(e) => error!("dropping video packet: {e}"),
        }

        if let Some(mut audio_packet) = core.audio.produce_tick() {
            let src = core.audio.time_base();
            match normalize::rescale_to_stream(&mut audio_packet, src, &core.audio_stream) {
                Ok(()) => {
                    if let Err(e) = core.sink.write_interleaved(&audio_packet) {
                        error!("error muxing audio packet: {e}");
                    }
                }
                Err(e) => error!("dropping audio packet: {e}"),
            }
        }

        drop(packet);
    }

    info!("publishing thread exiting after {frame_index} ticks");
    core
}
