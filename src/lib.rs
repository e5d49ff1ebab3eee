//! castpipe - live A/V publishing pipeline.
//!
//! Interleaves externally-produced, pre-encoded video packets with
//! internally synthesized and encoded audio, and writes both to a remote
//! sink with correct relative timing.
//!
//! # Architecture
//!
//! - [`queue::PacketQueue`] - bounded handoff between producers and the
//!   publishing thread; never blocks a producer.
//! - [`audio::AudioStage`] - produces exactly one encoded audio packet per
//!   video tick from a pull-based raw source.
//! - [`normalize`] - synthetic timestamps for untimed video and the single
//!   rescale of every packet into sink time-base units.
//! - [`publisher::Publisher`] - lifecycle controller plus the dedicated
//!   consumer thread running the publishing loop.
//!
//! The video encoder, the audio codec/resampler and the container
//! muxer/transport are external collaborators behind the [`sink::MediaSink`]
//! and [`audio::AudioEncoder`]/[`audio::SampleConverter`] traits.
//!
//! # Example
//!
//! ```ignore
//! let audio = AudioStage::new(
//!     Box::new(ToneGenerator::new(44_100)),
//!     Box::new(my_converter),
//!     Box::new(my_encoder),
//! );
//! let mut publisher = Publisher::new(64, Box::new(my_sink), audio);
//! publisher.initialize("rtmp://example/live", &video_params)?;
//! publisher.start()?;
//! // ... push_packet() from any producer thread ...
//! publisher.stop()?;
//! ```

pub mod audio;
pub mod error;
pub mod normalize;
pub mod packet;
pub mod publisher;
pub mod queue;
pub mod sink;
pub mod state;

pub use audio::{
    AudioEncoder, AudioFrame, AudioStage, PassthroughConverter, RawAudioSource, SampleConverter,
    ToneGenerator,
};
pub use error::{AudioError, Error, SinkError};
pub use packet::{NO_PTS, Packet, TimeBase};
pub use publisher::{FRAME_RATE, Publisher, VIDEO_TIME_BASE};
pub use queue::PacketQueue;
pub use sink::{CodecParameters, MediaKind, MediaSink, StreamDescriptor};
pub use state::PipelineState;
