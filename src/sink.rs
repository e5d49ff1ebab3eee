//! Output sink collaborator interface.
//!
//! The sink is the muxer + transport pair that accepts finalized,
//! stream-tagged packets. Its wire format is opaque to the pipeline; the
//! publishing loop only needs open/header/packet/trailer/close semantics.

use bytes::Bytes;

use crate::error::SinkError;
use crate::packet::{Packet, TimeBase};

/// Kind of media carried by a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Video => write!(f, "Video"),
            MediaKind::Audio => write!(f, "Audio"),
        }
    }
}

/// Codec parameters describing one output stream to the sink.
#[derive(Debug, Clone)]
pub struct CodecParameters {
    pub kind: MediaKind,
    /// Codec name, e.g. "h264" or "aac".
    pub codec: String,
    pub bit_rate: u64,
    /// Frame width (video only).
    pub width: Option<u32>,
    /// Frame height (video only).
    pub height: Option<u32>,
    /// Sample rate (audio only).
    pub sample_rate: Option<u32>,
    /// Channel count (audio only).
    pub channels: Option<u16>,
    /// Codec-specific out-of-band data (SPS/PPS, AudioSpecificConfig, ...).
    pub extradata: Bytes,
}

impl CodecParameters {
    /// Parameters for a video stream.
    pub fn video(codec: impl Into<String>, width: u32, height: u32, bit_rate: u64) -> Self {
        Self {
            kind: MediaKind::Video,
            codec: codec.into(),
            bit_rate,
            width: Some(width),
            height: Some(height),
            sample_rate: None,
            channels: None,
            extradata: Bytes::new(),
        }
    }

    /// Parameters for an audio stream.
    pub fn audio(codec: impl Into<String>, sample_rate: u32, channels: u16, bit_rate: u64) -> Self {
        Self {
            kind: MediaKind::Audio,
            codec: codec.into(),
            bit_rate,
            width: None,
            height: None,
            sample_rate: Some(sample_rate),
            channels: Some(channels),
            extradata: Bytes::new(),
        }
    }

    pub fn with_extradata(mut self, extradata: Bytes) -> Self {
        self.extradata = extradata;
        self
    }
}

/// Identity of one output stream registered with the sink.
///
/// Created once during initialization and immutable afterwards; the
/// publishing loop and the normalizer hold copies, the sink owns the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Index of the stream inside the sink output.
    pub index: usize,
    /// Time base all packets of this stream must be expressed in.
    pub time_base: TimeBase,
}

/// Muxer/transport collaborator accepting fully-timestamped packets.
///
/// Write failures are recoverable from the pipeline's point of view: the
/// publishing loop logs them and keeps going, favouring stream continuity
/// over completeness.
pub trait MediaSink: Send {
    /// Open the output target (URL, path, ...).
    fn open(&mut self, target: &str) -> Result<(), SinkError>;

    /// Register an output stream and return its descriptor.
    fn add_stream(
        &mut self,
        params: &CodecParameters,
        time_base: TimeBase,
    ) -> Result<StreamDescriptor, SinkError>;

    /// Write the container header/prologue.
    fn write_header(&mut self) -> Result<(), SinkError>;

    /// Write one stream-tagged, sink-time-base packet.
    fn write_interleaved(&mut self, packet: &Packet) -> Result<(), SinkError>;

    /// Write the container trailer/epilogue.
    fn write_trailer(&mut self) -> Result<(), SinkError>;

    /// Release the output target.
    fn close(&mut self);
}
