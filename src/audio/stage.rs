//! One-tick audio production: synthesize, convert, stamp, encode.

use log::{error, warn};

use super::{AudioEncoder, AudioFrame, RawAudioSource, SampleConverter};
use crate::packet::{Packet, TimeBase};
use crate::sink::CodecParameters;

/// Per-audio-stream mutable state, owned exclusively by the publishing
/// thread once the pipeline is running.
///
/// The stage is driven, not self-scheduling: the publishing loop calls
/// [`produce_tick`](AudioStage::produce_tick) exactly once per video tick,
/// which keeps the audio/video packet-count ratio fixed without a wall-clock
/// timer.
pub struct AudioStage {
    source: Box<dyn RawAudioSource>,
    converter: Box<dyn SampleConverter>,
    encoder: Box<dyn AudioEncoder>,
    /// Reused raw-sample buffer, one encoder frame of interleaved s16.
    raw_buf: Vec<i16>,
    /// Cumulative samples handed to the encoder; the audio clock.
    samples_count: u64,
}

impl AudioStage {
    pub fn new(
        source: Box<dyn RawAudioSource>,
        converter: Box<dyn SampleConverter>,
        encoder: Box<dyn AudioEncoder>,
    ) -> Self {
        let raw_len = encoder.frame_size() * encoder.channels() as usize;
        Self {
            source,
            converter,
            encoder,
            raw_buf: vec![0; raw_len],
            samples_count: 0,
        }
    }

    /// Time base of the packets this stage produces.
    pub fn time_base(&self) -> TimeBase {
        self.encoder.time_base()
    }

    /// Stream parameters for registering the audio output stream.
    pub fn codec_parameters(&self) -> CodecParameters {
        self.encoder.codec_parameters()
    }

    pub fn sample_rate(&self) -> u32 {
        self.encoder.sample_rate()
    }

    /// Produce the audio packet for one tick, if the encoder has one ready.
    ///
    /// The sample counter advances once per tick no matter what, so the PTS
    /// sequence stays monotonic and gap-free even when a conversion or
    /// encode call fails or the encoder is still buffering.
    pub fn produce_tick(&mut self) -> Option<Packet> {
        let nb_samples = self.encoder.frame_size();
        let channels = self.encoder.channels();
        self.source.fill(&mut self.raw_buf, channels);

        let sample_tb = TimeBase::new(1, self.encoder.sample_rate() as i32);
        let pts = TimeBase::rescale(self.samples_count as i64, sample_tb, self.time_base());
        self.samples_count += nb_samples as u64;

        let data = match self.converter.convert(&self.raw_buf) {
            Ok(data) => data,
            Err(e) => {
                error!("audio sample conversion failed: {e}");
                return None;
            }
        };

        let frame = AudioFrame {
            data,
            nb_samples,
            pts,
        };
        match self.encoder.encode(frame) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("audio encode failed: {e}");
                None
            }
        }
    }
}
