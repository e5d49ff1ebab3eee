//! Audio synthesis and encoding
//!
//! The publishing loop drives this module once per video tick: pull one
//! frame of raw samples from a [`RawAudioSource`], convert it to the
//! encoder's input format, stamp it from the cumulative sample count and
//! feed it to the [`AudioEncoder`]. Codec and resampler internals live
//! behind the collaborator traits; the crate only owns the synchronization
//! contract between them.

mod stage;
mod tone;

pub use stage::AudioStage;
pub use tone::ToneGenerator;

use bytes::Bytes;

use crate::error::AudioError;
use crate::packet::{Packet, TimeBase};
use crate::sink::CodecParameters;

/// One frame of converted samples ready for the encoder.
///
/// The sample format is whatever the converter produced for this encoder;
/// the pipeline never looks inside.
pub struct AudioFrame {
    /// Converted sample data.
    pub data: Bytes,
    /// Number of samples per channel in this frame.
    pub nb_samples: usize,
    /// Presentation timestamp in the encoder's time base.
    pub pts: i64,
}

/// Pull-based source of raw interleaved s16 samples.
///
/// The reference implementation is [`ToneGenerator`]; any pull-based raw
/// audio source fulfills the same contract.
pub trait RawAudioSource: Send {
    /// Fill `buf` with interleaved samples for `channels` channels.
    fn fill(&mut self, buf: &mut [i16], channels: u16);
}

/// Sample format/rate converter sitting between the raw source and the
/// encoder.
pub trait SampleConverter: Send {
    /// Convert raw interleaved s16 samples into the encoder's input format.
    fn convert(&mut self, samples: &[i16]) -> Result<Bytes, AudioError>;
}

/// Audio encoder collaborator.
pub trait AudioEncoder: Send {
    /// Samples per channel the encoder consumes per frame.
    fn frame_size(&self) -> usize;

    fn sample_rate(&self) -> u32;

    fn channels(&self) -> u16;

    /// Time base of the packets the encoder emits.
    fn time_base(&self) -> TimeBase;

    /// Stream parameters to register with the sink.
    fn codec_parameters(&self) -> CodecParameters;

    /// Encode one frame.
    ///
    /// `Ok(None)` means the encoder is still buffering and has no packet
    /// ready yet; this is not an error.
    fn encode(&mut self, frame: AudioFrame) -> Result<Option<Packet>, AudioError>;
}

/// Converter for encoders that take interleaved s16 directly.
pub struct PassthroughConverter;

impl SampleConverter for PassthroughConverter {
    fn convert(&mut self, samples: &[i16]) -> Result<Bytes, AudioError> {
        let mut out = Vec::with_capacity(samples.len() * 2);
        for s in samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        Ok(Bytes::from(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_converter_is_little_endian_s16() {
        let mut conv = PassthroughConverter;
        let data = conv.convert(&[1, -1, 0x0102]).unwrap();
        assert_eq!(&data[..], &[0x01, 0x00, 0xff, 0xff, 0x02, 0x01]);
    }
}
