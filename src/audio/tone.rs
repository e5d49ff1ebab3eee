//! Reference tone source: a sine whose frequency rises over time.

use std::f64::consts::PI;

use super::RawAudioSource;

const BASE_FREQUENCY_HZ: f64 = 110.0;
const AMPLITUDE: f64 = 10_000.0;

/// Deterministic stand-in audio source.
///
/// Generates a sine starting at 110 Hz whose frequency itself increases by
/// 110 Hz per second, so any stretch of output is audibly distinguishable
/// from any other. The same value is written to every channel of a sample
/// frame.
pub struct ToneGenerator {
    /// Running phase accumulator.
    t: f64,
    /// Phase increment per sample.
    tincr: f64,
    /// Increment applied to `tincr` per sample (frequency sweep).
    tincr2: f64,
}

impl ToneGenerator {
    pub fn new(sample_rate: u32) -> Self {
        let tincr = 2.0 * PI * BASE_FREQUENCY_HZ / sample_rate as f64;
        Self {
            t: 0.0,
            tincr,
            tincr2: tincr / sample_rate as f64,
        }
    }
}

impl RawAudioSource for ToneGenerator {
    fn fill(&mut self, buf: &mut [i16], channels: u16) {
        for frame in buf.chunks_mut(channels as usize) {
            let v = (self.t.sin() * AMPLITUDE) as i16;
            for sample in frame.iter_mut() {
                *sample = v;
            }
            self.t += self.tincr;
            self.tincr += self.tincr2;
        }
    }
}
