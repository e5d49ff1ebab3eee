//! Packet and time-base primitives shared by every pipeline stage.

use bytes::Bytes;

/// Sentinel for "no timestamp available" on a packet.
///
/// Producers that cannot timestamp their packets leave PTS/DTS at this value;
/// the publishing loop will assign a synthetic tick-based timestamp instead.
pub const NO_PTS: i64 = i64::MIN;

/// Rational time unit (numerator/denominator, in seconds) in which a
/// timestamp is expressed.
///
/// A value `v` in time base `num/den` represents `v * num / den` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBase {
    pub num: i32,
    pub den: i32,
}

impl TimeBase {
    /// Create a new time base. Both terms must be positive.
    pub const fn new(num: i32, den: i32) -> Self {
        assert!(num > 0 && den > 0, "time base terms must be positive");
        Self { num, den }
    }

    /// Rescale `value` from `src` units into `dst` units, rounding to the
    /// nearest integer (ties away from zero).
    ///
    /// The intermediate product is computed in 128 bits so no realistic
    /// timestamp can overflow.
    pub fn rescale(value: i64, src: TimeBase, dst: TimeBase) -> i64 {
        let a = value as i128 * src.num as i128 * dst.den as i128;
        let b = src.den as i128 * dst.num as i128;
        let r = if a >= 0 { (a + b / 2) / b } else { (a - b / 2) / b };
        r as i64
    }

    /// Rescale `value` from `src` units into `dst` units, rounding up.
    ///
    /// Used for durations, where rounding down could under-report the span a
    /// packet covers.
    pub fn rescale_ceil(value: i64, src: TimeBase, dst: TimeBase) -> i64 {
        let a = value as i128 * src.num as i128 * dst.den as i128;
        let b = src.den as i128 * dst.num as i128;
        ((a + b - 1).div_euclid(b)) as i64
    }
}

impl std::fmt::Display for TimeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// One unit of encoded media with timing metadata.
///
/// PTS/DTS/duration are expressed in `time_base` units at all times. The
/// normalizer rewrites `time_base` when it rescales a packet into a sink
/// stream, which is what makes an accidental double rescale detectable.
#[derive(Clone)]
pub struct Packet {
    /// Encoded payload.
    pub data: Bytes,
    /// Presentation timestamp, or [`NO_PTS`].
    pub pts: i64,
    /// Decode timestamp, or [`NO_PTS`].
    pub dts: i64,
    /// Duration in `time_base` units; 0 when unknown.
    pub duration: i64,
    /// Unit of `pts`, `dts` and `duration`.
    pub time_base: TimeBase,
    /// Destination stream, set by the normalizer when the packet is rescaled
    /// into the sink time base.
    pub stream_index: Option<usize>,
    /// Byte position in the output; unused on write (-1).
    pub pos: i64,
}

impl Packet {
    /// Create a packet without timestamps in the given time base.
    pub fn new(data: Bytes, time_base: TimeBase) -> Self {
        Self {
            data,
            pts: NO_PTS,
            dts: NO_PTS,
            duration: 0,
            time_base,
            stream_index: None,
            pos: -1,
        }
    }

    pub fn with_pts(mut self, pts: i64) -> Self {
        self.pts = pts;
        self
    }

    pub fn with_dts(mut self, dts: i64) -> Self {
        self.dts = dts;
        self
    }

    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = duration;
        self
    }

    /// Whether the packet carries a valid presentation timestamp.
    pub fn has_pts(&self) -> bool {
        self.pts != NO_PTS
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl std::fmt::Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("size", &self.size())
            .field("pts", &self.pts)
            .field("dts", &self.dts)
            .field("duration", &self.duration)
            .field("time_base", &self.time_base)
            .field("stream_index", &self.stream_index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale_exact() {
        // 5 frames at 25 fps land at 90 kHz ticks: 5 * 90000 / 25
        let src = TimeBase::new(1, 25);
        let dst = TimeBase::new(1, 90_000);
        assert_eq!(TimeBase::rescale(5, src, dst), 18_000);
        assert_eq!(TimeBase::rescale(0, src, dst), 0);
    }

    #[test]
    fn test_rescale_rounds_to_nearest() {
        let src = TimeBase::new(1, 3);
        let dst = TimeBase::new(1, 10);
        // 1/3 s = 3.33 ticks -> 3; 2/3 s = 6.67 ticks -> 7
        assert_eq!(TimeBase::rescale(1, src, dst), 3);
        assert_eq!(TimeBase::rescale(2, src, dst), 7);
        assert_eq!(TimeBase::rescale(-1, src, dst), -3);
        assert_eq!(TimeBase::rescale(-2, src, dst), -7);
    }

    #[test]
    fn test_rescale_ceil() {
        let src = TimeBase::new(1, 3);
        let dst = TimeBase::new(1, 10);
        assert_eq!(TimeBase::rescale_ceil(1, src, dst), 4);
        assert_eq!(TimeBase::rescale_ceil(3, src, dst), 10);
    }

    #[test]
    fn test_new_packet_has_no_timestamps() {
        let pkt = Packet::new(Bytes::from_static(b"xx"), TimeBase::new(1, 25));
        assert!(!pkt.has_pts());
        assert_eq!(pkt.dts, NO_PTS);
        assert_eq!(pkt.duration, 0);
        assert_eq!(pkt.stream_index, None);
        assert_eq!(pkt.pos, -1);
        assert_eq!(pkt.size(), 2);
    }
}
