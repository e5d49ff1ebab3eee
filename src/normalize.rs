//! Timestamp normalization: synthetic video timestamps and the single
//! rescale into sink time-base units.
//!
//! Rescaling must happen exactly once per packet. The packet's `time_base`
//! field acts as the marker: it is checked against the expected source unit
//! before converting and rewritten to the destination unit afterwards, so a
//! second rescale of the same packet fails loudly instead of silently
//! corrupting timing.

use crate::error::Error;
use crate::packet::{NO_PTS, Packet, TimeBase};
use crate::sink::StreamDescriptor;

/// Assign a synthetic timestamp to a packet that arrived without one.
///
/// Treats the stream as one packet per fixed-rate tick: PTS = DTS = the
/// tick index, duration 0. Packets that already carry a valid PTS are left
/// untouched.
pub fn assign_video_ts(packet: &mut Packet, tick: i64) {
    if !packet.has_pts() {
        packet.pts = tick;
        packet.dts = tick;
        packet.duration = 0;
    }
}

/// Convert a packet's PTS/DTS/duration from `src` units into the stream's
/// time base and tag it with the stream index.
///
/// PTS and DTS round to nearest; duration rounds up so the reported span
/// never shrinks. The packet must still be in `src` units; anything else is
/// a logic bug (most likely a double rescale) and is reported as
/// [`Error::TimeBaseMismatch`].
pub fn rescale_to_stream(
    packet: &mut Packet,
    src: TimeBase,
    stream: &StreamDescriptor,
) -> Result<(), Error> {
    if packet.time_base != src {
        return Err(Error::TimeBaseMismatch {
            expected: src,
            found: packet.time_base,
        });
    }

    let dst = stream.time_base;
    if packet.pts != NO_PTS {
        packet.pts = TimeBase::rescale(packet.pts, src, dst);
    }
    if packet.dts != NO_PTS {
        packet.dts = TimeBase::rescale(packet.dts, src, dst);
    }
    packet.duration = TimeBase::rescale_ceil(packet.duration, src, dst);
    packet.time_base = dst;
    packet.stream_index = Some(stream.index);
    packet.pos = -1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    const SRC: TimeBase = TimeBase::new(1, 25);

    fn stream() -> StreamDescriptor {
        StreamDescriptor {
            index: 0,
            time_base: TimeBase::new(1, 90_000),
        }
    }

    fn packet() -> Packet {
        Packet::new(Bytes::from_static(b"frame"), SRC)
    }

    #[test]
    fn test_assign_only_when_missing() {
        let mut pkt = packet();
        assign_video_ts(&mut pkt, 7);
        assert_eq!(pkt.pts, 7);
        assert_eq!(pkt.dts, 7);
        assert_eq!(pkt.duration, 0);

        let mut stamped = packet().with_pts(3).with_dts(2).with_duration(1);
        assign_video_ts(&mut stamped, 7);
        assert_eq!(stamped.pts, 3);
        assert_eq!(stamped.dts, 2);
        assert_eq!(stamped.duration, 1);
    }

    #[test]
    fn test_rescale_into_stream() {
        let mut pkt = packet().with_pts(5).with_dts(5).with_duration(1);
        rescale_to_stream(&mut pkt, SRC, &stream()).unwrap();

        assert_eq!(pkt.pts, 18_000);
        assert_eq!(pkt.dts, 18_000);
        assert_eq!(pkt.duration, 3_600);
        assert_eq!(pkt.time_base, TimeBase::new(1, 90_000));
        assert_eq!(pkt.stream_index, Some(0));
        assert_eq!(pkt.pos, -1);
    }

    #[test]
    fn test_missing_timestamps_stay_missing() {
        let mut pkt = packet();
        rescale_to_stream(&mut pkt, SRC, &stream()).unwrap();
        assert!(!pkt.has_pts());
        assert_eq!(pkt.dts, NO_PTS);
    }

    #[test]
    fn test_double_rescale_is_detected() {
        let mut pkt = packet().with_pts(5).with_dts(5);
        rescale_to_stream(&mut pkt, SRC, &stream()).unwrap();

        let err = rescale_to_stream(&mut pkt, SRC, &stream()).unwrap_err();
        assert!(matches!(err, Error::TimeBaseMismatch { .. }));
        // The packet is untouched by the failed call
        assert_eq!(pkt.pts, 18_000);
    }
}
