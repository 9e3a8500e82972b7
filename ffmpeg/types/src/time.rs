/*!
    Time bases, timestamp rescaling and seek modes.
*/

/**
    A rational number, used for stream time bases.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

/**
    Time base of all timestamps exposed by the media crates.
*/
pub const MICROSECONDS: Rational = Rational::new(1, 1_000_000);

impl Rational {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /**
        Rescale a timestamp expressed in `self` into the `to` time base.

        Rounds to the nearest tick, halves away from zero, the same way
        `av_rescale_q` does. Returns `ts` unchanged when either time base is
        degenerate.
    */
    pub fn rescale(self, ts: i64, to: Rational) -> i64 {
        if self == to {
            return ts;
        }

        // ts * from.num / from.den * to.den / to.num
        let mut num = ts as i128 * self.num as i128 * to.den as i128;
        let mut den = self.den as i128 * to.num as i128;
        if den == 0 {
            return ts;
        }
        if den < 0 {
            num = -num;
            den = -den;
        }

        let half = den / 2;
        let rounded = if num >= 0 {
            (num + half) / den
        } else {
            -((-num + half) / den)
        };
        rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

/**
    Convert a caller-supplied millisecond position into microseconds.
*/
pub const fn millis_to_micros(ms: u64) -> i64 {
    let us = ms.saturating_mul(1000);
    if us > i64::MAX as u64 {
        i64::MAX
    } else {
        us as i64
    }
}

/**
    Where a seek lands relative to the requested time.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeekMode {
    /// Latest sync point at or before the target.
    #[default]
    PreviousSync,
    /// Earliest sync point at or after the target.
    NextSync,
    /// Whichever sync point is nearest to the target.
    ClosestSync,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_to_microseconds() {
        let tb = Rational::new(1, 44100);
        assert_eq!(tb.rescale(44100, MICROSECONDS), 1_000_000);
        assert_eq!(tb.rescale(1024, MICROSECONDS), 23_220);
    }

    #[test]
    fn rescale_from_microseconds() {
        let tb = Rational::new(1, 90000);
        assert_eq!(MICROSECONDS.rescale(1_000_000, tb), 90000);
    }

    #[test]
    fn rescale_rounds_to_nearest() {
        let tb = Rational::new(1, 3);
        assert_eq!(tb.rescale(1, MICROSECONDS), 333_333);
        assert_eq!(tb.rescale(2, MICROSECONDS), 666_667);
        assert_eq!(tb.rescale(-1, MICROSECONDS), -333_333);
        assert_eq!(tb.rescale(-2, MICROSECONDS), -666_667);
        // Halves go away from zero
        assert_eq!(MICROSECONDS.rescale(5, Rational::new(1, 100_000)), 1);
        assert_eq!(MICROSECONDS.rescale(-5, Rational::new(1, 100_000)), -1);
    }

    #[test]
    fn adts_timestamps_survive_microsecond_round_trip() {
        // ADTS demuxer time base, 1024-sample AAC frames at 44.1 kHz
        let demux = Rational::new(1, 28_224_000);
        let mux = Rational::new(1, 44_100);
        for frame in 0..2000i64 {
            let us = demux.rescale(frame * 655_360, MICROSECONDS);
            assert_eq!(MICROSECONDS.rescale(us, mux), frame * 1024, "frame {}", frame);
        }
    }

    #[test]
    fn rescale_identity_and_degenerate() {
        assert_eq!(MICROSECONDS.rescale(42, MICROSECONDS), 42);
        assert_eq!(Rational::new(1, 0).rescale(7, MICROSECONDS), 7);
    }

    #[test]
    fn millis_conversion_saturates() {
        assert_eq!(millis_to_micros(1500), 1_500_000);
        assert_eq!(millis_to_micros(u64::MAX), i64::MAX);
    }
}
