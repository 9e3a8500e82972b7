/*!
    Amplitude envelope for waveform rendering.
*/

/// Magnitude an envelope value reaches at the loudest sample.
pub const ENVELOPE_SCALE: i8 = 100;

/**
    Collects raw PCM samples up to a fixed budget and normalizes them into an
    [`Envelope`].
*/
#[derive(Debug)]
pub struct WaveformSummarizer {
    budget: usize,
    samples: Vec<i16>,
}

impl WaveformSummarizer {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            samples: Vec::with_capacity(budget.min(1 << 20)),
        }
    }

    /**
        Accept as many of `samples` as the remaining budget allows.

        Returns the number accepted.
    */
    pub fn ingest(&mut self, samples: &[i16]) -> usize {
        let take = samples.len().min(self.remaining());
        self.samples.extend_from_slice(&samples[..take]);
        take
    }

    pub fn remaining(&self) -> usize {
        self.budget - self.samples.len()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.budget
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /**
        Scale every sample by the loudest one.

        Each value becomes `round(s / max * 100)`, so the loudest sample maps
        to 100 or -100. Silence (or nothing at all) maps to zeros.
    */
    pub fn finalize(self) -> Envelope {
        let max = self
            .samples
            .iter()
            .map(|&s| (s as i32).abs())
            .max()
            .filter(|&max| max > 0)
            .unwrap_or(1);

        let scale = ENVELOPE_SCALE as f32 / max as f32;
        let values = self
            .samples
            .iter()
            .map(|&s| (s as f32 * scale).round() as i8)
            .collect();

        Envelope { values }
    }
}

/**
    Normalized amplitude envelope, one value in `[-100, 100]` per summarized
    PCM sample.
*/
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Envelope {
    values: Vec<i8>,
}

impl Envelope {
    pub fn new(values: Vec<i8>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[i8] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<i8> {
        self.values
    }

    /**
        Reduce the envelope to at most `bins` `(min, max)` pairs, for
        renderers narrower than the sample count.
    */
    pub fn peaks(&self, bins: usize) -> Vec<(i8, i8)> {
        let len = self.values.len();
        let bins = bins.min(len);
        if bins == 0 {
            return Vec::new();
        }

        (0..bins)
            .map(|bin| {
                let start = bin * len / bins;
                let end = (bin + 1) * len / bins;
                let slice = &self.values[start..end];
                let min = slice.iter().copied().min().unwrap_or(0);
                let max = slice.iter().copied().max().unwrap_or(0);
                (min, max)
            })
            .collect()
    }

    /**
        Envelope index corresponding to `ms` in a file lasting `duration_ms`.

        Positions map linearly onto the summarized samples, so a selection
        drawn in time can be highlighted on the envelope. Clamped to the
        envelope length.
    */
    pub fn index_at(&self, ms: u64, duration_ms: u64) -> usize {
        if duration_ms == 0 {
            return 0;
        }
        let index = (ms as u128 * self.values.len() as u128) / duration_ms as u128;
        (index as usize).min(self.values.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summarize(samples: &[i16]) -> Envelope {
        let mut summarizer = WaveformSummarizer::new(samples.len());
        summarizer.ingest(samples);
        summarizer.finalize()
    }

    #[test]
    fn peak_maps_to_full_scale() {
        let envelope = summarize(&[0, 1000, -2000, 500]);
        assert_eq!(envelope.values(), &[0, 50, -100, 25]);

        let envelope = summarize(&[i16::MIN, i16::MAX, 0]);
        assert_eq!(envelope.values(), &[-100, 100, 0]);
    }

    #[test]
    fn values_stay_in_range() {
        let samples: Vec<i16> = (0..4096).map(|i| ((i * 7919) % 65536 - 32768) as i16).collect();
        let envelope = summarize(&samples);
        assert!(envelope.values().iter().all(|v| (-100..=100).contains(v)));
        assert!(envelope.values().iter().any(|v| v.abs() == 100));
    }

    #[test]
    fn empty_input_gives_empty_envelope() {
        let envelope = WaveformSummarizer::new(10).finalize();
        assert!(envelope.is_empty());
    }

    #[test]
    fn silence_does_not_divide_by_zero() {
        let envelope = summarize(&[0, 0, 0]);
        assert_eq!(envelope.values(), &[0, 0, 0]);
    }

    #[test]
    fn ingest_respects_budget() {
        let mut summarizer = WaveformSummarizer::new(5);
        assert_eq!(summarizer.ingest(&[1, 2, 3]), 3);
        assert_eq!(summarizer.remaining(), 2);
        assert_eq!(summarizer.ingest(&[4, 5, 6, 7]), 2);
        assert!(summarizer.is_full());
        assert_eq!(summarizer.ingest(&[8]), 0);
        assert_eq!(summarizer.finalize().len(), 5);
    }

    #[test]
    fn peaks_group_values() {
        let envelope = Envelope::new(vec![1, -5, 3, 7, -2, 0]);
        assert_eq!(envelope.peaks(3), vec![(-5, 1), (3, 7), (-2, 0)]);
        assert_eq!(envelope.peaks(1), vec![(-5, 7)]);
        // More bins than values yields one pair per value
        assert_eq!(envelope.peaks(100).len(), 6);
        assert!(envelope.peaks(0).is_empty());
        assert!(Envelope::default().peaks(4).is_empty());
    }

    #[test]
    fn index_at_maps_time_to_samples() {
        let envelope = Envelope::new(vec![0; 1000]);
        assert_eq!(envelope.index_at(0, 10_000), 0);
        assert_eq!(envelope.index_at(2_500, 10_000), 250);
        assert_eq!(envelope.index_at(10_000, 10_000), 1000);
        assert_eq!(envelope.index_at(20_000, 10_000), 1000);
        assert_eq!(envelope.index_at(500, 0), 0);
    }
}
