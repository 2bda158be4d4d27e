use heapless::HistoryBuffer;

use super::sample::Sample;

pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Per-axis simple moving average over the last `WINDOW_SIZE` raw samples.
///
/// The windows start out zero-filled rather than empty, so the first
/// `WINDOW_SIZE - 1` outputs after construction or [`reset`](Self::reset) are
/// pulled toward zero.
pub struct MovingAverageFilter<const WINDOW_SIZE: usize = DEFAULT_WINDOW_SIZE> {
    windows: [HistoryBuffer<f32, WINDOW_SIZE>; 3],
}

impl<const WINDOW_SIZE: usize> MovingAverageFilter<WINDOW_SIZE> {
    pub fn new() -> Self {
        assert!(WINDOW_SIZE > 0, "moving average window must not be empty");
        Self {
            windows: [
                HistoryBuffer::new_with(0.0),
                HistoryBuffer::new_with(0.0),
                HistoryBuffer::new_with(0.0),
            ],
        }
    }

    /// Overwrites the oldest value on every axis and returns the new averages.
    pub fn push(&mut self, sample: Sample) -> Sample {
        let raw = sample.axes();
        let mut averaged = [0.0f32; 3];
        for (axis, window) in self.windows.iter_mut().enumerate() {
            window.write(raw[axis]);
            // f64 keeps the sum exact, so a full window of v averages to exactly v
            let sum: f64 = window.as_slice().iter().map(|v| *v as f64).sum();
            averaged[axis] = (sum / WINDOW_SIZE as f64) as f32;
        }
        Sample::from_axes(averaged)
    }

    pub fn reset(&mut self) {
        for window in self.windows.iter_mut() {
            window.clear_with(0.0);
        }
    }
}

impl<const WINDOW_SIZE: usize> Default for MovingAverageFilter<WINDOW_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cold_start_is_biased_toward_zero() {
        let mut filter = MovingAverageFilter::<4>::new();
        let first = filter.push(Sample::new(4.0, -8.0, 2.0));
        assert_eq!(first, Sample::new(1.0, -2.0, 0.5));

        let second = filter.push(Sample::new(4.0, -8.0, 2.0));
        assert_eq!(second, Sample::new(2.0, -4.0, 1.0));
    }

    #[test]
    fn constant_input_converges_on_nth_push() {
        let v = Sample::new(0.37, -1.25, 3.5);
        let mut filter = MovingAverageFilter::<DEFAULT_WINDOW_SIZE>::new();
        for _ in 0..DEFAULT_WINDOW_SIZE - 1 {
            assert_ne!(filter.push(v), v);
        }
        for _ in 0..3 * DEFAULT_WINDOW_SIZE {
            assert_eq!(filter.push(v), v);
        }
    }

    #[test]
    fn oldest_value_is_evicted() {
        let mut filter = MovingAverageFilter::<3>::new();
        for value in [3.0, 6.0, 9.0, 12.0] {
            filter.push(Sample::new(value, 0.0, 0.0));
        }
        // window now holds 6, 9, 12
        let out = filter.push(Sample::new(0.0, 0.0, 0.0));
        assert_abs_diff_eq!(out.x, 7.0, epsilon = 1e-6);
    }

    #[test]
    fn reset_refills_with_zero() {
        let mut filter = MovingAverageFilter::<2>::new();
        filter.push(Sample::new(10.0, 10.0, 10.0));
        filter.push(Sample::new(10.0, 10.0, 10.0));
        filter.reset();
        assert_eq!(
            filter.push(Sample::new(10.0, 10.0, 10.0)),
            Sample::new(5.0, 5.0, 5.0)
        );
    }
}
