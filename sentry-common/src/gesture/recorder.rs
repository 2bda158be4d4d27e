use core::sync::atomic::{AtomicBool, Ordering};

use super::{
    moving_average::{MovingAverageFilter, DEFAULT_WINDOW_SIZE},
    sample::Sequence,
};
use crate::driver::{clock::Clock, gyro::Gyroscope};

/// Stops a capture before its window elapses. Only reachable from inside the
/// crate; a production capture always runs for its full duration.
pub(crate) struct CaptureCancel {
    cancelled: AtomicBool,
}

impl CaptureCancel {
    pub(crate) const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    #[allow(dead_code)]
    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

pub struct GestureRecorder<const WINDOW_SIZE: usize = DEFAULT_WINDOW_SIZE> {
    filter: MovingAverageFilter<WINDOW_SIZE>,
}

impl<const WINDOW_SIZE: usize> GestureRecorder<WINDOW_SIZE> {
    pub fn new() -> Self {
        Self {
            filter: MovingAverageFilter::new(),
        }
    }

    pub fn reset_filter(&mut self) {
        self.filter.reset();
    }

    /// Reads, filters and collects samples until `duration_ms` of clock time
    /// has passed. The sequence length is however many data-ready events fit
    /// in the window.
    pub async fn capture_window<G: Gyroscope, C: Clock>(
        &mut self,
        gyro: &mut G,
        clock: &C,
        duration_ms: f64,
    ) -> Result<Sequence, G::Error> {
        self.capture_window_until(gyro, clock, duration_ms, &CaptureCancel::new())
            .await
    }

    pub(crate) async fn capture_window_until<G: Gyroscope, C: Clock>(
        &mut self,
        gyro: &mut G,
        clock: &C,
        duration_ms: f64,
        cancel: &CaptureCancel,
    ) -> Result<Sequence, G::Error> {
        let start = clock.now_ms();
        let mut sequence = Sequence::new();

        while clock.now_ms() - start < duration_ms {
            if cancel.is_cancelled() {
                log_debug!("capture cancelled after {} samples", sequence.len());
                break;
            }

            let raw = gyro.read_sample().await?;
            let filtered = self.filter.push(raw);
            log_trace!(
                "moving average -> gx: {}, gy: {}, gz: {}",
                filtered.x,
                filtered.y,
                filtered.z
            );
            sequence.push(filtered);
        }

        log_debug!(
            "captured {} samples in {} ms",
            sequence.len(),
            clock.now_ms() - start
        );
        Ok(sequence)
    }
}

impl<const WINDOW_SIZE: usize> Default for GestureRecorder<WINDOW_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gesture::sample::Sample;
    use crate::tests::harness::{ScriptedGyro, SteppingClock};

    #[tokio::test]
    async fn window_length_follows_clock_not_count() {
        let clock = SteppingClock::new(0.0);
        let mut gyro = ScriptedGyro::constant(Sample::new(1.0, 2.0, 3.0)).with_clock(&clock, 5.0);
        let mut recorder = GestureRecorder::<4>::new();

        let sequence = recorder.capture_window(&mut gyro, &clock, 100.0).await.unwrap();
        assert_eq!(sequence.len(), 20);

        // slower data-ready cadence, same window
        let mut gyro = ScriptedGyro::constant(Sample::new(1.0, 2.0, 3.0)).with_clock(&clock, 8.0);
        let sequence = recorder.capture_window(&mut gyro, &clock, 100.0).await.unwrap();
        assert_eq!(sequence.len(), 13);
    }

    #[tokio::test]
    async fn samples_pass_through_filter_in_order() {
        let clock = SteppingClock::new(0.0);
        let raw = [
            Sample::new(2.0, 0.0, 0.0),
            Sample::new(4.0, 0.0, 0.0),
            Sample::new(6.0, 0.0, 0.0),
        ];
        let mut gyro = ScriptedGyro::new(&raw).with_clock(&clock, 1.0);
        let mut recorder = GestureRecorder::<2>::new();

        let sequence = recorder.capture_window(&mut gyro, &clock, 3.0).await.unwrap();
        let xs: alloc::vec::Vec<f32> = sequence.iter().map(|s| s.x).collect();
        assert_eq!(xs, [1.0, 3.0, 5.0]);
    }

    #[tokio::test]
    async fn filter_history_carries_over_between_windows() {
        let clock = SteppingClock::new(0.0);
        let mut recorder = GestureRecorder::<2>::new();
        let eights = ScriptedGyro::constant(Sample::new(8.0, 8.0, 8.0)).with_clock(&clock, 1.0);
        let zeros = ScriptedGyro::constant(Sample::new(0.0, 0.0, 0.0)).with_clock(&clock, 1.0);

        recorder.capture_window(&mut &eights, &clock, 2.0).await.unwrap();
        let sequence = recorder.capture_window(&mut &zeros, &clock, 1.0).await.unwrap();
        assert_eq!(sequence[0], Sample::new(4.0, 4.0, 4.0));

        recorder.capture_window(&mut &eights, &clock, 2.0).await.unwrap();
        recorder.reset_filter();
        let sequence = recorder.capture_window(&mut &zeros, &clock, 1.0).await.unwrap();
        assert_eq!(sequence[0], Sample::new(0.0, 0.0, 0.0));
    }

    #[tokio::test]
    async fn cancel_ends_capture_without_clock_progress() {
        // the clock never moves, so only the token can end this window
        let clock = SteppingClock::new(0.0);
        let cancel = CaptureCancel::new();
        let mut gyro = ScriptedGyro::constant(Sample::new(1.0, 1.0, 1.0)).cancel_after(&cancel, 7);
        let mut recorder = GestureRecorder::<4>::new();

        let sequence = recorder
            .capture_window_until(&mut gyro, &clock, 5000.0, &cancel)
            .await
            .unwrap();
        assert_eq!(sequence.len(), 7);
    }

    #[tokio::test]
    async fn bus_failure_is_returned() {
        let clock = SteppingClock::new(0.0);
        let mut gyro = ScriptedGyro::constant(Sample::default())
            .with_clock(&clock, 1.0)
            .fail_after(3);
        let mut recorder = GestureRecorder::<4>::new();

        assert!(recorder.capture_window(&mut gyro, &clock, 100.0).await.is_err());
    }
}
