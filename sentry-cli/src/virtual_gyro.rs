use std::{
    cell::RefCell,
    f64::consts::TAU,
    fmt,
    str::FromStr,
    time::{Duration, Instant},
};

use anyhow::anyhow;
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex as BlockingMutex};
use rand::Rng;
use sentry_common::{Gyroscope, Sample};
use tokio::time::sleep_until;

/// Simulated hand movement, as angular rate in rad/s over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Still,
    Wave,
    Circle,
    Shake,
    Twist,
}

impl Motion {
    pub const ALL: [Motion; 5] = [
        Motion::Still,
        Motion::Wave,
        Motion::Circle,
        Motion::Shake,
        Motion::Twist,
    ];

    /// Angular rate `t` seconds into the motion.
    pub fn angular_rate(&self, t: f64) -> Sample {
        let wave =
            |amplitude: f64, hz: f64, phase: f64| (amplitude * (TAU * hz * t + phase).sin()) as f32;
        match self {
            Motion::Still => Sample::default(),
            Motion::Wave => Sample::new(
                wave(2.0, 1.0, 0.0),
                wave(0.3, 0.5, 0.0),
                wave(0.2, 1.0, 1.0),
            ),
            Motion::Circle => Sample::new(
                wave(1.5, 0.5, 0.0),
                wave(1.5, 0.5, TAU / 4.0),
                wave(0.4, 0.25, 0.0),
            ),
            Motion::Shake => Sample::new(
                wave(3.0, 3.0, 0.0),
                wave(1.0, 3.0, 1.0),
                wave(0.5, 6.0, 0.0),
            ),
            Motion::Twist => Sample::new(
                wave(0.3, 0.4, 0.0),
                wave(0.2, 0.4, 2.0),
                wave(2.5, 0.8, 0.0),
            ),
        }
    }
}

impl fmt::Display for Motion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Motion::Still => "still",
            Motion::Wave => "wave",
            Motion::Circle => "circle",
            Motion::Shake => "shake",
            Motion::Twist => "twist",
        })
    }
}

impl FromStr for Motion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Motion::ALL
            .into_iter()
            .find(|motion| motion.to_string() == s)
            .ok_or_else(|| anyhow!("unknown gesture {:?}", s))
    }
}

#[derive(Debug, PartialEq)]
pub enum VirtualGyroError {
    NotAcknowledged,
}

struct GyroState {
    motion: Motion,
    motion_started: Instant,
    last_sample: Option<Instant>,
}

/// Gyroscope stand-in. The input side picks the motion, the sensing side reads
/// it at the configured output data rate.
pub struct VirtualGyro {
    state: BlockingMutex<CriticalSectionRawMutex, RefCell<GyroState>>,
    period: Duration,
    noise: f32,
    acknowledge: bool,
}

impl VirtualGyro {
    pub fn new(rate_hz: f64, noise: f32, acknowledge: bool) -> Self {
        Self {
            state: BlockingMutex::new(RefCell::new(GyroState {
                motion: Motion::Still,
                motion_started: Instant::now(),
                last_sample: None,
            })),
            period: Duration::from_secs_f64(1.0 / rate_hz),
            noise,
            acknowledge,
        }
    }

    pub fn set_motion(&self, motion: Motion) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.motion = motion;
            state.motion_started = Instant::now();
        });
    }

    pub fn motion(&self) -> Motion {
        self.state.lock(|state| state.borrow().motion)
    }

    fn next_deadline(&self) -> Instant {
        let now = Instant::now();
        self.state.lock(|state| match state.borrow().last_sample {
            Some(last) => (last + self.period).max(now),
            None => now,
        })
    }

    // roughly normal, unit variance
    fn noise(&self) -> f32 {
        let mut rng = rand::thread_rng();
        self.noise * (0..3).map(|_| rng.gen_range(-1.0f32..1.0)).sum::<f32>()
    }
}

impl Gyroscope for &VirtualGyro {
    type Error = VirtualGyroError;

    async fn configure(&mut self) -> Result<(), Self::Error> {
        if self.acknowledge {
            log::info!("virtual gyroscope configured, {:?} per sample", self.period);
            Ok(())
        } else {
            Err(VirtualGyroError::NotAcknowledged)
        }
    }

    async fn read_sample(&mut self) -> Result<Sample, Self::Error> {
        let deadline = self.next_deadline();
        sleep_until(deadline.into()).await;

        let (motion, t) = self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.last_sample = Some(deadline);
            (state.motion, state.motion_started.elapsed().as_secs_f64())
        });
        let rate = motion.angular_rate(t);
        Ok(Sample::new(
            rate.x + self.noise(),
            rate.y + self.noise(),
            rate.z + self.noise(),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gesture_names_parse() {
        for motion in Motion::ALL {
            assert_eq!(motion.to_string().parse::<Motion>().unwrap(), motion);
        }
        assert!("jump".parse::<Motion>().is_err());
    }

    #[test]
    fn moving_gestures_move_every_axis() {
        for motion in Motion::ALL.into_iter().filter(|m| *m != Motion::Still) {
            let samples: Vec<Sample> = (0..200)
                .map(|i| motion.angular_rate(i as f64 * 0.01))
                .collect();
            for axis in 0..3 {
                let first = samples[0].axes()[axis];
                assert!(
                    samples.iter().any(|s| s.axes()[axis] != first),
                    "{} axis {} is constant",
                    motion,
                    axis
                );
            }
        }
    }

    #[tokio::test]
    async fn still_without_noise_reads_zero() {
        let gyro = VirtualGyro::new(1000.0, 0.0, true);
        let mut reader = &gyro;
        reader.configure().await.unwrap();
        for _ in 0..3 {
            assert_eq!(reader.read_sample().await.unwrap(), Sample::default());
        }
    }

    #[tokio::test]
    async fn reads_are_paced_at_output_data_rate() {
        let gyro = VirtualGyro::new(100.0, 0.0, true);
        let mut reader = &gyro;
        let start = Instant::now();
        for _ in 0..6 {
            reader.read_sample().await.unwrap();
        }
        // first read is immediate, five periods follow
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn silent_sensor_rejects_configuration() {
        let gyro = VirtualGyro::new(190.0, 0.05, false);
        let mut reader = &gyro;
        assert_eq!(
            reader.configure().await,
            Err(VirtualGyroError::NotAcknowledged)
        );
    }
}
