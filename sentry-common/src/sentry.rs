use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::{
    config::SentryConfig,
    driver::{clock::Clock, gyro::Gyroscope},
    gesture::{
        correlation::MatchDecision,
        intent::{Intent, IntentMailbox},
        lock::{CaptureKind, LockState, LockStateMachine},
        moving_average::DEFAULT_WINDOW_SIZE,
        recorder::GestureRecorder,
        sample::Sample,
        ui::{Progress, UiNotifier},
    },
};

/// The gyroscope stopped cooperating. Nothing retries; the sensing side is
/// done for this power cycle.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareFault<E> {
    Configure(E),
    Read(E),
}

impl<E> HardwareFault<E> {
    pub fn into_inner(self) -> E {
        match self {
            HardwareFault::Configure(e) | HardwareFault::Read(e) => e,
        }
    }
}

/// Everything the sensing task owns: the sensor, the capture pipeline and the
/// lock state with its key.
pub struct Sentry<G, C, D, U, const WINDOW_SIZE: usize = DEFAULT_WINDOW_SIZE>
where
    G: Gyroscope,
    C: Clock,
    D: DelayNs,
    U: UiNotifier,
{
    gyro: G,
    clock: C,
    delay: D,
    ui: U,
    config: SentryConfig,
    recorder: GestureRecorder<WINDOW_SIZE>,
    machine: LockStateMachine,
}

impl<G, C, D, U, const WINDOW_SIZE: usize> Sentry<G, C, D, U, WINDOW_SIZE>
where
    G: Gyroscope,
    C: Clock,
    D: DelayNs,
    U: UiNotifier,
{
    pub fn new(gyro: G, clock: C, delay: D, ui: U, config: SentryConfig) -> Self {
        Self {
            gyro,
            clock,
            delay,
            ui,
            config,
            recorder: GestureRecorder::new(),
            machine: LockStateMachine::new(),
        }
    }

    pub fn state(&self) -> LockState {
        self.machine.state()
    }

    pub fn key(&self) -> &[Sample] {
        self.machine.key()
    }

    /// Configures the gyroscope, then serves intents forever. Only returns
    /// when the hardware fails.
    pub async fn run<R: RawMutex>(
        &mut self,
        intents: &IntentMailbox<R>,
    ) -> Result<Infallible, HardwareFault<G::Error>> {
        self.start().await?;
        loop {
            self.run_once(intents).await?;
        }
    }

    pub async fn start(&mut self) -> Result<(), HardwareFault<G::Error>> {
        if let Err(e) = self.gyro.configure().await {
            log_error!("gyroscope rejected configuration, capture disabled");
            self.ui.notify_progress(Progress::HardwareFault);
            return Err(HardwareFault::Configure(e));
        }
        self.ui.notify_state(self.machine.state());
        Ok(())
    }

    /// Waits for one intent and carries it out. Anything raised while the
    /// capture was running is thrown away.
    pub async fn run_once<R: RawMutex>(
        &mut self,
        intents: &IntentMailbox<R>,
    ) -> Result<(), HardwareFault<G::Error>> {
        let intent = intents.wait().await;
        let result = self.handle(intent).await;
        if let Some(dropped) = intents.discard() {
            log_debug!("dropped {:?} raised while busy", dropped);
        }
        result
    }

    pub async fn handle(&mut self, intent: Intent) -> Result<(), HardwareFault<G::Error>> {
        let Some(kind) = self.machine.begin(intent) else {
            return Ok(());
        };
        log_info!("{:?} requested, starting {:?}", intent, kind);
        self.ui.notify_state(self.machine.state());

        for n in (1..=self.config.countdown_secs).rev() {
            self.ui.notify_progress(Progress::Countdown(n));
            self.delay.delay_ms(1000).await;
        }

        if self.config.reset_filter_per_capture {
            self.recorder.reset_filter();
        }
        self.ui.notify_progress(Progress::Recording);
        let captured = match self
            .recorder
            .capture_window(&mut self.gyro, &self.clock, self.config.capture_duration_ms)
            .await
        {
            Ok(captured) => captured,
            Err(e) => {
                log_error!("gyroscope read failed mid-capture, capture disabled");
                let state = self.machine.abort();
                self.ui.notify_progress(Progress::HardwareFault);
                self.ui.notify_state(state);
                return Err(HardwareFault::Read(e));
            }
        };

        match kind {
            CaptureKind::Enroll => {
                self.ui.notify_progress(Progress::SavingKey);
                let progress = match self.machine.finish_enrollment(captured) {
                    LockState::Locked => Progress::KeySaved,
                    _ => Progress::EmptyCapture,
                };
                self.ui.notify_progress(progress);
            }
            CaptureKind::Verify => {
                self.ui.notify_progress(Progress::Verifying);
                let outcome = self
                    .machine
                    .finish_verification(&captured, self.config.match_threshold);
                self.ui.notify_progress(match outcome.decision {
                    MatchDecision::Accept => Progress::Unlocked,
                    MatchDecision::Reject => Progress::UnlockFailed,
                });
            }
        }

        self.delay.delay_ms(self.config.result_display_ms).await;
        log_info!("now {:?}", self.machine.state());
        self.ui.notify_state(self.machine.state());
        Ok(())
    }
}
