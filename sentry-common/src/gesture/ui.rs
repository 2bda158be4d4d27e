use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Sender as ChannelSender};

use super::lock::LockState;

/// Transient status text shown in the middle of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress {
    Countdown(u8),
    Recording,
    SavingKey,
    KeySaved,
    EmptyCapture,
    Verifying,
    Unlocked,
    UnlockFailed,
    HardwareFault,
}

impl core::fmt::Display for Progress {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Progress::Countdown(n) => write!(f, "RECORDING IN {}", n),
            Progress::Recording => f.write_str("RECORDING..."),
            Progress::SavingKey => f.write_str("SAVING KEY..."),
            Progress::KeySaved => f.write_str("KEY SAVED"),
            Progress::EmptyCapture => f.write_str("NO MOTION CAPTURED"),
            Progress::Verifying => f.write_str("UNLOCKING..."),
            Progress::Unlocked => f.write_str("UNLOCKED"),
            Progress::UnlockFailed => f.write_str("UNLOCK FAILED"),
            Progress::HardwareFault => f.write_str("GYROSCOPE FAULT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiEvent {
    State(LockState),
    Progress(Progress),
}

pub trait UiNotifier {
    fn notify(&mut self, event: UiEvent);

    fn notify_state(&mut self, state: LockState) {
        self.notify(UiEvent::State(state));
    }

    fn notify_progress(&mut self, progress: Progress) {
        self.notify(UiEvent::Progress(progress));
    }
}

impl<'ch, M: RawMutex, const N: usize> UiNotifier for ChannelSender<'ch, M, UiEvent, N> {
    fn notify(&mut self, event: UiEvent) {
        if self.try_send(event).is_err() {
            log_warn!("UiNotifier: event queue full, dropping {:?}", event);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use embassy_sync::{blocking_mutex::raw::NoopRawMutex, channel::Channel};

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let channel = Channel::<NoopRawMutex, UiEvent, 2>::new();
        let mut sender = channel.sender();
        sender.notify_state(LockState::Recording);
        sender.notify_progress(Progress::Countdown(3));
        sender.notify_progress(Progress::Countdown(2));

        assert_eq!(
            channel.try_receive().ok(),
            Some(UiEvent::State(LockState::Recording))
        );
        assert_eq!(
            channel.try_receive().ok(),
            Some(UiEvent::Progress(Progress::Countdown(3)))
        );
        assert!(channel.try_receive().is_err());
    }

    #[test]
    fn progress_text() {
        assert_eq!(Progress::Countdown(2).to_string(), "RECORDING IN 2");
        assert_eq!(Progress::UnlockFailed.to_string(), "UNLOCK FAILED");
    }
}
