use core::cell::RefCell;

use embassy_sync::{
    blocking_mutex::{raw::RawMutex, Mutex as BlockingMutex},
    signal::Signal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Intent {
    Record,
    Unlock,
}

#[derive(Default)]
struct PendingIntents {
    record: bool,
    unlock: bool,
}

impl PendingIntents {
    /// Record wins when both are pending; both flags are consumed either way.
    fn take(&mut self) -> Option<Intent> {
        let intent = if self.record {
            Some(Intent::Record)
        } else if self.unlock {
            Some(Intent::Unlock)
        } else {
            None
        };
        *self = Self::default();
        intent
    }
}

/// One flag per intent, shared between the input side and the sensing side.
///
/// Raising a flag that is already raised does nothing, so a burst of touches
/// before the sensing side gets around to [`wait`](Self::wait) collapses
/// into a single intent.
pub struct IntentMailbox<R: RawMutex> {
    pending: BlockingMutex<R, RefCell<PendingIntents>>,
    raised_signal: Signal<R, ()>,
}

impl<R: RawMutex> IntentMailbox<R> {
    pub const fn new() -> Self {
        Self {
            pending: BlockingMutex::new(RefCell::new(PendingIntents {
                record: false,
                unlock: false,
            })),
            raised_signal: Signal::new(),
        }
    }

    pub fn raise(&self, intent: Intent) {
        self.pending.lock(|pending| {
            let mut pending = pending.borrow_mut();
            match intent {
                Intent::Record => pending.record = true,
                Intent::Unlock => pending.unlock = true,
            }
        });
        self.raised_signal.signal(());
    }

    pub fn try_take(&self) -> Option<Intent> {
        self.pending.lock(|pending| pending.borrow_mut().take())
    }

    pub async fn wait(&self) -> Intent {
        loop {
            if let Some(intent) = self.try_take() {
                return intent;
            }
            self.raised_signal.wait().await;
        }
    }

    /// Drops whatever was raised since the last [`wait`](Self::wait).
    pub fn discard(&self) -> Option<Intent> {
        let dropped = self.try_take();
        self.raised_signal.reset();
        dropped
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock(|pending| {
            let pending = pending.borrow();
            pending.record || pending.unlock
        })
    }
}

impl<R: RawMutex> Default for IntentMailbox<R> {
    fn default() -> Self {
        Self::new()
    }
}
