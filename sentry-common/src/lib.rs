#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

extern crate alloc;

mod fmt;

pub mod config;
pub mod driver;
pub mod gesture;
mod sentry;

#[cfg(test)]
mod tests;

pub use config::SentryConfig;
pub use driver::{clock::Clock, gyro::Gyroscope};
pub use gesture::{
    correlation::{CorrelationResult, MatchDecision},
    intent::{Intent, IntentMailbox},
    lock::{LockState, LockStateMachine},
    sample::{Sample, Sequence},
    ui::{Progress, UiEvent, UiNotifier},
};
pub use sentry::{HardwareFault, Sentry};
