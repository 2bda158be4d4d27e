use super::{
    correlation::{CorrelationResult, MatchDecision},
    intent::Intent,
    sample::{Sample, Sequence},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockState {
    Unlocked,
    Recording,
    Unlocking,
    Locked,
}

impl LockState {
    pub fn is_busy(&self) -> bool {
        matches!(self, LockState::Recording | LockState::Unlocking)
    }

    /// Label of the single on-screen button, `None` while a capture runs.
    pub fn button_label(&self) -> Option<&'static str> {
        match self {
            LockState::Unlocked => Some("RECORD"),
            LockState::Locked => Some("UNLOCK"),
            LockState::Recording | LockState::Unlocking => None,
        }
    }

    /// What pressing the button means in this state.
    pub fn button_intent(&self) -> Option<Intent> {
        match self {
            LockState::Unlocked => Some(Intent::Record),
            LockState::Locked => Some(Intent::Unlock),
            LockState::Recording | LockState::Unlocking => None,
        }
    }
}

impl core::fmt::Display for LockState {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(match self {
            LockState::Unlocked => "UNLOCKED",
            LockState::Recording => "RECORDING",
            LockState::Unlocking => "UNLOCKING",
            LockState::Locked => "LOCKED",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureKind {
    Enroll,
    Verify,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnlockOutcome {
    pub correlation: CorrelationResult,
    pub decision: MatchDecision,
}

/// Owns the enrolled key. The key is empty exactly when the idle state is
/// `Unlocked`.
pub struct LockStateMachine {
    state: LockState,
    key: Sequence,
}

impl LockStateMachine {
    pub fn new() -> Self {
        Self {
            state: LockState::Unlocked,
            key: Sequence::new(),
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn key(&self) -> &[Sample] {
        &self.key
    }

    fn idle_state(&self) -> LockState {
        if self.key.is_empty() {
            LockState::Unlocked
        } else {
            LockState::Locked
        }
    }

    /// Moves into the matching busy state, or returns `None` when the intent
    /// does not apply to the current state.
    pub fn begin(&mut self, intent: Intent) -> Option<CaptureKind> {
        match (self.state, intent) {
            (LockState::Unlocked, Intent::Record) => {
                self.state = LockState::Recording;
                Some(CaptureKind::Enroll)
            }
            (LockState::Locked, Intent::Unlock) => {
                self.state = LockState::Unlocking;
                Some(CaptureKind::Verify)
            }
            (state, intent) => {
                log_warn!("ignoring {:?} while {:?}", intent, state);
                None
            }
        }
    }

    /// Stores `captured` as the new key. An empty capture leaves the device
    /// unlocked.
    pub fn finish_enrollment(&mut self, captured: Sequence) -> LockState {
        if self.state != LockState::Recording {
            log_warn!("enrollment finished while {:?}", self.state);
            return self.state;
        }

        if captured.is_empty() {
            log_warn!("enrollment captured no samples, staying unlocked");
        } else {
            log_info!("key saved, {} samples", captured.len());
            self.key = captured;
        }
        self.state = self.idle_state();
        self.state
    }

    /// Matches `candidate` against the key. Accept clears the key, reject
    /// keeps it untouched.
    pub fn finish_verification(&mut self, candidate: &[Sample], threshold: f32) -> UnlockOutcome {
        let correlation = CorrelationResult::compute(&self.key, candidate);
        let decision = correlation.decide(threshold);
        log_info!(
            "correlation values: x = {}, y = {}, z = {} ({} vs {} samples)",
            correlation.x,
            correlation.y,
            correlation.z,
            self.key.len(),
            candidate.len()
        );

        if self.state != LockState::Unlocking {
            log_warn!("verification finished while {:?}", self.state);
        } else if decision == MatchDecision::Accept {
            self.key.clear();
            self.state = LockState::Unlocked;
        } else {
            self.state = LockState::Locked;
        }

        UnlockOutcome {
            correlation,
            decision,
        }
    }

    /// Abandons the in-flight capture and returns to the idle state the key
    /// implies.
    pub fn abort(&mut self) -> LockState {
        self.state = self.idle_state();
        self.state
    }
}

impl Default for LockStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gesture::correlation::DEFAULT_MATCH_THRESHOLD;
    use alloc::vec::Vec;

    fn wave(len: usize, sign: f32) -> Vec<Sample> {
        (0..len)
            .map(|i| {
                let t = i as f32 * 0.1;
                Sample::new(sign * libm::sinf(t), sign * libm::cosf(t), sign * t)
            })
            .collect()
    }

    fn locked_with(key: Vec<Sample>) -> LockStateMachine {
        let mut machine = LockStateMachine::new();
        assert_eq!(machine.begin(Intent::Record), Some(CaptureKind::Enroll));
        assert_eq!(machine.finish_enrollment(key), LockState::Locked);
        machine
    }

    #[test]
    fn starts_unlocked_with_empty_key() {
        let machine = LockStateMachine::new();
        assert_eq!(machine.state(), LockState::Unlocked);
        assert!(machine.key().is_empty());
    }

    #[test]
    fn record_stores_capture_as_key() {
        let captured = wave(40, 1.0);
        let mut machine = LockStateMachine::new();
        machine.begin(Intent::Record);
        assert_eq!(machine.state(), LockState::Recording);

        machine.finish_enrollment(captured.clone());
        assert_eq!(machine.state(), LockState::Locked);
        assert_eq!(machine.key(), captured.as_slice());
    }

    #[test]
    fn empty_enrollment_stays_unlocked() {
        let mut machine = LockStateMachine::new();
        machine.begin(Intent::Record);
        assert_eq!(machine.finish_enrollment(Vec::new()), LockState::Unlocked);
        assert!(machine.key().is_empty());
    }

    #[test]
    fn matching_unlock_clears_key() {
        let mut machine = locked_with(wave(40, 1.0));
        assert_eq!(machine.begin(Intent::Unlock), Some(CaptureKind::Verify));
        assert_eq!(machine.state(), LockState::Unlocking);

        let outcome = machine.finish_verification(&wave(35, 1.0), DEFAULT_MATCH_THRESHOLD);
        assert_eq!(outcome.decision, MatchDecision::Accept);
        assert_eq!(machine.state(), LockState::Unlocked);
        assert!(machine.key().is_empty());
    }

    #[test]
    fn failed_unlock_keeps_key() {
        let key = wave(40, 1.0);
        let mut machine = locked_with(key.clone());

        for _ in 0..3 {
            machine.begin(Intent::Unlock);
            let outcome = machine.finish_verification(&wave(40, -1.0), DEFAULT_MATCH_THRESHOLD);
            assert_eq!(outcome.decision, MatchDecision::Reject);
            assert_eq!(machine.state(), LockState::Locked);
            assert_eq!(machine.key(), key.as_slice());
        }
    }

    #[test]
    fn mismatched_intents_are_ignored() {
        let mut machine = LockStateMachine::new();
        assert_eq!(machine.begin(Intent::Unlock), None);
        assert_eq!(machine.state(), LockState::Unlocked);

        let mut machine = locked_with(wave(10, 1.0));
        assert_eq!(machine.begin(Intent::Record), None);
        assert_eq!(machine.state(), LockState::Locked);

        machine.begin(Intent::Unlock);
        assert_eq!(machine.begin(Intent::Unlock), None);
        assert_eq!(machine.state(), LockState::Unlocking);
    }

    #[test]
    fn abort_returns_to_idle_state() {
        let mut machine = LockStateMachine::new();
        machine.begin(Intent::Record);
        assert_eq!(machine.abort(), LockState::Unlocked);

        let mut machine = locked_with(wave(10, 1.0));
        machine.begin(Intent::Unlock);
        assert_eq!(machine.abort(), LockState::Locked);
        assert_eq!(machine.key().len(), 10);
    }

    #[test]
    fn button_follows_idle_state() {
        assert_eq!(LockState::Unlocked.button_label(), Some("RECORD"));
        assert_eq!(LockState::Locked.button_intent(), Some(Intent::Unlock));
        assert_eq!(LockState::Recording.button_intent(), None);
    }
}
