use std::str::FromStr;

use anyhow::anyhow;
use sentry_common::{Intent, LockState, Progress, UiEvent};

use crate::virtual_gyro::Motion;

pub const HELP: &str = "\
commands:
  tap (or empty line)  press the on-screen button
  record               raise a record intent
  unlock               raise an unlock intent
  gesture <name>       move the virtual board: still, wave, circle, shake, twist
  status               show state, button and gesture
  help                 show this text
  quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tap,
    Raise(Intent),
    Gesture(Motion),
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = match (words.next(), words.next()) {
            (None, _) | (Some("tap"), None) => Command::Tap,
            (Some("record"), None) => Command::Raise(Intent::Record),
            (Some("unlock"), None) => Command::Raise(Intent::Unlock),
            (Some("gesture"), Some(name)) => Command::Gesture(name.parse()?),
            (Some("gesture"), None) => return Err(anyhow!("gesture needs a name")),
            (Some("status"), None) => Command::Status,
            (Some("help"), None) => Command::Help,
            (Some("quit" | "exit"), None) => Command::Quit,
            _ => return Err(anyhow!("unknown command {:?}, try help", line.trim())),
        };
        if words.next().is_some() {
            return Err(anyhow!("too many arguments in {:?}", line.trim()));
        }
        Ok(command)
    }
}

/// Stand-in for the touch screen: remembers what is shown so a tap can be
/// mapped to the button currently on screen.
pub struct TerminalUi {
    state: Option<LockState>,
    capture_available: bool,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self {
            state: None,
            capture_available: true,
        }
    }

    pub fn state(&self) -> Option<LockState> {
        self.state
    }

    pub fn capture_available(&self) -> bool {
        self.capture_available
    }

    /// Intent behind the visible button, if one is shown.
    pub fn button_intent(&self) -> Option<Intent> {
        self.state.and_then(|state| state.button_intent())
    }

    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::State(state) => self.state = Some(state),
            UiEvent::Progress(Progress::HardwareFault) => self.capture_available = false,
            UiEvent::Progress(_) => {}
        }
    }

    pub fn render(&mut self, event: UiEvent) {
        self.apply(event);
        match event {
            UiEvent::State(state) => {
                println!();
                println!("===== Embedded Sentry =====");
                println!("  {}", state);
                match state.button_label() {
                    Some(label) => println!("  [ {} ]", label),
                    None => println!(),
                }
            }
            UiEvent::Progress(Progress::HardwareFault) => {
                println!("  {}", Progress::HardwareFault);
                println!("  capture disabled until restart");
            }
            UiEvent::Progress(progress) => println!("  {}", progress),
        }
    }
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}
