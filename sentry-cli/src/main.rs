mod clock;
mod terminal_ui;
mod virtual_gyro;

use std::{sync::Arc, thread::JoinHandle};

use anyhow::{anyhow, Result};
use clap::Parser;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use log::LevelFilter;
use sentry_common::{IntentMailbox, Sentry, SentryConfig, UiEvent};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

use crate::{
    clock::{Delay, HostClock},
    terminal_ui::{Command, TerminalUi, HELP},
    virtual_gyro::{Motion, VirtualGyro},
};

static INTENTS: IntentMailbox<CriticalSectionRawMutex> = IntentMailbox::new();
static UI_EVENTS: Channel<CriticalSectionRawMutex, UiEvent, 16> = Channel::new();

#[derive(Parser)]
#[command(name = "Embedded Sentry")]
#[command(bin_name = "sentry")]
#[command(about = "Gesture lock running against a simulated gyroscope")]
struct Cli {
    /// Length of each capture window
    #[arg(long, default_value_t = 5000.0)]
    capture_ms: f64,

    /// Seconds counted down before each capture
    #[arg(long, default_value_t = 3)]
    countdown: u8,

    /// Every axis must correlate above this to unlock
    #[arg(long, default_value_t = 0.1)]
    threshold: f32,

    /// How long the result stays on screen
    #[arg(long, default_value_t = 1500)]
    result_ms: u32,

    /// Output data rate of the virtual gyroscope
    #[arg(long, default_value_t = 190.0)]
    rate_hz: f64,

    /// Standard deviation of the simulated sensor noise, rad/s
    #[arg(long, default_value_t = 0.05)]
    noise: f32,

    /// Clear the smoothing filter before every capture
    #[arg(long, action)]
    reset_filter: bool,

    /// Simulate a gyroscope that never acknowledges its configuration
    #[arg(long, action)]
    no_ack: bool,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

impl Cli {
    fn config(&self) -> SentryConfig {
        SentryConfig {
            capture_duration_ms: self.capture_ms,
            countdown_secs: self.countdown,
            match_threshold: self.threshold,
            result_display_ms: self.result_ms,
            reset_filter_per_capture: self.reset_filter,
        }
    }
}

/// Runs the sensing side on its own thread so capture timing is not at the
/// mercy of terminal I/O.
fn spawn_sensing(gyro: Arc<VirtualGyro>, config: SentryConfig) -> Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let handle = std::thread::Builder::new()
        .name("sensing".into())
        .spawn(move || {
            runtime.block_on(async {
                let mut sentry: Sentry<_, _, _, _> =
                    Sentry::new(&*gyro, HostClock::new(), Delay, UI_EVENTS.sender(), config);
                match sentry.run(&INTENTS).await {
                    Ok(never) => match never {},
                    Err(fault) => log::error!("sensing stopped: {:?}", fault),
                }
            })
        })?;
    Ok(handle)
}

fn execute(command: Command, ui: &TerminalUi, gyro: &VirtualGyro, sensing: &JoinHandle<()>) {
    match command {
        Command::Tap => match ui.button_intent() {
            Some(intent) => INTENTS.raise(intent),
            None => println!("  no button on screen"),
        },
        Command::Raise(intent) => INTENTS.raise(intent),
        Command::Gesture(motion) => {
            gyro.set_motion(motion);
            println!("  moving: {}", motion);
        }
        Command::Status => {
            match ui.state() {
                Some(state) => println!("  state: {}", state),
                None => println!("  state: starting"),
            }
            if let Some(label) = ui.state().and_then(|state| state.button_label()) {
                println!("  button: {}", label);
            }
            println!("  gesture: {}", gyro.motion());
            let sensing_running = ui.capture_available() && !sensing.is_finished();
            println!(
                "  sensing: {}",
                if sensing_running { "running" } else { "stopped" }
            );
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    if args.rate_hz <= 0.0 {
        return Err(anyhow!("--rate-hz must be positive"));
    }

    let _ = env_logger::builder().filter_level(args.log_level).try_init();

    let gyro = Arc::new(VirtualGyro::new(args.rate_hz, args.noise, !args.no_ack));
    let sensing = spawn_sensing(gyro.clone(), args.config())?;

    println!("{}", HELP);
    println!("  moving: {}", Motion::Still);

    let mut ui = TerminalUi::new();
    let mut lines = BufReader::new(stdin()).lines();
    let ui_events = UI_EVENTS.receiver();
    loop {
        tokio::select! {
            event = ui_events.receive() => ui.render(event),
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => execute(command, &ui, &gyro, &sensing),
                    Err(e) => println!("  {}", e),
                }
            }
        }
    }

    log::info!("bye");
    Ok(())
}
