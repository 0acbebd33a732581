//! Stdin console
//!
//! Stands in for the renderer and the platform collaborators: each line is a
//! command that sets the simulated foreground window, feeds keystrokes or
//! interactions onto the bus, or queries statistics.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use codepet_core::{
    Event, EventPublisher, IdleSource, InteractionKind, KeyActivityGate, MessageContext,
    SamplerHandle, WindowError, WindowSample, WindowSource,
};

use crate::surface::StatusBoard;

pub const HELP: &str = "\
commands:
  focus <process> [title...]   set the foreground window
  key [name]                   press a key
  click | feed | pet           interact with the pet
  goal [name]                  report a reached goal
  achievement [name]           report an unlocked achievement
  idle <secs>                  pretend there was no input for <secs>
  stats                        show today's statistics
  reset                        reset today's statistics
  say [context]                greeting | encouragement | rest
  quit";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{command}': '{value}' is not a non-negative number")]
    InvalidNumber { command: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Focus { process: String, title: String },
    Key(String),
    Interact(InteractionKind),
    Goal(String),
    Achievement(Option<String>),
    Idle(f64),
    Stats,
    Reset,
    Say(MessageContext),
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };
        let rest: Vec<&str> = words.collect();
        let joined = (!rest.is_empty()).then(|| rest.join(" "));

        match head.to_lowercase().as_str() {
            "focus" => {
                let (process, title) = rest.split_first().ok_or(CommandError::MissingArgument {
                    command: "focus",
                    argument: "a process name",
                })?;
                Ok(Self::Focus {
                    process: (*process).to_string(),
                    title: title.join(" "),
                })
            }
            "key" => Ok(Self::Key(joined.unwrap_or_else(|| "space".to_string()))),
            "click" => Ok(Self::Interact(InteractionKind::Click)),
            "feed" => Ok(Self::Interact(InteractionKind::Feed)),
            "pet" => Ok(Self::Interact(InteractionKind::Pet)),
            "goal" => Ok(Self::Goal(joined.unwrap_or_else(|| "goal".to_string()))),
            "achievement" => Ok(Self::Achievement(joined)),
            "idle" => {
                let value = rest.first().ok_or(CommandError::MissingArgument {
                    command: "idle",
                    argument: "a number of seconds",
                })?;
                match value.parse::<f64>() {
                    Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(Self::Idle(secs)),
                    _ => Err(CommandError::InvalidNumber {
                        command: "idle",
                        value: (*value).to_string(),
                    }),
                }
            }
            "stats" => Ok(Self::Stats),
            "reset" => Ok(Self::Reset),
            "say" => Ok(Self::Say(MessageContext::from_key(
                joined.as_deref().unwrap_or("greeting"),
            ))),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

// =============================================================================
// Simulated collaborators
// =============================================================================

/// Foreground window set by `focus`
#[derive(Clone, Debug, Default)]
pub struct ConsoleWindow {
    current: Arc<Mutex<Option<WindowSample>>>,
}

impl ConsoleWindow {
    pub fn focus(&self, sample: WindowSample) {
        *self.current.lock() = Some(sample);
    }
}

#[async_trait]
impl WindowSource for ConsoleWindow {
    async fn foreground_window(&mut self) -> Result<WindowSample, WindowError> {
        self.current
            .lock()
            .clone()
            .ok_or(WindowError::NoForegroundWindow)
    }
}

/// Idle time measured from the last console input
#[derive(Clone, Debug)]
pub struct InputClock {
    last_input: Arc<Mutex<Instant>>,
}

impl Default for InputClock {
    fn default() -> Self {
        Self {
            last_input: Arc::new(Mutex::new(Instant::now())),
        }
    }
}

impl InputClock {
    pub fn touch(&self) {
        *self.last_input.lock() = Instant::now();
    }

    /// Pretend the last input was `secs` ago
    pub fn set_idle(&self, secs: f64) {
        let now = Instant::now();
        let back = Duration::try_from_secs_f64(secs).unwrap_or_default();
        *self.last_input.lock() = now.checked_sub(back).unwrap_or(now);
    }
}

impl IdleSource for InputClock {
    fn idle_seconds(&self) -> f64 {
        self.last_input.lock().elapsed().as_secs_f64()
    }
}

// =============================================================================
// Console
// =============================================================================

/// Why [`Console::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Quit,
    Eof,
}

pub struct Console {
    pub window: ConsoleWindow,
    pub clock: InputClock,
    pub publisher: EventPublisher,
    pub keys: KeyActivityGate,
    pub sampler: SamplerHandle,
    pub board: StatusBoard,
    pub character: String,
}

impl Console {
    /// Apply one command; returns the text to print, `None` on quit
    pub fn execute(&self, command: ConsoleCommand) -> Option<String> {
        let reply = match command {
            ConsoleCommand::Focus { process, title } => {
                self.clock.touch();
                let reply = format!("focused {process}");
                self.window.focus(WindowSample::new(process, title));
                reply
            }
            ConsoleCommand::Key(key) => {
                self.clock.touch();
                match self.keys.record_key(&key) {
                    Some(count) => format!("key #{count}"),
                    None => "not programming, key not counted".to_string(),
                }
            }
            ConsoleCommand::Interact(kind) => {
                self.clock.touch();
                let reply = format!("{} sent", kind.as_str());
                self.publisher
                    .emit(Event::interaction(kind, Some(self.character.clone())));
                reply
            }
            ConsoleCommand::Goal(name) => {
                let reply = format!("goal '{name}' reached");
                self.publisher.emit(Event::GoalReached { name: Some(name) });
                reply
            }
            ConsoleCommand::Achievement(name) => {
                self.publisher.emit(Event::AchievementUnlocked { name });
                "achievement unlocked".to_string()
            }
            ConsoleCommand::Idle(secs) => {
                self.clock.set_idle(secs);
                format!("idle for {secs}s")
            }
            ConsoleCommand::Stats => self.stats(),
            ConsoleCommand::Reset => {
                self.sampler.reset_daily_stats();
                self.keys.reset_daily_stats();
                "statistics reset".to_string()
            }
            ConsoleCommand::Say(context) => self.board.say(context),
            ConsoleCommand::Help => HELP.to_string(),
            ConsoleCommand::Quit => return None,
        };
        Some(reply)
    }

    fn stats(&self) -> String {
        let daily = self.sampler.daily_stats();
        let keys = self.keys.key_stats();
        let mut lines = vec![
            format!(
                "programming: {:.1} min in {} session(s) [{:?}]",
                daily.total_seconds / 60.0,
                daily.session_count,
                self.sampler.classification()
            ),
            format!("keys: {} pressed", keys.total),
        ];
        for (app, secs) in &daily.app_breakdown {
            lines.push(format!("  {app}: {:.1} min", secs / 60.0));
        }
        if !keys.top_keys.is_empty() {
            let top: Vec<String> = keys
                .top_keys
                .iter()
                .map(|(key, count)| format!("{key}={count}"))
                .collect();
            lines.push(format!("  top keys: {}", top.join(", ")));
        }
        if let Some(pet) = self.board.latest() {
            lines.push(format!(
                "pet: {} the {} is {} / {} / {} (energy {:.0}, happiness {:.0})",
                pet.name, pet.species, pet.state, pet.mood, pet.action, pet.energy, pet.happiness
            ));
        }
        lines.join("\n")
    }

    /// Read commands from stdin until `quit` or end of input
    pub async fn run(self) -> ConsoleExit {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{HELP}");
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return ConsoleExit::Eof,
                Err(error) => {
                    tracing::warn!(error = %error, "Failed to read stdin");
                    return ConsoleExit::Eof;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<ConsoleCommand>() {
                Ok(command) => match self.execute(command) {
                    Some(reply) => println!("{reply}"),
                    None => return ConsoleExit::Quit,
                },
                Err(error) => println!("{error}"),
            }
        }
    }
}
