use crate::error::JigglerError;
use std::fmt;
use std::str::FromStr;

/// Команда управления, пришедшая из stdin или по сигналу
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Enable,
    Disable,
    Toggle,
    /// `None` переключает zen режим
    Zen(Option<bool>),
    Interval(u64),
    Status,
    Help,
    Quit,
}

impl FromStr for ControlCommand {
    type Err = JigglerError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace().map(str::to_lowercase);
        let invalid = || JigglerError::InvalidCommand(line.trim().to_string());

        let command = match words.next().as_deref() {
            Some("on" | "start" | "resume") => ControlCommand::Enable,
            Some("off" | "pause") => ControlCommand::Disable,
            Some("toggle" | "t") => ControlCommand::Toggle,
            Some("zen" | "z") => match words.next().as_deref() {
                None => ControlCommand::Zen(None),
                Some("on") => ControlCommand::Zen(Some(true)),
                Some("off") => ControlCommand::Zen(Some(false)),
                Some(_) => return Err(invalid()),
            },
            Some("interval" | "seconds" | "s") => {
                let seconds = words
                    .next()
                    .and_then(|w| w.parse::<u64>().ok())
                    .ok_or_else(invalid)?;
                ControlCommand::Interval(seconds)
            }
            Some("status") => ControlCommand::Status,
            Some("help" | "?") => ControlCommand::Help,
            Some("quit" | "exit" | "q") => ControlCommand::Quit,
            _ => return Err(invalid()),
        };

        if words.next().is_some() {
            return Err(invalid());
        }

        Ok(command)
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::Enable => write!(f, "on"),
            ControlCommand::Disable => write!(f, "off"),
            ControlCommand::Toggle => write!(f, "toggle"),
            ControlCommand::Zen(None) => write!(f, "zen"),
            ControlCommand::Zen(Some(true)) => write!(f, "zen on"),
            ControlCommand::Zen(Some(false)) => write!(f, "zen off"),
            ControlCommand::Interval(seconds) => write!(f, "interval {}", seconds),
            ControlCommand::Status => write!(f, "status"),
            ControlCommand::Help => write!(f, "help"),
            ControlCommand::Quit => write!(f, "quit"),
        }
    }
}

pub const HELP: &str = "\
Команды:
  on | off | toggle       включить / поставить на паузу / переключить подёргивание
  zen [on|off]            невидимый (нулевой) сдвиг
  interval <1..10800>     интервал между сдвигами в секундах
  status                  текущее состояние и счётчики
  quit                    завершить работу";
