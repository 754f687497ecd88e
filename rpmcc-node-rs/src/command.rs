//! Interactive node commands

use crate::agent::AgentHandle;
use crate::error::{NodeError, Result};
use rpmcc_core::{ClockController, RateHz, RpmTransport};
use serde::Serialize;

pub const HELP: &str = "\
Commands:
  enable <clock>           - Enable a clock (vote its pending rate)
  disable <clock>          - Disable a clock
  set <clock> <hz>         - Change the rate of an enabled clock
  request <clock> <hz>     - Record the rate a disabled clock will vote on enable
  rate <clock>             - Show last requested rate
  status <clock>           - Show clock state
  clocks                   - List clock names
  state                    - Show every clock
  registers                - Show RPM register file
  history [n]              - Show last n RPM requests (default 10)
  help                     - Show this help
  quit                     - Exit
";

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Enable(String),
    Disable(String),
    SetRate(String, RateHz),
    RequestRate(String, RateHz),
    Rate(String),
    Status(String),
    Clocks,
    State,
    Registers,
    History(usize),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; `Ok(None)` for blank lines
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&verb) = parts.first() else {
            return Ok(None);
        };

        let clock = || {
            parts
                .get(1)
                .map(|s| s.to_string())
                .ok_or_else(|| NodeError::BadCommand(format!("{} needs a clock name", verb)))
        };
        let hz = || {
            parts
                .get(2)
                .ok_or_else(|| NodeError::BadCommand(format!("{} needs a rate in Hz", verb)))?
                .parse::<RateHz>()
                .map_err(|_| NodeError::BadCommand("rate must be an unsigned integer".to_string()))
        };

        let cmd = match verb {
            "enable" => Self::Enable(clock()?),
            "disable" => Self::Disable(clock()?),
            "set" => Self::SetRate(clock()?, hz()?),
            "request" => Self::RequestRate(clock()?, hz()?),
            "rate" => Self::Rate(clock()?),
            "status" => Self::Status(clock()?),
            "clocks" => Self::Clocks,
            "state" => Self::State,
            "registers" => Self::Registers,
            "history" => {
                let n = match parts.get(1) {
                    Some(n) => n
                        .parse()
                        .map_err(|_| NodeError::BadCommand("history count must be an integer".to_string()))?,
                    None => 10,
                };
                Self::History(n)
            }
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(NodeError::BadCommand(format!("unknown command '{}'", other))),
        };
        Ok(Some(cmd))
    }
}

fn json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Run a command and render its output
pub fn execute<T: RpmTransport>(
    cc: &ClockController<T>,
    agent: &AgentHandle,
    cmd: &Command,
) -> Result<String> {
    match cmd {
        Command::Enable(name) => json(&cc.enable(cc.lookup(name)?)?),
        Command::Disable(name) => json(&cc.disable(cc.lookup(name)?)?),
        Command::SetRate(name, hz) => json(&cc.set_rate(cc.lookup(name)?, *hz)?),
        Command::RequestRate(name, hz) => json(&cc.request_rate(cc.lookup(name)?, *hz)?),
        Command::Rate(name) => Ok(format!("{} Hz", cc.rate(cc.lookup(name)?)?)),
        Command::Status(name) => json(&cc.status(cc.lookup(name)?)?),
        Command::Clocks => Ok(cc.clocks().join("\n")),
        Command::State => json(&cc.snapshot()),
        Command::Registers => json(&agent.registers()),
        Command::History(n) => json(&agent.recent(*n)),
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    }
}
