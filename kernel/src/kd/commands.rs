//! Monitor Commands
//!
//! The command table and the commands that need no machine access.

use crate::arch::TrapFrame;
use crate::console_println;
use crate::error::MonitorError;

use super::monitor::Monitor;
use super::{backtrace, dump, pagemap, resume};

/// Outcome of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Read the next line
    Continue,
    /// Leave the monitor
    Exit,
    /// Leave the monitor and resume the paused context
    Resume,
}

/// Command handler: full argument vector (name first) and the paused
/// context, if any
pub type CommandFn = fn(&mut Monitor<'_>, &[&str], Option<&mut TrapFrame>) -> Status;

/// Monitor command
pub struct Command {
    pub name: &'static str,
    pub desc: &'static str,
    pub func: CommandFn,
}

/// All monitor commands, in `help` order
pub static COMMANDS: [Command; 9] = [
    Command { name: "help", desc: "Display this list of commands", func: cmd_help },
    Command { name: "kerninfo", desc: "Display information about the kernel", func: cmd_kerninfo },
    Command { name: "backtrace", desc: "Display stack", func: backtrace::cmd_backtrace },
    Command { name: "map", desc: "Display mapping", func: pagemap::cmd_map },
    Command { name: "set", desc: "Set mapping", func: pagemap::cmd_set },
    Command { name: "xp", desc: "Dump physical memory", func: dump::cmd_xp },
    Command { name: "xv", desc: "Dump virtual memory", func: dump::cmd_xv },
    Command { name: "c", desc: "Continue process", func: resume::cmd_continue },
    Command { name: "si", desc: "Step", func: resume::cmd_step },
];

/// Find a command by exact name
pub fn lookup(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|cmd| cmd.name == name)
}

/// Turn a command result into a status, printing any error
///
/// Errors that end the session are logged at `warn`, all others at
/// `debug`.
pub(crate) fn report(mon: &mut Monitor<'_>, result: Result<Status, MonitorError>) -> Status {
    match result {
        Ok(status) => status,
        Err(err) => {
            console_println!(mon.console, "{}", err);
            if err.is_terminal() {
                log::warn!(target: "kd", "{}", err);
                Status::Exit
            } else {
                log::debug!(target: "kd", "{}", err);
                Status::Continue
            }
        }
    }
}

/// Display the list of commands
fn cmd_help(mon: &mut Monitor<'_>, _args: &[&str], _tf: Option<&mut TrapFrame>) -> Status {
    for cmd in COMMANDS.iter() {
        console_println!(mon.console, "{} - {}", cmd.name, cmd.desc);
    }
    Status::Continue
}

/// Display the kernel image layout
fn cmd_kerninfo(mon: &mut Monitor<'_>, _args: &[&str], _tf: Option<&mut TrapFrame>) -> Status {
    mon.layout.print(mon.console);
    Status::Continue
}
