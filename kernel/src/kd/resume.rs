//! Resume commands
//!
//! `c` and `si` only prepare the paused context. They set or clear the
//! single-step flag and return `Status::Resume`; [`Monitor::enter`] then
//! hands the frame to the kernel's [`EnvRunner`].
//!
//! [`Monitor::enter`]: super::Monitor::enter

use crate::arch::TrapFrame;
use crate::console_println;
use crate::error::MonitorError;

use super::commands::{report, Status};
use super::monitor::Monitor;
use super::symbols::lookup;

/// Restarts a paused context
pub trait EnvRunner {
    /// Return to the context described by `tf`; never comes back
    fn run(&mut self, tf: &mut TrapFrame) -> !;
}

/// The frame, if it was paused by a breakpoint or single-step trap
fn paused(tf: Option<&mut TrapFrame>) -> Result<&mut TrapFrame, MonitorError> {
    tf.filter(|tf| tf.is_debug_event())
        .ok_or(MonitorError::InvalidTrapFrame)
}

/// Continue process
pub fn cmd_continue(mon: &mut Monitor<'_>, _args: &[&str], tf: Option<&mut TrapFrame>) -> Status {
    let result = paused(tf).map(|tf| {
        tf.set_single_step(false);
        log::debug!(target: "kd", "continue at {:#x}", tf.rip);
        Status::Resume
    });
    report(mon, result)
}

/// Step
pub fn cmd_step(mon: &mut Monitor<'_>, _args: &[&str], tf: Option<&mut TrapFrame>) -> Status {
    let tf = match paused(tf) {
        Ok(tf) => tf,
        Err(err) => return report(mon, Err(err)),
    };

    let rip = tf.rip as usize;
    let info = lookup(mon.symbols, rip);
    console_println!(
        mon.console,
        "0x{:08x} {}:{}: {}+{}",
        rip,
        info.file,
        info.line,
        info.fn_name,
        info.offset(rip)
    );

    tf.set_single_step(true);
    Status::Resume
}
