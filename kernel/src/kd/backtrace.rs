//! Stack Backtrace
//!
//! Walks the saved frame pointer chain. With frame pointers enabled every
//! frame starts with the caller's saved `rbp`, followed by the return
//! address and whatever the caller left above it:
//!
//! ```text
//! fp + 6W  arg 5
//!   ...
//! fp + 2W  arg 1
//! fp + 1W  return address
//! fp       caller's fp  ──> next frame (higher address)
//! ```
//!
//! The "args" are the five words above the return address. They are
//! printed for every frame whatever the callee's real arity, so they are
//! only a hint: on x86_64 most arguments travel in registers.
//!
//! The walk is bounded: it stops at a null link, after `backtrace_depth`
//! frames, or at a link that is misaligned or does not move up the stack.

use core::mem::size_of;

use x86_64::VirtAddr;

use crate::arch::{self, TrapFrame};
use crate::console_println;
use crate::error::MonitorError;
use crate::mm::KernelMemory;

use super::commands::{report, Status};
use super::monitor::Monitor;
use super::symbols::lookup;

/// Size of one stack slot
const WORD: usize = size_of::<usize>();

/// Number of argument words printed per frame
pub const FRAME_ARGS: usize = 5;

/// One frame of the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackFrame {
    /// Frame pointer of this frame
    pub fp: usize,
    /// Return address into the caller
    pub ret: usize,
    /// Words above the return address
    pub args: [usize; FRAME_ARGS],
    /// Saved frame pointer of the caller (0 ends the chain)
    pub caller_fp: usize,
}

impl StackFrame {
    /// Read the frame at `fp`
    pub fn read(memory: &dyn KernelMemory, fp: usize) -> Result<Self, MonitorError> {
        let slot = |index: usize| -> Result<usize, MonitorError> {
            let addr = (fp as u64).wrapping_add((index * WORD) as u64);
            let va = VirtAddr::try_new(addr).map_err(|_| MonitorError::NonCanonical { addr })?;
            memory.read_word(va)
        };

        let caller_fp = slot(0)?;
        let ret = slot(1)?;
        let mut args = [0usize; FRAME_ARGS];
        for (i, arg) in args.iter_mut().enumerate() {
            *arg = slot(2 + i)?;
        }
        Ok(Self { fp, ret, args, caller_fp })
    }
}

/// Bounded iterator over the frame pointer chain
///
/// Yields an `Err` once when the walk is cut short, then ends.
pub struct Backtrace<'m> {
    memory: &'m dyn KernelMemory,
    fp: usize,
    depth: usize,
    max_depth: usize,
    pending: Option<MonitorError>,
}

impl<'m> Backtrace<'m> {
    /// Walk from the frame at `fp`, yielding at most `max_depth` frames
    pub fn new(memory: &'m dyn KernelMemory, fp: usize, max_depth: usize) -> Self {
        Self {
            memory,
            fp,
            depth: 0,
            max_depth,
            pending: None,
        }
    }

    fn stop(&mut self, err: MonitorError) -> Option<Result<StackFrame, MonitorError>> {
        self.fp = 0;
        Some(Err(err))
    }
}

impl Iterator for Backtrace<'_> {
    type Item = Result<StackFrame, MonitorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            return self.stop(err);
        }
        if self.fp == 0 {
            return None;
        }
        if self.depth == self.max_depth {
            return self.stop(MonitorError::StackDepthExceeded { max: self.max_depth });
        }

        let frame = match StackFrame::read(self.memory, self.fp) {
            Ok(frame) => frame,
            Err(err) => return self.stop(err),
        };
        self.depth += 1;

        let next = frame.caller_fp;
        if next != 0 && (next % WORD != 0 || next <= self.fp) {
            self.pending = Some(MonitorError::BadFramePointer { fp: self.fp, next });
            self.fp = 0;
        } else {
            self.fp = next;
        }
        Some(Ok(frame))
    }
}

/// Display stack
pub fn cmd_backtrace(mon: &mut Monitor<'_>, _args: &[&str], _tf: Option<&mut TrapFrame>) -> Status {
    console_println!(mon.console, "Stack backtrace:");

    let memory = mon.memory;
    // Read inline so the walk starts at this command's own frame
    let fp = match mon.frame_pointer {
        Some(read) => read(),
        None => arch::read_frame_pointer(),
    };
    for frame in Backtrace::new(memory, fp, mon.config.backtrace_depth) {
        match frame {
            Ok(frame) => print_frame(mon, &frame),
            Err(err) => return report(mon, Err(err)),
        }
    }
    Status::Continue
}

fn print_frame(mon: &mut Monitor<'_>, frame: &StackFrame) {
    let symbols = mon.symbols;
    let info = lookup(symbols, frame.ret);
    let a = &frame.args;

    console_println!(
        mon.console,
        "  rbp {:016x}  rip {:016x}  args {:016x} {:016x} {:016x} {:016x} {:016x}",
        frame.fp,
        frame.ret,
        a[0],
        a[1],
        a[2],
        a[3],
        a[4]
    );
    console_println!(
        mon.console,
        "         {}:{}: {}+{}",
        info.file,
        info.line,
        info.fn_name,
        info.offset(frame.ret)
    );
}
