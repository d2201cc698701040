//! Memory dump commands
//!
//! `xv` dumps kernel virtual memory, `xp` physical memory through the
//! direct map. Output is four 32-bit words per line:
//!
//! ```text
//! [00100000]: 0x1badb002 0x00000000 0xe4524ffe 0x7205c766
//! ```
//!
//! `length` counts words, rounded up to whole lines.

use x86_64::{PhysAddr, VirtAddr};

use crate::arch::TrapFrame;
use crate::console_println;
use crate::error::MonitorError;
use crate::mm::KernelMemory;

use super::commands::{report, Status};
use super::monitor::Monitor;
use super::parse::number_arg;

const WORDS_PER_LINE: u64 = 4;
const XP_USAGE: &str = "xp <start> <length>";
const XV_USAGE: &str = "xv <start> <length>";

/// Address space a dump reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Space {
    Virtual,
    Physical,
}

impl Space {
    fn read(self, memory: &dyn KernelMemory, addr: u64) -> Result<u32, MonitorError> {
        let va = match self {
            Space::Virtual => {
                VirtAddr::try_new(addr).map_err(|_| MonitorError::NonCanonical { addr })?
            }
            Space::Physical => {
                let pa = PhysAddr::try_new(addr).map_err(|_| MonitorError::OutOfRange { addr })?;
                memory.phys_to_virt(pa)?
            }
        };
        memory.read_u32(va)
    }
}

/// Dump physical memory
pub fn cmd_xp(mon: &mut Monitor<'_>, args: &[&str], _tf: Option<&mut TrapFrame>) -> Status {
    let result = dump(mon, args, Space::Physical, XP_USAGE);
    report(mon, result)
}

/// Dump virtual memory
pub fn cmd_xv(mon: &mut Monitor<'_>, args: &[&str], _tf: Option<&mut TrapFrame>) -> Status {
    let result = dump(mon, args, Space::Virtual, XV_USAGE);
    report(mon, result)
}

fn dump(mon: &mut Monitor<'_>, args: &[&str], space: Space, usage: &'static str) -> Result<Status, MonitorError> {
    let mut addr = number_arg(args, 1, "start", usage)?;
    let length = number_arg(args, 2, "length", usage)?;

    for _ in (0..length).step_by(WORDS_PER_LINE as usize) {
        let mut words = [0u32; WORDS_PER_LINE as usize];
        for (i, word) in words.iter_mut().enumerate() {
            *word = space.read(mon.memory, addr.wrapping_add(4 * i as u64))?;
        }
        console_println!(
            mon.console,
            "[{:08x}]: 0x{:08x} 0x{:08x} 0x{:08x} 0x{:08x}",
            addr,
            words[0],
            words[1],
            words[2],
            words[3]
        );
        addr = addr.wrapping_add(4 * WORDS_PER_LINE);
    }
    Ok(Status::Continue)
}
