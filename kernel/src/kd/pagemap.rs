//! Page mapping commands
//!
//! `map` shows the leaf PTE of every page in a range; `set` rewrites the
//! low flag field (bits 0-11) of one page and keeps bits 52-63, NX
//! included. Both walk with `create`, so looking at an
//! unmapped range allocates the page tables that would cover it.
//!
//! Status line layout:
//!
//! ```text
//! [  400-  401] G--A---WP   1f3
//!  ^page  ^page+1  ^flags    ^frame
//! ```

use x86_64::VirtAddr;

use crate::arch::TrapFrame;
use crate::console_println;
use crate::error::MonitorError;
use crate::mm::{page_number, page_round_down, HardwarePte, FLAG_FIELD_MASK, PAGE_SIZE};

use super::commands::{report, Status};
use super::monitor::Monitor;
use super::parse::number_arg;

const MAP_USAGE: &str = "map <start> <end>";
const SET_USAGE: &str = "set <page> <flags>";

/// Display mapping
pub fn cmd_map(mon: &mut Monitor<'_>, args: &[&str], _tf: Option<&mut TrapFrame>) -> Status {
    let result = show_range(mon, args);
    report(mon, result)
}

/// Set mapping
pub fn cmd_set(mon: &mut Monitor<'_>, args: &[&str], _tf: Option<&mut TrapFrame>) -> Status {
    let result = set_flags(mon, args);
    report(mon, result)
}

fn show_range(mon: &mut Monitor<'_>, args: &[&str]) -> Result<Status, MonitorError> {
    let start = number_arg(args, 1, "start", MAP_USAGE)?;
    let end = number_arg(args, 2, "end", MAP_USAGE)?;
    if start > end {
        return Err(MonitorError::InvertedRange { start, end });
    }

    let mut page = page_round_down(start);
    while page < end {
        let pte = walk(mon, page)?;
        print_status(mon, page, pte);
        page = match page.checked_add(PAGE_SIZE) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(Status::Continue)
}

fn set_flags(mon: &mut Monitor<'_>, args: &[&str]) -> Result<Status, MonitorError> {
    let page = number_arg(args, 1, "page", SET_USAGE)?;
    let flags = number_arg(args, 2, "flags", SET_USAGE)?;
    if page >= mon.config.kernel_base {
        return Err(MonitorError::KernelAddress { addr: page });
    }
    if flags & !FLAG_FIELD_MASK != 0 {
        return Err(MonitorError::FlagsOutOfRange { flags });
    }

    let page = page_round_down(page);
    let va = canonical(page)?;
    let entry = mon
        .pgdir
        .walk(va, true)
        .ok_or(MonitorError::NoPageTable { addr: page })?;
    let before = *entry;
    entry.replace_flags(flags);
    let after = *entry;
    mon.pgdir.flush(va);

    log::info!(target: "kd", "set {:#x}: {:#018x} -> {:#018x}", page, before.raw(), after.raw());
    print_status(mon, page, after);
    Ok(Status::Continue)
}

fn canonical(addr: u64) -> Result<VirtAddr, MonitorError> {
    VirtAddr::try_new(addr).map_err(|_| MonitorError::NonCanonical { addr })
}

/// Copy of the leaf entry for `page`, creating tables on the way
fn walk(mon: &mut Monitor<'_>, page: u64) -> Result<HardwarePte, MonitorError> {
    let va = canonical(page)?;
    mon.pgdir
        .walk(va, true)
        .map(|pte| *pte)
        .ok_or(MonitorError::NoPageTable { addr: page })
}

fn print_status(mon: &mut Monitor<'_>, page: u64, pte: HardwarePte) {
    let pn = page_number(page);
    console_println!(
        mon.console,
        "[{:5x}-{:5x}] {} {:5x}",
        pn,
        pn + 1,
        pte.flags().status(),
        pte.frame_number()
    );
}
