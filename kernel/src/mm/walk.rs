//! Page Table Walk
//!
//! x86_64 uses 4-level paging:
//! - PML4 (Page Map Level 4) - 512 entries, each covers 512GB
//! - PDPT (Page Directory Pointer Table) - 512 entries, each covers 1GB
//! - PD (Page Directory) - 512 entries, each covers 2MB
//! - PT (Page Table) - 512 entries, each covers 4KB
//!
//! `PageWalker` is the contract the monitor relies on. `OffsetWalker`
//! implements it for page tables reachable through the direct physical
//! map, allocating missing tables from a frame allocator.

use core::ptr;
use x86_64::structures::paging::{FrameAllocator, Size4KiB};
use x86_64::{PhysAddr, VirtAddr};

use super::pte::{HardwarePte, PteFlags};
use super::PAGE_SIZE;

/// Number of entries per page table (all levels)
pub const ENTRIES_PER_TABLE: usize = 512;

/// Resolves virtual addresses to their page table entries
pub trait PageWalker {
    /// Find the leaf entry mapping `va`
    ///
    /// With `create`, missing intermediate tables are allocated. Returns
    /// `None` if a table is missing and `create` is false, or allocation
    /// failed.
    fn walk(&mut self, va: VirtAddr, create: bool) -> Option<&mut HardwarePte>;

    /// Drop any cached translation of `va` after its entry was rewritten
    fn flush(&mut self, _va: VirtAddr) {}
}

/// One page table (any level)
#[repr(C, align(4096))]
pub struct PageTable {
    pub entries: [HardwarePte; ENTRIES_PER_TABLE],
}

impl PageTable {
    /// Create an all-empty table
    pub const fn new() -> Self {
        Self {
            entries: [HardwarePte::empty(); ENTRIES_PER_TABLE],
        }
    }
}

/// Table index of `va` at `level` (3 = PML4 .. 0 = PT)
#[inline]
fn table_index(va: VirtAddr, level: u32) -> usize {
    ((va.as_u64() >> (12 + 9 * level)) & 0x1FF) as usize
}

/// Walker over page tables mapped at a fixed physical offset
pub struct OffsetWalker<'a, A: FrameAllocator<Size4KiB>> {
    /// Physical address of the PML4
    root: PhysAddr,
    /// Virtual address where physical address 0 is mapped
    phys_offset: u64,
    /// Source of frames for new tables
    frames: &'a mut A,
}

impl<'a, A: FrameAllocator<Size4KiB>> OffsetWalker<'a, A> {
    /// Create a walker rooted at the PML4 at `root`
    ///
    /// # Safety
    /// `root` must be a valid PML4 and all physical memory that holds page
    /// tables must be mapped at `phys_offset`.
    pub unsafe fn new(root: PhysAddr, phys_offset: VirtAddr, frames: &'a mut A) -> Self {
        Self {
            root,
            phys_offset: phys_offset.as_u64(),
            frames,
        }
    }

    /// Create a walker over the page tables currently loaded in CR3
    ///
    /// # Safety
    /// See [`OffsetWalker::new`].
    #[cfg(target_arch = "x86_64")]
    pub unsafe fn active(phys_offset: VirtAddr, frames: &'a mut A) -> Self {
        let (pml4, _) = x86_64::registers::control::Cr3::read();
        Self::new(pml4.start_address(), phys_offset, frames)
    }

    fn table_at(&self, pa: u64) -> *mut PageTable {
        self.phys_offset.wrapping_add(pa) as *mut PageTable
    }
}

impl<A: FrameAllocator<Size4KiB>> PageWalker for OffsetWalker<'_, A> {
    fn walk(&mut self, va: VirtAddr, create: bool) -> Option<&mut HardwarePte> {
        let mut table = self.table_at(self.root.as_u64());

        for level in (1..=3).rev() {
            // SAFETY: tables are reachable through the direct map (see `new`)
            let entry = unsafe { &mut (*table).entries[table_index(va, level)] };
            let flags = entry.flags();

            if !flags.contains(PteFlags::PRESENT) {
                if !create {
                    return None;
                }
                let frame = self.frames.allocate_frame()?;
                let pa = frame.start_address().as_u64();
                // SAFETY: freshly allocated frame, mapped through the direct map
                unsafe { ptr::write_bytes(self.table_at(pa) as *mut u8, 0, PAGE_SIZE as usize) };
                let intermediate = PteFlags::PRESENT | PteFlags::WRITABLE | PteFlags::USER;
                *entry = HardwarePte::new(pa, intermediate.bits());
                log::trace!("walk: new level-{} table at {:#x} for {:#x}", level - 1, pa, va.as_u64());
            } else if flags.contains(PteFlags::HUGE_PAGE) {
                // Large page mapping ends the walk early
                return Some(entry);
            }

            table = self.table_at(entry.phys_addr());
        }

        // SAFETY: as above
        Some(unsafe { &mut (*table).entries[table_index(va, 0)] })
    }

    #[cfg(target_arch = "x86_64")]
    fn flush(&mut self, va: VirtAddr) {
        x86_64::instructions::tlb::flush(va);
    }
}
