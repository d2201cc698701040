//! Memory Manager (mm)
//!
//! The slice of the memory manager the monitor needs:
//!
//! - **PTE**: hardware page table entry word and its flag bits
//! - **Walker**: the page-table walk contract (`PageWalker`)
//! - **View**: capability-scoped reads of kernel memory (`KernelMemory`)
//!
//! # Address Space Layout (x86_64)
//!
//! - User space: 0x0000_0000_0000_0000 - 0x0000_7FFF_FFFF_FFFF
//! - Kernel space: 0xFFFF_8000_0000_0000 - 0xFFFF_FFFF_FFFF_FFFF

pub mod pte;
pub mod view;
pub mod walk;

pub use pte::{HardwarePte, PteFlags, FLAG_FIELD_MASK};
pub use view::{DirectMemory, KernelMemory};
pub use walk::PageWalker;

/// Page size (4KB)
pub const PAGE_SIZE: u64 = 4096;

/// log2(PAGE_SIZE)
pub const PAGE_SHIFT: u64 = 12;

/// Kernel space start address
pub const KERNEL_SPACE_START: u64 = 0xFFFF_8000_0000_0000;

/// Round an address down to its page boundary
#[inline]
pub const fn page_round_down(addr: u64) -> u64 {
    addr & !(PAGE_SIZE - 1)
}

/// Page number of an address
#[inline]
pub const fn page_number(addr: u64) -> u64 {
    addr >> PAGE_SHIFT
}
