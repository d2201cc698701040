//! Kernel image layout
//!
//! Addresses of the linker-script symbols `kerninfo` reports.

use crate::console::Console;
use crate::console_println;

/// Kernel image boundaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelLayout {
    /// `_start`, physical load address of the image
    pub start: u64,
    /// `entry`, virtual entry point
    pub entry: u64,
    /// `etext`, end of code
    pub etext: u64,
    /// `edata`, end of initialized data
    pub edata: u64,
    /// `end`, end of the image (after bss)
    pub end: u64,
    /// Virtual address the image is linked at minus its physical address
    pub kernel_base: u64,
}

impl KernelLayout {
    /// Physical address of a kernel virtual address
    pub const fn phys(&self, virt: u64) -> u64 {
        virt.wrapping_sub(self.kernel_base)
    }

    /// Image size from `entry` to `end`, rounded up to whole KB
    pub const fn footprint_kb(&self) -> u64 {
        self.end.saturating_sub(self.entry).div_ceil(1024)
    }

    /// Print the `kerninfo` report
    pub fn print(&self, console: &mut dyn Console) {
        console_println!(console, "Special kernel symbols:");
        console_println!(console, "  _start                  {:08x} (phys)", self.start);
        for (name, virt) in [
            ("entry", self.entry),
            ("etext", self.etext),
            ("edata", self.edata),
            ("end  ", self.end),
        ] {
            console_println!(console, "  {}  {:08x} (virt)  {:08x} (phys)", name, virt, self.phys(virt));
        }
        console_println!(console, "Kernel executable memory footprint: {}KB", self.footprint_kb());
    }
}

#[cfg(feature = "linker-symbols")]
impl KernelLayout {
    /// Read the layout from the kernel's linker-script symbols
    pub fn from_linker_symbols(kernel_base: u64) -> Self {
        extern "C" {
            static _start: u8;
            static entry: u8;
            static etext: u8;
            static edata: u8;
            static end: u8;
        }

        unsafe {
            Self {
                start: core::ptr::addr_of!(_start) as u64,
                entry: core::ptr::addr_of!(entry) as u64,
                etext: core::ptr::addr_of!(etext) as u64,
                edata: core::ptr::addr_of!(edata) as u64,
                end: core::ptr::addr_of!(end) as u64,
                kernel_base,
            }
        }
    }
}
