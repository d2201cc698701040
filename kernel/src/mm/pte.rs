//! Page Table Entry (PTE) Implementation
//!
//! # Page Table Entry Format
//! ```text
//! Bit 0:     Present
//! Bit 1:     Read/Write
//! Bit 2:     User/Supervisor
//! Bit 3:     Write-Through
//! Bit 4:     Cache Disable
//! Bit 5:     Accessed
//! Bit 6:     Dirty
//! Bit 7:     Page Size (1=Large page)
//! Bit 8:     Global
//! Bits 9-11: Available
//! Bits 12-51: Physical address (40 bits, 4KB aligned)
//! Bits 52-62: Available
//! Bit 63:    No Execute
//! ```

use core::fmt;

use super::PAGE_SHIFT;

/// Mask for physical address (bits 12-51)
pub const ADDR_MASK: u64 = 0x000F_FFFF_FFFF_F000;

/// Mask for the low flag field an operator may rewrite (bits 0-11)
pub const FLAG_FIELD_MASK: u64 = 0xFFF;

bitflags::bitflags! {
    /// Hardware flag bits the monitor reports
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PteFlags: u64 {
        /// Page is present in memory
        const PRESENT = 1 << 0;
        /// Page is writable
        const WRITABLE = 1 << 1;
        /// Page is accessible from user mode
        const USER = 1 << 2;
        /// Write-through caching
        const WRITE_THROUGH = 1 << 3;
        /// Disable caching
        const CACHE_DISABLE = 1 << 4;
        /// Page has been accessed
        const ACCESSED = 1 << 5;
        /// Page has been written to
        const DIRTY = 1 << 6;
        /// Large page (2MB or 1GB)
        const HUGE_PAGE = 1 << 7;
        /// Global (not flushed on CR3 switch)
        const GLOBAL = 1 << 8;
        /// No execute
        const NO_EXECUTE = 1 << 63;
    }
}

/// Column order of the status string, most significant flag first
const STATUS_COLUMNS: [(PteFlags, char); 9] = [
    (PteFlags::GLOBAL, 'G'),
    (PteFlags::HUGE_PAGE, 'S'),
    (PteFlags::DIRTY, 'D'),
    (PteFlags::ACCESSED, 'A'),
    (PteFlags::CACHE_DISABLE, 'C'),
    (PteFlags::WRITE_THROUGH, 'T'),
    (PteFlags::USER, 'U'),
    (PteFlags::WRITABLE, 'W'),
    (PteFlags::PRESENT, 'P'),
];

impl PteFlags {
    /// Nine-character status string, `-` for each clear flag
    pub fn status(self) -> FlagStatus {
        FlagStatus(self)
    }
}

/// Renders `PteFlags` as e.g. `G--A---WP`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagStatus(PteFlags);

impl fmt::Display for FlagStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        for (flag, letter) in STATUS_COLUMNS {
            f.write_char(if self.0.contains(flag) { letter } else { '-' })?;
        }
        Ok(())
    }
}

/// Hardware Page Table Entry
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct HardwarePte(u64);

impl HardwarePte {
    /// Create an empty (not present) PTE
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Create a PTE with the given physical address and flags
    ///
    /// `flags` may carry both the low field and bits 52-63.
    pub const fn new(phys_addr: u64, flags: u64) -> Self {
        Self((phys_addr & ADDR_MASK) | (flags & !ADDR_MASK))
    }

    /// Get the raw value
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Get the physical address
    pub fn phys_addr(&self) -> u64 {
        self.0 & ADDR_MASK
    }

    /// Physical frame number
    pub fn frame_number(&self) -> u64 {
        self.phys_addr() >> PAGE_SHIFT
    }

    /// The reported hardware flags
    pub fn flags(&self) -> PteFlags {
        PteFlags::from_bits_truncate(self.0)
    }

    /// Whole low flag field, including the available bits
    pub fn flag_field(&self) -> u64 {
        self.0 & FLAG_FIELD_MASK
    }

    /// Is the no-execute bit set?
    pub fn no_execute(&self) -> bool {
        self.flags().contains(PteFlags::NO_EXECUTE)
    }

    /// Replace the low flag field
    ///
    /// Bits outside the field are dropped from `flags`. The physical
    /// address and bits 52-63 (NX included) are kept.
    pub fn replace_flags(&mut self, flags: u64) {
        self.0 = (self.0 & !FLAG_FIELD_MASK) | (flags & FLAG_FIELD_MASK);
    }
}

impl fmt::Debug for HardwarePte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nx = if self.no_execute() { " NX" } else { "" };
        write!(f, "HardwarePte({:#x} {}{})", self.phys_addr(), self.flags().status(), nx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string() {
        assert_eq!(PteFlags::empty().status().to_string(), "---------");
        assert_eq!(PteFlags::all().status().to_string(), "GSDACTUWP");

        let kernel_rw = PteFlags::PRESENT | PteFlags::WRITABLE | PteFlags::GLOBAL;
        assert_eq!(kernel_rw.status().to_string(), "G------WP");

        let user_dirty = PteFlags::PRESENT | PteFlags::USER | PteFlags::DIRTY | PteFlags::ACCESSED;
        assert_eq!(user_dirty.status().to_string(), "--DA--U-P");
    }

    #[test]
    fn test_replace_flags_keeps_frame() {
        let mut pte = HardwarePte::new(0x0012_3000, 0x63);
        assert_eq!(pte.frame_number(), 0x123);

        pte.replace_flags(0x7);
        assert_eq!(pte.phys_addr(), 0x0012_3000);
        assert_eq!(pte.flag_field(), 0x7);

        // Address bits smuggled in through the flags are dropped
        pte.replace_flags(0xABC_D001);
        assert_eq!(pte.phys_addr(), 0x0012_3000);
        assert_eq!(pte.flag_field(), 0x001);
    }

    #[test]
    fn test_replace_flags_keeps_high_bits() {
        let mut pte = HardwarePte::new(0x5000, PteFlags::NO_EXECUTE.bits() | (1 << 52) | 0x3);
        assert!(pte.no_execute());

        pte.replace_flags(0x1);
        assert_eq!(pte.raw(), 0x8010_0000_0000_5001);
        assert!(pte.no_execute());
        assert_eq!(format!("{:?}", pte), "HardwarePte(0x5000 --------P NX)");
    }

    #[test]
    fn test_available_bits_not_reported() {
        let pte = HardwarePte::new(0, 0xE01);
        assert_eq!(pte.flags(), PteFlags::PRESENT);
        assert_eq!(pte.flag_field(), 0xE01);
    }
}
