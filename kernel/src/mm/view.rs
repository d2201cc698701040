//! Kernel Memory View
//!
//! All raw reads the monitor performs go through `KernelMemory`, so the
//! unsafe dereferences live in one place. `DirectMemory` is the view used
//! on real hardware: it reads through the kernel's direct physical map.

use core::mem::size_of;
use core::ptr;
use x86_64::{PhysAddr, VirtAddr};

use crate::error::MonitorError;

/// Read access to kernel memory
pub trait KernelMemory {
    /// Read a 32-bit word at a kernel virtual address
    fn read_u32(&self, va: VirtAddr) -> Result<u32, MonitorError>;

    /// Read a native word at a kernel virtual address
    fn read_word(&self, va: VirtAddr) -> Result<usize, MonitorError>;

    /// Translate a physical address into the kernel's direct map
    fn phys_to_virt(&self, pa: PhysAddr) -> Result<VirtAddr, MonitorError>;
}

/// Direct, unchecked view of kernel memory
///
/// Reads dereference the address as given. A bad address faults into the
/// kernel's page fault handler. Only physical translation is checked, and
/// only when an installed-memory limit is set.
#[derive(Debug, Clone, Copy)]
pub struct DirectMemory {
    /// Virtual address where physical address 0 is mapped
    phys_offset: u64,
    /// End of installed physical memory, if known
    phys_limit: Option<u64>,
}

impl DirectMemory {
    /// Create a view over the direct map at `phys_offset`
    ///
    /// # Safety
    /// Physical memory must be mapped at `phys_offset`, and the caller
    /// accepts that reads through this view may touch any kernel mapping.
    pub const unsafe fn new(phys_offset: VirtAddr) -> Self {
        Self {
            phys_offset: phys_offset.as_u64(),
            phys_limit: None,
        }
    }

    /// Reject physical addresses at or above `limit`
    pub const fn with_phys_limit(mut self, limit: u64) -> Self {
        self.phys_limit = Some(limit);
        self
    }

    fn check_phys(&self, pa: u64, len: usize) -> Result<(), MonitorError> {
        match self.phys_limit {
            Some(limit) if pa.saturating_add(len as u64) > limit => {
                Err(MonitorError::OutOfRange { addr: pa })
            }
            _ => Ok(()),
        }
    }
}

impl KernelMemory for DirectMemory {
    fn read_u32(&self, va: VirtAddr) -> Result<u32, MonitorError> {
        // SAFETY: the view was created by a caller that accepted raw access
        Ok(unsafe { ptr::read_unaligned(va.as_ptr::<u32>()) })
    }

    fn read_word(&self, va: VirtAddr) -> Result<usize, MonitorError> {
        // SAFETY: as above
        Ok(unsafe { ptr::read_unaligned(va.as_ptr::<usize>()) })
    }

    fn phys_to_virt(&self, pa: PhysAddr) -> Result<VirtAddr, MonitorError> {
        self.check_phys(pa.as_u64(), size_of::<u32>())?;
        let addr = self.phys_offset.wrapping_add(pa.as_u64());
        VirtAddr::try_new(addr).map_err(|_| MonitorError::NonCanonical { addr })
    }
}
