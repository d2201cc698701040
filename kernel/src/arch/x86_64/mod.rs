//! x86_64 architecture support
//!
//! - Trap frame layout pushed by the trap entry path
//! - Exception vector numbers and their names
//! - Frame pointer access for stack walks

pub mod trapframe;

pub use trapframe::{GeneralRegisters, TrapFrame};

/// Exception vector numbers
pub mod trapno {
    pub const DIVIDE: u64 = 0;
    pub const DEBUG: u64 = 1;
    pub const NMI: u64 = 2;
    pub const BREAKPOINT: u64 = 3;
    pub const OVERFLOW: u64 = 4;
    pub const BOUND: u64 = 5;
    pub const INVALID_OPCODE: u64 = 6;
    pub const DEVICE_NOT_AVAILABLE: u64 = 7;
    pub const DOUBLE_FAULT: u64 = 8;
    pub const INVALID_TSS: u64 = 10;
    pub const SEGMENT_NOT_PRESENT: u64 = 11;
    pub const STACK_FAULT: u64 = 12;
    pub const GENERAL_PROTECTION: u64 = 13;
    pub const PAGE_FAULT: u64 = 14;
    pub const X87_FLOATING_POINT: u64 = 16;
    pub const ALIGNMENT_CHECK: u64 = 17;
    pub const MACHINE_CHECK: u64 = 18;
    pub const SIMD_FLOATING_POINT: u64 = 19;
}

/// Human-readable name of an exception vector
pub fn trap_name(trapno: u64) -> &'static str {
    const EXCEPTIONS: [&str; 20] = [
        "Divide error",
        "Debug",
        "Non-Maskable Interrupt",
        "Breakpoint",
        "Overflow",
        "BOUND Range Exceeded",
        "Invalid Opcode",
        "Device Not Available",
        "Double Fault",
        "Coprocessor Segment Overrun",
        "Invalid TSS",
        "Segment Not Present",
        "Stack Fault",
        "General Protection",
        "Page Fault",
        "(unknown trap)",
        "x87 FPU Floating-Point Error",
        "Alignment Check",
        "Machine-Check",
        "SIMD Floating-Point Exception",
    ];

    EXCEPTIONS
        .get(trapno as usize)
        .copied()
        .unwrap_or("(unknown trap)")
}

/// Read the current frame pointer (RBP)
///
/// Only meaningful when the kernel is built with frame pointers kept
/// (`-C force-frame-pointers=yes`); otherwise RBP is a general register.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub fn read_frame_pointer() -> usize {
    let rbp: usize;
    unsafe {
        core::arch::asm!(
            "mov {}, rbp",
            out(reg) rbp,
            options(nomem, nostack, preserves_flags)
        );
    }
    rbp
}

/// Frame pointers are not available on this architecture
#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub fn read_frame_pointer() -> usize {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trap_names() {
        assert_eq!(trap_name(trapno::BREAKPOINT), "Breakpoint");
        assert_eq!(trap_name(trapno::DEBUG), "Debug");
        assert_eq!(trap_name(trapno::PAGE_FAULT), "Page Fault");
        assert_eq!(trap_name(15), "(unknown trap)");
        assert_eq!(trap_name(0x80), "(unknown trap)");
    }
}
