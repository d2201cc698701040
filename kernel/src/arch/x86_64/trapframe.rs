//! Trap Frame
//!
//! The register snapshot the trap entry path pushes before calling into
//! the kernel. The layout is fixed by the entry stubs:
//!
//! ```text
//! [low address]
//!   r15 .. rax         <- pushed by the entry stub
//!   trapno, err        <- vector number, error code (0 if none)
//!   rip, cs, rflags    <- pushed by the CPU
//!   rsp, ss
//! [high address]
//! ```
//!
//! The monitor only borrows the frame; it is owned by the trap path for
//! the whole pause.

use core::fmt;
use ::x86_64::registers::rflags::RFlags;

use super::{trap_name, trapno};

/// General purpose registers saved by the entry stub
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneralRegisters {
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rbp: u64,
    pub rdi: u64,
    pub rsi: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub rbx: u64,
    pub rax: u64,
}

/// Paused execution context
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapFrame {
    /// Saved general purpose registers
    pub regs: GeneralRegisters,
    /// Exception vector that caused the pause
    pub trapno: u64,
    /// Error code (0 for vectors without one)
    pub err: u64,
    /// Instruction pointer
    pub rip: u64,
    /// Code segment selector
    pub cs: u64,
    /// RFLAGS word
    pub rflags: u64,
    /// Stack pointer
    pub rsp: u64,
    /// Stack segment selector
    pub ss: u64,
}

impl TrapFrame {
    /// Create a frame for the given vector with all registers zeroed
    pub const fn new(trapno: u64) -> Self {
        Self {
            regs: GeneralRegisters {
                r15: 0,
                r14: 0,
                r13: 0,
                r12: 0,
                r11: 0,
                r10: 0,
                r9: 0,
                r8: 0,
                rbp: 0,
                rdi: 0,
                rsi: 0,
                rdx: 0,
                rcx: 0,
                rbx: 0,
                rax: 0,
            },
            trapno,
            err: 0,
            rip: 0,
            cs: 0,
            rflags: 0,
            rsp: 0,
            ss: 0,
        }
    }

    /// Was this pause caused by a breakpoint or a single-step trap?
    pub fn is_debug_event(&self) -> bool {
        self.trapno == trapno::BREAKPOINT || self.trapno == trapno::DEBUG
    }

    /// RFLAGS as typed flags, unknown bits retained
    pub fn flags(&self) -> RFlags {
        RFlags::from_bits_retain(self.rflags)
    }

    /// Is the single-step (TF) flag set?
    pub fn single_step(&self) -> bool {
        self.flags().contains(RFlags::TRAP_FLAG)
    }

    /// Set or clear the single-step (TF) flag
    pub fn set_single_step(&mut self, enable: bool) {
        let mut flags = self.flags();
        flags.set(RFlags::TRAP_FLAG, enable);
        self.rflags = flags.bits();
    }
}

impl fmt::Display for TrapFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.regs;
        writeln!(f, "TRAP frame at {:p}", self)?;
        writeln!(f, "  rax  0x{:016x}  rbx  0x{:016x}", r.rax, r.rbx)?;
        writeln!(f, "  rcx  0x{:016x}  rdx  0x{:016x}", r.rcx, r.rdx)?;
        writeln!(f, "  rsi  0x{:016x}  rdi  0x{:016x}", r.rsi, r.rdi)?;
        writeln!(f, "  rbp  0x{:016x}  r8   0x{:016x}", r.rbp, r.r8)?;
        writeln!(f, "  r9   0x{:016x}  r10  0x{:016x}", r.r9, r.r10)?;
        writeln!(f, "  r11  0x{:016x}  r12  0x{:016x}", r.r11, r.r12)?;
        writeln!(f, "  r13  0x{:016x}  r14  0x{:016x}", r.r13, r.r14)?;
        writeln!(f, "  r15  0x{:016x}", r.r15)?;
        writeln!(f, "  trap 0x{:08x} {}", self.trapno, trap_name(self.trapno))?;
        writeln!(f, "  err  0x{:08x}", self.err)?;
        writeln!(f, "  rip  0x{:016x}", self.rip)?;
        writeln!(f, "  cs   0x----{:04x}", self.cs)?;
        writeln!(f, "  flag 0x{:08x}", self.rflags)?;
        writeln!(f, "  rsp  0x{:016x}", self.rsp)?;
        write!(f, "  ss   0x----{:04x}", self.ss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_event_vectors() {
        assert!(TrapFrame::new(trapno::BREAKPOINT).is_debug_event());
        assert!(TrapFrame::new(trapno::DEBUG).is_debug_event());
        assert!(!TrapFrame::new(trapno::PAGE_FAULT).is_debug_event());
        assert!(!TrapFrame::new(trapno::GENERAL_PROTECTION).is_debug_event());
    }

    #[test]
    fn test_single_step_flag_preserves_other_bits() {
        let mut tf = TrapFrame::new(trapno::BREAKPOINT);
        tf.rflags = 0x202; // IF | reserved bit 1
        tf.set_single_step(true);
        assert!(tf.single_step());
        assert_eq!(tf.rflags, 0x302);

        tf.set_single_step(false);
        assert!(!tf.single_step());
        assert_eq!(tf.rflags, 0x202);
    }

    #[test]
    fn test_display_names_trap() {
        let mut tf = TrapFrame::new(trapno::BREAKPOINT);
        tf.rip = 0xffff_8000_0010_2030;
        let text = tf.to_string();
        assert!(text.contains("trap 0x00000003 Breakpoint"));
        assert!(text.contains("rip  0xffff800000102030"));
    }
}
