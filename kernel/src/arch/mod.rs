//! Architecture-specific code
//!
//! This module provides the CPU state the monitor works with on x86_64:
//! the trap frame saved on entry, exception names, and the frame pointer.

pub mod x86_64;

pub use self::x86_64::*;
