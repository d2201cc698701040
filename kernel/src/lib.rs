//! Kernel Debug Monitor
//!
//! An interactive monitor for a small x86_64 kernel. It reads command
//! lines from a console and offers:
//!
//! - **help / kerninfo** - command list and kernel image layout
//! - **backtrace** - frame pointer stack walk with symbol lookup
//! - **map / set** - inspect and rewrite leaf page table entries
//! - **xp / xv** - dump physical or virtual memory as 32-bit words
//! - **c / si** - resume a context paused by a breakpoint or debug trap
//!
//! # Integration
//!
//! The kernel provides the collaborators and runs the monitor from its
//! trap handler:
//!
//! ```ignore
//! let mut walker = unsafe { OffsetWalker::active(phys_offset, &mut frames) };
//! let memory = unsafe { DirectMemory::new(phys_offset) };
//! let mut console = SerialConsole;
//!
//! Monitor::new(&mut console, &mut walker, &memory, &NoSymbols)
//!     .with_layout(layout)
//!     .enter(Some(tf), &mut runner);
//! ```
//!
//! Outside `cfg(test)` the crate is `no_std` and does not allocate.

#![cfg_attr(not(test), no_std)]
#![allow(clippy::missing_safety_doc)]
#![allow(clippy::new_without_default)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::doc_lazy_continuation)]

pub mod arch;
pub mod console;
pub mod error;
pub mod kd;
pub mod mm;

pub use arch::TrapFrame;
pub use console::{Console, SerialConsole};
pub use error::MonitorError;
pub use kd::{EnvRunner, Monitor, MonitorConfig, MonitorExit, Status};
pub use mm::{DirectMemory, KernelMemory, PageWalker};
