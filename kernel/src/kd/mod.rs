//! Kernel Debug Monitor (KD)
//!
//! Interactive command monitor the kernel drops into on a breakpoint, a
//! debug trap, or when it has nothing else to do.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Monitor (loop)                         │
//! ├──────────────┬──────────────┬──────────────┬───────────────┤
//! │   Tokenizer  │   Registry   │   Commands   │    Resume     │
//! ├──────────────┼──────────────┼──────────────┼───────────────┤
//! │  in-place    │ static table │ map/set, xp/ │  c / si then  │
//! │  argv split  │ exact lookup │ xv, backtrace│  EnvRunner    │
//! └──────────────┴──────────────┴──────────────┴───────────────┘
//! ```
//!
//! The monitor owns nothing: the console, page tables, memory view and
//! symbols are borrowed through traits for the length of one session.

pub mod backtrace;
pub mod commands;
pub mod config;
pub mod dump;
pub mod layout;
pub mod monitor;
pub mod pagemap;
pub mod parse;
pub mod resume;
pub mod symbols;

#[cfg(test)]
pub(crate) mod testing;

pub use backtrace::{Backtrace, StackFrame};
pub use commands::{Command, Status, COMMANDS};
pub use config::{MonitorConfig, CMDBUF_SIZE, MAX_ARGS};
pub use layout::KernelLayout;
pub use monitor::{Monitor, MonitorExit};
pub use resume::EnvRunner;
pub use symbols::{DebugInfo, FunctionSymbol, NoSymbols, SymbolResolver, SymbolTable};
