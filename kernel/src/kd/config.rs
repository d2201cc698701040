//! Monitor configuration

use crate::mm::KERNEL_SPACE_START;

/// Maximum number of arguments, one slot reserved as terminator
pub const MAX_ARGS: usize = 16;

/// Command line buffer size (one VGA text line)
pub const CMDBUF_SIZE: usize = 80;

/// Default limit on frames printed by `backtrace`
pub const DEFAULT_BACKTRACE_DEPTH: usize = 64;

/// Default prompt
pub const DEFAULT_PROMPT: &str = "K> ";

/// Runtime tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// First kernel address; `set` refuses pages at or above it
    pub kernel_base: u64,
    /// Frames `backtrace` prints before reporting truncation
    pub backtrace_depth: usize,
    /// Prompt shown before each line
    pub prompt: &'static str,
}

impl MonitorConfig {
    pub const fn new() -> Self {
        Self {
            kernel_base: KERNEL_SPACE_START,
            backtrace_depth: DEFAULT_BACKTRACE_DEPTH,
            prompt: DEFAULT_PROMPT,
        }
    }

    pub const fn with_kernel_base(mut self, kernel_base: u64) -> Self {
        self.kernel_base = kernel_base;
        self
    }

    pub const fn with_backtrace_depth(mut self, depth: usize) -> Self {
        self.backtrace_depth = depth;
        self
    }

    pub const fn with_prompt(mut self, prompt: &'static str) -> Self {
        self.prompt = prompt;
        self
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}
