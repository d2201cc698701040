//! Monitor error codes
//!
//! Every failure a command can report. Parse and range errors abort the
//! command and the monitor keeps reading lines; `InvalidTrapFrame` also
//! ends the monitor loop.

use core::fmt;

/// Monitor error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorError {
    /// Line holds more tokens than the argument vector can take
    TooManyArgs { max: usize },
    /// Line is not valid UTF-8
    InvalidUtf8,
    /// A numeric argument could not be parsed
    InvalidNumber { arg: &'static str },
    /// A required argument was not given
    MissingArgument { usage: &'static str },
    /// Range start lies above its end
    InvertedRange { start: u64, end: u64 },
    /// Address lies at or above the kernel/user split
    KernelAddress { addr: u64 },
    /// Address is not canonical
    NonCanonical { addr: u64 },
    /// Flag value does not fit the PTE flag field
    FlagsOutOfRange { flags: u64 },
    /// Walker could not produce a page table for the address
    NoPageTable { addr: u64 },
    /// No paused context, or it was not paused by a debug event
    InvalidTrapFrame,
    /// Memory view cannot read the address
    Unmapped { addr: u64 },
    /// Physical address lies beyond installed memory
    OutOfRange { addr: u64 },
    /// Stack walk hit the frame limit
    StackDepthExceeded { max: usize },
    /// Next frame pointer is misaligned or does not move up the stack
    BadFramePointer { fp: usize, next: usize },
}

impl MonitorError {
    /// Does this error end the monitor loop?
    pub fn is_terminal(&self) -> bool {
        matches!(self, MonitorError::InvalidTrapFrame)
    }
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MonitorError::TooManyArgs { max } => write!(f, "Too many arguments (max {})", max),
            MonitorError::InvalidUtf8 => write!(f, "Invalid UTF-8 in command"),
            MonitorError::InvalidNumber { arg } => write!(f, "Invalid number for <{}>", arg),
            MonitorError::MissingArgument { usage } => write!(f, "Usage: {}", usage),
            MonitorError::InvertedRange { start, end } => {
                write!(f, "Invalid parameters[start={:08x}, end={:08x}]", start, end)
            }
            MonitorError::KernelAddress { addr } => write!(f, "Invalid parameters[page={:08x}]", addr),
            MonitorError::NonCanonical { addr } => write!(f, "Non-canonical address {:#x}", addr),
            MonitorError::FlagsOutOfRange { flags } => {
                write!(f, "Invalid parameters[flags={:#x}] (flag field is 12 bits)", flags)
            }
            MonitorError::NoPageTable { addr } => write!(f, "no page table for {:#x}", addr),
            MonitorError::InvalidTrapFrame => write!(f, "Invalid Trapframe"),
            MonitorError::Unmapped { addr } => write!(f, "cannot read {:#x}", addr),
            MonitorError::OutOfRange { addr } => {
                write!(f, "physical address {:#x} beyond installed memory", addr)
            }
            MonitorError::StackDepthExceeded { max } => {
                write!(f, "stack truncated (more than {} frames)", max)
            }
            MonitorError::BadFramePointer { fp, next } => {
                write!(f, "stack truncated (bad link {:#x} -> {:#x})", fp, next)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            MonitorError::TooManyArgs { max: 16 }.to_string(),
            "Too many arguments (max 16)"
        );
        assert_eq!(
            MonitorError::InvertedRange { start: 0x2000, end: 0x1000 }.to_string(),
            "Invalid parameters[start=00002000, end=00001000]"
        );
        assert_eq!(MonitorError::InvalidTrapFrame.to_string(), "Invalid Trapframe");
    }

    #[test]
    fn test_only_trapframe_error_is_terminal() {
        assert!(MonitorError::InvalidTrapFrame.is_terminal());
        assert!(!MonitorError::InvertedRange { start: 1, end: 0 }.is_terminal());
        assert!(!MonitorError::TooManyArgs { max: 16 }.is_terminal());
    }
}
