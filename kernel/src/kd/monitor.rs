//! Monitor loop
//!
//! Reads command lines from the console and dispatches them until a
//! command ends the session:
//!
//! ```text
//! START ──> banner, trap frame ──> READ-LINE ──> DISPATCH ──┐
//!                                     ^   │                 │
//!                                     │   └─ end of input ──┼──> TERMINATE
//!                                     └──── Continue ───────┤
//!                                                Exit/Resume┘
//! ```

use crate::arch::TrapFrame;
use crate::console::Console;
use crate::console_println;
use crate::mm::{KernelMemory, PageWalker};

use super::commands::{self, Status};
use super::config::{MonitorConfig, CMDBUF_SIZE};
use super::layout::KernelLayout;
use super::parse;
use super::resume::EnvRunner;
use super::symbols::SymbolResolver;

/// Why the monitor loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
    /// A command asked to leave
    Exit,
    /// The console reported end of input
    EndOfInput,
    /// `c` or `si` prepared the paused context for resumption
    Resume,
}

/// Interactive kernel monitor
///
/// Borrows everything it inspects; it owns no kernel state of its own.
pub struct Monitor<'a> {
    pub(crate) console: &'a mut dyn Console,
    pub(crate) pgdir: &'a mut dyn PageWalker,
    pub(crate) memory: &'a dyn KernelMemory,
    pub(crate) symbols: &'a dyn SymbolResolver,
    pub(crate) layout: KernelLayout,
    pub(crate) config: MonitorConfig,
    /// Replaces the live `rbp` read in `backtrace`
    pub(crate) frame_pointer: Option<fn() -> usize>,
}

impl<'a> Monitor<'a> {
    pub fn new(
        console: &'a mut dyn Console,
        pgdir: &'a mut dyn PageWalker,
        memory: &'a dyn KernelMemory,
        symbols: &'a dyn SymbolResolver,
    ) -> Self {
        Self {
            console,
            pgdir,
            memory,
            symbols,
            layout: KernelLayout::default(),
            config: MonitorConfig::new(),
            frame_pointer: None,
        }
    }

    /// Kernel image layout reported by `kerninfo`
    pub fn with_layout(mut self, layout: KernelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Start `backtrace` from `frame_pointer()` instead of the live `rbp`
    pub fn with_frame_pointer(mut self, frame_pointer: fn() -> usize) -> Self {
        self.frame_pointer = Some(frame_pointer);
        self
    }

    /// Run the monitor, then hand a resumed context to `runner`
    ///
    /// Returns only when the session ends without resuming.
    pub fn enter(&mut self, mut tf: Option<&mut TrapFrame>, runner: &mut dyn EnvRunner) -> MonitorExit {
        let exit = self.run(tf.as_deref_mut());
        if exit == MonitorExit::Resume {
            if let Some(tf) = tf {
                log::debug!(target: "kd", "resuming at {:#x}", tf.rip);
                runner.run(tf);
            }
        }
        exit
    }

    /// Run the read-eval-print loop until a command ends it
    pub fn run(&mut self, mut tf: Option<&mut TrapFrame>) -> MonitorExit {
        console_println!(self.console, "Welcome to the kernel monitor!");
        console_println!(self.console, "Type 'help' for a list of commands.");

        if let Some(frame) = tf.as_deref() {
            log::info!(target: "kd", "monitor entered on trap {}", frame.trapno);
            console_println!(self.console, "{}", frame);
        }

        let mut buf = [0u8; CMDBUF_SIZE];
        loop {
            buf.fill(0);
            let Some(len) = self.console.readline(self.config.prompt, &mut buf) else {
                log::debug!(target: "kd", "end of input");
                return MonitorExit::EndOfInput;
            };
            let len = len.min(buf.len());

            match self.run_command(&mut buf[..len], tf.as_deref_mut()) {
                Status::Continue => {}
                Status::Exit => return MonitorExit::Exit,
                Status::Resume => return MonitorExit::Resume,
            }
        }
    }

    /// Tokenize and dispatch one line
    pub fn run_command(&mut self, line: &mut [u8], tf: Option<&mut TrapFrame>) -> Status {
        match parse::tokenize(line) {
            Ok(args) => self.dispatch(args.as_slice(), tf),
            Err(err) => {
                log::debug!(target: "kd", "{}", err);
                console_println!(self.console, "{}", err);
                Status::Continue
            }
        }
    }

    /// Invoke the command named by `argv[0]`
    pub fn dispatch(&mut self, argv: &[&str], tf: Option<&mut TrapFrame>) -> Status {
        let Some(&name) = argv.first() else {
            return Status::Continue;
        };

        match commands::lookup(name) {
            Some(cmd) => {
                log::debug!(target: "kd", "dispatch {:?}", argv);
                (cmd.func)(self, argv, tf)
            }
            None => {
                console_println!(self.console, "Unknown command '{}'", name);
                Status::Continue
            }
        }
    }
}
