//! Host-side fakes for monitor tests
//!
//! `Harness` wires a `Monitor` to a scripted console, an in-memory page
//! table, a byte-addressed memory image and a small symbol table:
//!
//! | addresses             | function         | file           | line |
//! |-----------------------|------------------|----------------|------|
//! | 0x100000 - 0x100100   | `kern_init`      | kern/init.rs   | 24   |
//! | 0x100100 - 0x100200   | `test_backtrace` | kern/init.rs   | 13   |
//! | 0x100200 - 0x100400   | `monitor`        | kern/monitor.rs| 230  |

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use x86_64::{PhysAddr, VirtAddr};

use crate::arch::TrapFrame;
use crate::console::Console;
use crate::error::MonitorError;
use crate::mm::{page_round_down, HardwarePte, KernelMemory, PageWalker, KERNEL_SPACE_START};

use super::commands::Status;
use super::config::MonitorConfig;
use super::layout::KernelLayout;
use super::monitor::Monitor;
use super::symbols::{FunctionSymbol, SymbolTable};

/// Console fed from a list of lines
///
/// Prompts and input lines are echoed into the output like a terminal
/// would show them.
pub struct ScriptedConsole {
    input: VecDeque<String>,
    output: String,
    prompts: usize,
}

impl ScriptedConsole {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            input: lines.iter().map(|line| String::from(*line)).collect(),
            output: String::new(),
            prompts: 0,
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        core::mem::take(&mut self.output)
    }

    /// Lines not yet read
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    /// Number of `readline` calls so far
    pub fn prompts(&self) -> usize {
        self.prompts
    }
}

impl fmt::Write for ScriptedConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}

impl Console for ScriptedConsole {
    fn readline(&mut self, prompt: &str, buf: &mut [u8]) -> Option<usize> {
        self.prompts += 1;
        self.output.push_str(prompt);

        let line = self.input.pop_front()?;
        let len = line.len().min(buf.len());
        buf[..len].copy_from_slice(&line.as_bytes()[..len]);
        self.output.push_str(&line);
        self.output.push('\n');
        Some(len)
    }
}

/// Page table keyed by page address
#[derive(Default)]
pub struct FakePageTable {
    entries: BTreeMap<u64, HardwarePte>,
    created: usize,
    flushed: Vec<u64>,
    fail_creation: bool,
}

impl FakePageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an entry without counting it as created
    pub fn insert(&mut self, va: u64, pte: HardwarePte) {
        self.entries.insert(page_round_down(va), pte);
    }

    pub fn get(&self, va: u64) -> Option<HardwarePte> {
        self.entries.get(&page_round_down(va)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries created by `walk`
    pub fn created(&self) -> usize {
        self.created
    }

    /// Pages passed to `flush`, in order
    pub fn flushed(&self) -> &[u64] {
        &self.flushed
    }

    /// Make every later `walk` fail when the entry is missing
    pub fn fail_creation(&mut self) {
        self.fail_creation = true;
    }
}

impl PageWalker for FakePageTable {
    fn walk(&mut self, va: VirtAddr, create: bool) -> Option<&mut HardwarePte> {
        let key = page_round_down(va.as_u64());
        if !self.entries.contains_key(&key) {
            if !create || self.fail_creation {
                return None;
            }
            self.created += 1;
        }
        Some(self.entries.entry(key).or_insert_with(HardwarePte::empty))
    }

    fn flush(&mut self, va: VirtAddr) {
        self.flushed.push(va.as_u64());
    }
}

/// Sparse byte-addressed memory image
///
/// Physical address `pa` is visible at `KERNEL_SPACE_START + pa`.
pub struct FakeMemory {
    bytes: BTreeMap<u64, u8>,
    phys_offset: u64,
}

impl FakeMemory {
    pub fn new() -> Self {
        Self {
            bytes: BTreeMap::new(),
            phys_offset: KERNEL_SPACE_START,
        }
    }

    pub fn write_bytes(&mut self, addr: u64, data: &[u8]) {
        for (i, &b) in data.iter().enumerate() {
            self.bytes.insert(addr + i as u64, b);
        }
    }

    pub fn write_u32(&mut self, addr: u64, value: u32) {
        self.write_bytes(addr, &value.to_le_bytes());
    }

    pub fn write_word(&mut self, addr: u64, value: usize) {
        self.write_bytes(addr, &value.to_le_bytes());
    }

    pub fn fill(&mut self, addr: u64, len: usize, byte: u8) {
        self.write_bytes(addr, &vec![byte; len]);
    }

    fn read<const N: usize>(&self, va: VirtAddr) -> Result<[u8; N], MonitorError> {
        let base = va.as_u64();
        let mut out = [0u8; N];
        for (i, b) in out.iter_mut().enumerate() {
            *b = *self
                .bytes
                .get(&(base + i as u64))
                .ok_or(MonitorError::Unmapped { addr: base })?;
        }
        Ok(out)
    }
}

impl Default for FakeMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelMemory for FakeMemory {
    fn read_u32(&self, va: VirtAddr) -> Result<u32, MonitorError> {
        self.read(va).map(u32::from_le_bytes)
    }

    fn read_word(&self, va: VirtAddr) -> Result<usize, MonitorError> {
        self.read(va).map(usize::from_le_bytes)
    }

    fn phys_to_virt(&self, pa: PhysAddr) -> Result<VirtAddr, MonitorError> {
        let addr = self.phys_offset.wrapping_add(pa.as_u64());
        VirtAddr::try_new(addr).map_err(|_| MonitorError::NonCanonical { addr })
    }
}

static FUNCTIONS: [FunctionSymbol; 3] = [
    FunctionSymbol { start: 0x10_0000, end: 0x10_0100, name: "kern_init", file: "kern/init.rs", line: 24 },
    FunctionSymbol { start: 0x10_0100, end: 0x10_0200, name: "test_backtrace", file: "kern/init.rs", line: 13 },
    FunctionSymbol { start: 0x10_0200, end: 0x10_0400, name: "monitor", file: "kern/monitor.rs", line: 230 },
];

/// Fakes plus the settings a `Monitor` is built from
pub struct Harness {
    pub console: ScriptedConsole,
    pub pgdir: FakePageTable,
    pub memory: FakeMemory,
    pub symbols: SymbolTable<'static>,
    pub layout: KernelLayout,
    pub config: MonitorConfig,
    pub frame_pointer: fn() -> usize,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_input(&[])
    }

    pub fn with_input(lines: &[&str]) -> Self {
        Self {
            console: ScriptedConsole::new(lines),
            pgdir: FakePageTable::new(),
            memory: FakeMemory::new(),
            symbols: SymbolTable::new(&FUNCTIONS),
            layout: KernelLayout::default(),
            config: MonitorConfig::new(),
            frame_pointer: || 0,
        }
    }

    pub fn monitor(&mut self) -> Monitor<'_> {
        Monitor::new(&mut self.console, &mut self.pgdir, &self.memory, &self.symbols)
            .with_layout(self.layout)
            .with_config(self.config)
            .with_frame_pointer(self.frame_pointer)
    }

    /// Run one command line
    pub fn exec(&mut self, line: &str, tf: Option<&mut TrapFrame>) -> Status {
        let mut buf = line.as_bytes().to_vec();
        self.monitor().run_command(&mut buf, tf)
    }

    pub fn output(&self) -> &str {
        self.console.output()
    }

    pub fn take_output(&mut self) -> String {
        self.console.take_output()
    }
}
