//! Monitor console
//!
//! The monitor talks to the operator through a `Console`: formatted output
//! plus one-line input. On hardware this is COM1 (0x3F8), the same port the
//! kernel's serial log goes to.

use core::fmt::{self, Write};
use spin::Mutex;

/// Operator console
pub trait Console: fmt::Write {
    /// Print `prompt` and read one line into `buf`
    ///
    /// Returns the number of bytes stored, or `None` at end of input.
    fn readline(&mut self, prompt: &str, buf: &mut [u8]) -> Option<usize>;
}

/// Print to a console, ignoring output errors
pub fn _print(console: &mut dyn Console, args: fmt::Arguments) {
    let _ = console.write_fmt(args);
}

/// Print macro for console output
#[macro_export]
macro_rules! console_print {
    ($con:expr, $($arg:tt)*) => ($crate::console::_print(&mut *$con, format_args!($($arg)*)));
}

/// Print with newline macro for console output
#[macro_export]
macro_rules! console_println {
    ($con:expr) => ($crate::console_print!($con, "\n"));
    ($con:expr, $($arg:tt)*) => ($crate::console_print!($con, "{}\n", format_args!($($arg)*)));
}

/// COM1 port address
const COM1: u16 = 0x3F8;

/// Serial port on COM1
pub struct SerialPort;

#[cfg(target_arch = "x86_64")]
impl SerialPort {
    /// Write a byte to COM1
    fn write_byte(&mut self, byte: u8) {
        use x86_64::instructions::port::Port;
        let mut status: Port<u8> = Port::new(COM1 + 5);
        let mut data: Port<u8> = Port::new(COM1);
        unsafe {
            // Wait for transmit buffer to be empty
            while (status.read() & 0x20) == 0 {}
            data.write(byte);
        }
    }

    /// Block until a byte arrives on COM1
    fn read_byte(&mut self) -> u8 {
        use x86_64::instructions::port::Port;
        let mut status: Port<u8> = Port::new(COM1 + 5);
        let mut data: Port<u8> = Port::new(COM1);
        unsafe {
            // Wait for data ready
            while (status.read() & 0x01) == 0 {
                core::hint::spin_loop();
            }
            data.read()
        }
    }
}

#[cfg(not(target_arch = "x86_64"))]
impl SerialPort {
    fn write_byte(&mut self, _byte: u8) {}

    fn read_byte(&mut self) -> u8 {
        0x04
    }
}

impl Write for SerialPort {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(byte);
        }
        Ok(())
    }
}

/// Global serial port (already initialized by the bootloader)
static SERIAL: Mutex<SerialPort> = Mutex::new(SerialPort);

/// Monitor console on COM1 with minimal line editing
pub struct SerialConsole;

impl Write for SerialConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        SERIAL.lock().write_str(s)
    }
}

impl Console for SerialConsole {
    fn readline(&mut self, prompt: &str, buf: &mut [u8]) -> Option<usize> {
        let mut serial = SERIAL.lock();
        let _ = serial.write_str(prompt);
        let mut len = 0;

        loop {
            let c = serial.read_byte();
            match c {
                // Enter - line complete
                b'\r' | b'\n' => {
                    let _ = serial.write_str("\n");
                    if len < buf.len() {
                        buf[len] = 0;
                    }
                    return Some(len);
                }

                // Backspace
                0x7F | 0x08 => {
                    if len > 0 {
                        len -= 1;
                        // Erase character on screen: backspace, space, backspace
                        let _ = serial.write_str("\x08 \x08");
                    }
                }

                // Ctrl+C - cancel current line
                0x03 => {
                    let _ = serial.write_str("^C\n");
                    len = 0;
                    let _ = serial.write_str(prompt);
                }

                // Ctrl+D - end of input
                0x04 => {
                    let _ = serial.write_str("\n");
                    return None;
                }

                // Regular printable characters and tab
                b'\t' | 0x20..=0x7E => {
                    // Keep one byte for the terminator
                    if len + 1 < buf.len() {
                        buf[len] = c;
                        len += 1;
                        serial.write_byte(c);
                    }
                }

                _ => {}
            }
        }
    }
}

/// `log` backend writing to COM1
pub struct SerialLogger;

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(
                SERIAL.lock(),
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger;

/// Install the serial logger as the `log` backend
pub fn init_logger(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
