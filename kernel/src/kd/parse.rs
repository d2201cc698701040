//! Command line parsing
//!
//! Splits the line buffer into arguments in place and parses numeric
//! arguments. Nothing here allocates: arguments borrow the line buffer.

use core::str;

use super::config::MAX_ARGS;
use crate::error::MonitorError;

/// Characters that separate arguments
const WHITESPACE: &[u8] = b"\t\r\n ";

#[inline]
fn is_whitespace(c: u8) -> bool {
    WHITESPACE.contains(&c)
}

/// Arguments of one command line
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    argv: [&'a str; MAX_ARGS],
    argc: usize,
}

impl<'a> Args<'a> {
    /// Number of arguments, including the command name
    pub fn len(&self) -> usize {
        self.argc
    }

    pub fn is_empty(&self) -> bool {
        self.argc == 0
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.argv[..self.argc]
    }
}

/// Split `buf` into whitespace-separated arguments
///
/// Whitespace is overwritten with NUL so each argument is terminated in
/// place. Scanning stops at the first NUL already in the buffer. A line
/// with more than `MAX_ARGS - 1` arguments is rejected as a whole.
pub fn tokenize(buf: &mut [u8]) -> Result<Args<'_>, MonitorError> {
    let mut spans = [(0usize, 0usize); MAX_ARGS];
    let mut argc = 0;
    let mut pos = 0;

    loop {
        // gobble whitespace
        while pos < buf.len() && buf[pos] != 0 && is_whitespace(buf[pos]) {
            buf[pos] = 0;
            pos += 1;
        }
        if pos == buf.len() || buf[pos] == 0 {
            break;
        }

        // save and scan past next arg
        if argc == MAX_ARGS - 1 {
            return Err(MonitorError::TooManyArgs { max: MAX_ARGS });
        }
        let start = pos;
        while pos < buf.len() && buf[pos] != 0 && !is_whitespace(buf[pos]) {
            pos += 1;
        }
        spans[argc] = (start, pos);
        argc += 1;
    }

    let line: &[u8] = buf;
    let mut argv = [""; MAX_ARGS];
    for (slot, &(start, end)) in argv.iter_mut().zip(&spans[..argc]) {
        *slot = str::from_utf8(&line[start..end]).map_err(|_| MonitorError::InvalidUtf8)?;
    }

    Ok(Args { argv, argc })
}

/// Parse an unsigned number, picking the base from its prefix
///
/// `0x`/`0X` selects hexadecimal, a leading `0` octal, anything else
/// decimal. The whole text must be digits of that base.
pub fn parse_number(text: &str) -> Option<u64> {
    let (digits, radix) = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (hex, 16)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };

    // from_str_radix accepts a leading '+'
    if digits.is_empty() || !digits.bytes().all(|b| (b as char).is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

/// Parse `args[index]` as a number
///
/// `name` labels the argument in the error; `usage` is shown when it is
/// missing.
pub fn number_arg(
    args: &[&str],
    index: usize,
    name: &'static str,
    usage: &'static str,
) -> Result<u64, MonitorError> {
    let text = args
        .get(index)
        .ok_or(MonitorError::MissingArgument { usage })?;
    parse_number(text).ok_or(MonitorError::InvalidNumber { arg: name })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }

    #[test]
    fn test_tokenize_trims_whitespace() {
        let mut buf = line("  help  ");
        let args = tokenize(&mut buf).unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args.as_slice(), &["help"]);
    }

    #[test]
    fn test_tokenize_terminates_in_place() {
        let mut buf = line("map\t0x1000 \r\n0x2000");
        {
            let args = tokenize(&mut buf).unwrap();
            assert_eq!(args.as_slice(), &["map", "0x1000", "0x2000"]);
        }
        assert_eq!(&buf, b"map\x000x1000\x00\x00\x000x2000");
    }

    #[test]
    fn test_tokenize_stops_at_nul() {
        let mut buf = line("xv 0x10\0 garbage");
        let args = tokenize(&mut buf).unwrap();
        assert_eq!(args.as_slice(), &["xv", "0x10"]);
    }

    #[test]
    fn test_tokenize_empty_line() {
        let mut buf = line(" \t \r\n");
        let args = tokenize(&mut buf).unwrap();
        assert!(args.is_empty());

        let args = tokenize(&mut []).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_tokenize_argument_limit() {
        let fifteen = ["a"; 15].join(" ");
        let mut buf = line(&fifteen);
        assert_eq!(tokenize(&mut buf).unwrap().len(), 15);

        for count in [16, 17] {
            let text = ["a"; 17][..count].join(" ");
            let mut buf = line(&text);
            assert_eq!(
                tokenize(&mut buf).unwrap_err(),
                MonitorError::TooManyArgs { max: MAX_ARGS }
            );
        }
    }

    #[test]
    fn test_tokenize_rejects_invalid_utf8() {
        let mut buf = vec![b'x', b'v', b' ', 0xff, 0xfe];
        assert_eq!(tokenize(&mut buf).unwrap_err(), MonitorError::InvalidUtf8);
    }

    #[test]
    fn test_parse_number_bases() {
        assert_eq!(parse_number("0"), Some(0));
        assert_eq!(parse_number("4096"), Some(4096));
        assert_eq!(parse_number("0x1000"), Some(0x1000));
        assert_eq!(parse_number("0XfF"), Some(0xff));
        assert_eq!(parse_number("010"), Some(8));
        assert_eq!(parse_number("0xffff800000000000"), Some(0xffff_8000_0000_0000));
    }

    #[test]
    fn test_parse_number_rejects_malformed() {
        for text in ["", "0x", "zz", "12ab", "08", "-1", "+5", "0x+5", "0x1g", "99999999999999999999"] {
            assert_eq!(parse_number(text), None, "{:?}", text);
        }
    }

    #[test]
    fn test_number_arg_errors() {
        let args = ["set", "0x1000", "junk"];
        assert_eq!(number_arg(&args, 1, "page", "set <page> <flags>"), Ok(0x1000));
        assert_eq!(
            number_arg(&args, 2, "flags", "set <page> <flags>"),
            Err(MonitorError::InvalidNumber { arg: "flags" })
        );
        assert_eq!(
            number_arg(&args, 3, "extra", "set <page> <flags>"),
            Err(MonitorError::MissingArgument { usage: "set <page> <flags>" })
        );
    }
}
