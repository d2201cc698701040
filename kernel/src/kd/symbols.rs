//! Symbol lookup
//!
//! Maps instruction addresses to source locations for `backtrace` and `si`.

/// Source location of an instruction address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugInfo<'a> {
    /// Source file name
    pub file: &'a str,
    /// Source line number
    pub line: u32,
    /// Function name
    pub fn_name: &'a str,
    /// Start address of the function
    pub fn_addr: usize,
}

impl DebugInfo<'static> {
    /// Placeholder for addresses the resolver does not know
    pub const fn unknown(addr: usize) -> Self {
        Self {
            file: "<unknown>",
            line: 0,
            fn_name: "<unknown>",
            fn_addr: addr,
        }
    }
}

impl DebugInfo<'_> {
    /// Byte offset of `addr` into the function
    pub fn offset(&self, addr: usize) -> usize {
        addr.wrapping_sub(self.fn_addr)
    }
}

/// Instruction address to source location resolver
pub trait SymbolResolver {
    fn resolve(&self, addr: usize) -> Option<DebugInfo<'_>>;
}

/// Resolve `addr`, falling back to `<unknown>`
pub fn lookup(resolver: &dyn SymbolResolver, addr: usize) -> DebugInfo<'_> {
    resolver.resolve(addr).unwrap_or(DebugInfo::unknown(addr))
}

/// Resolver for kernels built without symbol information
pub struct NoSymbols;

impl SymbolResolver for NoSymbols {
    fn resolve(&self, _addr: usize) -> Option<DebugInfo<'_>> {
        None
    }
}

/// One function in a `SymbolTable`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSymbol {
    /// First instruction
    pub start: usize,
    /// One past the last instruction
    pub end: usize,
    pub name: &'static str,
    pub file: &'static str,
    /// Line of the function's declaration
    pub line: u32,
}

/// Function-granular resolver over a table sorted by `start`
///
/// Reports the declaration line of the enclosing function, not the line
/// of the instruction itself.
pub struct SymbolTable<'a> {
    functions: &'a [FunctionSymbol],
}

impl<'a> SymbolTable<'a> {
    /// `functions` must be sorted by `start` and must not overlap
    pub const fn new(functions: &'a [FunctionSymbol]) -> Self {
        Self { functions }
    }
}

impl SymbolResolver for SymbolTable<'_> {
    fn resolve(&self, addr: usize) -> Option<DebugInfo<'_>> {
        let idx = self.functions.partition_point(|f| f.start <= addr);
        let func = self.functions[..idx].last()?;
        (addr < func.end).then_some(DebugInfo {
            file: func.file,
            line: func.line,
            fn_name: func.name,
            fn_addr: func.start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FUNCTIONS: [FunctionSymbol; 2] = [
        FunctionSymbol { start: 0x1000, end: 0x1080, name: "i386_init", file: "kern/init.rs", line: 24 },
        FunctionSymbol { start: 0x1100, end: 0x1200, name: "test_backtrace", file: "kern/init.rs", line: 13 },
    ];

    #[test]
    fn test_table_lookup() {
        let table = SymbolTable::new(&FUNCTIONS);

        let info = table.resolve(0x1040).unwrap();
        assert_eq!(info.fn_name, "i386_init");
        assert_eq!(info.offset(0x1040), 0x40);

        let info = table.resolve(0x1100).unwrap();
        assert_eq!(info.fn_name, "test_backtrace");
        assert_eq!(info.line, 13);
    }

    #[test]
    fn test_table_gaps_and_edges() {
        let table = SymbolTable::new(&FUNCTIONS);
        assert!(table.resolve(0xfff).is_none());
        assert!(table.resolve(0x1080).is_none());
        assert!(table.resolve(0x1200).is_none());
    }

    #[test]
    fn test_lookup_falls_back_to_unknown() {
        let info = lookup(&NoSymbols, 0xdead);
        assert_eq!(info.file, "<unknown>");
        assert_eq!(info.offset(0xdead), 0);
    }
}
