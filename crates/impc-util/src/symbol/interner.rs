//! Hash-indexed string table backing [`super::Symbol`].
//!
//! Interned strings are leaked (`Box::leak`) to obtain `'static` references.
//! That is safe here because a `StringTable` lives exactly as long as one
//! compilation and the total memory interned is bounded by the size of the
//! one source file being compiled.

use rustc_hash::FxHashMap;
use std::cell::RefCell;

use super::Symbol;

thread_local! {
    /// One string table per thread; since the compiler runs single-threaded
    /// and synchronously, a single logical table is all any run ever sees.
    pub static STRING_TABLE: RefCell<StringTable> = RefCell::new(StringTable::new());
}

pub struct StringTable {
    index: FxHashMap<u64, Vec<(&'static str, u32)>>,
    strings: Vec<&'static str>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            strings: Vec::new(),
        }
    }

    fn hash_of(s: &str) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = rustc_hash::FxHasher::default();
        s.hash(&mut hasher);
        hasher.finish()
    }

    pub fn intern(&mut self, string: &str) -> Symbol {
        let hash = Self::hash_of(string);
        if let Some(bucket) = self.index.get(&hash) {
            for &(existing, idx) in bucket {
                if existing == string {
                    return Symbol { index: idx };
                }
            }
        }

        let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let idx = self.strings.len() as u32;
        self.strings.push(leaked);
        self.index.entry(hash).or_default().push((leaked, idx));
        Symbol { index: idx }
    }

    pub fn get(&self, symbol: Symbol) -> &'static str {
        self.strings
            .get(symbol.index as usize)
            .copied()
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut table = StringTable::new();
        let a = table.intern("hello");
        let b = table.intern("hello");
        assert_eq!(a, b);
        assert_eq!(table.get(a), "hello");
    }

    #[test]
    fn distinct_strings_get_distinct_symbols() {
        let mut table = StringTable::new();
        let a = table.intern("foo");
        let b = table.intern("bar");
        assert_ne!(a, b);
    }
}
