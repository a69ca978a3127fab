//! Symbol interning.
//!
//! An [`Atom`] is an interned string: two atoms are equal iff they were
//! interned from equal strings, so name comparison is an integer compare.
//! Well-known names the compiler treats specially are prefilled and exposed
//! as constants in the [`kw`] module.

use rustc_hash::FxHashMap;

/// An interned string handle. Equality is index equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(pub u32);

/// Well-known prefilled atoms. Stable across every [`Interner`].
pub mod kw {
    use super::Atom;

    /// The ignored name `_`.
    pub const UNDERSCORE: Atom = Atom(0);
    pub const THIS: Atom = Atom(1);
    pub const DROP: Atom = Atom(2);
    pub const MAIN: Atom = Atom(3);
    pub const STR: Atom = Atom(4);

    pub(super) const PREFILL: &[&str] = &["_", "this", "drop", "main", "str"];
}

#[derive(Debug)]
pub struct Interner {
    map: FxHashMap<String, Atom>,
    strings: Vec<String>,
}

impl Interner {
    /// A new interner with the [`kw`] atoms prefilled.
    pub fn new() -> Self {
        let mut interner = Interner { map: FxHashMap::default(), strings: Vec::new() };
        for s in kw::PREFILL {
            interner.intern(s);
        }
        interner
    }

    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.map.insert(s.to_string(), atom);
        atom
    }

    /// Resolve an atom back to its string.
    pub fn resolve(&self, atom: Atom) -> &str {
        &self.strings[atom.0 as usize]
    }
}

impl Default for Interner {
    fn default() -> Self {
        Interner::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_dedups() {
        let mut i = Interner::new();
        let a = i.intern("foo");
        let b = i.intern("foo");
        let c = i.intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(i.resolve(a), "foo");
    }

    #[test]
    fn keywords_prefilled() {
        let mut i = Interner::new();
        assert_eq!(i.intern("_"), kw::UNDERSCORE);
        assert_eq!(i.intern("this"), kw::THIS);
        assert_eq!(i.intern("drop"), kw::DROP);
        assert_eq!(i.intern("main"), kw::MAIN);
        assert_eq!(i.intern("str"), kw::STR);
    }
}
